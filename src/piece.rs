//! Piece values, collision, and the current/next/held piece controller.

use crate::field::Field;
use crate::generators::PieceSource;
use crate::shapes::{PieceKind, Shape};

/// A piece at a field-relative origin with a rotation index.
/// Shape data is looked up from the static catalog, never copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Rotation 0, top row, origin one column left of centre.
    pub fn spawn(kind: PieceKind, field_width: usize) -> Self {
        Self {
            kind,
            rotation: 0,
            x: (field_width as i32 / 2 - 1).max(0),
            y: 0,
        }
    }

    pub fn shape(&self) -> &'static Shape {
        self.kind.shape(self.rotation)
    }

    /// Field coordinates of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape().cells().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn moved(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Next rotation state clockwise, wrapping.
    pub fn rotated(self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.kind.rotation_count(),
            ..self
        }
    }

    /// Same kind back at spawn position and rotation.
    pub fn respawned(self, field_width: usize) -> Self {
        Self::spawn(self.kind, field_width)
    }
}

/// True if every occupied cell is inside the side walls, not below the floor,
/// and (for rows on the field) not on a filled cell. Rows above the top are free.
pub fn can_place(piece: &Piece, field: &Field) -> bool {
    let (w, h) = (field.width() as i32, field.height() as i32);
    piece.cells().all(|(x, y)| {
        if x < 0 || x >= w || y >= h {
            return false;
        }
        if y < 0 {
            return true;
        }
        !field.get(x as usize, y as usize).is_some_and(|c| c.is_filled())
    })
}

/// Lowest position reachable by dropping straight down.
pub fn drop_position(piece: Piece, field: &Field) -> Piece {
    let mut landed = piece;
    while can_place(&landed.moved(0, 1), field) {
        landed = landed.moved(0, 1);
    }
    landed
}

/// Current, next and held piece plus the once-per-spawn hold flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceController {
    current: Piece,
    next: Piece,
    held: Option<Piece>,
    can_hold: bool,
    field_width: usize,
}

impl PieceController {
    pub fn new(source: &mut dyn PieceSource, field_width: usize) -> Self {
        let current = Piece::spawn(source.next_kind(), field_width);
        let next = Piece::spawn(source.next_kind(), field_width);
        Self {
            current,
            next,
            held: None,
            can_hold: true,
            field_width,
        }
    }

    pub fn current(&self) -> Piece {
        self.current
    }

    pub fn next(&self) -> Piece {
        self.next
    }

    pub fn held(&self) -> Option<Piece> {
        self.held
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    /// Move by (dx, dy) if the result fits. Returns whether it moved.
    pub fn try_move(&mut self, dx: i32, dy: i32, field: &Field) -> bool {
        let candidate = self.current.moved(dx, dy);
        let ok = can_place(&candidate, field);
        if ok {
            self.current = candidate;
        }
        ok
    }

    /// Advance one rotation state if the rotated shape fits in place.
    /// No wall kicks: a colliding rotation is rejected.
    pub fn rotate(&mut self, field: &Field) -> bool {
        let candidate = self.current.rotated();
        let ok = can_place(&candidate, field);
        if ok {
            self.current = candidate;
        }
        ok
    }

    /// Stash the current piece. The first hold promotes the next piece;
    /// later holds swap with the held one. Returns false if hold was used up.
    pub fn hold(&mut self, source: &mut dyn PieceSource) -> bool {
        if !self.can_hold {
            return false;
        }
        let incoming = match self.held.replace(self.current) {
            Some(held) => held,
            None => self.draw_next(source),
        };
        self.current = incoming.respawned(self.field_width);
        self.can_hold = false;
        true
    }

    /// Natural spawn after a lock: next becomes current, hold is re-enabled.
    pub fn advance(&mut self, source: &mut dyn PieceSource) {
        self.current = self.draw_next(source);
        self.can_hold = true;
    }

    fn draw_next(&mut self, source: &mut dyn PieceSource) -> Piece {
        let fresh = Piece::spawn(source.next_kind(), self.field_width);
        std::mem::replace(&mut self.next, fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Cell;
    use crate::generators::Sequence;

    #[test]
    fn spawn_is_centred_at_top() {
        let p = Piece::spawn(PieceKind::T, 10);
        assert_eq!((p.x, p.y, p.rotation), (4, 0, 0));
    }

    #[test]
    fn cannot_place_outside_walls_or_below_floor() {
        let field = Field::new(10, 20);
        for kind in PieceKind::ALL {
            for rotation in 0..kind.rotation_count() {
                let p = Piece { kind, rotation, x: 0, y: 0 };
                let w = p.shape().width() as i32;
                let h = p.shape().height() as i32;
                assert!(can_place(&p, &field));
                assert!(!can_place(&p.moved(-1, 0), &field), "{kind:?} left wall");
                assert!(!can_place(&p.moved(10 - w + 1, 0), &field), "{kind:?} right wall");
                assert!(can_place(&p.moved(0, 20 - h), &field));
                assert!(!can_place(&p.moved(0, 20 - h + 1), &field), "{kind:?} floor");
            }
        }
    }

    #[test]
    fn rows_above_field_are_free_but_walls_still_apply() {
        let mut field = Field::new(10, 20);
        for x in 0..10 {
            field.set(x, 0, Cell::Filled(PieceKind::O));
        }
        let above = Piece { kind: PieceKind::I, rotation: 0, x: 3, y: -1 };
        assert!(can_place(&above, &field));
        assert!(!can_place(&above.moved(0, 1), &field));
        assert!(!can_place(&Piece { x: -1, ..above }, &field));
    }

    #[test]
    fn rotation_is_cyclic() {
        for kind in PieceKind::ALL {
            let start = Piece::spawn(kind, 10);
            let mut p = start;
            for _ in 0..kind.rotation_count() {
                p = p.rotated();
            }
            assert_eq!(p, start);
            let mut p = start;
            for _ in 0..4 {
                p = p.rotated();
            }
            assert!(std::ptr::eq(p.shape(), start.shape()), "{kind:?}");
        }
    }

    #[test]
    fn blocked_move_and_rotation_are_no_ops() {
        let field = Field::new(10, 20);
        let mut src = Sequence::new(vec![PieceKind::I]);
        let mut pc = PieceController::new(&mut src, 10);
        while pc.try_move(0, 1, &field) {}
        let resting = pc.current();
        assert_eq!(resting.y, 19);
        // vertical I would poke through the floor
        assert!(!pc.rotate(&field));
        assert_eq!(pc.current(), resting);
        assert!(!pc.try_move(0, 1, &field));
        assert_eq!(pc.current(), resting);
    }

    #[test]
    fn first_hold_promotes_next_then_swaps() {
        let field = Field::new(10, 20);
        let mut src = Sequence::new(vec![PieceKind::T, PieceKind::S, PieceKind::Z, PieceKind::J]);
        let mut pc = PieceController::new(&mut src, 10);
        assert!(pc.can_hold());
        pc.try_move(1, 3, &field);

        assert!(pc.hold(&mut src));
        assert_eq!(pc.current().kind, PieceKind::S);
        assert_eq!(pc.next().kind, PieceKind::Z);
        assert_eq!(pc.held().map(|p| p.kind), Some(PieceKind::T));
        assert!(!pc.can_hold());
        assert!(!pc.hold(&mut src));

        pc.advance(&mut src);
        assert_eq!(pc.current().kind, PieceKind::Z);
        assert!(pc.can_hold());
        pc.try_move(-2, 5, &field);
        pc.rotate(&field);

        assert!(pc.hold(&mut src));
        assert_eq!(pc.current(), Piece::spawn(PieceKind::T, 10));
        assert_eq!(pc.held().map(|p| p.kind), Some(PieceKind::Z));
        assert_eq!(pc.next().kind, PieceKind::J);
    }

    #[test]
    fn drop_position_rests_on_stack() {
        let mut field = Field::new(10, 20);
        field.set(4, 10, Cell::Filled(PieceKind::L));
        let p = Piece::spawn(PieceKind::O, 10);
        assert_eq!(drop_position(p, &field).y, 8);
    }
}
