//! Shape catalog: piece kinds and their rotation-state matrices.

/// Tetromino kinds (I, O, T, S, Z, J, L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

/// One rotation state: rows top to bottom, 1 = occupied.
#[derive(Debug, PartialEq, Eq)]
pub struct Shape(&'static [&'static [u8]]);

impl Shape {
    pub fn height(&self) -> usize {
        self.0.len()
    }

    pub fn width(&self) -> usize {
        self.0.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.0.get(y).and_then(|row| row.get(x)).is_some_and(|&c| c != 0)
    }

    /// Occupied cells as (dx, dy) offsets from the shape's top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.0.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &c)| c != 0)
                .map(move |(dx, _)| (dx as i32, dy as i32))
        })
    }
}

static I_SHAPES: [Shape; 2] = [Shape(&[&[1, 1, 1, 1]]), Shape(&[&[1], &[1], &[1], &[1]])];

static O_SHAPES: [Shape; 1] = [Shape(&[&[1, 1], &[1, 1]])];

static T_SHAPES: [Shape; 4] = [
    Shape(&[&[0, 1, 0], &[1, 1, 1]]),
    Shape(&[&[1, 0], &[1, 1], &[1, 0]]),
    Shape(&[&[1, 1, 1], &[0, 1, 0]]),
    Shape(&[&[0, 1], &[1, 1], &[0, 1]]),
];

static S_SHAPES: [Shape; 2] = [
    Shape(&[&[0, 1, 1], &[1, 1, 0]]),
    Shape(&[&[1, 0], &[1, 1], &[0, 1]]),
];

static Z_SHAPES: [Shape; 2] = [
    Shape(&[&[1, 1, 0], &[0, 1, 1]]),
    Shape(&[&[0, 1], &[1, 1], &[1, 0]]),
];

static J_SHAPES: [Shape; 4] = [
    Shape(&[&[1, 0, 0], &[1, 1, 1]]),
    Shape(&[&[1, 1], &[1, 0], &[1, 0]]),
    Shape(&[&[1, 1, 1], &[0, 0, 1]]),
    Shape(&[&[0, 1], &[0, 1], &[1, 1]]),
];

static L_SHAPES: [Shape; 4] = [
    Shape(&[&[0, 0, 1], &[1, 1, 1]]),
    Shape(&[&[1, 0], &[1, 0], &[1, 1]]),
    Shape(&[&[1, 1, 1], &[1, 0, 0]]),
    Shape(&[&[1, 1], &[0, 1], &[0, 1]]),
];

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::J, Self::L];

    /// All rotation states, clockwise from the spawn orientation.
    pub fn rotations(self) -> &'static [Shape] {
        match self {
            Self::I => &I_SHAPES,
            Self::O => &O_SHAPES,
            Self::T => &T_SHAPES,
            Self::S => &S_SHAPES,
            Self::Z => &Z_SHAPES,
            Self::J => &J_SHAPES,
            Self::L => &L_SHAPES,
        }
    }

    pub fn rotation_count(self) -> usize {
        self.rotations().len()
    }

    /// Shape for a rotation index; the index wraps.
    pub fn shape(self, rotation: usize) -> &'static Shape {
        let rotations = self.rotations();
        &rotations[rotation % rotations.len()]
    }

    /// Colour index 0..7 for `Theme::piece_color`.
    pub fn color_index(self) -> u8 {
        match self {
            Self::I => 0,
            Self::O => 1,
            Self::T => 2,
            Self::S => 3,
            Self::Z => 4,
            Self::J => 5,
            Self::L => 6,
        }
    }
}
