//! Field grid: occupancy store, piece commit, full-row detection and removal.

use crate::piece::Piece;
use crate::shapes::PieceKind;
use std::collections::VecDeque;
use thiserror::Error;

/// Single cell: empty or filled by a locked piece of the given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell ({x}, {y}) is outside the {width}x{height} field")]
pub struct OutOfBounds {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Playfield: grid of cells. y=0 is top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Field {
    pub fn new(width: usize, height: usize) -> Self {
        let rows = (0..height).map(|_| vec![Cell::Empty; width]).collect();
        Self { width, height, rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    pub fn occupied(&self, x: usize, y: usize) -> Result<bool, OutOfBounds> {
        self.get(x, y).map(Cell::is_filled).ok_or(OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        })
    }

    pub fn row(&self, y: usize) -> Option<&[Cell]> {
        self.rows.get(y).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Write the piece's cells into the grid. Cells above row 0 are dropped.
    pub fn place(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 {
                self.set(x as usize, y as usize, Cell::Filled(piece.kind));
            }
        }
    }

    /// Indices of rows with no empty cell, top to bottom.
    pub fn full_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|c| c.is_filled()))
            .map(|(y, _)| y)
            .collect()
    }

    /// Remove the given rows and push the same number of empty rows on top.
    /// Remaining rows keep their relative order.
    pub fn clear(&mut self, rows: &[usize]) {
        let before = self.rows.len();
        let mut y = 0;
        self.rows.retain(|_| {
            let keep = !rows.contains(&y);
            y += 1;
            keep
        });
        for _ in self.rows.len()..before {
            self.rows.push_front(vec![Cell::Empty; self.width]);
        }
    }

    /// Rows holding at least one filled cell.
    pub fn occupied_row_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.iter().any(|c| c.is_filled()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(field: &mut Field, y: usize, kind: PieceKind) {
        for x in 0..field.width() {
            field.set(x, y, Cell::Filled(kind));
        }
    }

    #[test]
    fn new_field_is_empty() {
        let f = Field::new(10, 20);
        assert_eq!(f.rows().count(), 20);
        assert!(f.rows().all(|r| r.len() == 10));
        assert_eq!(f.occupied_row_count(), 0);
        assert!(f.full_rows().is_empty());
    }

    #[test]
    fn occupied_reports_out_of_bounds() {
        let mut f = Field::new(4, 4);
        f.set(1, 2, Cell::Filled(PieceKind::S));
        assert_eq!(f.occupied(1, 2), Ok(true));
        assert_eq!(f.occupied(0, 0), Ok(false));
        let err = f.occupied(4, 0).unwrap_err();
        assert_eq!(err.to_string(), "cell (4, 0) is outside the 4x4 field");
    }

    #[test]
    fn place_skips_cells_above_top() {
        let mut f = Field::new(10, 20);
        let piece = Piece {
            kind: PieceKind::I,
            rotation: 1,
            x: 0,
            y: -2,
        };
        f.place(&piece);
        assert_eq!(f.get(0, 0), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(f.get(0, 1), Some(Cell::Filled(PieceKind::I)));
        assert_eq!(f.get(0, 2), Some(Cell::Empty));
    }

    #[test]
    fn full_rows_top_to_bottom() {
        let mut f = Field::new(4, 6);
        fill_row(&mut f, 5, PieceKind::I);
        fill_row(&mut f, 2, PieceKind::O);
        f.set(0, 3, Cell::Filled(PieceKind::T));
        assert_eq!(f.full_rows(), vec![2, 5]);
    }

    #[test]
    fn clear_shifts_rows_down_and_keeps_order() {
        let mut f = Field::new(4, 6);
        fill_row(&mut f, 5, PieceKind::I);
        fill_row(&mut f, 3, PieceKind::O);
        f.set(0, 4, Cell::Filled(PieceKind::T));
        f.set(1, 2, Cell::Filled(PieceKind::Z));

        f.clear(&[3, 5]);

        assert_eq!(f.height(), 6);
        assert_eq!(f.rows().count(), 6);
        assert_eq!(f.get(0, 5), Some(Cell::Filled(PieceKind::T)));
        assert_eq!(f.get(1, 4), Some(Cell::Filled(PieceKind::Z)));
        assert!(f.row(0).unwrap().iter().all(|c| *c == Cell::Empty));
        assert!(f.row(1).unwrap().iter().all(|c| *c == Cell::Empty));
        assert_eq!(f.occupied_row_count(), 2);
    }
}
