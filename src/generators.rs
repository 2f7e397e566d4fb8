//! Piece sources: uniform random, shuffled 7-bag, and fixed sequences.

use crate::shapes::PieceKind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Supplies the kind of each freshly drawn piece.
pub trait PieceSource: std::fmt::Debug {
    fn next_kind(&mut self) -> PieceKind;
}

/// Each kind with equal probability.
#[derive(Debug, Clone)]
pub struct Uniform {
    rng: StdRng,
}

impl Uniform {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded(seed) }
    }
}

impl PieceSource for Uniform {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

/// Bag of 7 tetrominoes (random order, then refill).
#[derive(Debug, Clone)]
pub struct Bag {
    queue: Vec<PieceKind>,
    rng: StdRng,
}

impl Bag {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            queue: Vec::with_capacity(PieceKind::ALL.len()),
            rng: seeded(seed),
        }
    }

    fn refill(&mut self) {
        let mut all = PieceKind::ALL.to_vec();
        all.shuffle(&mut self.rng);
        self.queue.extend(all);
    }
}

impl PieceSource for Bag {
    fn next_kind(&mut self) -> PieceKind {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.remove(0)
    }
}

/// Cycles through a fixed list. Used for scripted games and tests.
#[derive(Debug, Clone)]
pub struct Sequence {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl Sequence {
    /// An empty list falls back to all kinds in catalog order.
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        let pieces = if pieces.is_empty() {
            PieceKind::ALL.to_vec()
        } else {
            pieces
        };
        Self { pieces, index: 0 }
    }
}

impl PieceSource for Sequence {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        kind
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
