//! Blockfall engine: falling-block puzzle rules with no I/O.
//!
//! A [`Session`] owns the field and piece queue. Front ends drive it through
//! [`Controls`] (or [`Session::apply`]) plus [`Session::tick`] with elapsed
//! milliseconds, and draw from [`Session::snapshot`].

pub mod config;
pub mod field;
pub mod generators;
pub mod piece;
pub mod scoring;
pub mod session;
pub mod shapes;

pub use config::{ConfigError, EngineConfig};
pub use field::{Cell, Field, OutOfBounds};
pub use generators::{Bag, PieceSource, Sequence, Uniform};
pub use piece::{Piece, PieceController, can_place};
pub use scoring::{ClearResult, ScoreKeeper};
pub use session::{Command, Controls, Direction, DropKind, GameEvent, Phase, Session, Snapshot};
pub use shapes::{PieceKind, Shape};
