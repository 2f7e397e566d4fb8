//! Game session: Idle/Running/Paused/Over state machine, drop timer,
//! lock/clear/spawn sequence, player actions and read-only snapshots.

use crate::config::{ConfigError, EngineConfig};
use crate::field::{Cell, Field};
use crate::generators::PieceSource;
use crate::piece::{Piece, PieceController, can_place, drop_position};
use crate::scoring::ScoreKeeper;
use crate::shapes::PieceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Soft,
    Hard,
}

/// Discrete player action, as produced by an input front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    Rotate,
    Hold,
    Start,
    Pause,
}

/// State changes a front end may want to react to (effects, sounds, stats).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Locked(PieceKind),
    /// Cleared row indices and their cells as they were before removal.
    LinesCleared {
        rows: Vec<usize>,
        cells: Vec<Vec<Cell>>,
    },
    LevelUp(u32),
    Held,
    GameOver,
}

/// Capability set any front end (terminal, headless harness) drives.
pub trait Controls {
    fn on_move(&mut self, direction: Direction) -> bool;
    fn on_rotate(&mut self) -> bool;
    fn on_drop(&mut self, drop: DropKind);
    fn on_hold(&mut self) -> bool;
    fn on_start(&mut self);
    fn on_pause(&mut self);

    fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => {
                self.on_move(Direction::Left);
            }
            Command::MoveRight => {
                self.on_move(Direction::Right);
            }
            Command::SoftDrop => self.on_drop(DropKind::Soft),
            Command::HardDrop => self.on_drop(DropKind::Hard),
            Command::Rotate => {
                self.on_rotate();
            }
            Command::Hold => {
                self.on_hold();
            }
            Command::Start => self.on_start(),
            Command::Pause => self.on_pause(),
        }
    }
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub field: &'a Field,
    pub current: Option<Piece>,
    /// Where the current piece would land on a hard drop.
    pub ghost: Option<Piece>,
    pub next: Option<Piece>,
    pub held: Option<Piece>,
    pub can_hold: bool,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_interval_ms: u64,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    field: Field,
    /// None until the first start.
    pieces: Option<PieceController>,
    scores: ScoreKeeper,
    phase: Phase,
    /// Time accumulated towards the next gravity step.
    drop_timer_ms: u64,
    source: Box<dyn PieceSource>,
    events: Vec<GameEvent>,
}

impl Session {
    /// Idle session. Fails if `config` does not pass [`EngineConfig::validate`].
    pub fn new(config: EngineConfig, source: Box<dyn PieceSource>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            field: Field::new(config.width, config.height),
            scores: ScoreKeeper::new(&config),
            config,
            pieces: None,
            phase: Phase::Idle,
            drop_timer_ms: 0,
            source,
            events: Vec::new(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let current = self.pieces.as_ref().map(PieceController::current);
        Snapshot {
            field: &self.field,
            current,
            ghost: current.map(|p| drop_position(p, &self.field)),
            next: self.pieces.as_ref().map(PieceController::next),
            held: self.pieces.as_ref().and_then(PieceController::held),
            can_hold: self.pieces.as_ref().is_some_and(PieceController::can_hold),
            score: self.scores.score,
            level: self.scores.level,
            lines: self.scores.lines,
            drop_interval_ms: self.scores.drop_interval_ms,
            phase: self.phase,
        }
    }

    /// Drain events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Idle/Over -> Running with a fresh field, score and piece queue.
    pub fn start(&mut self) {
        if matches!(self.phase, Phase::Running | Phase::Paused) {
            return;
        }
        self.field = Field::new(self.config.width, self.config.height);
        self.scores = ScoreKeeper::new(&self.config);
        self.pieces = Some(PieceController::new(self.source.as_mut(), self.config.width));
        self.drop_timer_ms = 0;
        self.phase = Phase::Running;
        self.events.push(GameEvent::Started);
        self.check_spawn();
    }

    pub fn pause(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.events.push(GameEvent::Paused);
        }
    }

    /// Paused -> Running. The drop timer restarts from zero.
    pub fn resume(&mut self) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            self.drop_timer_ms = 0;
            self.events.push(GameEvent::Resumed);
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            Phase::Running => self.pause(),
            Phase::Paused => self.resume(),
            Phase::Idle | Phase::Over => {}
        }
    }

    /// Advance the drop timer. At most one gravity step per call.
    pub fn tick(&mut self, elapsed_ms: u64) {
        if !self.is_running() {
            return;
        }
        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms >= self.scores.drop_interval_ms {
            self.drop_timer_ms = 0;
            self.step_down();
        }
    }

    pub fn move_piece(&mut self, direction: Direction) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.pieces.as_mut() {
            Some(pieces) => pieces.try_move(direction.dx(), 0, &self.field),
            None => false,
        }
    }

    pub fn rotate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.pieces.as_mut() {
            Some(pieces) => pieces.rotate(&self.field),
            None => false,
        }
    }

    /// One step down with a per-cell bonus; blocked soft drops do nothing.
    pub fn soft_drop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(pieces) = self.pieces.as_mut() {
            if pieces.try_move(0, 1, &self.field) {
                self.scores.add_drop_bonus(1, self.config.soft_drop_bonus);
            }
        }
    }

    /// Drop to the floor scoring each cell, then lock immediately.
    pub fn hard_drop(&mut self) {
        if !self.is_running() {
            return;
        }
        let Some(pieces) = self.pieces.as_mut() else {
            return;
        };
        let mut cells = 0;
        while pieces.try_move(0, 1, &self.field) {
            cells += 1;
        }
        self.scores.add_drop_bonus(cells, self.config.hard_drop_bonus);
        self.lock_and_spawn();
    }

    pub fn hold(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(pieces) = self.pieces.as_mut() else {
            return false;
        };
        if !pieces.hold(self.source.as_mut()) {
            return false;
        }
        self.events.push(GameEvent::Held);
        self.check_spawn();
        true
    }

    fn step_down(&mut self) {
        let moved = match self.pieces.as_mut() {
            Some(pieces) => pieces.try_move(0, 1, &self.field),
            None => return,
        };
        if !moved {
            self.lock_and_spawn();
        }
    }

    /// Commit the current piece, clear rows, draw the next piece and
    /// end the game if it cannot spawn.
    fn lock_and_spawn(&mut self) {
        let Some(pieces) = self.pieces.as_mut() else {
            return;
        };
        let piece = pieces.current();
        self.field.place(&piece);
        self.events.push(GameEvent::Locked(piece.kind));

        let level_before = self.scores.level;
        let mut cleared_cells = Vec::new();
        let result = self.scores.resolve(&mut self.field, &self.config, |field, rows| {
            cleared_cells = rows
                .iter()
                .filter_map(|&y| field.row(y).map(<[Cell]>::to_vec))
                .collect();
        });
        if !result.is_empty() {
            self.events.push(GameEvent::LinesCleared {
                rows: result.cleared_rows,
                cells: cleared_cells,
            });
        }
        if result.new_level > level_before {
            self.events.push(GameEvent::LevelUp(result.new_level));
        }

        pieces.advance(self.source.as_mut());
        self.check_spawn();
    }

    fn check_spawn(&mut self) {
        let blocked = self
            .pieces
            .as_ref()
            .is_some_and(|p| !can_place(&p.current(), &self.field));
        if blocked {
            self.phase = Phase::Over;
            self.events.push(GameEvent::GameOver);
        }
    }
}

impl Controls for Session {
    fn on_move(&mut self, direction: Direction) -> bool {
        self.move_piece(direction)
    }

    fn on_rotate(&mut self) -> bool {
        self.rotate()
    }

    fn on_drop(&mut self, drop: DropKind) {
        match drop {
            DropKind::Soft => self.soft_drop(),
            DropKind::Hard => self.hard_drop(),
        }
    }

    fn on_hold(&mut self) -> bool {
        self.hold()
    }

    fn on_start(&mut self) {
        self.start();
    }

    fn on_pause(&mut self) {
        self.toggle_pause();
    }
}
