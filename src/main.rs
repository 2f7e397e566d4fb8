//! Blockfall — falling-block puzzle game in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use blockfall::{Bag, EngineConfig, PieceSource, Session, Uniform};
use clap::{Parser, ValueEnum};

/// Front-end options that do not affect game rules.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub no_animation: bool,
    pub frame_rate: f64,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let session =
        Session::new(args.engine_config(), args.piece_source()).context("invalid game settings")?;
    let display = DisplayConfig {
        no_animation: args.no_animation,
        frame_rate: args.frame_rate,
        no_menu: args.no_menu,
    };
    let mut app = App::new(session, display, theme::Theme::default());
    app.run()?;
    Ok(())
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-block puzzle in the terminal. Complete horizontal rows to clear them and score.",
    long_about = "Blockfall is a classic falling-block puzzle game for the terminal.\n\n\
        Steer falling pieces into place. Full rows vanish; clear 10 rows to level up \
        and the pieces fall faster.\n\n\
        CONTROLS:\n  Left/Right  Move        Space / x   Rotate     Down        Soft drop\n  \
        Up          Hard drop   C           Hold       P           Pause\n  \
        Enter / s   Start       Q / Esc     Quit\n\n\
        Vim keys h/l/j/k also move, soft drop and hard drop. Hold a movement key to keep the piece moving."
)]
pub struct Args {
    /// Playfield width in cells.
    #[arg(long, default_value = "10", value_name = "COLS")]
    pub width: usize,

    /// Playfield height in cells.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: usize,

    /// Drop interval at level 1 in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Cleared rows needed per level.
    #[arg(long, default_value = "10", value_name = "N")]
    pub lines_per_level: u32,

    /// Piece randomiser: uniform (each piece equally likely) or bag (shuffled 7-bag).
    #[arg(short, long, default_value = "uniform")]
    pub generator: Generator,

    /// Seed for the piece randomiser (reproducible games).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Disable line-clear animation.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip the title screen and start a game immediately.
    #[arg(long)]
    pub no_menu: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            width: self.width,
            height: self.height,
            base_drop_interval_ms: self.drop_interval_ms,
            lines_per_level: self.lines_per_level,
            ..EngineConfig::default()
        }
    }

    fn piece_source(&self) -> Box<dyn PieceSource> {
        match self.generator {
            Generator::Uniform => Box::new(Uniform::new(self.seed)),
            Generator::Bag => Box::new(Bag::new(self.seed)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Generator {
    #[default]
    Uniform,
    #[value(alias = "7bag")]
    Bag,
}
