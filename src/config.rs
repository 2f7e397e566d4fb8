//! Engine configuration: field size, gravity curve, score table.

use thiserror::Error;

/// Largest accepted field width in cells.
pub const MAX_WIDTH: usize = 64;
/// Largest accepted field height in cells.
pub const MAX_HEIGHT: usize = 200;

/// Engine constants. Defaults match the classic 10×20 browser game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Drop interval at level 1.
    pub base_drop_interval_ms: u64,
    /// Interval reduction per level above 1.
    pub drop_interval_step_ms: u64,
    /// Floor for the drop interval.
    pub min_drop_interval_ms: u64,
    pub lines_per_level: u32,
    /// Points for clearing 1, 2, 3 and 4+ rows at level 1.
    pub line_scores: [u32; 4],
    /// Points per cell for a soft drop step.
    pub soft_drop_bonus: u32,
    /// Points per cell for each hard drop step.
    pub hard_drop_bonus: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            base_drop_interval_ms: 1000,
            drop_interval_step_ms: 100,
            min_drop_interval_ms: 50,
            lines_per_level: 10,
            line_scores: [100, 300, 500, 800],
            soft_drop_bonus: 1,
            hard_drop_bonus: 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("field must be at least 4x4 cells, got {width}x{height}")]
    FieldTooSmall { width: usize, height: usize },
    #[error("field must be at most {MAX_WIDTH}x{MAX_HEIGHT} cells, got {width}x{height}")]
    FieldTooLarge { width: usize, height: usize },
    #[error("lines per level must be positive")]
    ZeroLinesPerLevel,
    #[error("minimum drop interval must be positive")]
    ZeroMinInterval,
    #[error("base drop interval {base} ms is below the {min} ms floor")]
    BaseBelowFloor { base: u64, min: u64 },
    #[error("line score table must strictly increase: {0:?}")]
    ScoreTableNotIncreasing([u32; 4]),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 4 || self.height < 4 {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_WIDTH || self.height > MAX_HEIGHT {
            return Err(ConfigError::FieldTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if self.lines_per_level == 0 {
            return Err(ConfigError::ZeroLinesPerLevel);
        }
        if self.min_drop_interval_ms == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }
        if self.base_drop_interval_ms < self.min_drop_interval_ms {
            return Err(ConfigError::BaseBelowFloor {
                base: self.base_drop_interval_ms,
                min: self.min_drop_interval_ms,
            });
        }
        if self.line_scores.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ScoreTableNotIncreasing(self.line_scores));
        }
        Ok(())
    }

    /// Drop interval for a level: base minus one step per level above 1, floored.
    pub fn drop_interval_for(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_drop_interval_ms
            .saturating_sub(steps.saturating_mul(self.drop_interval_step_ms))
            .max(self.min_drop_interval_ms)
    }

    /// Level-1 points for clearing `rows` rows at once; 4 or more use the top entry.
    pub fn line_score(&self, rows: usize) -> u32 {
        match rows {
            0 => 0,
            n => self.line_scores[n.min(4) - 1],
        }
    }
}
