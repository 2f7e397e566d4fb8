//! Line clearing, score and level progression.

use crate::config::EngineConfig;
use crate::field::Field;

/// Outcome of one clear pass. `cleared_rows` is empty when nothing cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearResult {
    pub cleared_rows: Vec<usize>,
    pub score_delta: u32,
    pub new_level: u32,
    pub new_drop_interval_ms: u64,
}

impl ClearResult {
    pub fn is_empty(&self) -> bool {
        self.cleared_rows.is_empty()
    }
}

/// Score, level, cleared-line total and the resulting drop interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreKeeper {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_interval_ms: u64,
}

impl ScoreKeeper {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            drop_interval_ms: config.drop_interval_for(1),
        }
    }

    /// Points for drop steps (soft or hard), `per_cell` each.
    pub fn add_drop_bonus(&mut self, cells: u32, per_cell: u32) {
        self.score = self.score.saturating_add(cells.saturating_mul(per_cell));
    }

    /// Detect full rows, let `on_detect` see them while still on the field,
    /// remove them, then update score, lines, level and drop interval.
    /// Score uses the level in effect before any level-up.
    pub fn resolve(
        &mut self,
        field: &mut Field,
        config: &EngineConfig,
        on_detect: impl FnOnce(&Field, &[usize]),
    ) -> ClearResult {
        let rows = field.full_rows();
        if rows.is_empty() {
            return ClearResult {
                cleared_rows: rows,
                score_delta: 0,
                new_level: self.level,
                new_drop_interval_ms: self.drop_interval_ms,
            };
        }

        on_detect(field, &rows);
        field.clear(&rows);

        let count = rows.len() as u32;
        let delta = config.line_score(rows.len()).saturating_mul(self.level);
        self.score = self.score.saturating_add(delta);
        self.lines += count;

        let new_level = self.lines / config.lines_per_level.max(1) + 1;
        if new_level > self.level {
            self.level = new_level;
            self.drop_interval_ms = config.drop_interval_for(new_level);
        }

        ClearResult {
            cleared_rows: rows,
            score_delta: delta,
            new_level: self.level,
            new_drop_interval_ms: self.drop_interval_ms,
        }
    }
}
