//! Game configuration.

use std::ops::RangeInclusive;

use crate::{board::NumberSet, error::EngineError};

/// Board domain and seed ranges for a new game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Largest number a board may hold. Seeds, snapshots and peer boards
    /// with a larger member are rejected.
    pub board_max: u32,
    /// Range the smaller seed is drawn from.
    pub low_seed: RangeInclusive<u32>,
    /// Range the larger seed is drawn from.
    pub high_seed: RangeInclusive<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { board_max: 100, low_seed: 20..=40, high_seed: 60..=80 }
    }
}

impl GameConfig {
    /// Check that both seed ranges are non-empty, positive, disjoint, ordered
    /// low-below-high and inside the board domain.
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_ranges(&self.low_seed, &self.high_seed)?;
        if *self.high_seed.end() > self.board_max {
            return Err(EngineError::InvalidSeedRange {
                reason: format!(
                    "high seed range ends at {} beyond board max {}",
                    self.high_seed.end(),
                    self.board_max
                ),
            });
        }
        Ok(())
    }

    /// Check that every member of `board` lies inside the board domain.
    pub fn check_board(&self, board: &NumberSet) -> Result<(), EngineError> {
        match board.max() {
            Some(max) if max > self.board_max => Err(EngineError::InvalidBoard {
                reason: format!("{max} exceeds board max {}", self.board_max),
            }),
            _ => Ok(()),
        }
    }
}

pub(crate) fn validate_ranges(
    low: &RangeInclusive<u32>,
    high: &RangeInclusive<u32>,
) -> Result<(), EngineError> {
    for (name, range) in [("low", low), ("high", high)] {
        if range.start() >= range.end() {
            return Err(EngineError::InvalidSeedRange {
                reason: format!("{name} range {}..={} is empty or degenerate", range.start(), range.end()),
            });
        }
        if *range.start() == 0 {
            return Err(EngineError::InvalidSeedRange {
                reason: format!("{name} range must start above zero"),
            });
        }
    }
    if low.end() >= high.start() {
        return Err(EngineError::InvalidSeedRange {
            reason: format!(
                "ranges overlap: low ends at {}, high starts at {}",
                low.end(),
                high.start()
            ),
        });
    }
    Ok(())
}
