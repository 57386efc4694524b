//! Euclid Bot
//!
//! Computer opponent. Given a read-only board and a [`Difficulty`], proposes a
//! legal move or `None` when the board is terminal.
//!
//! # Tiers
//!
//! - Easy: uniformly random legal move, drawn from a caller-supplied RNG
//! - Medium: the legal move adding the smallest number, first in ascending
//!   pair order on ties
//! - Expert: depth-limited alpha-beta over legal-move counts (see [`search`])
//!
//! The bot never mutates game state. The caller applies the returned move
//! through the engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod greedy;
pub mod search;

pub use config::SearchConfig;
use euclid_core::{Difficulty, Move, NumberSet};
pub use greedy::{easy_move, medium_move};
use rand::Rng;
pub use search::expert_move;
use tracing::debug;

/// A computer player of fixed strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bot {
    difficulty: Difficulty,
    search: SearchConfig,
}

impl Bot {
    /// Create a bot. `search` only affects the Expert tier.
    pub fn new(difficulty: Difficulty, search: SearchConfig) -> Self {
        Self { difficulty, search }
    }

    /// Strength tier.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Pick a move on `board`, or `None` if no legal move exists.
    pub fn choose_move<R>(&self, board: &NumberSet, rng: &mut R) -> Option<Move>
    where
        R: Rng + ?Sized,
    {
        let choice = match self.difficulty {
            Difficulty::Easy => easy_move(board, rng),
            Difficulty::Medium => medium_move(board),
            Difficulty::Expert => expert_move(board, &self.search),
        };
        debug!(difficulty = ?self.difficulty, ?choice, "bot move chosen");
        choice
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn every_tier_passes_on_terminal_board() {
        let board = NumberSet::from_numbers([2, 4, 6]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Expert] {
            let bot = Bot::new(difficulty, SearchConfig::default());
            assert_eq!(bot.choose_move(&board, &mut rng), None);
        }
    }

    #[test]
    fn tiers_dispatch() {
        let board = NumberSet::from_numbers([1, 3, 5]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let medium = Bot::new(Difficulty::Medium, SearchConfig::default());
        assert_eq!(medium.choose_move(&board, &mut rng), Move::new(1, 3));
        assert_eq!(medium.difficulty(), Difficulty::Medium);
    }
}
