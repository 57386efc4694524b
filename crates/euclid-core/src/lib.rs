//! Euclid Core
//!
//! Deterministic engine for Euclid's game: two players alternately pick two
//! numbers on a shared board and add their difference, if it is new. The
//! player who leaves the opponent without a legal move wins.
//!
//! # Architecture
//!
//! Everything here is pure state and pure functions. No I/O, no clocks, no
//! global randomness: callers pass an RNG to the operations that draw seeds,
//! and the [`Environment`] trait is the seam through which drivers and the
//! simulation harness supply time and entropy to higher layers.
//!
//! # Components
//!
//! - [`NumberSet`]: The board, an ascending set of distinct positive integers
//! - [`rules`]: Legal-move generation and the terminal test
//! - [`GameEngine`]: Owner of [`GameState`] and the only mutator of it
//! - [`StateSnapshot`]: Flat serializable copy for persistence and sync
//! - [`GameConfig`]: Board domain and seed ranges

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod board;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod rules;
pub mod snapshot;
mod types;

pub use board::{NumberSet, ZeroOnBoard};
pub use config::GameConfig;
pub use engine::{GameEngine, GameSetup, GameState, MoveRecord, Selection};
pub use env::Environment;
pub use error::{EngineError, MoveError, SnapshotError};
pub use rules::{Move, is_terminal, legal_move_count, legal_moves};
pub use snapshot::StateSnapshot;
pub use types::{Difficulty, GameMode, Player, PlayerRole};
