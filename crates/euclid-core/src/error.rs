//! Engine error types.

use thiserror::Error;

/// A proposed move broke a rule. The engine state is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Both operands are the same number.
    #[error("cannot pair {number} with itself")]
    SameNumber {
        /// The repeated operand.
        number: u32,
    },

    /// An operand is not on the board.
    #[error("{number} is not on the board")]
    NotOnBoard {
        /// The missing operand.
        number: u32,
    },

    /// The difference is already on the board.
    #[error("{diff} is already on the board")]
    AlreadyPresent {
        /// The difference the move would add.
        diff: u32,
    },

    /// The local player tried to move on the opponent's turn.
    #[error("not your turn: {current} to move")]
    NotYourTurn {
        /// Player whose turn it is.
        current: crate::Player,
    },

    /// The game has already ended.
    #[error("game is over")]
    GameOver,
}

/// Errors from engine setup and state replacement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Seed ranges are empty, overlapping or out of domain.
    #[error("invalid seed range: {reason}")]
    InvalidSeedRange {
        /// What is wrong with the ranges.
        reason: String,
    },

    /// Explicit seeds cannot start a game.
    #[error("invalid seeds {low} and {high}")]
    InvalidSeeds {
        /// First seed.
        low: u32,
        /// Second seed.
        high: u32,
    },

    /// A move was rejected.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// A replacement board is not a valid board for this game.
    #[error("invalid board: {reason}")]
    InvalidBoard {
        /// Why the board was refused.
        reason: String,
    },
}

/// Errors from encoding, decoding or loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Bytes could not be decoded.
    #[error("snapshot decode failed: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },

    /// Snapshot could not be encoded.
    #[error("snapshot encode failed: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },

    /// Snapshot decoded but describes an impossible game.
    #[error("invalid snapshot: {reason}")]
    Invalid {
        /// Which consistency check failed.
        reason: String,
    },
}
