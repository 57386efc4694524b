//! Client error types.

use euclid_core::{EngineError, MoveError, SnapshotError};
use thiserror::Error;

use crate::event::EndReason;

/// A peer message that cannot be applied to the local game.
///
/// The message is dropped and local state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The sender moved for a seat that is not the one to move here.
    #[error("out of turn: expected player {expected}, message claims player {actual}")]
    OutOfTurn {
        /// Seat to move locally.
        expected: u8,
        /// Seat claimed by the message.
        actual: u8,
    },

    /// Declared difference does not match the operands.
    #[error("diff mismatch: |{num1} - {num2}| is not {diff}")]
    DiffMismatch {
        /// First operand.
        num1: u32,
        /// Second operand.
        num2: u32,
        /// Declared difference.
        diff: u32,
    },

    /// Declared difference is already on the local board.
    #[error("stale move: {diff} is already on the board")]
    StaleDiff {
        /// Declared difference.
        diff: u32,
    },

    /// An operand is missing from the local board.
    #[error("unknown number {number}")]
    UnknownNumber {
        /// The missing operand.
        number: u32,
    },

    /// Seat number is not 1 or 2, or is the local seat.
    #[error("invalid player {player}")]
    InvalidPlayer {
        /// Offending seat number.
        player: u8,
    },

    /// Board carried by the message is not a valid board.
    #[error("malformed board: {reason}")]
    MalformedBoard {
        /// Why the board was refused.
        reason: String,
    },

    /// No match is in progress.
    #[error("no match in progress")]
    NotPlaying,

    /// Message is not valid in the current phase.
    #[error("unexpected {action} message")]
    UnexpectedMessage {
        /// The message's action tag.
        action: &'static str,
    },

    /// `GameStart` does not describe a valid match.
    #[error("invalid game start: {reason}")]
    InvalidStart {
        /// What is wrong with it.
        reason: String,
    },

    /// The engine refused the move.
    #[error("move rejected: {0}")]
    Rejected(MoveError),
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local move rejected by the rules.
    #[error(transparent)]
    Move(#[from] MoveError),

    /// Game setup failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Snapshot could not be loaded.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Peer message dropped.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// No game is active.
    #[error("no active game")]
    NoActiveGame,

    /// Operation not available in the current mode or role.
    #[error("wrong mode: {reason}")]
    WrongMode {
        /// What was attempted.
        reason: String,
    },

    /// Host tried to start before a guest was ready.
    #[error("no opponent is ready yet")]
    MatchNotReady,

    /// The session has ended and only a fresh start is accepted.
    #[error("session ended: {reason}")]
    SessionEnded {
        /// Why the session ended.
        reason: EndReason,
    },
}

impl ClientError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors mean the session is over and must be restarted. Rule
    /// violations and dropped peer messages leave the session usable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::SessionEnded { .. } => true,

            Self::Move(_)
            | Self::Engine(_)
            | Self::Snapshot(_)
            | Self::Sync(_)
            | Self::NoActiveGame
            | Self::WrongMode { .. }
            | Self::MatchNotReady => false,
        }
    }
}
