//! Operations and observations shared by the model and the real engine.

use arbitrary::Arbitrary;
use euclid_core::{GameEngine, MoveError};

/// One step applied to both the model and the engine.
#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum Operation {
    /// Propose two numbers picked by index from the sorted board (modulo its
    /// length). Reaches legal moves often.
    ProposeOnBoard {
        /// Index of the first number.
        i: u8,
        /// Index of the second number.
        j: u8,
    },
    /// Propose two raw values, usually off the board.
    ProposeRaw {
        /// First number.
        a: u8,
        /// Second number.
        b: u8,
    },
    /// Save a snapshot and restore the engine from it. The model is untouched.
    SaveAndReload,
}

/// Outcome of an operation, comparable across model and engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Applied.
    Ok,
    /// Refused.
    Error(OperationError),
}

impl OperationResult {
    /// Whether the operation was applied.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether the operation was refused.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Both numbers were the same.
    SameNumber,
    /// A number was not on the board.
    NotOnBoard,
    /// The difference is already on the board.
    AlreadyPresent,
    /// The game is over.
    GameOver,
    /// Anything the model has no counterpart for.
    Other,
}

impl From<&MoveError> for OperationError {
    fn from(error: &MoveError) -> Self {
        match error {
            MoveError::SameNumber { .. } => Self::SameNumber,
            MoveError::NotOnBoard { .. } => Self::NotOnBoard,
            MoveError::AlreadyPresent { .. } => Self::AlreadyPresent,
            MoveError::GameOver => Self::GameOver,
            MoveError::NotYourTurn { .. } => Self::Other,
        }
    }
}

/// What a player can see of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Board, ascending.
    pub board: Vec<u32>,
    /// Player to move, 1 or 2.
    pub current_player: u8,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Winner, 1 or 2.
    pub winner: Option<u8>,
    /// Moves made.
    pub move_count: usize,
}

impl ObservableState {
    /// Observe a real engine.
    pub fn from_engine(engine: &GameEngine) -> Self {
        Self {
            board: engine.current_board().to_vec(),
            current_player: engine.current_player().number(),
            game_over: engine.is_over(),
            winner: engine.winner().map(|p| p.number()),
            move_count: engine.move_count(),
        }
    }
}
