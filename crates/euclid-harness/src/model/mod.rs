//! Model-based testing.
//!
//! [`ModelGame`] is a deliberately naive rendition of the rules: an unsorted
//! `Vec`, linear scans, no caching. Tests apply the same [`Operation`]s to the
//! model and to a real `GameEngine` and compare [`ObservableState`]s after
//! every step.

mod game;
mod operation;

pub use game::ModelGame;
pub use operation::{ObservableState, Operation, OperationError, OperationResult};
