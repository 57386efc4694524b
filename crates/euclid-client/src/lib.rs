//! Euclid Client
//!
//! Action-based session state machine for Euclid's game. Runs local games
//! against the bot or between two players on one board, and network matches
//! between two peers that each keep their own engine.
//!
//! # Architecture
//!
//! The session is a pure state machine that:
//! - Receives events from the caller (user input, peer messages, timer fires)
//! - Produces actions for the caller to execute (send messages, arm or cancel
//!   bot timers, update the display)
//! - Uses the `Environment` trait for randomness (deterministic testing)
//!
//! # Components
//!
//! - [`Session`]: Top-level state machine for one seat
//! - [`SyncCoordinator`]: Validation and reconciliation of peer messages
//! - [`ClientEvent`]: Events fed into the session
//! - [`ClientAction`]: Actions produced by the session

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod event;
mod session;
pub mod sync;

pub use error::{ClientError, SyncError};
pub use euclid_core::env::Environment;
pub use event::{BotTimerKey, ClientAction, ClientEvent, EndReason};
pub use session::{Phase, Session, SessionConfig};
pub use sync::{RemoteGameOver, RemoteMove, SyncCoordinator};
