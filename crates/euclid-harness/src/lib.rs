//! Deterministic simulation harness for Euclid's game.
//!
//! Seeded implementations of the `Environment` trait and of the peer channel,
//! so whole matches replay exactly from one seed.
//!
//! # Components
//!
//! - [`SimEnv`]: Virtual clock and seeded RNG
//! - [`SimChannel`]: Ordered, at-least-once channel that duplicates messages
//!   at a configurable rate and carries them as CBOR frames
//! - [`PeerPair`]: Host and guest sessions wired through two channels
//!
//! Full matches over simulated TCP (turmoil) live in this crate's tests.
//! - [`model`]: Naive reference game for model-based testing. Operations are
//!   applied to both the model and the real engine, and their observable
//!   states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod channel;
pub mod model;
pub mod sim_env;
pub mod world;

pub use channel::SimChannel;
pub use model::{ModelGame, ObservableState, Operation, OperationError, OperationResult};
pub use sim_env::SimEnv;
pub use world::{Peer, PeerOp, PeerPair, WorldError};
