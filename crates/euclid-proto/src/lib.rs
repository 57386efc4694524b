//! Euclid Protocol
//!
//! Wire messages exchanged between the two peers of a network match, and
//! their encoding.
//!
//! # Architecture
//!
//! Messages are tagged records keyed by an `action` field and encoded as CBOR.
//! Fields carry plain integers (seat numbers as `u8`, board numbers as `u32`):
//! the receiving coordinator validates them against its own engine, so the
//! wire layer never rejects a message for game reasons.
//!
//! Stream transports wrap each encoded message in a 4-byte big-endian length
//! prefix (see [`frame`]).
//!
//! # Forward compatibility
//!
//! A message whose `action` is not known decodes as [`PeerMessage::Unknown`]
//! and is ignored by the receiver. Unknown fields on known actions are
//! ignored as well.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod errors;
pub mod frame;
mod message;

pub use errors::{ProtoError, Result};
pub use frame::{FrameDecoder, MAX_MESSAGE_SIZE, encode_frame};
pub use message::PeerMessage;
