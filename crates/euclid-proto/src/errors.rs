//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtoError>;

/// Errors from encoding or decoding peer messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// Message could not be encoded.
    #[error("encode failed: {reason}")]
    Encode {
        /// Encoder message.
        reason: String,
    },

    /// Bytes are not a well-formed message.
    #[error("decode failed: {reason}")]
    Decode {
        /// Decoder message.
        reason: String,
    },

    /// Message exceeds the frame size limit.
    #[error("message too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the offending message.
        size: usize,
        /// Largest accepted size.
        max: usize,
    },
}
