//! Length-prefixed framing for stream transports.
//!
//! ```text
//! ┌──────────────┬──────────────────────┐
//! │ len: u32 BE  │ CBOR PeerMessage     │
//! └──────────────┴──────────────────────┘
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{
    PeerMessage,
    errors::{ProtoError, Result},
};

/// Largest encoded message accepted in a frame.
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

const LEN_PREFIX: usize = 4;

/// Encode a message into a single length-prefixed frame.
pub fn encode_frame(message: &PeerMessage) -> Result<Bytes> {
    let body = message.encode()?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(ProtoError::TooLarge { size: body.len(), max: MAX_MESSAGE_SIZE });
    }
    let mut frame = BytesMut::with_capacity(LEN_PREFIX + body.len());
    #[allow(clippy::cast_possible_truncation)] // bounded by MAX_MESSAGE_SIZE
    frame.put_u32(body.len() as u32);
    frame.put_slice(&body);
    Ok(frame.freeze())
}

/// Incremental decoder over a byte stream.
///
/// Feed bytes as they arrive with [`extend`](Self::extend), then drain complete
/// messages with [`next_message`](Self::next_message).
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Decode the next complete message, if one is buffered.
    ///
    /// An oversized length prefix is an error; the stream cannot be resynced
    /// after it and should be dropped.
    pub fn next_message(&mut self) -> Result<Option<PeerMessage>> {
        if self.buffer.len() < LEN_PREFIX {
            return Ok(None);
        }
        let len = u32::from_be_bytes([self.buffer[0], self.buffer[1], self.buffer[2], self.buffer[3]])
            as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(ProtoError::TooLarge { size: len, max: MAX_MESSAGE_SIZE });
        }
        if self.buffer.len() < LEN_PREFIX + len {
            return Ok(None);
        }
        self.buffer.advance(LEN_PREFIX);
        let body = self.buffer.split_to(len);
        PeerMessage::decode(&body).map(Some)
    }
}
