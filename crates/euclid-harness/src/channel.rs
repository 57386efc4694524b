//! Simulated peer channel.
//!
//! Ordered and at-least-once: every message is delivered, in send order, and
//! some are delivered twice in a row. Messages travel as length-prefixed CBOR
//! frames so the wire codec is exercised end to end.

use std::collections::VecDeque;

use euclid_proto::{FrameDecoder, PeerMessage, ProtoError, encode_frame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// One direction of a peer link.
#[derive(Debug)]
pub struct SimChannel {
    in_flight: VecDeque<Vec<u8>>,
    rng: ChaCha8Rng,
    duplicate_rate: f64,
    sent: u64,
    duplicated: u64,
}

impl SimChannel {
    /// Create a channel that duplicates each message with `duplicate_rate`
    /// probability (clamped to `0.0..=1.0`).
    pub fn new(seed: u64, duplicate_rate: f64) -> Self {
        Self {
            in_flight: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            duplicate_rate: duplicate_rate.clamp(0.0, 1.0),
            sent: 0,
            duplicated: 0,
        }
    }

    /// A channel that never duplicates.
    pub fn reliable() -> Self {
        Self::new(0, 0.0)
    }

    /// Queue a message.
    pub fn send(&mut self, message: &PeerMessage) -> Result<(), ProtoError> {
        let frame = encode_frame(message)?.to_vec();
        self.sent += 1;
        if self.rng.gen_bool(self.duplicate_rate) {
            trace!(action = message.action(), "duplicating message");
            self.duplicated += 1;
            self.in_flight.push_back(frame.clone());
        }
        self.in_flight.push_back(frame);
        Ok(())
    }

    /// Deliver the oldest queued message.
    pub fn recv(&mut self) -> Result<Option<PeerMessage>, ProtoError> {
        let Some(frame) = self.in_flight.pop_front() else {
            return Ok(None);
        };
        let mut decoder = FrameDecoder::new();
        decoder.extend(&frame);
        decoder.next_message()
    }

    /// Messages waiting, duplicates included.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Messages sent, not counting duplicates.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Extra copies injected.
    pub fn duplicated(&self) -> u64 {
        self.duplicated
    }
}
