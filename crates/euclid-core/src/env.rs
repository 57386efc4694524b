//! Environment abstraction for deterministic play.
//!
//! The `Environment` trait decouples game logic from system resources (time
//! and randomness). The driver supplies a real clock and OS entropy; the
//! simulation harness supplies a virtual clock and a seeded RNG, so a whole
//! match replays exactly from one seed.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence

use std::time::{Duration, Instant};

/// Abstract environment providing time, randomness, and async sleeping.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current time. Never decreases.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code uses this. State machines schedule delays as actions.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// Deterministic under a simulation seed.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    ///
    /// Used for session identifiers and RNG seeds.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
