//! Production Environment implementation using system time and RNG.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use euclid_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Production environment.
///
/// Uses the system clock and `tokio::time::sleep`. Randomness comes from
/// `getrandom`, unless the environment was built with [`SystemEnv::seeded`],
/// in which case a ChaCha RNG makes games reproducible.
#[derive(Clone, Default)]
pub struct SystemEnv {
    seeded: Option<Arc<Mutex<ChaCha8Rng>>>,
}

impl SystemEnv {
    /// Environment backed by OS randomness.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment whose randomness derives from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { seeded: Some(Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed)))) }
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        if let Some(rng) = &self.seeded {
            rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
            return;
        }
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // Zeroes still give a playable game, just not a random one
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}
