//! Simulated environment.
//!
//! Time only moves when the harness advances it, and randomness comes from a
//! ChaCha RNG seeded at construction. Clones share the same clock and RNG.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use euclid_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug)]
struct SimState {
    rng: ChaCha8Rng,
    elapsed: Duration,
}

/// Deterministic environment for tests and simulations.
#[derive(Debug, Clone)]
pub struct SimEnv {
    epoch: Instant,
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Create an environment whose randomness derives from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            epoch: Instant::now(),
            state: Arc::new(Mutex::new(SimState {
                rng: ChaCha8Rng::seed_from_u64(seed),
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, by: Duration) {
        self.lock().elapsed += by;
    }

    /// Virtual time since construction.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.epoch + self.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
