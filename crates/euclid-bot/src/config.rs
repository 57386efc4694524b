//! Search configuration.

/// Limits for the Expert look-ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies searched below each candidate move.
    pub depth: u32,
    /// Node budget for one decision, shared evenly among the candidate moves.
    /// A subtree that exhausts its share is scored statically.
    pub max_nodes: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { depth: 4, max_nodes: 200_000 }
    }
}
