//! One-ply strategies.

use euclid_core::{Move, NumberSet, legal_moves};
use rand::{Rng, seq::SliceRandom};

/// Uniformly random legal move.
pub fn easy_move<R>(board: &NumberSet, rng: &mut R) -> Option<Move>
where
    R: Rng + ?Sized,
{
    legal_moves(board).choose(rng).copied()
}

/// Legal move with the smallest difference. Ties go to the first pair in
/// ascending order.
pub fn medium_move(board: &NumberSet) -> Option<Move> {
    // min_by_key keeps the first of equal minima
    legal_moves(board).into_iter().min_by_key(|mv| mv.diff())
}
