//! Pure move-legality rules over a board.
//!
//! These functions are shared by the engine, the bot search and the tests.
//! None of them touch turn state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{board::NumberSet, error::MoveError};

/// An unordered pair of distinct board numbers, stored with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Smaller operand.
    pub low: u32,
    /// Larger operand.
    pub high: u32,
}

impl Move {
    /// Normalize a pair. Returns `None` if the operands are equal.
    pub fn new(a: u32, b: u32) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The number this move adds to the board.
    pub fn diff(self) -> u32 {
        self.high - self.low
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} = {}", self.high, self.low, self.diff())
    }
}

/// Check a proposed pair against the board without mutating it.
///
/// Checks run in order: distinct operands, both on the board, difference new.
pub fn validate(board: &NumberSet, a: u32, b: u32) -> Result<Move, MoveError> {
    let mv = Move::new(a, b).ok_or(MoveError::SameNumber { number: a })?;
    for number in [a, b] {
        if !board.contains(number) {
            return Err(MoveError::NotOnBoard { number });
        }
    }
    let diff = mv.diff();
    if board.contains(diff) {
        return Err(MoveError::AlreadyPresent { diff });
    }
    Ok(mv)
}

/// Every legal move on `board`, ascending by `(low, high)`.
pub fn legal_moves(board: &NumberSet) -> Vec<Move> {
    let numbers = board.to_vec();
    let mut moves = Vec::new();
    for (i, &low) in numbers.iter().enumerate() {
        for &high in &numbers[i + 1..] {
            if !board.contains(high - low) {
                moves.push(Move { low, high });
            }
        }
    }
    moves
}

/// Number of legal moves on `board`.
pub fn legal_move_count(board: &NumberSet) -> usize {
    let numbers = board.to_vec();
    let mut count = 0;
    for (i, &low) in numbers.iter().enumerate() {
        count += numbers[i + 1..].iter().filter(|&&high| !board.contains(high - low)).count();
    }
    count
}

/// True iff every pairwise difference is already on the board.
pub fn is_terminal(board: &NumberSet) -> bool {
    let numbers = board.to_vec();
    numbers
        .iter()
        .enumerate()
        .all(|(i, &low)| numbers[i + 1..].iter().all(|&high| board.contains(high - low)))
}
