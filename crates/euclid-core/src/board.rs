//! The board: a growing set of distinct positive integers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of active numbers on the board.
///
/// Members are distinct and strictly positive. Iteration is always ascending,
/// which gives every consumer (move generation, snapshots, wire messages) the
/// same deterministic order.
///
/// Within one game the set only grows; it is replaced wholesale on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct NumberSet(BTreeSet<u32>);

/// A zero was offered as a board member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("board numbers must be positive")]
pub struct ZeroOnBoard;

impl NumberSet {
    /// Create an empty board.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a board from arbitrary integers, rejecting zero.
    ///
    /// Duplicates collapse, matching set semantics.
    pub fn from_numbers<I>(numbers: I) -> Result<Self, ZeroOnBoard>
    where
        I: IntoIterator<Item = u32>,
    {
        let set: BTreeSet<u32> = numbers.into_iter().collect();
        if set.contains(&0) {
            return Err(ZeroOnBoard);
        }
        Ok(Self(set))
    }

    /// Check membership.
    pub fn contains(&self, number: u32) -> bool {
        self.0.contains(&number)
    }

    /// Insert a number. Returns `false` if it was already present.
    ///
    /// Zero is never inserted.
    pub(crate) fn insert(&mut self, number: u32) -> bool {
        number != 0 && self.0.insert(number)
    }

    /// Number of active numbers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the board is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest number on the board.
    pub fn max(&self) -> Option<u32> {
        self.0.last().copied()
    }

    /// Iterate in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u32> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    /// Ascending copy of the members.
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Whether `self` contains every member of `other`.
    pub fn is_superset(&self, other: &Self) -> bool {
        self.0.is_superset(&other.0)
    }
}

impl TryFrom<Vec<u32>> for NumberSet {
    type Error = ZeroOnBoard;

    fn try_from(numbers: Vec<u32>) -> Result<Self, Self::Error> {
        Self::from_numbers(numbers)
    }
}

impl From<NumberSet> for Vec<u32> {
    fn from(set: NumberSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a NumberSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
