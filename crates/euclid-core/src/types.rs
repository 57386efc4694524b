//! Closed tag types shared by the engine, snapshots and the wire protocol.
//!
//! Every tag serializes as its integer discriminant so snapshots and peer
//! messages stay compact and language-neutral.

use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// One of the two seats at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Player {
    /// Moves first; the host in a network match.
    One = 1,
    /// Moves second; the guest in a network match.
    Two = 2,
}

impl Player {
    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Seat number as carried on the wire (1 or 2).
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Parse a wire seat number.
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// How the two seats are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum GameMode {
    /// Human is player one, the bot is player two.
    SinglePlayerVsBot = 1,
    /// Two humans share one engine.
    LocalTwoPlayer = 2,
    /// Two peers, each with its own engine, kept in step by the sync protocol.
    NetworkTwoPlayer = 3,
}

/// Bot strength tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Difficulty {
    /// Uniformly random legal move.
    Easy = 1,
    /// Smallest resulting difference.
    #[default]
    Medium = 2,
    /// Depth-limited look-ahead over legal-move counts.
    Expert = 3,
}

/// Fixed role in a network match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PlayerRole {
    /// Seeds the initial board and plays as player one.
    Host = 1,
    /// Receives the initial board and plays as player two.
    Guest = 2,
}

impl PlayerRole {
    /// The seat this role occupies.
    pub fn player(self) -> Player {
        match self {
            Self::Host => Player::One,
            Self::Guest => Player::Two,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_is_an_involution() {
        assert_eq!(Player::One.other(), Player::Two);
        assert_eq!(Player::Two.other().other(), Player::Two);
    }

    #[test]
    fn seat_numbers() {
        assert_eq!(Player::from_number(1), Some(Player::One));
        assert_eq!(Player::from_number(2), Some(Player::Two));
        assert_eq!(Player::from_number(0), None);
        assert_eq!(Player::from_number(3), None);
        assert_eq!(Player::Two.to_string(), "Player 2");
    }

    #[test]
    fn roles_map_to_fixed_seats() {
        assert_eq!(PlayerRole::Host.player(), Player::One);
        assert_eq!(PlayerRole::Guest.player(), Player::Two);
    }
}
