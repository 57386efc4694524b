//! Serializable projection of [`GameState`].
//!
//! A snapshot is a flat keyed record. It is produced on demand by
//! [`GameEngine::save`] and consumed by [`GameEngine::load`]; it is never
//! mutated in between. The byte encoding is CBOR.
//!
//! # Invariants
//!
//! - Round-trip: for any state reached through legal play,
//!   `load(save(state))` reproduces it field for field.
//! - Loading validates first: a malformed snapshot leaves the engine
//!   untouched.

use serde::{Deserialize, Serialize};

use crate::{
    Difficulty, GameConfig, GameMode, Player, PlayerRole,
    board::NumberSet,
    engine::{GameEngine, GameSetup, GameState, MoveRecord},
    error::SnapshotError,
    rules,
};

/// Flat, self-describing copy of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// How the seats are filled.
    pub game_mode: GameMode,
    /// Bot tier.
    pub difficulty: Difficulty,
    /// Board, ascending.
    pub active_numbers: Vec<u32>,
    /// Pending picks, in pick order.
    pub selected_numbers: Vec<u32>,
    /// Player to move.
    pub current_player: Player,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Winner, once the game has ended.
    pub winner: Option<Player>,
    /// Applied moves, oldest first.
    pub move_history: Vec<MoveRecord>,
    /// Local network role. Absent outside network play.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PlayerRole>,
}

impl StateSnapshot {
    /// Encode as CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(self, &mut bytes)
            .map_err(|e| SnapshotError::Encode { reason: e.to_string() })?;
        Ok(bytes)
    }

    /// Decode from CBOR. Does not check game consistency; `load` does.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        ciborium::de::from_reader(bytes).map_err(|e| SnapshotError::Decode { reason: e.to_string() })
    }

    /// Rebuild the game state, checking every consistency rule and that the
    /// board fits `config`'s domain.
    pub fn to_state(&self, config: &GameConfig) -> Result<GameState, SnapshotError> {
        let invalid = |reason: &str| SnapshotError::Invalid { reason: reason.to_string() };

        GameSetup { mode: self.game_mode, difficulty: self.difficulty, role: self.role }
            .check()
            .map_err(|e| SnapshotError::Invalid { reason: e.to_string() })?;

        let board = NumberSet::from_numbers(self.active_numbers.iter().copied())
            .map_err(|e| SnapshotError::Invalid { reason: e.to_string() })?;
        if board.len() != self.active_numbers.len() {
            return Err(invalid("duplicate board numbers"));
        }
        if board.len() < 2 {
            return Err(invalid("board needs at least two numbers"));
        }
        config.check_board(&board).map_err(|e| SnapshotError::Invalid { reason: e.to_string() })?;

        match self.selected_numbers.as_slice() {
            [] => {},
            [a, b] if a == b => return Err(invalid("selected the same number twice")),
            [_] | [_, _] if self.game_over => return Err(invalid("selection in a finished game")),
            [_] | [_, _] => {},
            _ => return Err(invalid("more than two selected numbers")),
        }
        if self.selected_numbers.iter().any(|&n| !board.contains(n)) {
            return Err(invalid("selected number not on board"));
        }

        if self.game_over != self.winner.is_some() {
            return Err(invalid("winner must be present exactly when the game is over"));
        }
        if !self.game_over && rules::is_terminal(&board) {
            return Err(invalid("terminal board in a live game"));
        }

        for record in &self.move_history {
            if record.num1.abs_diff(record.num2) != record.diff || record.diff == 0 {
                return Err(invalid("history record with wrong difference"));
            }
            if [record.num1, record.num2, record.diff].iter().any(|&n| !board.contains(n)) {
                return Err(invalid("history record references numbers off the board"));
            }
        }

        Ok(GameState {
            active_numbers: board,
            current_player: self.current_player,
            selected: self.selected_numbers.clone(),
            game_over: self.game_over,
            winner: self.winner,
            move_history: self.move_history.clone(),
            mode: self.game_mode,
            difficulty: self.difficulty,
            role: self.role,
        })
    }
}

impl From<&GameState> for StateSnapshot {
    fn from(state: &GameState) -> Self {
        Self {
            game_mode: state.mode,
            difficulty: state.difficulty,
            active_numbers: state.active_numbers.to_vec(),
            selected_numbers: state.selected.clone(),
            current_player: state.current_player,
            game_over: state.game_over,
            winner: state.winner,
            move_history: state.move_history.clone(),
            role: state.role,
        }
    }
}

impl GameEngine {
    /// Build an engine directly from a snapshot.
    pub fn restore(config: GameConfig, snapshot: &StateSnapshot) -> Result<Self, SnapshotError> {
        let state = snapshot.to_state(&config)?;
        Ok(Self::with_state(config, state))
    }

    /// Snapshot the current state.
    pub fn save(&self) -> StateSnapshot {
        StateSnapshot::from(self.state())
    }

    /// Replace the current state with a snapshot.
    ///
    /// On error the current state is kept; callers fall back to a fresh game.
    pub fn load(&mut self, snapshot: &StateSnapshot) -> Result<(), SnapshotError> {
        let state = snapshot.to_state(self.config())?;
        self.replace_state(state);
        Ok(())
    }
}
