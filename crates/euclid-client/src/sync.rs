//! Peer synchronization.
//!
//! The `SyncCoordinator` turns local moves into outbound messages and remote
//! messages into validated engine mutations. It never bypasses the engine:
//! every remote move goes through [`GameEngine::apply_as`].
//!
//! # Protocol
//!
//! ```text
//!   Guest                         Host
//!     │ ── PlayerReady{nick} ──────► │
//!     │ ◄───── GameStart{board} ──── │   host is player 1, guest player 2
//!     │ ◄──────── Move ───────────── │   mover sends Move{.., resulting board}
//!     │ ───────── Move ────────────► │
//!     │            ...               │
//!     │ ───── Move, GameOver ──────► │   mover into the terminal board
//! ```
//!
//! # Reconciliation
//!
//! After applying a remote move the receiver compares its board with the
//! sender's resulting board. On mismatch the sender's board is adopted: the
//! mover observed the pre-move state when it decided. Each adoption bumps a
//! divergence counter.
//!
//! # Delivery
//!
//! The channel is ordered and at-least-once. A duplicated `Move` fails the
//! turn check and is dropped; a duplicated `GameOver` is ignored. Messages that
//! fail validation are dropped without touching local state.

use euclid_core::{GameConfig, GameEngine, GameSetup, MoveRecord, NumberSet, Player, PlayerRole};
use euclid_proto::PeerMessage;
use tracing::{debug, info, warn};

use crate::error::SyncError;

/// Result of applying a remote `Move`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMove {
    /// The move as recorded locally.
    pub record: MoveRecord,
    /// Local and adopted boards, when they disagreed.
    pub reconciled: Option<(Vec<u32>, Vec<u32>)>,
    /// Whether this move ended the game.
    pub game_over: bool,
}

/// Result of a remote `GameOver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteGameOver {
    /// Declared winner.
    pub winner: Player,
    /// Local and adopted boards, when they disagreed.
    pub reconciled: Option<(Vec<u32>, Vec<u32>)>,
    /// Whether the local game was still running before this message.
    pub newly_over: bool,
}

/// Mediates between the local engine and the peer.
#[derive(Debug, Clone)]
pub struct SyncCoordinator {
    role: PlayerRole,
    divergences: u64,
}

impl SyncCoordinator {
    /// Create a coordinator for a fixed role.
    pub fn new(role: PlayerRole) -> Self {
        Self { role, divergences: 0 }
    }

    /// Local role.
    pub fn role(&self) -> PlayerRole {
        self.role
    }

    /// Local seat.
    pub fn local_player(&self) -> Player {
        self.role.player()
    }

    /// Number of times the peer's board was adopted over the local one.
    pub fn divergences(&self) -> u64 {
        self.divergences
    }

    /// Guest's announcement.
    pub fn ready_message(nick: &str) -> PeerMessage {
        PeerMessage::PlayerReady { player_nick: nick.to_string() }
    }

    /// Host's start message for the freshly drawn board.
    pub fn start_message(engine: &GameEngine) -> PeerMessage {
        PeerMessage::GameStart {
            active_numbers: engine.current_board().to_vec(),
            current_player: engine.current_player().number(),
            host_player: PlayerRole::Host.player().number(),
            guest_player: PlayerRole::Guest.player().number(),
        }
    }

    /// Build the guest's engine from the host's `GameStart`.
    pub fn accept_start(
        config: GameConfig,
        active_numbers: &[u32],
        current_player: u8,
        host_player: u8,
        guest_player: u8,
    ) -> Result<GameEngine, SyncError> {
        if host_player != Player::One.number() || guest_player != Player::Two.number() {
            return Err(SyncError::InvalidStart {
                reason: format!("host {host_player} and guest {guest_player} must be 1 and 2"),
            });
        }
        let current = Player::from_number(current_player)
            .ok_or(SyncError::InvalidPlayer { player: current_player })?;
        let seeds: [u32; 2] = active_numbers.try_into().map_err(|_| SyncError::InvalidStart {
            reason: format!("expected two seed numbers, got {}", active_numbers.len()),
        })?;

        GameEngine::from_seeds(config, GameSetup::network(PlayerRole::Guest), seeds, current)
            .map_err(|e| SyncError::InvalidStart { reason: e.to_string() })
    }

    /// Messages announcing a local move that was just applied.
    ///
    /// A move into a terminal board is followed by `GameOver`.
    pub fn local_move(&self, engine: &GameEngine, record: &MoveRecord) -> Vec<PeerMessage> {
        let board = engine.current_board().to_vec();
        let mut messages = vec![PeerMessage::Move {
            player: record.player.number(),
            num1: record.num1,
            num2: record.num2,
            diff: record.diff,
            active_numbers: board.clone(),
        }];
        if let Some(winner) = engine.winner() {
            info!(%winner, "announcing game over");
            messages.push(PeerMessage::GameOver { winner: winner.number(), final_state: board });
        }
        messages
    }

    /// Validate and apply a remote move, then reconcile boards.
    pub fn on_move(
        &mut self,
        engine: &mut GameEngine,
        player: u8,
        num1: u32,
        num2: u32,
        diff: u32,
        active_numbers: &[u32],
    ) -> Result<RemoteMove, SyncError> {
        if engine.is_over() {
            return Err(SyncError::NotPlaying);
        }
        let mover = Player::from_number(player).ok_or(SyncError::InvalidPlayer { player })?;
        let expected = engine.current_player();
        if mover != expected {
            return Err(SyncError::OutOfTurn { expected: expected.number(), actual: player });
        }
        if mover == self.local_player() {
            return Err(SyncError::InvalidPlayer { player });
        }
        if num1.abs_diff(num2) != diff {
            return Err(SyncError::DiffMismatch { num1, num2, diff });
        }
        let board = engine.current_board();
        if board.contains(diff) {
            return Err(SyncError::StaleDiff { diff });
        }
        if let Some(&number) = [num1, num2].iter().find(|&&n| !board.contains(n)) {
            return Err(SyncError::UnknownNumber { number });
        }
        let remote = parse_board(active_numbers, engine.config())?;

        let record = engine.apply_as(mover, num1, num2).map_err(SyncError::Rejected)?;
        debug!(%record, "remote move applied");

        let reconciled = self.reconcile(engine, remote)?;
        Ok(RemoteMove { record, reconciled, game_over: engine.is_over() })
    }

    /// Apply a remote `GameOver`, reconciling the final board.
    ///
    /// A repeat of a `GameOver` already reflected locally changes nothing.
    pub fn on_game_over(
        &mut self,
        engine: &mut GameEngine,
        winner: u8,
        final_state: &[u32],
    ) -> Result<RemoteGameOver, SyncError> {
        let declared = Player::from_number(winner).ok_or(SyncError::InvalidPlayer { player: winner })?;
        let remote = parse_board(final_state, engine.config())?;
        let newly_over = !engine.is_over();

        if !newly_over && engine.winner() == Some(declared) && engine.current_board() == &remote {
            debug!("duplicate game over ignored");
            return Ok(RemoteGameOver { winner: declared, reconciled: None, newly_over });
        }
        if !newly_over && engine.winner() != Some(declared) {
            warn!(local = ?engine.winner(), remote = %declared, "winner disagreement, adopting peer's");
        }

        let local = engine.current_board().to_vec();
        let reconciled = (engine.current_board() != &remote).then(|| {
            self.divergences += 1;
            warn!(?local, remote = ?remote.to_vec(), "final board diverged, adopting peer's");
            (local, remote.to_vec())
        });
        engine
            .conclude(declared, remote)
            .map_err(|e| SyncError::MalformedBoard { reason: e.to_string() })?;
        info!(winner = %declared, "game over received");

        Ok(RemoteGameOver { winner: declared, reconciled, newly_over })
    }

    fn reconcile(
        &mut self,
        engine: &mut GameEngine,
        remote: NumberSet,
    ) -> Result<Option<(Vec<u32>, Vec<u32>)>, SyncError> {
        if engine.current_board() == &remote {
            return Ok(None);
        }
        let local = engine.current_board().to_vec();
        let adopted = remote.to_vec();
        self.divergences += 1;
        warn!(?local, remote = ?adopted, divergences = self.divergences, "board diverged, adopting peer's");

        engine.adopt_board(remote).map_err(|e| SyncError::MalformedBoard { reason: e.to_string() })?;
        Ok(Some((local, adopted)))
    }
}

fn parse_board(numbers: &[u32], config: &GameConfig) -> Result<NumberSet, SyncError> {
    let board = NumberSet::from_numbers(numbers.iter().copied())
        .map_err(|e| SyncError::MalformedBoard { reason: e.to_string() })?;
    if board.is_empty() {
        return Err(SyncError::MalformedBoard { reason: "empty board".to_string() });
    }
    config.check_board(&board).map_err(|e| SyncError::MalformedBoard { reason: e.to_string() })?;
    Ok(board)
}
