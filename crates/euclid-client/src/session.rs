//! Session state machine.
//!
//! The `Session` is the top-level state machine for one seat at the table. It
//! owns the engine, the bot and (in network play) the sync coordinator, and
//! turns [`ClientEvent`]s into [`ClientAction`]s. It never performs I/O.
//!
//! # Phases
//!
//! ```text
//!   local:    Idle ──NewGame/Load──► Playing ──terminal──► Finished
//!   network:  Idle ──Host/Join──► Lobby ──start──► Playing ──► Finished
//!   any network phase ──PeerDisconnected──► Ended(reason)
//! ```
//!
//! `NewGame`, `HostMatch`, `JoinMatch`, `Load` and `Leave` abandon whatever is
//! running and are accepted from every phase.
//!
//! # Bot pacing
//!
//! A bot move is never made synchronously. When the turn passes to the bot the
//! session emits `ScheduleBotMove` with a [`BotTimerKey`] and waits for the
//! driver to feed the key back. Abandoning a game emits `CancelBotMove`, and a
//! fired key that is no longer pending is ignored.

use std::time::Duration;

use euclid_bot::{Bot, SearchConfig};
use euclid_core::{
    Difficulty, Environment, GameConfig, GameEngine, GameMode, GameSetup, MoveError, MoveRecord,
    Player, PlayerRole, Selection, StateSnapshot,
};
use euclid_proto::PeerMessage;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::{
    error::{ClientError, SyncError},
    event::{BotTimerKey, ClientAction, ClientEvent, EndReason},
    sync::SyncCoordinator,
};

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Board domain and seed ranges.
    pub game: GameConfig,
    /// Expert search limits.
    pub search: SearchConfig,
    /// Pause before a bot move.
    pub bot_delay: Duration,
    /// Pause before a bot move right after loading a saved game.
    pub resume_bot_delay: Duration,
    /// Nickname announced to a host when joining.
    pub nick: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            search: SearchConfig::default(),
            bot_delay: Duration::from_millis(1000),
            resume_bot_delay: Duration::from_millis(1500),
            nick: "player".to_string(),
        }
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing running.
    Idle,
    /// Network match waiting to start.
    Lobby {
        /// Local role.
        role: PlayerRole,
        /// Guest nickname, once the host has heard from one.
        opponent: Option<String>,
    },
    /// A game is in progress.
    Playing,
    /// The game ended; the board stays readable.
    Finished,
    /// The match was torn down.
    Ended(EndReason),
}

/// One seat's game session.
///
/// # Type Parameters
///
/// - `E`: Environment implementation for time/randomness
pub struct Session<E: Environment> {
    /// Environment for randomness.
    env: E,

    config: SessionConfig,

    /// Drives seed draws and Easy bot choices. Seeded once from `env`.
    rng: ChaCha8Rng,

    /// Identifies the current game for bot timer keys.
    game_id: u64,

    phase: Phase,
    engine: Option<GameEngine>,
    sync: Option<SyncCoordinator>,
    bot: Option<Bot>,
    opponent: Option<String>,
    pending_bot: Option<BotTimerKey>,
}

impl<E: Environment> Session<E> {
    /// Create an idle session.
    pub fn new(env: E, config: SessionConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(env.random_u64());
        let game_id = env.random_u64();
        Self {
            env,
            config,
            rng,
            game_id,
            phase: Phase::Idle,
            engine: None,
            sync: None,
            bot: None,
            opponent: None,
            pending_bot: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Engine of the current game, if any.
    pub fn engine(&self) -> Option<&GameEngine> {
        self.engine.as_ref()
    }

    /// Snapshot of the current game, if any.
    pub fn save(&self) -> Option<StateSnapshot> {
        self.engine.as_ref().map(GameEngine::save)
    }

    /// Opponent nickname in a network match, when known.
    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }

    /// Bot timer currently armed.
    pub fn pending_bot(&self) -> Option<BotTimerKey> {
        self.pending_bot
    }

    /// Boards adopted from the peer in the current match.
    pub fn divergences(&self) -> u64 {
        self.sync.as_ref().map_or(0, SyncCoordinator::divergences)
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Environment this session draws from.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the event is refused. State is unchanged
    /// on error.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        if let Phase::Ended(reason) = self.phase {
            let restarts = matches!(
                event,
                ClientEvent::NewGame { .. }
                    | ClientEvent::HostMatch
                    | ClientEvent::JoinMatch
                    | ClientEvent::Load(_)
                    | ClientEvent::Leave
                    | ClientEvent::PeerDisconnected
            );
            if !restarts {
                return Err(ClientError::SessionEnded { reason });
            }
        }

        match event {
            ClientEvent::NewGame { mode, difficulty } => self.handle_new_game(mode, difficulty),
            ClientEvent::HostMatch => Ok(self.handle_open_lobby(PlayerRole::Host)),
            ClientEvent::JoinMatch => Ok(self.handle_open_lobby(PlayerRole::Guest)),
            ClientEvent::StartMatch => self.handle_start_match(),
            ClientEvent::Select(number) => self.handle_select(number),
            ClientEvent::Propose { a, b } => self.handle_propose(a, b),
            ClientEvent::BotTimerFired(key) => self.handle_bot_timer(key),
            ClientEvent::MessageReceived(message) => {
                let action = message.action();
                self.handle_message(message).inspect_err(|e| {
                    warn!(action, error = %e, "peer message dropped");
                })
            },
            ClientEvent::PeerDisconnected => Ok(self.handle_disconnect()),
            ClientEvent::Load(snapshot) => self.handle_load(&snapshot),
            ClientEvent::Leave => Ok(self.handle_leave()),
        }
    }

    fn handle_new_game(
        &mut self,
        mode: GameMode,
        difficulty: Difficulty,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let setup = match mode {
            GameMode::SinglePlayerVsBot => GameSetup::vs_bot(difficulty),
            GameMode::LocalTwoPlayer => GameSetup { difficulty, ..GameSetup::local() },
            GameMode::NetworkTwoPlayer => {
                return Err(ClientError::WrongMode {
                    reason: "network matches start with HostMatch or JoinMatch".to_string(),
                });
            },
        };
        let engine = GameEngine::new(self.config.game.clone(), setup, &mut self.rng)?;

        let actions = self.abandon();
        info!(?mode, ?difficulty, board = ?engine.current_board().to_vec(), "new game");
        self.bot = (mode == GameMode::SinglePlayerVsBot)
            .then(|| Bot::new(difficulty, self.config.search));
        self.engine = Some(engine);
        self.phase = Phase::Playing;
        Ok(actions)
    }

    fn handle_open_lobby(&mut self, role: PlayerRole) -> Vec<ClientAction> {
        let mut actions = self.abandon();
        self.sync = Some(SyncCoordinator::new(role));
        self.phase = Phase::Lobby { role, opponent: None };
        info!(?role, "lobby opened");

        if role == PlayerRole::Guest {
            actions.push(ClientAction::Send(SyncCoordinator::ready_message(&self.config.nick)));
        }
        actions
    }

    fn handle_start_match(&mut self) -> Result<Vec<ClientAction>, ClientError> {
        let opponent = match &self.phase {
            Phase::Lobby { role: PlayerRole::Host, opponent: Some(nick) } => nick.clone(),
            Phase::Lobby { role: PlayerRole::Host, opponent: None } => {
                return Err(ClientError::MatchNotReady);
            },
            _ => {
                return Err(ClientError::WrongMode {
                    reason: "only a host in the lobby can start a match".to_string(),
                });
            },
        };

        let engine = GameEngine::new(
            self.config.game.clone(),
            GameSetup::network(PlayerRole::Host),
            &mut self.rng,
        )?;
        let mut actions = vec![
            ClientAction::Send(SyncCoordinator::start_message(&engine)),
            ClientAction::MatchStarted { role: PlayerRole::Host, opponent: Some(opponent.clone()) },
        ];
        if engine.is_local_turn() {
            actions.push(ClientAction::YourTurn);
        }
        info!(%opponent, board = ?engine.current_board().to_vec(), "match started as host");

        self.engine = Some(engine);
        self.opponent = Some(opponent);
        self.phase = Phase::Playing;
        Ok(actions)
    }

    fn handle_select(&mut self, number: u32) -> Result<Vec<ClientAction>, ClientError> {
        let engine = self.engine.as_mut().ok_or(ClientError::NoActiveGame)?;
        match engine.toggle_selection(number)? {
            Selection::Pending(selected) => Ok(vec![ClientAction::SelectionChanged(selected)]),
            Selection::Moved(record) => {
                let mut actions = vec![ClientAction::SelectionChanged(Vec::new())];
                actions.extend(self.after_local_move(record));
                Ok(actions)
            },
            Selection::Rejected(error) => {
                debug!(%error, "selected pair refused");
                Ok(vec![ClientAction::SelectionChanged(Vec::new()), ClientAction::MoveRejected(error)])
            },
        }
    }

    fn handle_propose(&mut self, a: u32, b: u32) -> Result<Vec<ClientAction>, ClientError> {
        let engine = self.engine.as_mut().ok_or(ClientError::NoActiveGame)?;
        if !engine.is_over() && !engine.is_local_turn() {
            return Err(MoveError::NotYourTurn { current: engine.current_player() }.into());
        }
        let record = engine.propose(a, b)?;
        Ok(self.after_local_move(record))
    }

    fn handle_bot_timer(&mut self, key: BotTimerKey) -> Result<Vec<ClientAction>, ClientError> {
        if self.pending_bot != Some(key) {
            debug!(?key, pending = ?self.pending_bot, "stale bot timer ignored");
            return Ok(Vec::new());
        }
        self.pending_bot = None;

        let (Some(engine), Some(bot)) = (self.engine.as_mut(), self.bot.as_ref()) else {
            return Ok(Vec::new());
        };
        if engine.is_over() || engine.current_player() != Player::Two {
            return Ok(Vec::new());
        }
        let Some(mv) = bot.choose_move(engine.current_board(), &mut self.rng) else {
            return Ok(Vec::new());
        };
        let record = engine.propose(mv.low, mv.high)?;

        let mut actions = self.after_local_move(record);
        if self.phase == Phase::Playing {
            actions.push(ClientAction::YourTurn);
        }
        Ok(actions)
    }

    fn handle_message(&mut self, message: PeerMessage) -> Result<Vec<ClientAction>, ClientError> {
        match message {
            PeerMessage::PlayerReady { player_nick } => self.handle_player_ready(player_nick),
            PeerMessage::GameStart { active_numbers, current_player, host_player, guest_player } => {
                self.handle_game_start(&active_numbers, current_player, host_player, guest_player)
            },
            PeerMessage::Move { player, num1, num2, diff, active_numbers } => {
                self.handle_remote_move(player, num1, num2, diff, &active_numbers)
            },
            PeerMessage::GameOver { winner, final_state } => {
                self.handle_remote_game_over(winner, &final_state)
            },
            PeerMessage::Unknown => {
                debug!("unknown peer message ignored");
                Ok(Vec::new())
            },
        }
    }

    fn handle_player_ready(&mut self, nick: String) -> Result<Vec<ClientAction>, ClientError> {
        let role = self.sync.as_ref().map(SyncCoordinator::role);
        match &mut self.phase {
            Phase::Lobby { role: PlayerRole::Host, opponent } => {
                if opponent.is_none() {
                    info!(%nick, "guest ready");
                    *opponent = Some(nick);
                } else {
                    debug!(%nick, "repeated player ready ignored");
                }
                Ok(Vec::new())
            },
            Phase::Playing | Phase::Finished if role == Some(PlayerRole::Host) => {
                debug!(%nick, "player ready after start ignored");
                Ok(Vec::new())
            },
            _ => Err(SyncError::UnexpectedMessage { action: "player_ready" }.into()),
        }
    }

    fn handle_game_start(
        &mut self,
        active_numbers: &[u32],
        current_player: u8,
        host_player: u8,
        guest_player: u8,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let role = self.sync.as_ref().map(SyncCoordinator::role);
        match (&self.phase, role) {
            (Phase::Lobby { role: PlayerRole::Guest, .. }, _) => {},
            (Phase::Playing | Phase::Finished, Some(PlayerRole::Guest)) => {
                debug!("repeated game start ignored");
                return Ok(Vec::new());
            },
            _ => return Err(SyncError::UnexpectedMessage { action: "game_start" }.into()),
        }

        let engine = SyncCoordinator::accept_start(
            self.config.game.clone(),
            active_numbers,
            current_player,
            host_player,
            guest_player,
        )?;
        let mut actions =
            vec![ClientAction::MatchStarted { role: PlayerRole::Guest, opponent: None }];
        if engine.is_local_turn() {
            actions.push(ClientAction::YourTurn);
        }
        info!(board = ?engine.current_board().to_vec(), "match started as guest");

        self.engine = Some(engine);
        self.phase = Phase::Playing;
        Ok(actions)
    }

    fn handle_remote_move(
        &mut self,
        player: u8,
        num1: u32,
        num2: u32,
        diff: u32,
        active_numbers: &[u32],
    ) -> Result<Vec<ClientAction>, ClientError> {
        let (engine, sync) = self.network_game()?;
        let outcome = sync.on_move(engine, player, num1, num2, diff, active_numbers)?;
        let (winner, local_turn) = (engine.winner(), engine.is_local_turn());

        let mut actions = vec![ClientAction::MoveApplied(outcome.record)];
        if let Some((local, remote)) = outcome.reconciled {
            actions.push(ClientAction::Reconciled { local, remote });
        }
        if let Some(winner) = winner {
            actions.push(ClientAction::GameOver { winner });
            self.phase = Phase::Finished;
        } else if local_turn {
            actions.push(ClientAction::YourTurn);
        }
        Ok(actions)
    }

    fn handle_remote_game_over(
        &mut self,
        winner: u8,
        final_state: &[u32],
    ) -> Result<Vec<ClientAction>, ClientError> {
        let (engine, sync) = self.network_game()?;
        let outcome = sync.on_game_over(engine, winner, final_state)?;

        let mut actions = Vec::new();
        if let Some((local, remote)) = outcome.reconciled {
            actions.push(ClientAction::Reconciled { local, remote });
        }
        if outcome.newly_over {
            actions.push(ClientAction::GameOver { winner: outcome.winner });
            self.phase = Phase::Finished;
        }
        Ok(actions)
    }

    fn handle_disconnect(&mut self) -> Vec<ClientAction> {
        let in_match = self.sync.is_some()
            && matches!(self.phase, Phase::Lobby { .. } | Phase::Playing | Phase::Finished);
        if !in_match {
            debug!(phase = ?self.phase, "disconnect outside a match ignored");
            return Vec::new();
        }

        let reason = EndReason::OpponentDisconnected;
        let mut actions = self.abandon();
        self.phase = Phase::Ended(reason);
        info!(%reason, "session ended");
        actions.push(ClientAction::SessionEnded { reason });
        actions
    }

    fn handle_load(&mut self, snapshot: &StateSnapshot) -> Result<Vec<ClientAction>, ClientError> {
        if snapshot.game_mode == GameMode::NetworkTwoPlayer {
            return Err(ClientError::WrongMode {
                reason: "network matches cannot be resumed from a snapshot".to_string(),
            });
        }
        let engine = GameEngine::restore(self.config.game.clone(), snapshot)?;

        let mut actions = self.abandon();
        info!(moves = engine.move_count(), over = engine.is_over(), "game loaded");
        self.phase = if engine.is_over() { Phase::Finished } else { Phase::Playing };
        self.bot = (snapshot.game_mode == GameMode::SinglePlayerVsBot)
            .then(|| Bot::new(snapshot.difficulty, self.config.search));
        self.engine = Some(engine);

        actions.extend(self.schedule_bot(self.config.resume_bot_delay));
        Ok(actions)
    }

    fn handle_leave(&mut self) -> Vec<ClientAction> {
        let was_active = self.phase != Phase::Idle;
        let mut actions = self.abandon();
        self.phase = Phase::Idle;
        if was_active {
            info!("left session");
            actions.push(ClientAction::SessionEnded { reason: EndReason::Left });
        }
        actions
    }

    /// Announce a local (human or bot) move and decide what happens next.
    fn after_local_move(&mut self, record: MoveRecord) -> Vec<ClientAction> {
        let Some(engine) = self.engine.as_ref() else {
            return Vec::new();
        };

        let mut actions = vec![ClientAction::MoveApplied(record)];
        if let Some(sync) = &self.sync {
            actions.extend(sync.local_move(engine, &record).into_iter().map(ClientAction::Send));
        }

        if let Some(winner) = engine.winner() {
            self.phase = Phase::Finished;
            actions.push(ClientAction::GameOver { winner });
        } else {
            actions.extend(self.schedule_bot(self.config.bot_delay));
        }
        actions
    }

    /// Arm the bot timer if it is the bot's turn.
    fn schedule_bot(&mut self, delay: Duration) -> Option<ClientAction> {
        let engine = self.engine.as_ref()?;
        if self.bot.is_none() || engine.is_over() || engine.current_player() != Player::Two {
            return None;
        }
        let key = BotTimerKey { session: self.game_id, ply: engine.move_count() };
        self.pending_bot = Some(key);
        debug!(?key, ?delay, "bot move scheduled");
        Some(ClientAction::ScheduleBotMove { key, delay })
    }

    /// Tear down the current game. Cancels any armed bot timer and retires
    /// the game identifier so late timers are recognised as stale.
    fn abandon(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if let Some(key) = self.pending_bot.take() {
            debug!(?key, "bot move cancelled");
            actions.push(ClientAction::CancelBotMove { key });
        }
        self.engine = None;
        self.sync = None;
        self.bot = None;
        self.opponent = None;
        self.game_id = self.game_id.wrapping_add(1);
        actions
    }

    fn network_game(&mut self) -> Result<(&mut GameEngine, &mut SyncCoordinator), ClientError> {
        match (self.engine.as_mut(), self.sync.as_mut()) {
            (Some(engine), Some(sync)) => Ok((engine, sync)),
            _ => Err(SyncError::NotPlaying.into()),
        }
    }
}
