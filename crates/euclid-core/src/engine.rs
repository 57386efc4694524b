//! The game engine: sole owner of game state and sole authority for legal
//! transitions.
//!
//! # State machine
//!
//! ```text
//!   reset ──► InProgress ──propose/apply_as──► InProgress
//!                 │                                 │
//!                 └──── apply leaves no legal move ─┴──► Terminal (absorbing)
//! ```
//!
//! `current_player` switches on every successful apply, including the one that
//! ends the game. The mover who leaves no legal move wins, so in every terminal
//! state reached through play `winner == current_player.other()`.

use std::{fmt, ops::RangeInclusive};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    Difficulty, GameMode, Player, PlayerRole,
    board::NumberSet,
    config::{GameConfig, validate_ranges},
    error::{EngineError, MoveError},
    rules,
};

/// One applied move. Immutable once appended to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Player who made the move.
    pub player: Player,
    /// First operand, as selected.
    pub num1: u32,
    /// Second operand, as selected.
    pub num2: u32,
    /// Number added to the board.
    pub diff: u32,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {} = {}", self.player, self.num1, self.num2, self.diff)
    }
}

/// Mode, bot tier and network role for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSetup {
    /// How the seats are filled.
    pub mode: GameMode,
    /// Bot tier. Carried in every mode so snapshots keep the last choice.
    pub difficulty: Difficulty,
    /// Local role. Present exactly when `mode` is network play.
    pub role: Option<PlayerRole>,
}

impl GameSetup {
    /// Human against the bot.
    pub fn vs_bot(difficulty: Difficulty) -> Self {
        Self { mode: GameMode::SinglePlayerVsBot, difficulty, role: None }
    }

    /// Two humans on one engine.
    pub fn local() -> Self {
        Self { mode: GameMode::LocalTwoPlayer, difficulty: Difficulty::default(), role: None }
    }

    /// One side of a network match.
    pub fn network(role: PlayerRole) -> Self {
        Self { mode: GameMode::NetworkTwoPlayer, difficulty: Difficulty::default(), role: Some(role) }
    }

    pub(crate) fn check(&self) -> Result<(), EngineError> {
        match (self.mode, self.role) {
            (GameMode::NetworkTwoPlayer, None) => Err(EngineError::InvalidBoard {
                reason: "network game without a role".to_string(),
            }),
            (GameMode::SinglePlayerVsBot | GameMode::LocalTwoPlayer, Some(_)) => {
                Err(EngineError::InvalidBoard { reason: "role outside a network game".to_string() })
            },
            _ => Ok(()),
        }
    }
}

/// Complete state of one game.
///
/// Read through [`GameEngine::state`]; only the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// The board.
    pub active_numbers: NumberSet,
    /// Player to move.
    pub current_player: Player,
    /// Numbers picked so far toward the next move, in pick order (0 to 2).
    pub selected: Vec<u32>,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Winner, once the game has ended.
    pub winner: Option<Player>,
    /// Applied moves, oldest first.
    pub move_history: Vec<MoveRecord>,
    /// How the seats are filled.
    pub mode: GameMode,
    /// Bot tier.
    pub difficulty: Difficulty,
    /// Local network role.
    pub role: Option<PlayerRole>,
}

/// Result of picking a number on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Selection changed; fewer than two numbers are picked.
    Pending(Vec<u32>),
    /// The second pick completed a legal move, which was applied.
    Moved(MoveRecord),
    /// The second pick completed a pair that was refused. Selection is cleared.
    Rejected(MoveError),
}

/// Owns and mutates a [`GameState`].
#[derive(Debug, Clone)]
pub struct GameEngine {
    config: GameConfig,
    state: GameState,
}

impl GameEngine {
    /// Create an engine and draw a fresh board from the configured ranges.
    pub fn new<R>(config: GameConfig, setup: GameSetup, rng: &mut R) -> Result<Self, EngineError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;
        setup.check()?;
        let (low, high) = (config.low_seed.clone(), config.high_seed.clone());
        let mut engine = Self { config, state: blank_state(setup) };
        engine.reset_with_ranges(low, high, rng)?;
        Ok(engine)
    }

    /// Create an engine from an explicit initial board.
    ///
    /// A guest uses this with the host's `GameStart` board. Seeds must be two
    /// distinct positive integers inside the board domain with at least one
    /// legal move between them, so `{x, 2x}` is refused.
    pub fn from_seeds(
        config: GameConfig,
        setup: GameSetup,
        seeds: [u32; 2],
        current_player: Player,
    ) -> Result<Self, EngineError> {
        setup.check()?;
        let [low, high] = seeds;
        let board = NumberSet::from_numbers(seeds)
            .ok()
            .filter(|board| board.len() == 2 && !rules::is_terminal(board))
            .ok_or(EngineError::InvalidSeeds { low, high })?;
        config.check_board(&board)?;

        let mut state = blank_state(setup);
        state.active_numbers = board;
        state.current_player = current_player;
        Ok(Self { config, state })
    }

    /// Start a new game with the same setup, drawing from the configured ranges.
    pub fn reset<R>(&mut self, rng: &mut R) -> Result<&GameState, EngineError>
    where
        R: Rng + ?Sized,
    {
        let (low, high) = (self.config.low_seed.clone(), self.config.high_seed.clone());
        self.reset_with_ranges(low, high, rng)
    }

    /// Start a new game, drawing one seed uniformly from each range.
    ///
    /// Fails without touching the current game if either range is degenerate,
    /// the ranges overlap or the high range leaves the board domain.
    pub fn reset_with_ranges<R>(
        &mut self,
        low: RangeInclusive<u32>,
        high: RangeInclusive<u32>,
        rng: &mut R,
    ) -> Result<&GameState, EngineError>
    where
        R: Rng + ?Sized,
    {
        validate_ranges(&low, &high)?;
        if *high.end() > self.config.board_max {
            return Err(EngineError::InvalidSeedRange {
                reason: format!("high range ends beyond board max {}", self.config.board_max),
            });
        }
        let seeds = draw_seeds(&low, &high, rng).ok_or_else(|| EngineError::InvalidSeedRange {
            reason: format!("every pair from {low:?} and {high:?} is already closed"),
        })?;

        let mut state = blank_state(self.setup());
        for seed in seeds {
            state.active_numbers.insert(seed);
        }
        self.state = state;
        debug!(board = ?self.state.active_numbers.to_vec(), "new game");
        Ok(&self.state)
    }

    /// Apply a move for the player to move.
    ///
    /// In network mode only the local role may move. On any error the state is
    /// unchanged.
    pub fn propose(&mut self, a: u32, b: u32) -> Result<MoveRecord, MoveError> {
        if self.state.game_over {
            return Err(MoveError::GameOver);
        }
        if self.state.mode == GameMode::NetworkTwoPlayer && !self.is_local_turn() {
            return Err(MoveError::NotYourTurn { current: self.state.current_player });
        }
        self.apply(a, b)
    }

    /// Apply a move on behalf of `player`, who must be the player to move.
    ///
    /// Used for remote moves and bot moves, bypassing the local-role check.
    pub fn apply_as(&mut self, player: Player, a: u32, b: u32) -> Result<MoveRecord, MoveError> {
        if self.state.game_over {
            return Err(MoveError::GameOver);
        }
        if player != self.state.current_player {
            return Err(MoveError::NotYourTurn { current: self.state.current_player });
        }
        self.apply(a, b)
    }

    /// Toggle `number` in the selection. A second pick proposes the pair.
    ///
    /// Picks are refused when the game is over, when the number is not on the
    /// board, or when the player to move is not local (the bot's seat, or the
    /// remote peer's seat).
    pub fn toggle_selection(&mut self, number: u32) -> Result<Selection, MoveError> {
        if self.state.game_over {
            return Err(MoveError::GameOver);
        }
        if !self.is_local_turn() {
            return Err(MoveError::NotYourTurn { current: self.state.current_player });
        }
        if !self.state.active_numbers.contains(number) {
            return Err(MoveError::NotOnBoard { number });
        }

        if let Some(pos) = self.state.selected.iter().position(|&n| n == number) {
            self.state.selected.remove(pos);
            return Ok(Selection::Pending(self.state.selected.clone()));
        }
        self.state.selected.push(number);
        if self.state.selected.len() < 2 {
            return Ok(Selection::Pending(self.state.selected.clone()));
        }

        let (a, b) = (self.state.selected[0], self.state.selected[1]);
        self.state.selected.clear();
        Ok(match self.apply(a, b) {
            Ok(record) => Selection::Moved(record),
            Err(error) => Selection::Rejected(error),
        })
    }

    /// Replace the board with a peer's authoritative board.
    ///
    /// Selection is cleared and the outcome follows the new board: a terminal
    /// board ends the game with the player who just moved as winner, and a
    /// live one reopens a game that only ended on the local copy.
    pub fn adopt_board(&mut self, board: NumberSet) -> Result<(), EngineError> {
        if board.is_empty() {
            return Err(EngineError::InvalidBoard { reason: "empty board".to_string() });
        }
        self.config.check_board(&board)?;
        self.state.active_numbers = board;
        self.state.selected.clear();
        let terminal = rules::is_terminal(&self.state.active_numbers);
        if terminal && !self.state.game_over {
            self.finish(self.state.current_player.other());
        } else if !terminal && self.state.game_over {
            warn!("adopted board is live, game reopened");
            self.state.game_over = false;
            self.state.winner = None;
        }
        Ok(())
    }

    /// End the game with a peer-declared winner and final board.
    pub fn conclude(&mut self, winner: Player, board: NumberSet) -> Result<(), EngineError> {
        if board.is_empty() {
            return Err(EngineError::InvalidBoard { reason: "empty final board".to_string() });
        }
        self.config.check_board(&board)?;
        self.state.active_numbers = board;
        self.state.selected.clear();
        if !self.state.game_over || self.state.winner != Some(winner) {
            self.finish(winner);
        }
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Configuration this engine draws games from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Mode, tier and role of the current game.
    pub fn setup(&self) -> GameSetup {
        GameSetup { mode: self.state.mode, difficulty: self.state.difficulty, role: self.state.role }
    }

    /// The board.
    pub fn current_board(&self) -> &NumberSet {
        &self.state.active_numbers
    }

    /// Player to move.
    pub fn current_player(&self) -> Player {
        self.state.current_player
    }

    /// Whether the game has ended.
    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    /// Winner, once the game has ended.
    pub fn winner(&self) -> Option<Player> {
        self.state.winner
    }

    /// Applied moves, oldest first.
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.state.move_history
    }

    /// Number of moves made.
    pub fn move_count(&self) -> usize {
        self.state.move_history.len()
    }

    /// Legal moves left on the board.
    pub fn legal_move_count(&self) -> usize {
        rules::legal_move_count(&self.state.active_numbers)
    }

    /// Numbers picked toward the next move.
    pub fn selected(&self) -> &[u32] {
        &self.state.selected
    }

    /// Whether the player to move sits at this engine's keyboard.
    pub fn is_local_turn(&self) -> bool {
        match self.state.mode {
            GameMode::LocalTwoPlayer => true,
            GameMode::SinglePlayerVsBot => self.state.current_player == Player::One,
            GameMode::NetworkTwoPlayer => {
                self.state.role.map(PlayerRole::player) == Some(self.state.current_player)
            },
        }
    }

    pub(crate) fn with_state(config: GameConfig, state: GameState) -> Self {
        Self { config, state }
    }

    pub(crate) fn replace_state(&mut self, state: GameState) {
        self.state = state;
    }

    fn apply(&mut self, a: u32, b: u32) -> Result<MoveRecord, MoveError> {
        let mv = rules::validate(&self.state.active_numbers, a, b)?;
        let player = self.state.current_player;
        let record = MoveRecord { player, num1: a, num2: b, diff: mv.diff() };

        self.state.active_numbers.insert(record.diff);
        self.state.move_history.push(record);
        self.state.selected.clear();
        self.state.current_player = player.other();
        debug!(%record, board_size = self.state.active_numbers.len(), "move applied");

        if rules::is_terminal(&self.state.active_numbers) {
            self.finish(player);
        }
        Ok(record)
    }

    fn finish(&mut self, winner: Player) {
        self.state.game_over = true;
        self.state.winner = Some(winner);
        info!(%winner, moves = self.state.move_history.len(), "game over");
    }
}

/// Seeds `{x, 2x}` leave no legal move. Redraw those, giving up only when the
/// ranges hold nothing else.
fn draw_seeds<R>(
    low: &RangeInclusive<u32>,
    high: &RangeInclusive<u32>,
    rng: &mut R,
) -> Option<[u32; 2]>
where
    R: Rng + ?Sized,
{
    const ATTEMPTS: usize = 64;

    for _ in 0..ATTEMPTS {
        let seeds = [rng.gen_range(low.clone()), rng.gen_range(high.clone())];
        if seeds[1] != seeds[0].saturating_mul(2) {
            return Some(seeds);
        }
    }
    low.clone()
        .find_map(|x| high.clone().find(|&y| y != x.saturating_mul(2)).map(|y| [x, y]))
}

fn blank_state(setup: GameSetup) -> GameState {
    GameState {
        active_numbers: NumberSet::new(),
        current_player: Player::One,
        selected: Vec::new(),
        game_over: false,
        winner: None,
        move_history: Vec::new(),
        mode: setup.mode,
        difficulty: setup.difficulty,
        role: setup.role,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn engine_with(seeds: [u32; 2], setup: GameSetup) -> GameEngine {
        GameEngine::from_seeds(GameConfig::default(), setup, seeds, Player::One).unwrap()
    }

    #[test]
    fn reset_draws_from_both_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let engine = GameEngine::new(GameConfig::default(), GameSetup::local(), &mut rng).unwrap();

        let board = engine.current_board().to_vec();
        assert_eq!(board.len(), 2);
        assert!((20..=40).contains(&board[0]));
        assert!((60..=80).contains(&board[1]));
        assert_eq!(engine.current_player(), Player::One);
        assert!(!engine.is_over());
        assert!(engine.move_history().is_empty());
    }

    #[test]
    fn reset_never_deals_a_closed_pair() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut engine = engine_with([20, 26], GameSetup::local());
        for _ in 0..200 {
            engine.reset_with_ranges(30..=31, 60..=62, &mut rng).unwrap();
            assert!(!rules::is_terminal(engine.current_board()));
        }
        engine.reset_with_ranges(30..=30, 60..=61, &mut rng).unwrap();
        assert_eq!(engine.current_board().to_vec(), vec![30, 61]);
    }

    #[test]
    fn reset_with_bad_ranges_keeps_game() {
        let mut engine = engine_with([20, 26], GameSetup::local());
        engine.propose(20, 26).unwrap();
        let before = engine.state().clone();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(engine.reset_with_ranges(40..=20, 60..=80, &mut rng).is_err());
        assert!(engine.reset_with_ranges(20..=70, 60..=80, &mut rng).is_err());
        assert!(engine.reset_with_ranges(30..=30, 60..=60, &mut rng).is_err());
        assert!(engine.reset_with_ranges(30..=40, 90..=101, &mut rng).is_err());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn reset_clears_history() {
        let mut engine = engine_with([20, 26], GameSetup::local());
        engine.propose(20, 26).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let state = engine.reset(&mut rng).unwrap();
        assert!(state.move_history.is_empty());
        assert_eq!(state.active_numbers.len(), 2);
        assert_eq!(state.current_player, Player::One);
    }

    #[test]
    fn scenario_twenty_and_twenty_six() {
        let mut engine = engine_with([20, 26], GameSetup::local());

        let record = engine.propose(20, 26).unwrap();
        assert_eq!(record, MoveRecord { player: Player::One, num1: 20, num2: 26, diff: 6 });
        assert_eq!(engine.current_board().to_vec(), vec![6, 20, 26]);
        assert_eq!(engine.current_player(), Player::Two);

        let before = engine.state().clone();
        assert_eq!(engine.propose(20, 26), Err(MoveError::AlreadyPresent { diff: 6 }));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn rejections_leave_state_unchanged() {
        let mut engine = engine_with([20, 26], GameSetup::local());
        let before = engine.state().clone();

        assert_eq!(engine.propose(20, 20), Err(MoveError::SameNumber { number: 20 }));
        assert_eq!(engine.propose(20, 99), Err(MoveError::NotOnBoard { number: 99 }));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn network_propose_requires_local_turn() {
        let mut guest = engine_with([30, 70], GameSetup::network(PlayerRole::Guest));
        assert_eq!(guest.propose(30, 70), Err(MoveError::NotYourTurn { current: Player::One }));

        guest.apply_as(Player::One, 30, 70).unwrap();
        assert!(guest.is_local_turn());
        assert!(guest.propose(40, 70).is_ok());
    }

    #[test]
    fn apply_as_checks_turn() {
        let mut engine = engine_with([30, 70], GameSetup::local());
        assert_eq!(
            engine.apply_as(Player::Two, 30, 70),
            Err(MoveError::NotYourTurn { current: Player::One })
        );
    }

    #[test]
    fn mover_into_terminal_board_wins() {
        // {3, 4} -> {1, 3, 4} -> {1, 2, 3, 4}, which is closed.
        let mut engine = engine_with([3, 4], GameSetup::local());

        engine.propose(3, 4).unwrap();
        assert!(!engine.is_over());
        engine.propose(1, 3).unwrap();

        assert!(engine.is_over());
        assert_eq!(engine.current_board().to_vec(), vec![1, 2, 3, 4]);
        assert_eq!(engine.winner(), Some(Player::Two));
        assert_eq!(engine.current_player(), Player::One);
        assert_eq!(engine.legal_move_count(), 0);
        assert_eq!(engine.propose(1, 4), Err(MoveError::GameOver));
    }

    #[test]
    fn second_pick_proposes_and_clears() {
        let mut engine = engine_with([20, 26], GameSetup::local());

        assert_eq!(engine.toggle_selection(20).unwrap(), Selection::Pending(vec![20]));
        assert_eq!(engine.toggle_selection(20).unwrap(), Selection::Pending(vec![]));
        engine.toggle_selection(26).unwrap();
        let outcome = engine.toggle_selection(20).unwrap();

        assert_eq!(
            outcome,
            Selection::Moved(MoveRecord { player: Player::One, num1: 26, num2: 20, diff: 6 })
        );
        assert!(engine.selected().is_empty());

        engine.toggle_selection(20).unwrap();
        assert_eq!(
            engine.toggle_selection(26).unwrap(),
            Selection::Rejected(MoveError::AlreadyPresent { diff: 6 })
        );
        assert!(engine.selected().is_empty());
    }

    #[test]
    fn picks_refused_on_bot_turn() {
        let mut engine = engine_with([20, 26], GameSetup::vs_bot(Difficulty::Easy));
        assert_eq!(engine.toggle_selection(7), Err(MoveError::NotOnBoard { number: 7 }));
        engine.propose(20, 26).unwrap();
        assert_eq!(engine.toggle_selection(6), Err(MoveError::NotYourTurn { current: Player::Two }));
    }

    #[test]
    fn adopting_terminal_board_ends_game() {
        let mut engine = engine_with([3, 4], GameSetup::local());
        engine.propose(3, 4).unwrap();

        engine.adopt_board(NumberSet::from_numbers([1, 2, 3, 4]).unwrap()).unwrap();
        assert!(engine.is_over());
        assert_eq!(engine.winner(), Some(Player::One));
        assert!(engine.adopt_board(NumberSet::new()).is_err());
    }

    #[test]
    fn adopting_live_board_reopens_game() {
        let mut engine = engine_with([3, 4], GameSetup::local());
        engine.propose(3, 4).unwrap();
        engine.propose(3, 1).unwrap();
        assert_eq!(engine.winner(), Some(Player::Two));

        engine.adopt_board(NumberSet::from_numbers([1, 3, 4]).unwrap()).unwrap();
        assert!(!engine.is_over());
        assert_eq!(engine.winner(), None);
    }

    #[test]
    fn conclude_sets_declared_winner() {
        let mut engine = engine_with([30, 70], GameSetup::network(PlayerRole::Guest));
        engine.conclude(Player::Two, NumberSet::from_numbers([10, 20, 30]).unwrap()).unwrap();
        assert!(engine.is_over());
        assert_eq!(engine.winner(), Some(Player::Two));
        assert_eq!(engine.current_board().to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn from_seeds_rejects_degenerate_boards() {
        let setup = GameSetup::local();
        let cfg = GameConfig::default;
        assert!(GameEngine::from_seeds(cfg(), setup, [5, 5], Player::One).is_err());
        assert!(GameEngine::from_seeds(cfg(), setup, [0, 5], Player::One).is_err());
        assert!(GameEngine::from_seeds(cfg(), setup, [30, 60], Player::One).is_err());

        let roleless = GameSetup { role: None, ..GameSetup::network(PlayerRole::Host) };
        assert!(GameEngine::from_seeds(cfg(), roleless, [3, 5], Player::One).is_err());
    }

    #[test]
    fn boards_outside_the_domain_are_refused() {
        let setup = GameSetup::local();
        assert!(matches!(
            GameEngine::from_seeds(GameConfig::default(), setup, [7, 3_000_000_000], Player::One),
            Err(EngineError::InvalidBoard { .. })
        ));
        assert!(GameEngine::from_seeds(GameConfig::default(), setup, [7, 100], Player::One).is_ok());

        let mut engine = GameEngine::from_seeds(GameConfig::default(), setup, [30, 70], Player::One).unwrap();
        let before = engine.state().clone();
        let oversized = NumberSet::from_numbers([30, 70, 900]).unwrap();
        assert!(matches!(engine.adopt_board(oversized.clone()), Err(EngineError::InvalidBoard { .. })));
        assert!(matches!(engine.conclude(Player::Two, oversized), Err(EngineError::InvalidBoard { .. })));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn move_record_display() {
        let record = MoveRecord { player: Player::Two, num1: 70, num2: 30, diff: 40 };
        assert_eq!(record.to_string(), "Player 2: 70 - 30 = 40");
    }
}
