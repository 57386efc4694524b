//! Reference game.

use euclid_core::GameEngine;

use super::{ObservableState, Operation, OperationError, OperationResult};

/// Naive reference implementation of the rules.
#[derive(Debug, Clone)]
pub struct ModelGame {
    /// In insertion order.
    numbers: Vec<u32>,
    to_move: u8,
    over: bool,
    winner: Option<u8>,
    moves: usize,
}

impl ModelGame {
    /// Start from two seeds with player one to move.
    pub fn new(low: u32, high: u32) -> Self {
        let mut game = Self { numbers: vec![low, high], to_move: 1, over: false, winner: None, moves: 0 };
        game.over = !game.any_move();
        game
    }

    /// Mirror a freshly created engine.
    pub fn mirror(engine: &GameEngine) -> Self {
        let state = ObservableState::from_engine(engine);
        Self {
            numbers: state.board,
            to_move: state.current_player,
            over: state.game_over,
            winner: state.winner,
            moves: state.move_count,
        }
    }

    /// Apply an operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::ProposeOnBoard { i, j } => {
                let board = self.sorted();
                let a = board[usize::from(i) % board.len()];
                let b = board[usize::from(j) % board.len()];
                self.propose(a, b)
            },
            Operation::ProposeRaw { a, b } => self.propose(u32::from(a), u32::from(b)),
            Operation::SaveAndReload => OperationResult::Ok,
        }
    }

    /// Propose a pair.
    pub fn propose(&mut self, a: u32, b: u32) -> OperationResult {
        let refused = OperationResult::Error;
        if self.over {
            return refused(OperationError::GameOver);
        }
        if a == b {
            return refused(OperationError::SameNumber);
        }
        if !self.numbers.contains(&a) || !self.numbers.contains(&b) {
            return refused(OperationError::NotOnBoard);
        }
        let diff = a.abs_diff(b);
        if self.numbers.contains(&diff) {
            return refused(OperationError::AlreadyPresent);
        }

        self.numbers.push(diff);
        self.moves += 1;
        let mover = self.to_move;
        self.to_move = 3 - mover;
        if !self.any_move() {
            self.over = true;
            self.winner = Some(mover);
        }
        OperationResult::Ok
    }

    /// Current observation.
    pub fn observe(&self) -> ObservableState {
        ObservableState {
            board: self.sorted(),
            current_player: self.to_move,
            game_over: self.over,
            winner: self.winner,
            move_count: self.moves,
        }
    }

    fn any_move(&self) -> bool {
        self.numbers.iter().any(|&a| {
            self.numbers.iter().any(|&b| a > b && !self.numbers.contains(&(a - b)))
        })
    }

    fn sorted(&self) -> Vec<u32> {
        let mut board = self.numbers.clone();
        board.sort_unstable();
        board
    }
}
