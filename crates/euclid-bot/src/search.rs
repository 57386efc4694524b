//! Expert look-ahead.
//!
//! Alpha-beta minimax where a leaf is scored by how many legal moves the side
//! to move has: positive when the bot is to move, negative when the opponent
//! is. The bot therefore prefers lines that leave the opponent few options.
//! A node with no legal moves is a loss for the side to move and scores
//! decisively, with nearer results weighted higher.
//!
//! This is a heuristic, not an exact solver. Depth and a node budget bound the
//! cost; the branching factor grows quadratically with board size.

use euclid_core::{Move, NumberSet};

use crate::SearchConfig;

const DECISIVE: i64 = 1_000_000;

/// Best move found by bounded look-ahead, or `None` on a terminal board.
///
/// Candidates are tried in ascending pair order; the first one with the
/// highest value wins.
pub fn expert_move(board: &NumberSet, config: &SearchConfig) -> Option<Move> {
    let mut scratch = Scratch::new(board);
    let moves = scratch.moves();
    if let [only] = moves.as_slice() {
        return Some(*only);
    }
    let share = (config.max_nodes / moves.len().max(1) as u64).max(1);

    let mut best = None;
    let mut best_value = i64::MIN;
    for mv in moves {
        let mut budget = share;
        scratch.push(mv.diff());
        let value = alphabeta(&mut scratch, config.depth, i64::MIN, i64::MAX, false, &mut budget);
        scratch.pop(mv.diff());

        if value > best_value {
            best_value = value;
            best = Some(mv);
        }
    }
    best
}

/// Value of `board` for the bot, searched `depth` plies.
///
/// Exposed for diagnostics and tests.
pub fn evaluate(board: &NumberSet, bot_to_move: bool, config: &SearchConfig) -> i64 {
    let mut budget = config.max_nodes.max(1);
    alphabeta(&mut Scratch::new(board), config.depth, i64::MIN, i64::MAX, bot_to_move, &mut budget)
}

fn alphabeta(
    board: &mut Scratch,
    depth: u32,
    mut alpha: i64,
    mut beta: i64,
    maximizing: bool,
    budget: &mut u64,
) -> i64 {
    *budget = budget.saturating_sub(1);
    let moves = board.moves();

    if moves.is_empty() {
        let score = DECISIVE + i64::from(depth);
        return if maximizing { -score } else { score };
    }
    if depth == 0 || *budget == 0 {
        let count = moves.len() as i64;
        return if maximizing { count } else { -count };
    }

    if maximizing {
        let mut max_eval = i64::MIN;
        for mv in moves {
            board.push(mv.diff());
            let eval = alphabeta(board, depth - 1, alpha, beta, false, budget);
            board.pop(mv.diff());
            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                break;
            }
        }
        max_eval
    } else {
        let mut min_eval = i64::MAX;
        for mv in moves {
            board.push(mv.diff());
            let eval = alphabeta(board, depth - 1, alpha, beta, true, budget);
            board.pop(mv.diff());
            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                break;
            }
        }
        min_eval
    }
}

/// Mutable board for search: sorted members plus a presence table.
///
/// Differences are always below the largest member, so the table never grows.
struct Scratch {
    numbers: Vec<u32>,
    present: Vec<bool>,
}

impl Scratch {
    fn new(board: &NumberSet) -> Self {
        let numbers = board.to_vec();
        let mut present = vec![false; board.max().map_or(0, |max| max as usize) + 1];
        for &n in &numbers {
            present[n as usize] = true;
        }
        Self { numbers, present }
    }

    fn contains(&self, n: u32) -> bool {
        self.present.get(n as usize).copied().unwrap_or(false)
    }

    /// Legal moves, ascending by `(low, high)`.
    fn moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (i, &low) in self.numbers.iter().enumerate() {
            for &high in &self.numbers[i + 1..] {
                if !self.contains(high - low) {
                    moves.push(Move { low, high });
                }
            }
        }
        moves
    }

    fn push(&mut self, n: u32) {
        if let Err(pos) = self.numbers.binary_search(&n) {
            self.numbers.insert(pos, n);
            self.present[n as usize] = true;
        }
    }

    fn pop(&mut self, n: u32) {
        if let Ok(pos) = self.numbers.binary_search(&n) {
            self.numbers.remove(pos);
            self.present[n as usize] = false;
        }
    }
}
