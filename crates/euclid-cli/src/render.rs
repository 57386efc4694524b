//! Plain-text rendering of a game.

use std::fmt::Write as _;

use euclid_core::{GameEngine, GameMode, MoveRecord, Player};

/// Board, turn and stats, one item per line.
pub fn board(engine: &GameEngine) -> String {
    let mut out = String::new();
    let numbers: Vec<String> = engine.current_board().iter().map(|n| n.to_string()).collect();
    let _ = writeln!(out, "board: {}", numbers.join(" "));
    if !engine.selected().is_empty() {
        let _ = writeln!(out, "selected: {:?}", engine.selected());
    }
    let _ = writeln!(
        out,
        "active numbers: {} | moves made: {} | valid moves left: {}",
        engine.current_board().len(),
        engine.move_count(),
        engine.legal_move_count(),
    );
    match engine.winner() {
        Some(winner) => {
            let _ = writeln!(out, "{}", outcome(engine, winner));
        },
        None => {
            let _ = writeln!(out, "{} to move", seat(engine, engine.current_player()));
        },
    }
    out
}

/// One line per move, oldest first.
pub fn history(moves: &[MoveRecord]) -> String {
    if moves.is_empty() {
        return "no moves yet\n".to_string();
    }
    moves.iter().enumerate().fold(String::new(), |mut out, (i, record)| {
        let _ = writeln!(out, "{:>3}. {record}", i + 1);
        out
    })
}

/// Result line for a finished game.
pub fn outcome(engine: &GameEngine, winner: Player) -> String {
    match engine.state().mode {
        GameMode::SinglePlayerVsBot if winner == Player::One => "you win!".to_string(),
        GameMode::SinglePlayerVsBot => "the bot wins".to_string(),
        _ => format!("{winner} wins"),
    }
}

fn seat(engine: &GameEngine, player: Player) -> String {
    match (engine.state().mode, player) {
        (GameMode::SinglePlayerVsBot, Player::One) => "you are".to_string(),
        (GameMode::SinglePlayerVsBot, Player::Two) => "the bot is".to_string(),
        _ => format!("{player} is"),
    }
}
