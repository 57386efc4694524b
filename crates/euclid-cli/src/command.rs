//! Input line parsing.

use std::path::PathBuf;

use crate::CliError;

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `<n>` or `pick <n>`: toggle a number in the selection.
    Pick(u32),
    /// `<a> <b>` or `move <a> <b>`: propose a pair.
    Move(u32, u32),
    /// `new`: start a fresh game with the current mode.
    New,
    /// `board`: show the board and stats again.
    Board,
    /// `history`: list moves so far.
    History,
    /// `save [path]`.
    Save(Option<PathBuf>),
    /// `load [path]`.
    Load(Option<PathBuf>),
    /// `help`.
    Help,
    /// `quit` or `exit`.
    Quit,
}

/// Text shown for `help`.
pub const HELP: &str = "\
commands:
  <n> | pick <n>        select or deselect a number; a second pick plays the pair
  <a> <b> | move <a> <b>  play a pair directly
  new                   start a new game
  board                 show the board
  history               list the moves so far
  save [path]           save the game
  load [path]           load a saved game
  help                  this text
  quit                  leave";

impl Command {
    /// Parse a trimmed input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CliError> {
        let bad = || CliError::BadCommand { input: line.to_string() };
        let words: Vec<&str> = line.split_whitespace().collect();
        let number = |word: &str| word.parse::<u32>().map_err(|_| bad());

        let command = match words.as_slice() {
            [] => return Ok(None),
            ["pick", n] => Self::Pick(number(n)?),
            ["move", a, b] => Self::Move(number(a)?, number(b)?),
            ["new"] => Self::New,
            ["board"] => Self::Board,
            ["history"] => Self::History,
            ["save"] => Self::Save(None),
            ["save", path] => Self::Save(Some(PathBuf::from(path))),
            ["load"] => Self::Load(None),
            ["load", path] => Self::Load(Some(PathBuf::from(path))),
            ["help" | "?"] => Self::Help,
            ["quit" | "exit" | "q"] => Self::Quit,
            [n] => Self::Pick(number(n)?),
            [a, b] => Self::Move(number(a)?, number(b)?),
            _ => return Err(bad()),
        };
        Ok(Some(command))
    }
}
