//! Euclid CLI
//!
//! Terminal front end for the session state machine. Reads commands from
//! stdin, executes the actions the session produces and prints the board.
//!
//! # Components
//!
//! - [`Driver`]: Event loop over input lines and bot timers
//! - [`SystemEnv`]: Production `Environment` (system clock, OS randomness)
//! - [`Command`]: Parsed input line
//! - [`render`]: Board and stats formatting

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
mod driver;
mod error;
pub mod render;
mod system_env;

pub use command::Command;
pub use driver::{Driver, DriverConfig};
pub use error::CliError;
pub use system_env::SystemEnv;
