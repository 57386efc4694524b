//! CLI error types.

use std::{io, path::PathBuf};

use euclid_client::ClientError;
use euclid_core::SnapshotError;
use thiserror::Error;

/// Errors that stop the driver or a single command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Terminal or file I/O failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A save file could not be read or written.
    #[error("save file {}: {source}", path.display())]
    SaveFile {
        /// File involved.
        path: PathBuf,
        /// What went wrong.
        source: io::Error,
    },

    /// A save file held no valid game.
    #[error("save file {}: {source}", path.display())]
    Snapshot {
        /// File involved.
        path: PathBuf,
        /// What went wrong.
        source: SnapshotError,
    },

    /// The session refused an event.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Input line was not a command.
    #[error("unknown command: {input:?} (try 'help')")]
    BadCommand {
        /// The offending line.
        input: String,
    },

    /// `save` without a path and no `--save` default.
    #[error("no save path given")]
    NoSavePath,
}

impl CliError {
    /// Whether the driver must stop.
    ///
    /// Terminal I/O and fatal session errors stop the loop. Everything else
    /// is reported and the prompt continues.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Client(e) => e.is_fatal(),
            Self::SaveFile { .. }
            | Self::Snapshot { .. }
            | Self::BadCommand { .. }
            | Self::NoSavePath => false,
        }
    }
}
