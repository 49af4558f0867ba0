//! Error types for the stock agents crate.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for agent operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The primary error enum for all operations within the `stock_agents` crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the underlying I/O system while reading or writing agent state.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted agent state exists but cannot be decoded.
    ///
    /// Learned values are never silently discarded: a corrupt file stops the
    /// agent from being constructed instead of starting it from scratch.
    #[error("Persisted state corrupt at {path:?}: {reason}")]
    CorruptState {
        /// The file that failed to decode.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// An error that occurred while serializing agent state.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An invalid configuration value or unreadable configuration file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An observation record that could not be decoded.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// An action label outside the fixed action set.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl Error {
    /// Builds a [`Error::CorruptState`] for the given file.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::CorruptState {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` if the error means learned state on disk is unusable.
    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, Error::CorruptState { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
