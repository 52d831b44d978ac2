//! Error handling for the application

use std::path::PathBuf;
use thiserror::Error;

/// Single-symbol market data failure. Never fatal: the symbol is retried next round.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("invalid price data: {0}")]
    Parse(String),

    #[error("no price returned")]
    Empty,
}

/// Config document errors, split by how the reload policy treats them
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("config file {0:?} is malformed: {1}")]
    Malformed(PathBuf, String),

    #[error("config error: {0}")]
    Other(String),
}

impl ConfigError {
    pub fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound(path)
        } else {
            ConfigError::Other(format!("{}: {}", path.display(), err))
        }
    }
}

/// Notification dispatch failure; logged only
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to launch notifier: {0}")]
    Spawn(String),

    #[error("notifier exited with status {0}")]
    Exit(i32),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{symbol}: {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("market data client: {0}")]
    Client(FetchError),

    #[error("config file already exists: {0:?} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
