//! Top-level error type

use std::io;

use thiserror::Error;

use crate::pty::{ConfigError, PtyError};

/// Errors that end a fakecom run with a failure status
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Pty(#[from] PtyError),

    #[error("Failed to enable raw mode: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start reverse relay: {0}")]
    Spawn(#[source] io::Error),

    #[error("Failed to join reverse relay: {0}")]
    Join(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for fakecom operations
pub type Result<T> = std::result::Result<T, Error>;
