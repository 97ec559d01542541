//! PTY (pseudoterminal) handling
//!
//! This module allocates the master/slave pair that fakecom exposes as a
//! fake serial device, and configures its line discipline.

mod raw;
mod unix;

pub use raw::{apply_raw_mode, baud_rate, has_parity, make_raw, LineSettings, Parity, DEFAULT_BAUD};
pub use unix::{MasterReader, MasterWriter, Pty};

/// Errors raised while allocating the PTY pair
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),
}

/// Errors raised while switching the PTY to raw mode
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read terminal attributes: {0}")]
    GetAttributes(#[source] nix::Error),

    #[error("Failed to set line speed: {0}")]
    SetSpeed(#[source] nix::Error),

    #[error("Failed to set terminal attributes: {0}")]
    SetAttributes(#[source] nix::Error),
}

/// Result type for PTY allocation
pub type PtyResult<T> = Result<T, PtyError>;
