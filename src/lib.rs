//! fakecom: a fake serial device on a pseudoterminal
//!
//! fakecom allocates a PTY, reports the slave path, and relays bytes between
//! its own stdin/stdout and the PTY master. A program that expects a serial
//! port (something like `/dev/ttyUSB0`) can be pointed at the slave path
//! instead.
//!
//! - `pty`: PTY allocation and raw mode
//! - `relay`: the byte-at-a-time copy loops
//! - `shutdown`: runs both directions and joins them
//! - `app`: the startup sequence used by the binary

pub mod app;
pub mod cli;
pub mod error;
pub mod pty;
pub mod relay;
pub mod shutdown;

pub use error::{Error, Result};
