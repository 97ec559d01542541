//! Raw mode for the PTY master
//!
//! Clears the line discipline so that arbitrary binary data passes through
//! unmodified, the way a plain serial line would carry it.
//!
//! # References
//!
//! - termios(3): https://man7.org/linux/man-pages/man3/termios.3.html

use std::fmt;
use std::os::fd::AsFd;
use std::str::FromStr;

use nix::sys::termios::{
    self, BaudRate, ControlFlags, InputFlags, LocalFlags, OutputFlags, SetArg,
    SpecialCharacterIndices, Termios,
};

use super::ConfigError;

/// Baud rate used when none is given
pub const DEFAULT_BAUD: u32 = 115_200;

/// Parity applied in raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

impl Parity {
    fn control_flags(self) -> ControlFlags {
        match self {
            Parity::None => ControlFlags::empty(),
            Parity::Even => ControlFlags::PARENB,
            Parity::Odd => ControlFlags::PARENB | ControlFlags::PARODD,
        }
    }
}

impl FromStr for Parity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "even" | "e" => Ok(Parity::Even),
            "odd" | "o" => Ok(Parity::Odd),
            other => Err(format!(
                "unknown parity '{}', expected none, even or odd",
                other
            )),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parity::None => "none",
            Parity::Even => "even",
            Parity::Odd => "odd",
        };
        f.write_str(name)
    }
}

/// Map a numeric rate in bits per second to its termios constant
pub fn baud_rate(bps: u32) -> Option<BaudRate> {
    let rate = match bps {
        1200 => BaudRate::B1200,
        2400 => BaudRate::B2400,
        4800 => BaudRate::B4800,
        9600 => BaudRate::B9600,
        19200 => BaudRate::B19200,
        38400 => BaudRate::B38400,
        57600 => BaudRate::B57600,
        115200 => BaudRate::B115200,
        230400 => BaudRate::B230400,
        _ => return None,
    };
    Some(rate)
}

/// Line settings applied together with raw mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud: BaudRate,
    pub parity: Parity,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud: BaudRate::B115200,
            parity: Parity::None,
        }
    }
}

/// Rewrite `termios` in place to raw mode
///
/// ICRNL stays set, so a carriage return sent to the slave still arrives as
/// a newline.
pub fn make_raw(termios: &mut Termios, settings: LineSettings) -> Result<(), ConfigError> {
    termios::cfsetospeed(termios, settings.baud).map_err(ConfigError::SetSpeed)?;
    termios::cfsetispeed(termios, settings.baud).map_err(ConfigError::SetSpeed)?;

    termios.input_flags &= !(InputFlags::IGNBRK
        | InputFlags::BRKINT
        | InputFlags::PARMRK
        | InputFlags::ISTRIP
        | InputFlags::INLCR
        | InputFlags::IGNCR
        | InputFlags::IXON);

    termios.local_flags &= !(LocalFlags::ECHO
        | LocalFlags::ECHONL
        | LocalFlags::ICANON
        | LocalFlags::ISIG
        | LocalFlags::IEXTEN);

    termios.output_flags &= !OutputFlags::OPOST;

    termios.control_flags &= !(ControlFlags::CSIZE
        | ControlFlags::PARENB
        | ControlFlags::PARODD
        | ControlFlags::CSTOPB);
    termios.control_flags |= ControlFlags::CS8 | settings.parity.control_flags();

    // Block until at least one byte, never time out
    termios.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    termios.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

    Ok(())
}

/// Whether `termios` carries the control bits for `parity`
pub fn has_parity(termios: &Termios, parity: Parity) -> bool {
    let mask = ControlFlags::PARENB | ControlFlags::PARODD;
    termios.control_flags & mask == parity.control_flags()
}

/// Put the terminal behind `fd` into raw mode, effective immediately
///
/// Fails if `fd` is not a terminal. Applying it twice yields the same
/// attributes as applying it once.
///
/// Linux PTYs drop PARENB and PARODD on every attribute change, so a
/// requested parity is checked after the fact and only warned about.
pub fn apply_raw_mode<Fd: AsFd>(fd: Fd, baud: BaudRate, parity: Parity) -> Result<(), ConfigError> {
    let fd = fd.as_fd();
    let mut attrs = termios::tcgetattr(fd).map_err(ConfigError::GetAttributes)?;
    make_raw(&mut attrs, LineSettings { baud, parity })?;
    termios::tcsetattr(fd, SetArg::TCSANOW, &attrs).map_err(ConfigError::SetAttributes)?;

    if parity != Parity::None {
        let applied = termios::tcgetattr(fd).map_err(ConfigError::GetAttributes)?;
        if !has_parity(&applied, parity) {
            tracing::warn!(%parity, "terminal ignored the requested parity");
        }
    }

    Ok(())
}
