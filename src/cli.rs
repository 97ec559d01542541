//! Command line arguments

use clap::Parser;

use crate::pty::{baud_rate, LineSettings, Parity, DEFAULT_BAUD};

/// CLI arguments for fakecom
#[derive(Parser, Debug, Clone)]
#[command(name = "fakecom")]
#[command(version)]
#[command(about = "Emulate a serial device on a pseudoterminal", long_about = None)]
#[command(after_help = "The slave device path is printed on stderr. Bytes read from stdin are \
    written to the PTY; bytes read from the PTY are written to stdout.")]
pub struct CliArgs {
    /// Put the pseudoterminal into raw mode
    #[arg(short, long)]
    pub raw: bool,

    /// Baud rate set in raw mode
    #[arg(short, long, value_name = "BPS", default_value_t = DEFAULT_BAUD, value_parser = parse_baud)]
    pub baud: u32,

    /// Parity set in raw mode (none, even, odd); Linux PTYs ignore it
    #[arg(short, long, value_name = "PARITY", default_value_t = Parity::None)]
    pub parity: Parity,
}

impl CliArgs {
    /// Line settings to apply together with raw mode
    pub fn line_settings(&self) -> LineSettings {
        LineSettings {
            baud: baud_rate(self.baud).unwrap_or(LineSettings::default().baud),
            parity: self.parity,
        }
    }
}

fn parse_baud(s: &str) -> Result<u32, String> {
    let bps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid baud rate", s))?;
    if baud_rate(bps).is_none() {
        return Err(format!(
            "unsupported baud rate {}, expected one of 1200, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400",
            bps
        ));
    }
    Ok(bps)
}
