//! Startup sequence: allocate, configure, announce, relay

use std::io::{Read, Write};

use crate::cli::CliArgs;
use crate::error::Result;
use crate::pty::{apply_raw_mode, ConfigError, LineSettings, Pty};
use crate::shutdown;

/// Run fakecom against the given streams
///
/// The slave path is written as a single line to `diagnostics` once the PTY
/// is ready, before any byte is relayed. A raw mode failure returns before
/// either relay starts.
pub fn run<I, O, D>(args: &CliArgs, input: I, output: O, diagnostics: D) -> Result<()>
where
    I: Read,
    O: Write + Send + 'static,
    D: Write,
{
    let pty = Pty::open()?;
    run_on(
        pty,
        args,
        |pty, settings| apply_raw_mode(pty, settings.baud, settings.parity),
        input,
        output,
        diagnostics,
    )
}

/// Run on an already allocated PTY
///
/// `configure` is called only when `args.raw` is set.
pub fn run_on<C, I, O, D>(
    pty: Pty,
    args: &CliArgs,
    configure: C,
    input: I,
    output: O,
    mut diagnostics: D,
) -> Result<()>
where
    C: FnOnce(&Pty, LineSettings) -> std::result::Result<(), ConfigError>,
    I: Read,
    O: Write + Send + 'static,
    D: Write,
{
    if args.raw {
        let settings = args.line_settings();
        configure(&pty, settings)?;
        tracing::debug!(baud = args.baud, parity = %settings.parity, "raw mode enabled");
    }

    writeln!(diagnostics, "{}", pty.slave_path())?;
    diagnostics.flush()?;

    let (reader, writer) = pty.split();
    shutdown::run(reader, writer, input, output)
}
