//! fakecom - emulate a serial device on a pseudoterminal
//!
//! Prints the slave device path on stderr, then relays stdin to the PTY and
//! the PTY to stdout. Pass `-r` to put the PTY into raw mode.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use fakecom::cli::CliArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        },
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match fakecom::app::run(&args, io::stdin(), io::stdout(), io::stderr()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        },
    }
}
