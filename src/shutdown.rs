//! Relay lifecycle: runs both directions and decides how the run ends
//!
//! The forward relay runs on the calling thread; the reverse relay runs on a
//! dedicated thread started first. Once the forward relay returns, the
//! coordinator joins the reverse thread. There is no timeout: if the consumer
//! keeps the slave open, the join waits for as long as it does.

use std::any::Any;
use std::io::{Read, Write};
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::relay::{self, ForwardEnd, ReverseEnd};

/// The reverse relay running on its own thread
pub struct ReverseTask {
    handle: JoinHandle<ReverseEnd>,
}

impl ReverseTask {
    /// Start relaying `master` to `output` on a new thread
    pub fn spawn<R, W>(master: R, output: W) -> Result<Self>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("fakecom-reverse".to_string())
            .spawn(move || {
                tracing::info!("reverse relay started");
                relay::reverse(master, output)
            })
            .map_err(Error::Spawn)?;

        Ok(Self { handle })
    }

    /// Wait for the reverse relay to finish
    pub fn join(self) -> Result<ReverseEnd> {
        self.handle
            .join()
            .map_err(|payload| Error::Join(panic_message(payload.as_ref())))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "reverse relay panicked".to_string()
    }
}

/// Relay both directions until each has ended
///
/// `master_reader` and `master_writer` are the two views of the same PTY
/// master. A write failure on the forward side only ends that side.
pub fn run<MR, MW, I, O>(master_reader: MR, master_writer: MW, input: I, output: O) -> Result<()>
where
    MR: Read + Send + 'static,
    MW: Write,
    I: Read,
    O: Write + Send + 'static,
{
    let reverse = ReverseTask::spawn(master_reader, output)?;

    match relay::forward(input, master_writer) {
        ForwardEnd::EndOfInput => tracing::debug!("input reached end of stream"),
        ForwardEnd::ReadFailed(e) => tracing::debug!(error = %e, "input read failed"),
        ForwardEnd::WriteFailed(e) => tracing::warn!(error = %e, "write to PTY master failed"),
    }

    match reverse.join()? {
        ReverseEnd::EndOfStream => tracing::debug!("PTY master reached end of stream"),
        ReverseEnd::ReadFailed(e) => tracing::debug!(error = %e, "PTY master read ended"),
    }

    Ok(())
}
