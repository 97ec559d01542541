//! Byte relay between the process streams and the PTY master
//!
//! Both directions move a single byte per read and per write. This keeps the
//! relay binary-safe and free of framing assumptions, at the cost of
//! throughput.

use std::io::{self, Read, Write};

/// Why the forward (input to master) relay stopped
#[derive(Debug)]
pub enum ForwardEnd {
    /// The input reached end of stream
    EndOfInput,
    /// Reading the input failed
    ReadFailed(io::Error),
    /// Writing to the master failed
    WriteFailed(io::Error),
}

/// Why the reverse (master to output) relay stopped
#[derive(Debug)]
pub enum ReverseEnd {
    /// The master reached end of stream
    EndOfStream,
    /// Reading the master failed, e.g. EIO after the slave was closed
    ReadFailed(io::Error),
}

/// Read a single byte, retrying on `Interrupted`
///
/// Returns `Ok(None)` at end of stream.
fn read_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Copy `input` to the PTY master until the input ends or a write fails
///
/// Every byte is handed to the master in its own write. The master is left
/// open on return.
pub fn forward<R: Read, W: Write>(mut input: R, mut master: W) -> ForwardEnd {
    let end = loop {
        let byte = match read_byte(&mut input) {
            Ok(Some(byte)) => byte,
            Ok(None) => break ForwardEnd::EndOfInput,
            Err(e) => break ForwardEnd::ReadFailed(e),
        };

        if let Err(e) = master.write_all(&[byte]) {
            break ForwardEnd::WriteFailed(e);
        }
    };

    tracing::info!("forward relay closed");
    end
}

/// Copy the PTY master to `output` until the master ends or fails
///
/// Output is flushed after every byte. A failed write to the output drops
/// that byte but does not stop the relay; only the master side ends it.
pub fn reverse<R: Read, W: Write>(mut master: R, mut output: W) -> ReverseEnd {
    loop {
        let byte = match read_byte(&mut master) {
            Ok(Some(byte)) => byte,
            Ok(None) => return ReverseEnd::EndOfStream,
            Err(e) => return ReverseEnd::ReadFailed(e),
        };

        if let Err(e) = output.write_all(&[byte]).and_then(|()| output.flush()) {
            tracing::debug!(error = %e, "dropped byte: output write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Writer that records each write call and flush separately
    #[derive(Default)]
    struct Recorder {
        writes: Vec<Vec<u8>>,
        flushes: usize,
        /// Number of writes to accept before failing
        fail_after: Option<usize>,
    }

    impl Recorder {
        fn bytes(&self) -> Vec<u8> {
            self.writes.concat()
        }
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_after == Some(self.writes.len()) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    /// Reader that yields its data, then a fixed error
    struct FailingReader {
        data: Cursor<Vec<u8>>,
        kind: io::ErrorKind,
        interrupted_once: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted_once {
                self.interrupted_once = true;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            match self.data.read(buf)? {
                0 => Err(io::Error::from(self.kind)),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_forward_end_of_input() {
        let mut master = Recorder::default();
        let end = forward(Cursor::new(b"AT\r\n".to_vec()), &mut master);
        assert!(matches!(end, ForwardEnd::EndOfInput));
        assert_eq!(master.bytes(), b"AT\r\n");
    }

    #[test]
    fn test_forward_empty_input() {
        let mut master = Recorder::default();
        let end = forward(io::empty(), &mut master);
        assert!(matches!(end, ForwardEnd::EndOfInput));
        assert!(master.writes.is_empty());
    }

    #[test]
    fn test_forward_stops_on_write_failure() {
        let mut master = Recorder {
            fail_after: Some(2),
            ..Default::default()
        };
        let end = forward(Cursor::new(b"abcdef".to_vec()), &mut master);
        match end {
            ForwardEnd::WriteFailed(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected end: {:?}", other),
        }
        assert_eq!(master.bytes(), b"ab");
    }

    #[test]
    fn test_forward_read_error_after_interrupt() {
        let input = FailingReader {
            data: Cursor::new(b"xy".to_vec()),
            kind: io::ErrorKind::InvalidData,
            interrupted_once: false,
        };
        let mut master = Recorder::default();
        let end = forward(input, &mut master);
        assert!(matches!(end, ForwardEnd::ReadFailed(ref e) if e.kind() == io::ErrorKind::InvalidData));
        assert_eq!(master.bytes(), b"xy");
    }

    #[test]
    fn test_reverse_end_of_stream() {
        let mut output = Recorder::default();
        let end = reverse(Cursor::new(b"OK\r\n".to_vec()), &mut output);
        assert!(matches!(end, ReverseEnd::EndOfStream));
        assert_eq!(output.bytes(), b"OK\r\n");
        assert_eq!(output.flushes, 4);
    }

    #[test]
    fn test_reverse_read_failure_ends_relay() {
        let master = FailingReader {
            data: Cursor::new(b"hi".to_vec()),
            kind: io::ErrorKind::Other,
            interrupted_once: false,
        };
        let mut output = Recorder::default();
        let end = reverse(master, &mut output);
        assert!(matches!(end, ReverseEnd::ReadFailed(_)));
        assert_eq!(output.bytes(), b"hi");
    }

    #[test]
    fn test_reverse_survives_output_failure() {
        let mut output = Recorder {
            fail_after: Some(1),
            ..Default::default()
        };
        let end = reverse(Cursor::new(b"abc".to_vec()), &mut output);
        // Relay keeps draining the master after the first failed write
        assert!(matches!(end, ReverseEnd::EndOfStream));
        assert_eq!(output.bytes(), b"a");
    }

    proptest! {
        #[test]
        fn prop_forward_one_write_per_byte(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut master = Recorder::default();
            let end = forward(Cursor::new(data.clone()), &mut master);
            prop_assert!(matches!(end, ForwardEnd::EndOfInput));
            prop_assert_eq!(master.writes.len(), data.len());
            prop_assert!(master.writes.iter().all(|w| w.len() == 1));
            prop_assert_eq!(master.bytes(), data);
        }

        #[test]
        fn prop_reverse_flushes_every_byte(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut output = Recorder::default();
            let end = reverse(Cursor::new(data.clone()), &mut output);
            prop_assert!(matches!(end, ReverseEnd::EndOfStream));
            prop_assert_eq!(output.flushes, data.len());
            prop_assert_eq!(output.writes.len(), data.len());
            prop_assert_eq!(output.bytes(), data);
        }
    }
}
