//! Line sources for the acquisition worker
//!
//! This module provides a common trait for everything the worker can read
//! altitude lines from, enabling both real serial hardware and scripted
//! mock sources for testing.
//!
//! The serial implementation uses a bounded read timeout instead of an
//! unbounded blocking read: a timeout surfaces as [`LineEvent::TimedOut`],
//! which gives the worker a regular opportunity to poll its cancellation
//! flag. Operator termination therefore does not have to wait for the
//! hardware to fail.

use crate::error::Result;
use crate::types::PortDescriptor;
use std::io::Read;
use std::time::Duration;

/// Cap on bytes buffered while waiting for a line terminator
///
/// A malfunctioning feed that streams without newlines gets its buffered
/// bytes discarded at this bound instead of growing the buffer forever.
const MAX_PENDING_BYTES: usize = 4096;

/// One read attempt's outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line arrived (terminator stripped by the caller's trim)
    Line(String),
    /// The bounded read elapsed without completing a line
    TimedOut,
}

/// A source of discrete input lines, exclusively owned by one worker
pub trait LineSource: Send {
    /// Block for at most the source's read bound and return the outcome
    ///
    /// `Err(_)` means the channel itself is unusable (device unplugged,
    /// port closed); the worker treats it as terminal.
    fn read_line(&mut self) -> Result<LineEvent>;
}

/// Pop the first complete line (through its `\n`) off the pending buffer
fn next_line(pending: &mut Vec<u8>) -> Option<String> {
    let pos = pending.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = pending.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line).into_owned())
}

/// Line source backed by a real serial port
pub struct SerialLineSource {
    reader: Box<dyn Read + Send>,
    pending: Vec<u8>,
}

impl SerialLineSource {
    /// Open the given port with a bounded read timeout
    pub fn open(descriptor: &PortDescriptor, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        let port = serialport::new(&descriptor.name, baud_rate)
            .timeout(read_timeout)
            .open()?;

        tracing::info!(
            "opened serial port {} at {} baud",
            descriptor.name,
            baud_rate
        );

        Ok(Self::from_reader(Box::new(port)))
    }

    fn from_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self) -> Result<LineEvent> {
        loop {
            if let Some(line) = next_line(&mut self.pending) {
                return Ok(LineEvent::Line(line));
            }

            if self.pending.len() >= MAX_PENDING_BYTES {
                tracing::warn!(
                    "discarding {} unterminated bytes from the feed",
                    self.pending.len()
                );
                self.pending.clear();
                return Ok(LineEvent::TimedOut);
            }

            let mut buf = [0u8; 256];
            match self.reader.read(&mut buf) {
                // Zero-byte reads happen on some platforms when no data is
                // pending; treat like a timeout so cancellation stays live.
                Ok(0) => return Ok(LineEvent::TimedOut),
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                    return Ok(LineEvent::TimedOut);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    /// Scripted stand-in for the serial port's byte stream
    struct FakeReader {
        reads: VecDeque<io::Result<Vec<u8>>>,
    }

    impl FakeReader {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
            }
        }
    }

    impl Read for FakeReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "script exhausted")),
            }
        }
    }

    fn source(reads: Vec<io::Result<Vec<u8>>>) -> SerialLineSource {
        SerialLineSource::from_reader(Box::new(FakeReader::new(reads)))
    }

    #[test]
    fn test_next_line_splits_on_newline() {
        let mut pending = b"10\r\n12\n".to_vec();
        assert_eq!(next_line(&mut pending).unwrap().trim(), "10");
        assert_eq!(next_line(&mut pending).unwrap().trim(), "12");
        assert!(next_line(&mut pending).is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_next_line_keeps_partial_tail() {
        let mut pending = b"10\n1".to_vec();
        assert_eq!(next_line(&mut pending).unwrap().trim(), "10");
        assert!(next_line(&mut pending).is_none());
        assert_eq!(pending, b"1");
    }

    #[test]
    fn test_read_line_assembles_chunked_input() {
        let mut source = source(vec![Ok(b"1".to_vec()), Ok(b"2".to_vec()), Ok(b"0\n3".to_vec())]);
        assert_eq!(
            source.read_line().unwrap(),
            LineEvent::Line("120\n".to_string())
        );
        // The tail byte stays pending for the next call
        assert_eq!(source.pending, b"3");
    }

    #[test]
    fn test_zero_byte_read_maps_to_timeout() {
        let mut source = source(vec![Ok(Vec::new()), Ok(b"7\n".to_vec())]);
        assert_eq!(source.read_line().unwrap(), LineEvent::TimedOut);
        assert_eq!(
            source.read_line().unwrap(),
            LineEvent::Line("7\n".to_string())
        );
    }

    #[test]
    fn test_io_timeout_maps_to_timeout_event() {
        let mut source = source(vec![
            Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
            Ok(b"8\n".to_vec()),
        ]);
        assert_eq!(source.read_line().unwrap(), LineEvent::TimedOut);
        assert_eq!(
            source.read_line().unwrap(),
            LineEvent::Line("8\n".to_string())
        );
    }

    #[test]
    fn test_other_io_errors_propagate() {
        let mut source = source(vec![Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "device unplugged",
        ))]);
        assert!(source.read_line().is_err());
    }

    #[test]
    fn test_unterminated_stream_is_discarded_at_the_cap() {
        // Feed exactly enough unterminated garbage to trip the cap
        let chunks = MAX_PENDING_BYTES / 256;
        let mut reads: Vec<io::Result<Vec<u8>>> = (0..chunks).map(|_| Ok(vec![b'x'; 256])).collect();
        reads.push(Ok(b"9\n".to_vec()));
        let mut source = source(reads);

        assert_eq!(source.read_line().unwrap(), LineEvent::TimedOut);
        assert!(source.pending.is_empty());

        // The source recovers: the next well-formed line still parses
        assert_eq!(
            source.read_line().unwrap(),
            LineEvent::Line("9\n".to_string())
        );
    }
}
