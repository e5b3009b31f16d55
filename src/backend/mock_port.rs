//! Mock line source for testing without real hardware
//!
//! Only available with the `mock-port` feature. The mock replays a
//! configurable feed and then ends the channel the way a real device
//! would: by disconnecting, by reporting operator interruption (endless
//! timeouts until the cancel flag is polled), or by staying silent.

use crate::backend::source::{LineEvent, LineSource};
use crate::error::{AltimonError, Result};
use std::collections::VecDeque;

/// How the mock feed ends once its lines are exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockEnding {
    /// Fail like an unplugged device
    Disconnect,
    /// Keep timing out (lets cancellation tests drive termination)
    Silence,
}

/// Scripted replacement for a serial port
pub struct MockLineSource {
    feed: VecDeque<String>,
    ending: MockEnding,
}

impl MockLineSource {
    /// Create a mock that replays the given lines and then disconnects
    pub fn new(lines: &[&str]) -> Self {
        Self {
            feed: lines.iter().map(|l| format!("{}\n", l)).collect(),
            ending: MockEnding::Disconnect,
        }
    }

    /// Override how the feed ends
    pub fn with_ending(mut self, ending: MockEnding) -> Self {
        self.ending = ending;
        self
    }

    /// Create a mock producing a ramp of integer altitudes
    pub fn ramp(start: i64, count: usize) -> Self {
        Self {
            feed: (0..count)
                .map(|i| format!("{}\n", start + i as i64))
                .collect(),
            ending: MockEnding::Disconnect,
        }
    }
}

impl LineSource for MockLineSource {
    fn read_line(&mut self) -> Result<LineEvent> {
        if let Some(line) = self.feed.pop_front() {
            return Ok(LineEvent::Line(line));
        }

        match self.ending {
            MockEnding::Disconnect => Err(AltimonError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock device disconnected",
            ))),
            MockEnding::Silence => Ok(LineEvent::TimedOut),
        }
    }
}
