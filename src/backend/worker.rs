//! Acquisition worker
//!
//! The worker runs on a dedicated thread, exclusively owns its line source,
//! and is the only writer of the telemetry series. It parses each incoming
//! line into a numeric value, appends valid samples to the shared store,
//! and classifies failures:
//!
//! - malformed lines (empty or non-numeric) are transient line noise and
//!   are silently discarded, changing neither the series nor the status
//! - a channel-level I/O failure is terminal: status becomes
//!   `DeviceDisconnected` and the shutdown coordinator is signalled
//! - cancellation observed between bounded reads is terminal: status
//!   becomes `UserTerminated` and the coordinator is signalled
//!
//! There is no retry or reconnect: either terminal condition ends the
//! worker permanently. At most one worker instance may be alive at a time;
//! starting a second while one is active is a caller error.

use crate::backend::source::{LineEvent, LineSource};
use crate::shutdown::ShutdownCoordinator;
use crate::store::TelemetryStore;
use crate::types::{Sample, SessionStatus, TerminationCause};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// The background reader that owns the serial channel
pub struct AcquisitionWorker {
    source: Box<dyn LineSource>,
    store: TelemetryStore,
    coordinator: ShutdownCoordinator,
    cancel: Arc<AtomicBool>,
}

impl AcquisitionWorker {
    /// Create a worker; the cancellation flag comes from the coordinator
    pub fn new(
        source: Box<dyn LineSource>,
        store: TelemetryStore,
        coordinator: ShutdownCoordinator,
    ) -> Self {
        let cancel = coordinator.cancel_flag();
        Self {
            source,
            store,
            coordinator,
            cancel,
        }
    }

    /// Spawn the worker on its dedicated thread
    pub fn spawn(
        source: Box<dyn LineSource>,
        store: TelemetryStore,
        coordinator: ShutdownCoordinator,
    ) -> std::io::Result<JoinHandle<()>> {
        let worker = Self::new(source, store, coordinator);
        std::thread::Builder::new()
            .name("altimon-acquisition".to_string())
            .spawn(move || worker.run())
    }

    /// Run the acquisition loop until a terminal condition
    pub fn run(mut self) {
        tracing::info!("acquisition worker started");

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                self.terminate(TerminationCause::UserTerminated);
                break;
            }

            match self.source.read_line() {
                Ok(LineEvent::Line(line)) => self.handle_line(&line),
                Ok(LineEvent::TimedOut) => {
                    // Cancellation is re-checked at the top of the loop.
                }
                Err(e) => {
                    tracing::error!("serial channel failed: {}", e);
                    self.terminate(TerminationCause::DeviceDisconnected);
                    break;
                }
            }
        }

        tracing::info!("acquisition worker stopped");
    }

    fn handle_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.store.write(Sample::now(value));
            }
            _ => {
                // Transient line noise: no state change, no log entry.
                tracing::trace!("discarding malformed line: {:?}", trimmed);
            }
        }
    }

    fn terminate(&self, cause: TerminationCause) {
        self.store.set_status(cause.status());
        self.coordinator.request(cause);
    }
}

/// Set the no-device terminal condition without ever starting a worker
///
/// Used when port discovery resolves to nothing: acquisition is
/// short-circuited entirely, the status flips to `NoDeviceAvailable`, and
/// the coordinator handles the cause line and terminate signal.
pub fn report_no_device(store: &TelemetryStore, coordinator: &ShutdownCoordinator) {
    store.set_status(SessionStatus::NoDeviceAvailable);
    coordinator.request_async(TerminationCause::NoDeviceAvailable);
}
