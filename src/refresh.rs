//! Refresh cycle
//!
//! The periodic consumer of the telemetry store. One tick per refresh
//! period (driven by the UI frame loop):
//!
//! 1. snapshot the store;
//! 2. if the status is terminal and not yet acted upon, forward the cause
//!    to the shutdown coordinator once and skip the rest of the tick;
//! 3. otherwise persist `(now, current_value)` to the CSV log and append
//!    the same pair to the display buffer - persistence happens-before the
//!    value is handed to the renderer, so a crash between the two never
//!    produces a displayed-but-unlogged point;
//! 4. emit what the renderer needs: the display series, the headline value,
//!    and which shutdown modal (if any) to show.
//!
//! This cycle is the only component that writes telemetry records to the
//! persistent log during normal operation; the shutdown coordinator writes
//! the final cause line.

use crate::csv_log::CsvLog;
use crate::shutdown::ShutdownCoordinator;
use crate::store::TelemetryStore;
use crate::types::{ModalKind, Sample, SessionStatus};
use chrono::{DateTime, Local};

/// What one tick hands to the renderer
#[derive(Debug, Clone)]
pub struct RefreshOutput {
    /// Headline value
    pub current_value: f64,
    /// Status at tick time
    pub status: SessionStatus,
    /// Which shutdown dialog to show, if any
    pub modal: Option<ModalKind>,
}

/// Periodic consumer: store -> display buffer + persistent log
pub struct RefreshCycle {
    store: TelemetryStore,
    log: CsvLog,
    coordinator: ShutdownCoordinator,
    display: Vec<Sample>,
    acted_on_terminal: bool,
}

impl RefreshCycle {
    /// Create a cycle over the given store, log sink, and coordinator
    pub fn new(store: TelemetryStore, log: CsvLog, coordinator: ShutdownCoordinator) -> Self {
        Self {
            store,
            log,
            coordinator,
            display: Vec::new(),
            acted_on_terminal: false,
        }
    }

    /// The display buffer accumulated so far (one point per tick)
    pub fn display(&self) -> &[Sample] {
        &self.display
    }

    /// Run one refresh tick
    pub fn tick(&mut self, now: DateTime<Local>) -> RefreshOutput {
        let snapshot = self.store.read();

        if snapshot.status.is_terminal() {
            if !self.acted_on_terminal {
                self.acted_on_terminal = true;
                if let Some(cause) = snapshot.status.cause() {
                    // Idempotent: a no-op if the detecting component already
                    // signalled the coordinator itself.
                    self.coordinator.request_async(cause);
                }
            }
            return RefreshOutput {
                current_value: snapshot.current_value,
                status: snapshot.status,
                modal: snapshot.status.modal(),
            };
        }

        match self.log.append_sample(now, snapshot.current_value) {
            Ok(()) => {
                self.display.push(Sample::at(now, snapshot.current_value));
            }
            Err(e) => {
                // Best-effort sink: skip the display append too, so every
                // displayed point has a corresponding log line.
                tracing::error!("failed to append telemetry record: {}", e);
            }
        }

        RefreshOutput {
            current_value: snapshot.current_value,
            status: SessionStatus::Running,
            modal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TerminationCause;
    use crossbeam_channel::Receiver;
    use std::time::Duration;
    use tempfile::tempdir;

    fn fixture() -> (
        RefreshCycle,
        TelemetryStore,
        Receiver<TerminationCause>,
        std::path::PathBuf,
        tempfile::TempDir,
    ) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Altitude.csv");
        let log = CsvLog::open(&path).unwrap();
        let (coordinator, rx) =
            ShutdownCoordinator::with_flush_grace(log.clone(), Duration::from_millis(0));
        let store = TelemetryStore::new();
        (
            RefreshCycle::new(store.clone(), log, coordinator),
            store,
            rx,
            path,
            dir,
        )
    }

    #[test]
    fn test_tick_appends_display_and_log() {
        let (mut cycle, store, _rx, path, _dir) = fixture();
        store.write(Sample::now(42.0));

        let out = cycle.tick(Local::now());
        assert_eq!(out.current_value, 42.0);
        assert!(out.modal.is_none());
        assert_eq!(cycle.display().len(), 1);
        assert_eq!(cycle.display()[0].value, 42.0);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.trim().ends_with(",42"));
    }

    #[test]
    fn test_every_display_point_has_a_log_line() {
        let (mut cycle, store, _rx, path, _dir) = fixture();

        for i in 0..5 {
            store.write(Sample::now(i as f64));
            cycle.tick(Local::now());
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let log_lines: Vec<&str> = content.lines().collect();
        assert_eq!(log_lines.len(), cycle.display().len());

        for (point, line) in cycle.display().iter().zip(log_lines) {
            let logged_value: f64 = line.split(',').nth(1).unwrap().parse().unwrap();
            assert_eq!(logged_value, point.value);
        }
    }

    #[test]
    fn test_terminal_status_forwards_cause_once_and_skips_logging() {
        let (mut cycle, store, rx, path, _dir) = fixture();
        store.set_status(SessionStatus::DeviceDisconnected);

        let out = cycle.tick(Local::now());
        assert_eq!(out.modal, Some(ModalKind::ConnectionLost));
        assert!(cycle.display().is_empty());

        // Second tick must not forward again
        cycle.tick(Local::now());

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            TerminationCause::DeviceDisconnected
        );
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

        // The only log content is the cause line written by the coordinator
        let content = wait_for_nonempty(&path);
        assert_eq!(content.trim(), "Arduino connection has been lost.");
    }

    #[test]
    fn test_modal_mapping_for_user_termination() {
        let (mut cycle, store, _rx, _path, _dir) = fixture();
        store.set_status(SessionStatus::UserTerminated);

        let out = cycle.tick(Local::now());
        assert_eq!(out.modal, Some(ModalKind::UserTerminated));
        assert_eq!(out.status, SessionStatus::UserTerminated);
    }

    fn wait_for_nonempty(path: &std::path::Path) -> String {
        // request_async writes from a short-lived thread
        for _ in 0..50 {
            let content = std::fs::read_to_string(path).unwrap_or_default();
            if !content.is_empty() {
                return content;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("log never received the cause line");
    }
}
