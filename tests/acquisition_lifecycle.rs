//! Integration tests for the acquisition lifecycle
//!
//! These tests validate the complete worker/store/coordinator workflow:
//! - sample parsing and line-noise tolerance
//! - terminal condition classification
//! - idempotent shutdown coordination across racing triggers

use altimon::backend::{AcquisitionWorker, LineEvent, LineSource};
use altimon::csv_log::CsvLog;
use altimon::shutdown::ShutdownCoordinator;
use altimon::store::TelemetryStore;
use altimon::types::{SessionStatus, TerminationCause};
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

/// A scripted line source for driving the worker without hardware
enum Step {
    Line(&'static str),
    TimedOut,
    Fail,
}

struct ScriptedSource {
    steps: VecDeque<Step>,
    /// What read_line returns once the script is exhausted
    then_silence: bool,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            then_silence: false,
        }
    }

    fn with_silence(mut self) -> Self {
        self.then_silence = true;
        self
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self) -> altimon::Result<LineEvent> {
        match self.steps.pop_front() {
            Some(Step::Line(l)) => Ok(LineEvent::Line(format!("{}\n", l))),
            Some(Step::TimedOut) => Ok(LineEvent::TimedOut),
            Some(Step::Fail) => Err(altimon::AltimonError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device unplugged",
            ))),
            None if self.then_silence => {
                // Pace the silent loop so cancellation tests do not spin
                thread::sleep(Duration::from_millis(5));
                Ok(LineEvent::TimedOut)
            }
            None => Err(altimon::AltimonError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "script exhausted",
            ))),
        }
    }
}

struct Fixture {
    store: TelemetryStore,
    coordinator: ShutdownCoordinator,
    terminate_rx: Receiver<TerminationCause>,
    log_path: std::path::PathBuf,
    _dir: TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("Altitude.csv");
    let log = CsvLog::open(&log_path).unwrap();
    let (coordinator, terminate_rx) =
        ShutdownCoordinator::with_flush_grace(log, Duration::from_millis(10));
    Fixture {
        store: TelemetryStore::empty(),
        coordinator,
        terminate_rx,
        log_path,
        _dir: dir,
    }
}

#[test]
fn test_valid_and_malformed_lines_while_running() {
    let f = fixture();
    let source = ScriptedSource::new(vec![
        Step::Line("10"),
        Step::Line("bad"),
        Step::Line("12"),
    ])
    .with_silence();

    let handle = AcquisitionWorker::spawn(
        Box::new(source),
        f.store.clone(),
        f.coordinator.clone(),
    )
    .unwrap();

    // Give the worker time to consume the script
    thread::sleep(Duration::from_millis(100));

    let snap = f.store.read();
    let values: Vec<f64> = snap.series.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![10.0, 12.0]);
    assert_eq!(snap.status, SessionStatus::Running);

    // Cancel to end the silent loop
    f.coordinator.cancel_flag().store(true, Ordering::SeqCst);
    handle.join().unwrap();
    assert_eq!(f.store.status(), SessionStatus::UserTerminated);
}

#[test]
fn test_disconnect_after_five_samples() {
    let f = fixture();
    let source = ScriptedSource::new(vec![
        Step::Line("1"),
        Step::Line("2"),
        Step::Line("3"),
        Step::TimedOut,
        Step::Line("4"),
        Step::Line("5"),
        Step::Fail,
    ]);

    let handle = AcquisitionWorker::spawn(
        Box::new(source),
        f.store.clone(),
        f.coordinator.clone(),
    )
    .unwrap();
    handle.join().unwrap();

    // Series retains the 5 samples acquired before the failure
    assert_eq!(f.store.series_len(), 5);
    assert_eq!(f.store.status(), SessionStatus::DeviceDisconnected);

    // Terminate signal fires exactly once
    assert_eq!(
        f.terminate_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        TerminationCause::DeviceDisconnected
    );
    assert!(f.terminate_rx.try_recv().is_err());

    // Log gains the disconnected line
    let content = std::fs::read_to_string(&f.log_path).unwrap();
    assert_eq!(content.trim(), "Arduino connection has been lost.");
}

#[test]
fn test_no_device_available_short_circuits() {
    let f = fixture();

    // Zero descriptors resolve to None without blocking
    assert_eq!(altimon::backend::choose(&[], None), altimon::backend::PortSelection::None);

    altimon::backend::report_no_device(&f.store, &f.coordinator);

    assert_eq!(f.store.status(), SessionStatus::NoDeviceAvailable);
    assert_eq!(
        f.terminate_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        TerminationCause::NoDeviceAvailable
    );

    let content = std::fs::read_to_string(&f.log_path).unwrap();
    assert_eq!(content.trim(), "No COM Port available.");
}

#[test]
fn test_racing_disconnect_and_operator_abort() {
    let f = fixture();

    // Worker hits an immediate channel failure...
    let source = ScriptedSource::new(vec![Step::Fail]);
    let worker = AcquisitionWorker::spawn(
        Box::new(source),
        f.store.clone(),
        f.coordinator.clone(),
    )
    .unwrap();

    // ...while the operator stops at the same time
    let coordinator = f.coordinator.clone();
    let store = f.store.clone();
    let aborter = thread::spawn(move || {
        store.set_status(SessionStatus::UserTerminated);
        coordinator.request(TerminationCause::UserTerminated)
    });

    worker.join().unwrap();
    aborter.join().unwrap();

    // Exactly one terminate signal and one cause line, whichever won
    let cause = f.terminate_rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert!(f.terminate_rx.try_recv().is_err());

    let content = std::fs::read_to_string(&f.log_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert_eq!(content.trim(), cause.log_line());

    // Status matches some terminal value and never reverts
    assert!(f.store.status().is_terminal());
    assert!(!f.store.set_status(SessionStatus::NoDeviceAvailable));
}

#[test]
fn test_cancellation_interrupts_silent_channel() {
    let f = fixture();
    let source = ScriptedSource::new(vec![]).with_silence();

    let handle = AcquisitionWorker::spawn(
        Box::new(source),
        f.store.clone(),
        f.coordinator.clone(),
    )
    .unwrap();

    // Operator stop: the coordinator raises the cancel flag, the worker
    // observes it at its next bounded-read timeout.
    f.store.set_status(SessionStatus::UserTerminated);
    assert!(f.coordinator.request(TerminationCause::UserTerminated));

    handle.join().unwrap();
    assert_eq!(f.store.status(), SessionStatus::UserTerminated);
    assert_eq!(
        f.terminate_rx.recv_timeout(Duration::from_secs(1)).unwrap(),
        TerminationCause::UserTerminated
    );
}
