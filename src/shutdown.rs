//! Shutdown coordination
//!
//! The [`ShutdownCoordinator`] guarantees the process terminates exactly
//! once, whichever terminal condition fires first: device loss reported by
//! the acquisition worker, an operator stop request from the UI, or port
//! discovery finding no device at all.
//!
//! # State machine
//!
//! `Active -> Terminating -> Terminated`, driven by a single
//! compare-and-set on the `Active -> Terminating` edge. Multiple threads
//! may race to request termination; the first wins and every later attempt
//! is a no-op. The winner appends the cause sentence to the persistent
//! log, pauses briefly so the log write and any in-flight UI update can
//! flush, then delivers the terminate signal exactly once.
//!
//! The coordinator also raises the worker cancellation flag, so the
//! acquisition read loop unblocks at its next bounded-read timeout instead
//! of waiting for hardware failure.

use crate::csv_log::CsvLog;
use crate::types::TerminationCause;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pause between the cause log write and the terminate signal
pub const FLUSH_GRACE: Duration = Duration::from_millis(300);

const STATE_ACTIVE: u8 = 0;
const STATE_TERMINATING: u8 = 1;
const STATE_TERMINATED: u8 = 2;

/// Coordinator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No terminal condition observed yet
    Active,
    /// A trigger won the race; cause line and signal are in flight
    Terminating,
    /// Terminate signal delivered; absorbing state
    Terminated,
}

/// Serializes and deduplicates termination requests
///
/// Cheap to clone; every component that can detect a terminal condition
/// holds a handle.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    state: Arc<AtomicU8>,
    cancel: Arc<AtomicBool>,
    log: CsvLog,
    terminate_tx: Sender<TerminationCause>,
    flush_grace: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator and the receiving end of the terminate signal
    ///
    /// The returned receiver yields exactly one [`TerminationCause`] per
    /// process lifetime.
    pub fn new(log: CsvLog) -> (Self, Receiver<TerminationCause>) {
        Self::with_flush_grace(log, FLUSH_GRACE)
    }

    /// Create a coordinator with an explicit flush grace (tests use zero)
    pub fn with_flush_grace(
        log: CsvLog,
        flush_grace: Duration,
    ) -> (Self, Receiver<TerminationCause>) {
        let (terminate_tx, terminate_rx) = bounded(1);
        (
            Self {
                state: Arc::new(AtomicU8::new(STATE_ACTIVE)),
                cancel: Arc::new(AtomicBool::new(false)),
                log,
                terminate_tx,
                flush_grace,
            },
            terminate_rx,
        )
    }

    /// The cancellation flag the acquisition worker polls between reads
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    /// Request process termination for the given cause
    ///
    /// Idempotent: returns `true` only for the single request that wins the
    /// `Active -> Terminating` transition. Losers return `false` without
    /// side effects.
    pub fn request(&self, cause: TerminationCause) -> bool {
        if self
            .state
            .compare_exchange(
                STATE_ACTIVE,
                STATE_TERMINATING,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            tracing::debug!("termination already requested, ignoring: {}", cause);
            return false;
        }

        tracing::info!("terminating: {}", cause);
        self.cancel.store(true, Ordering::SeqCst);

        if let Err(e) = self.log.append_note(cause.log_line()) {
            tracing::error!("failed to write shutdown cause to log: {}", e);
        }

        // Let the log write and any in-flight UI update flush before the
        // terminate signal lands.
        std::thread::sleep(self.flush_grace);

        if self.terminate_tx.try_send(cause).is_err() {
            tracing::warn!("terminate signal receiver already gone");
        }

        self.state.store(STATE_TERMINATED, Ordering::SeqCst);
        true
    }

    /// Request termination from the UI thread without blocking it
    ///
    /// Spawns a short-lived thread so the grace pause never stalls a
    /// frame.
    pub fn request_async(&self, cause: TerminationCause) {
        let coordinator = self.clone();
        std::thread::Builder::new()
            .name("altimon-shutdown".to_string())
            .spawn(move || {
                coordinator.request(cause);
            })
            .expect("failed to spawn shutdown thread");
    }

    /// Current lifecycle state
    pub fn state(&self) -> CoordinatorState {
        match self.state.load(Ordering::SeqCst) {
            STATE_ACTIVE => CoordinatorState::Active,
            STATE_TERMINATING => CoordinatorState::Terminating,
            _ => CoordinatorState::Terminated,
        }
    }

    /// Whether the terminate signal has been delivered
    pub fn is_terminated(&self) -> bool {
        self.state() == CoordinatorState::Terminated
    }

    /// Whether no terminal condition has been observed yet
    pub fn is_active(&self) -> bool {
        self.state() == CoordinatorState::Active
    }
}
