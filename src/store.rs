//! Shared telemetry state
//!
//! The [`TelemetryStore`] is the single synchronized container shared between
//! the acquisition worker (writer of the current value and series), the
//! refresh cycle and renderer (readers), and the termination triggers
//! (writers of the status). An explicit handle is passed to every
//! component instead of module-level globals.
//!
//! # Consistency
//!
//! One mutex covers the `(current_value, series, status)` triple, so a
//! reader never observes a torn sample or a series whose length decreases.
//! [`TelemetryStore::read`] returns an owned [`StoreSnapshot`], not a live
//! reference; appends after the snapshot cannot retroactively mutate what
//! the reader already observed.
//!
//! # Status monotonicity
//!
//! [`TelemetryStore::set_status`] enforces the once-only transition out of
//! `Running`: the first terminal value wins and every later call is a no-op.

use crate::types::{Sample, SessionStatus};
use std::sync::{Arc, Mutex};

struct StoreInner {
    current_value: f64,
    series: Vec<Sample>,
    status: SessionStatus,
}

/// A consistent point-in-time copy of the store contents
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    /// Latest acquired value
    pub current_value: f64,
    /// Full sample history, arrival order
    pub series: Vec<Sample>,
    /// Session status at snapshot time
    pub status: SessionStatus,
}

/// Cheap-to-clone handle to the shared telemetry state
#[derive(Clone)]
pub struct TelemetryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl TelemetryStore {
    /// Create a store with `Running` status and a single zero seed sample
    ///
    /// The seed keeps the display at 0 until the first real reading
    /// arrives. It counts toward the series length: after acquisition the
    /// series holds one sample per valid line plus this seed. Tests that
    /// count samples use [`TelemetryStore::empty`] instead.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                current_value: 0.0,
                series: vec![Sample::now(0.0)],
                status: SessionStatus::Running,
            })),
        }
    }

    /// Create an empty store with no seed sample (for tests)
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                current_value: 0.0,
                series: Vec::new(),
                status: SessionStatus::Running,
            })),
        }
    }

    /// Append a sample and update the current value as one atomic update
    pub fn write(&self, sample: Sample) {
        let mut inner = self.inner.lock().expect("telemetry store lock poisoned");
        inner.current_value = sample.value;
        inner.series.push(sample);
    }

    /// Take a consistent snapshot of `(current_value, series, status)`
    pub fn read(&self) -> StoreSnapshot {
        let inner = self.inner.lock().expect("telemetry store lock poisoned");
        StoreSnapshot {
            current_value: inner.current_value,
            series: inner.series.clone(),
            status: inner.status,
        }
    }

    /// Latest value without cloning the series
    pub fn current_value(&self) -> f64 {
        self.inner
            .lock()
            .expect("telemetry store lock poisoned")
            .current_value
    }

    /// Current status without cloning the series
    pub fn status(&self) -> SessionStatus {
        self.inner
            .lock()
            .expect("telemetry store lock poisoned")
            .status
    }

    /// Number of samples acquired so far
    pub fn series_len(&self) -> usize {
        self.inner
            .lock()
            .expect("telemetry store lock poisoned")
            .series
            .len()
    }

    /// Transition to a terminal status, once only
    ///
    /// Returns `true` if this call performed the transition. Once any
    /// terminal status is set, later calls (including with a different
    /// terminal value) are no-ops and return `false`. Setting `Running`
    /// is always a no-op.
    pub fn set_status(&self, status: SessionStatus) -> bool {
        if !status.is_terminal() {
            return false;
        }
        let mut inner = self.inner.lock().expect("telemetry store lock poisoned");
        if inner.status.is_terminal() {
            return false;
        }
        inner.status = status;
        true
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}
