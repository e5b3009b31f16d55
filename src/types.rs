//! Core data types for altimon
//!
//! This module contains the fundamental data structures used throughout
//! the application for representing telemetry samples, session status,
//! and serial port descriptors.
//!
//! # Main Types
//!
//! - [`Sample`] - One timestamped altitude reading
//! - [`SessionStatus`] - Running or one of three terminal conditions
//! - [`TerminationCause`] - The reason a session ended, with its log sentence
//! - [`PortDescriptor`] - A discovered serial port with a human label
//! - [`ModalKind`] - Which shutdown dialog the renderer should show
//!
//! # Status model
//!
//! `SessionStatus::Running` is the sole initial value. Exactly one of the
//! three terminal values is reachable per process lifetime; the transition
//! is enforced by [`crate::store::TelemetryStore::set_status`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Default baud rate for the altitude feed
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

/// Default refresh cycle period in milliseconds
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Default CSV log file name
pub const DEFAULT_LOG_FILE: &str = "Altitude.csv";

/// A single timestamped telemetry reading
///
/// Immutable once created. Produced only by the acquisition worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock instant the reading arrived
    pub timestamp: DateTime<Local>,
    /// The altitude value
    pub value: f64,
}

impl Sample {
    /// Create a sample stamped with the current wall-clock time
    pub fn now(value: f64) -> Self {
        Self {
            timestamp: Local::now(),
            value,
        }
    }

    /// Create a sample at an explicit instant
    pub fn at(timestamp: DateTime<Local>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// The terminal/non-terminal classification of the acquisition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// Acquisition is live (sole initial value)
    #[default]
    Running,
    /// The serial channel became unusable
    DeviceDisconnected,
    /// The operator requested a stop
    UserTerminated,
    /// Enumeration found no serial device to acquire from
    NoDeviceAvailable,
}

impl SessionStatus {
    /// Whether this status ends the session
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }

    /// The termination cause for a terminal status, `None` while running
    pub fn cause(&self) -> Option<TerminationCause> {
        match self {
            SessionStatus::Running => None,
            SessionStatus::DeviceDisconnected => Some(TerminationCause::DeviceDisconnected),
            SessionStatus::UserTerminated => Some(TerminationCause::UserTerminated),
            SessionStatus::NoDeviceAvailable => Some(TerminationCause::NoDeviceAvailable),
        }
    }

    /// Which modal the renderer should show for this status
    pub fn modal(&self) -> Option<ModalKind> {
        match self {
            SessionStatus::Running => None,
            SessionStatus::DeviceDisconnected => Some(ModalKind::ConnectionLost),
            SessionStatus::UserTerminated => Some(ModalKind::UserTerminated),
            SessionStatus::NoDeviceAvailable => Some(ModalKind::NoDevice),
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Running => write!(f, "running"),
            SessionStatus::DeviceDisconnected => write!(f, "device disconnected"),
            SessionStatus::UserTerminated => write!(f, "user terminated"),
            SessionStatus::NoDeviceAvailable => write!(f, "no device available"),
        }
    }
}

/// Why the session ended
///
/// Each cause carries the human-readable sentence appended to the
/// persistent log by the shutdown coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationCause {
    /// The serial channel errored out mid-acquisition
    DeviceDisconnected,
    /// The operator pressed stop (or interrupted the worker)
    UserTerminated,
    /// Port discovery yielded nothing to acquire from
    NoDeviceAvailable,
}

impl TerminationCause {
    /// The sentence written to the persistent log for this cause
    pub fn log_line(&self) -> &'static str {
        match self {
            TerminationCause::DeviceDisconnected => "Arduino connection has been lost.",
            TerminationCause::UserTerminated => "User has terminated the process.",
            TerminationCause::NoDeviceAvailable => "No COM Port available.",
        }
    }

    /// The terminal status corresponding to this cause
    pub fn status(&self) -> SessionStatus {
        match self {
            TerminationCause::DeviceDisconnected => SessionStatus::DeviceDisconnected,
            TerminationCause::UserTerminated => SessionStatus::UserTerminated,
            TerminationCause::NoDeviceAvailable => SessionStatus::NoDeviceAvailable,
        }
    }
}

impl std::fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.log_line())
    }
}

/// Which shutdown dialog the renderer shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// The serial connection is lost
    ConnectionLost,
    /// The process has been terminated by the user
    UserTerminated,
    /// No serial device was found
    NoDevice,
}

impl ModalKind {
    /// Dialog title
    pub fn title(&self) -> &'static str {
        "Server Shutdown."
    }

    /// Dialog body text
    pub fn body(&self) -> &'static str {
        match self {
            ModalKind::ConnectionLost => "The Arduino connection is lost.",
            ModalKind::UserTerminated => "The process has been terminated by the user.",
            ModalKind::NoDevice => "No COM Port available.",
        }
    }
}

/// A discovered serial port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescriptor {
    /// OS-level port name (e.g. "COM9", "/dev/ttyUSB0")
    pub name: String,
    /// Human-friendly label including USB manufacturer/product when known
    pub label: String,
}

impl PortDescriptor {
    /// Create a descriptor whose label is just the port name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
        }
    }

    /// Create a descriptor with an explicit label
    pub fn with_label(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

impl std::fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
