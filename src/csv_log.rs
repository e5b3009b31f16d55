//! Append-only CSV log sink
//!
//! One record per line, append-safe: telemetry ticks append
//! `HH:MM:SS,<value>` and shutdown causes append a human-readable sentence.
//! Prior lines are never rewritten, so the file is a durable audit trail
//! independent of in-memory state.
//!
//! The handle is cheap to clone; the refresh cycle holds one for telemetry
//! lines and the shutdown coordinator holds one for the final cause line.

use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Timestamp format used in telemetry records
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

/// Cloneable handle to the append-only CSV log
#[derive(Clone)]
pub struct CsvLog {
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<std::fs::File>>>,
}

impl CsvLog {
    /// Open (or create) the log file in append mode
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().append(true).create(true).open(&path)?;
        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    /// Path this log writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one telemetry record, flushed immediately
    pub fn append_sample(&self, timestamp: DateTime<Local>, value: f64) -> Result<()> {
        let mut writer = self.writer.lock().expect("csv log lock poisoned");
        writeln!(writer, "{},{}", timestamp.format(TIMESTAMP_FORMAT), value)?;
        writer.flush()?;
        Ok(())
    }

    /// Append a human-readable note line (shutdown causes), flushed immediately
    pub fn append_note(&self, note: &str) -> Result<()> {
        let mut writer = self.writer.lock().expect("csv log lock poisoned");
        writeln!(writer, "{}", note)?;
        writer.flush()?;
        Ok(())
    }
}
