//! Error handling for the altimon application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for altimon operations
#[derive(Error, Debug)]
pub enum AltimonError {
    /// Errors related to the serial device
    #[error("Serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AltimonError>,
    },
}

impl AltimonError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AltimonError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for altimon operations
pub type Result<T> = std::result::Result<T, AltimonError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
