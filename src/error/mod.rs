//! Error module for FSAF.
//!
//! Misuse of the API (bad segment names, appending to a file, directory
//! operations on a file root) is reported through [`FsafError`]. Expected
//! absence (a file that does not exist, a lookup miss) is never an error and is
//! expressed with `Option`/`bool` results instead. Provider failures are caught
//! at the file manager boundary, logged and handed to the global
//! [`ErrorReporter`].

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;

pub mod config;
pub mod provider;

/// Result type alias used throughout FSAF.
pub type FsafResult<T> = Result<T, FsafError>;

/// Core error enum for FSAF.
#[derive(Error, Debug)]
pub enum FsafError {
    /// Errors occurring during configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Errors reported by a document provider.
    #[error("Provider error: {0}")]
    Provider(#[from] provider::ProviderError),

    /// IO errors that may occur during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/Deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A segment name that cannot be part of a path.
    #[error("Invalid segment '{name}': {reason}")]
    InvalidSegment {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Attempt to append segments after a file name.
    #[error("Cannot append segments to '{0}': it already ends with a file name")]
    FileNameAppended(String),

    /// A directory-only operation was called with a file-rooted handle.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Custom error with message for cases where specific error types are not defined.
    #[error("{0}")]
    Custom(String),
}

/// Error reporting structure to provide context and debugging information.
#[derive(Debug)]
pub struct ErrorContext {
    /// The original error that occurred.
    pub error: FsafError,

    /// The component where the error occurred.
    pub component: String,

    /// Additional context information to help with debugging.
    pub details: Option<String>,
}

impl ErrorContext {
    /// Creates a new error context with the given error and component.
    ///
    /// # Arguments
    ///
    /// * `error` - The error that occurred
    /// * `component` - The component where the error occurred
    pub fn new<S: Into<String>>(error: FsafError, component: S) -> Self {
        Self {
            error,
            component: component.into(),
            details: None,
        }
    }

    /// Adds detail information to the error context.
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error in {}: {}", self.component, self.error)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        Ok(())
    }
}

/// Error reporter trait for reporting errors to various sinks.
pub trait ErrorReporter: Send + Sync + std::fmt::Debug {
    /// Report an error with context.
    fn report(&self, context: ErrorContext);
}

/// A simple error reporter implementation that logs errors using the tracing framework.
#[derive(Default, Debug)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: ErrorContext) {
        tracing::error!(
            error = %context.error,
            component = %context.component,
            details = context.details.as_deref().unwrap_or("None"),
            "Error reported"
        );
    }
}

/// Process-wide error reporter. Falls back to [`TracingErrorReporter`].
static ERROR_REPORTER: Lazy<RwLock<Option<Arc<dyn ErrorReporter>>>> =
    Lazy::new(|| RwLock::new(None));

/// Replace the global error reporter.
///
/// # Arguments
///
/// * `reporter` - The error reporter to use
pub fn set_error_reporter(reporter: Arc<dyn ErrorReporter>) {
    *ERROR_REPORTER.write() = Some(reporter);
}

/// Report an error through the global reporter.
pub fn report_error(context: ErrorContext) {
    let reporter = ERROR_REPORTER.read().clone();
    match reporter {
        Some(reporter) => reporter.report(context),
        None => TracingErrorReporter.report(context),
    }
}
