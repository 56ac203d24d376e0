//! Document provider error module.
//!
//! Errors a [`DocumentProvider`](crate::provider::DocumentProvider) may return.
//! File managers never propagate these for lookups; they log them and report
//! the affected file as absent.

use thiserror::Error;

/// Errors that can occur while talking to a document provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider could not answer a query.
    #[error("Query on {uri} failed: {reason}")]
    QueryFailed {
        /// The URI that was queried
        uri: String,
        /// Provider supplied reason
        reason: String,
    },

    /// The URI does not belong to this provider or cannot be parsed.
    #[error("Malformed document URI: {0}")]
    MalformedUri(String),

    /// The backing storage refused access to the document.
    #[error("Permission denied for {0}")]
    PermissionDenied(String),

    /// The backing storage failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
