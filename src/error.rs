//! Error types for the SEO audit engine.
//!
//! This module provides structured error handling with:
//! - `AppError`: Domain-specific errors for audit operations
//! - `Result<T>`: Type alias for Results using AppError
//!
//! Analyzers never fail because a page lacks expected structure; a missing tag
//! is an `AuditIssue`, not an error. Errors are reserved for malformed
//! invocation (unparseable URL) and for the fetch boundary.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Domain-specific errors for audit operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid, malformed or non-http(s) URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The fetch did not complete within the configured timeout
    #[error("Fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    /// The server answered with a non-success status
    #[error("Server returned HTTP {0}")]
    HttpStatus(u16),

    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// External service error (semantic backend, store, ...)
    #[error("Service error ({service}): {message}")]
    ServiceError { service: &'static str, message: String },

    /// Stored report not found
    #[error("Report not found: {0}")]
    ReportNotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create an invalid URL error
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Create a service error
    pub fn service(service: &'static str, msg: impl Into<String>) -> Self {
        Self::ServiceError { service, message: msg.into() }
    }

    /// True when the page could not be retrieved at all.
    ///
    /// Callers use this to tell "fetch failed" apart from "analysis ran and
    /// found issues".
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchTimeout(_) | Self::HttpStatus(_) | Self::NetworkError(_)
        )
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
