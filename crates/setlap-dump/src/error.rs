//! Dump error types.

use setlap_core::SetlapError;
use thiserror::Error;

/// Errors raised while writing or reading dumps.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error(transparent)]
    Setlap(#[from] SetlapError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported dump version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },
}

/// Result type alias for dump operations.
pub type DumpResult<T> = std::result::Result<T, DumpError>;
