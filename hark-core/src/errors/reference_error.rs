//! Reference data resolution errors.

use super::error_code::{self, HarkErrorCode};

/// Errors that can occur while resolving per-call reference data.
/// The resolver degrades to the fallback record on every variant; these
/// surface in logs and run history, never as pipeline failures.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Lookup failed for {jurisdiction_id}: {message}")]
    LookupFailed {
        jurisdiction_id: String,
        message: String,
    },

    #[error("Malformed reference record for {jurisdiction_id}: {message}")]
    MalformedRecord {
        jurisdiction_id: String,
        message: String,
    },
}

impl HarkErrorCode for ReferenceError {
    fn error_code(&self) -> &'static str {
        error_code::REFERENCE_ERROR
    }
}
