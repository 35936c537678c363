//! Stable machine-readable error codes.
//!
//! Codes survive refactors of the enum variants themselves; downstream
//! consumers (events, persisted run history) key off these strings.

/// Trait implemented by every subsystem error enum.
pub trait HarkErrorCode {
    /// Returns the stable code for this error.
    fn error_code(&self) -> &'static str;
}

pub const EXTRACTION_ERROR: &str = "EXTRACTION_ERROR";
pub const REFERENCE_ERROR: &str = "REFERENCE_ERROR";
pub const EVALUATION_ERROR: &str = "EVALUATION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const RUNTIME_ERROR: &str = "RUNTIME_ERROR";
pub const CANCELLED: &str = "CANCELLED";
