//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, HarkErrorCode};
use super::{ConfigError, EvaluationError, ExtractionError, ReferenceError, StorageError};

/// Errors that can occur during pipeline execution.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Runtime lifecycle misuse, e.g. initializing twice or touching the
    /// singleton before initialization.
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl HarkErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.error_code(),
            Self::Reference(e) => e.error_code(),
            Self::Evaluation(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Runtime { .. } => error_code::RUNTIME_ERROR,
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a pipeline run that accumulates non-fatal errors.
/// A degraded run still returns usable data; callers inspect `errors`
/// to decide whether the degradation matters to them.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The result data, possibly produced under degraded conditions.
    pub data: T,
    /// Non-fatal errors collected along the way.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    /// Wrap result data with no errors.
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Record a non-fatal error.
    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    /// Returns true when no non-fatal errors were recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
