//! Entity extraction errors.

use super::error_code::{self, HarkErrorCode};

/// Errors that can occur while extracting entities from a transcript.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Recognizer failure: {0}")]
    RecognizerFailure(String),

    #[error("Chunk {index} failed: {message}")]
    ChunkFailed { index: usize, message: String },

    #[error("Artifact sink failure: {0}")]
    ArtifactSinkFailure(String),
}

impl HarkErrorCode for ExtractionError {
    fn error_code(&self) -> &'static str {
        error_code::EXTRACTION_ERROR
    }
}
