//! ArtifactSink trait: audit side channel for extraction output.

use crate::errors::ExtractionError;

/// Persists serialized entity bags for audit. Implementations must not
/// block the extraction path; sink failures are logged and swallowed by
/// the adapter.
pub trait ArtifactSink: Send + Sync {
    /// Persist one serialized bag, returning the artifact key it was
    /// stored under.
    fn persist_entities(
        &self,
        call_id: Option<&str>,
        payload_json: &str,
    ) -> Result<String, ExtractionError>;
}

/// Sink that discards everything. Standalone default.
pub struct NullArtifactSink;

impl ArtifactSink for NullArtifactSink {
    fn persist_entities(
        &self,
        _call_id: Option<&str>,
        _payload_json: &str,
    ) -> Result<String, ExtractionError> {
        Ok(String::new())
    }
}
