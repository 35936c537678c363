//! Storage-backed implementations of the core capability traits.
//!
//! These adapters are what turn the standalone analysis crate into the full
//! engine: reference lookups read hark.db through the pool, and extracted
//! entity bags flow to the background artifact writer instead of a no-op
//! sink. Both sides keep the trait contracts' degrade semantics: a lookup
//! error is reported (the resolver falls through), a full artifact queue is
//! reported (the extractor logs and moves on).

use std::sync::Arc;

use hark_core::errors::{ExtractionError, ReferenceError};
use hark_core::traits::{ArtifactSink, ReferenceSource};
use hark_core::types::ReferenceRecord;
use hark_storage::queries::reference;
use hark_storage::{now_ms, ArtifactInsert, ArtifactWriter, DatabaseManager};
use uuid::Uuid;

/// Reference lookups over the `reference_records` table.
///
/// Reads go through the pool, so the database must be file-backed; the
/// runtime always opens one.
pub struct StorageReferenceSource {
    db: Arc<DatabaseManager>,
}

impl StorageReferenceSource {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn lookup(
        &self,
        namespace: &'static str,
        jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError> {
        self.db
            .with_reader(|conn| reference::get_reference(conn, namespace, jurisdiction_id))
            .map_err(|e| ReferenceError::LookupFailed {
                jurisdiction_id: jurisdiction_id.to_string(),
                message: format!("{namespace} namespace: {e}"),
            })
    }
}

impl ReferenceSource for StorageReferenceSource {
    fn lookup_voicemail(
        &self,
        jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError> {
        self.lookup("voicemail", jurisdiction_id)
    }

    fn lookup_master(
        &self,
        jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError> {
        self.lookup("master", jurisdiction_id)
    }
}

/// Entity-bag audit trail into `entity_artifacts` via the background writer.
///
/// `persist_entities` only enqueues; the write happens off the caller's
/// thread. The returned key is therefore a promise, not a receipt, which is
/// all the audit channel needs.
pub struct StorageArtifactSink {
    writer: Arc<ArtifactWriter>,
}

impl StorageArtifactSink {
    pub fn new(writer: Arc<ArtifactWriter>) -> Self {
        Self { writer }
    }
}

impl ArtifactSink for StorageArtifactSink {
    fn persist_entities(
        &self,
        call_id: Option<&str>,
        payload_json: &str,
    ) -> Result<String, ExtractionError> {
        let artifact_key = format!(
            "{}/{}",
            call_id.unwrap_or("unassigned"),
            Uuid::new_v4().simple()
        );
        let accepted = self.writer.enqueue(ArtifactInsert {
            artifact_key: artifact_key.clone(),
            call_id: call_id.map(str::to_string),
            payload_json: payload_json.to_string(),
            created_at: now_ms(),
        });
        if accepted {
            Ok(artifact_key)
        } else {
            Err(ExtractionError::ArtifactSinkFailure(
                "artifact queue rejected entity payload".to_string(),
            ))
        }
    }
}
