//! Runtime wiring for the Hark compliance engine.
//!
//! hark-core carries the domain model, hark-analysis the evaluation
//! machinery, hark-storage the database. This crate connects them: a
//! process-wide runtime singleton, storage-backed implementations of the
//! core capability traits, the end-to-end call pipeline (single and
//! parallel batch), and TOML catalog import for rules and reference data.

pub mod catalog;
pub mod pipeline;
pub mod runtime;
pub mod stores;

pub use catalog::{
    import_references_from_file, import_references_from_str, import_rules_from_file,
    import_rules_from_str, load_active_rules, CatalogImportReport, SkippedEntry,
};
pub use pipeline::{
    process_batch, process_transcript, record_transcribing, record_transcription_failure,
    CallInput, CallStatus, ProcessedCall,
};
pub use runtime::{get, initialize, is_initialized, HarkRuntime, RuntimeOptions};
pub use stores::{StorageArtifactSink, StorageReferenceSource};
