//! Capability traits decoupling the engine from its collaborators.

pub mod artifact_sink;
pub mod recognizer;
pub mod reference_source;

pub use artifact_sink::{ArtifactSink, NullArtifactSink};
pub use recognizer::{
    ChunkAnalysis, EntityKind, EntityRecognizer, NullRecognizer, RecognizedEntity,
    RecognizedPhrase, RecognizedPii,
};
pub use reference_source::{EmptyReferenceSource, ReferenceSource};
