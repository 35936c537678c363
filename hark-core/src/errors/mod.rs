//! Error handling for Hark.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod evaluation_error;
pub mod extraction_error;
pub mod pipeline_error;
pub mod reference_error;
pub mod storage_error;

pub use config_error::ConfigError;
pub use error_code::HarkErrorCode;
pub use evaluation_error::EvaluationError;
pub use extraction_error::ExtractionError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use reference_error::ReferenceError;
pub use storage_error::StorageError;
