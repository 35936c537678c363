//! Configuration system for Hark.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod evaluation_config;
pub mod extraction_config;
pub mod hark_config;
pub mod storage_config;

pub use evaluation_config::EvaluationConfig;
pub use extraction_config::ExtractionConfig;
pub use hark_config::{CliOverrides, HarkConfig};
pub use storage_config::StorageConfig;
