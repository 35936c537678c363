//! Top-level Hark configuration with 4-layer resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{EvaluationConfig, ExtractionConfig, StorageConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`HARK_*`)
/// 3. Project config (`hark.toml` in project root)
/// 4. User config (`~/.hark/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarkConfig {
    pub extraction: ExtractionConfig,
    pub evaluation: EvaluationConfig,
    pub storage: StorageConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_path: Option<String>,
    pub chunk_delay_ms: Option<u64>,
    pub confidence_threshold: Option<f64>,
    pub opening_window_words: Option<usize>,
}

impl HarkConfig {
    /// Load configuration with 4-layer resolution.
    ///
    /// Resolution order (highest priority first):
    /// 1. CLI flags
    /// 2. Environment variables (`HARK_*`)
    /// 3. Project config (`hark.toml` in `root`)
    /// 4. User config (`~/.hark/config.toml`)
    /// 5. Compiled defaults
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(ConfigError::ParseError { .. }) => {
                        return Err(ConfigError::ParseError {
                            path: user_config_path.display().to_string(),
                            message: "invalid TOML in user config".to_string(),
                        });
                    }
                    Err(_) => {
                        // Non-parse errors from user config are warnings,
                        // not fatal. Continue with defaults.
                    }
                }
            }
        }

        // Layer 3: project config
        let project_config_path = root.join("hark.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        // Validate the final config
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &HarkConfig) -> Result<(), ConfigError> {
        let unit_interval = [
            (
                "extraction.confidence_threshold",
                config.extraction.confidence_threshold,
            ),
            (
                "extraction.pii_confidence_threshold",
                config.extraction.pii_confidence_threshold,
            ),
            (
                "evaluation.evidence_threshold",
                config.evaluation.evidence_threshold,
            ),
            (
                "evaluation.review_quality_threshold",
                config.evaluation.review_quality_threshold,
            ),
        ];
        for (field, value) in unit_interval {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be between 0.0 and 1.0".to_string(),
                    });
                }
            }
        }
        if let Some(limit) = config.extraction.chunk_limit {
            if limit == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "extraction.chunk_limit".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(words) = config.evaluation.opening_window_words {
            if words == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "evaluation.opening_window_words".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(size) = config.storage.read_pool_size {
            if size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "storage.read_pool_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.hark/config.toml`.
    fn user_config_path() -> Option<std::path::PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut HarkConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: HarkConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base`
    /// values only when `other` has a `Some` value.
    fn merge(base: &mut HarkConfig, other: &HarkConfig) {
        // Extraction
        if other.extraction.chunk_limit.is_some() {
            base.extraction.chunk_limit = other.extraction.chunk_limit;
        }
        if other.extraction.chunk_delay_ms.is_some() {
            base.extraction.chunk_delay_ms = other.extraction.chunk_delay_ms;
        }
        if other.extraction.confidence_threshold.is_some() {
            base.extraction.confidence_threshold = other.extraction.confidence_threshold;
        }
        if other.extraction.pii_confidence_threshold.is_some() {
            base.extraction.pii_confidence_threshold =
                other.extraction.pii_confidence_threshold;
        }

        // Evaluation
        if other.evaluation.opening_window_words.is_some() {
            base.evaluation.opening_window_words = other.evaluation.opening_window_words;
        }
        if other.evaluation.evidence_threshold.is_some() {
            base.evaluation.evidence_threshold = other.evaluation.evidence_threshold;
        }
        if other.evaluation.review_quality_threshold.is_some() {
            base.evaluation.review_quality_threshold =
                other.evaluation.review_quality_threshold;
        }
        if other.evaluation.pattern_cache_capacity.is_some() {
            base.evaluation.pattern_cache_capacity = other.evaluation.pattern_cache_capacity;
        }

        // Storage
        if other.storage.db_path.is_some() {
            base.storage.db_path = other.storage.db_path.clone();
        }
        if other.storage.read_pool_size.is_some() {
            base.storage.read_pool_size = other.storage.read_pool_size;
        }
        if other.storage.artifact_queue_capacity.is_some() {
            base.storage.artifact_queue_capacity = other.storage.artifact_queue_capacity;
        }
        if other.storage.retention_completed_days.is_some() {
            base.storage.retention_completed_days = other.storage.retention_completed_days;
        }
        if other.storage.retention_failed_days.is_some() {
            base.storage.retention_failed_days = other.storage.retention_failed_days;
        }
        if other.storage.retention_artifact_days.is_some() {
            base.storage.retention_artifact_days = other.storage.retention_artifact_days;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `HARK_EXTRACTION_CHUNK_LIMIT`, `HARK_STORAGE_DB_PATH`, etc.
    fn apply_env_overrides(config: &mut HarkConfig) {
        if let Ok(val) = std::env::var("HARK_EXTRACTION_CHUNK_LIMIT") {
            if let Ok(v) = val.parse::<usize>() {
                config.extraction.chunk_limit = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_EXTRACTION_CHUNK_DELAY_MS") {
            if let Ok(v) = val.parse::<u64>() {
                config.extraction.chunk_delay_ms = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_EXTRACTION_CONFIDENCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.extraction.confidence_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_EXTRACTION_PII_CONFIDENCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.extraction.pii_confidence_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_EVALUATION_OPENING_WINDOW_WORDS") {
            if let Ok(v) = val.parse::<usize>() {
                config.evaluation.opening_window_words = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_EVALUATION_EVIDENCE_THRESHOLD") {
            if let Ok(v) = val.parse::<f64>() {
                config.evaluation.evidence_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("HARK_STORAGE_DB_PATH") {
            config.storage.db_path = Some(val);
        }
        if let Ok(val) = std::env::var("HARK_STORAGE_READ_POOL_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.storage.read_pool_size = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut HarkConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.db_path {
            config.storage.db_path = Some(v.clone());
        }
        if let Some(v) = cli.chunk_delay_ms {
            config.extraction.chunk_delay_ms = Some(v);
        }
        if let Some(v) = cli.confidence_threshold {
            config.extraction.confidence_threshold = Some(v);
        }
        if let Some(v) = cli.opening_window_words {
            config.evaluation.opening_window_words = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level hark config directory: `~/.hark/`.
fn dirs_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".hark"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}
