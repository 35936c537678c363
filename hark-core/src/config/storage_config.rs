//! Storage configuration.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Configuration for the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database path relative to the project root. Default: `.hark/hark.db`.
    pub db_path: Option<String>,
    /// Read connection pool size. Default: 4.
    pub read_pool_size: Option<usize>,
    /// Background artifact queue capacity. Default: 256.
    pub artifact_queue_capacity: Option<usize>,
    /// Days completed call records are kept. Default: 90.
    pub retention_completed_days: Option<u32>,
    /// Days failed call records are kept. Default: 30.
    pub retention_failed_days: Option<u32>,
    /// Days audit artifacts and run history are kept. Default: 365.
    pub retention_artifact_days: Option<u32>,
}

impl StorageConfig {
    /// Returns the effective database path, defaulting to `.hark/hark.db`.
    pub fn effective_db_path(&self) -> &str {
        self.db_path.as_deref().unwrap_or(".hark/hark.db")
    }

    /// Returns the effective read pool size, defaulting to 4.
    pub fn effective_read_pool_size(&self) -> usize {
        self.read_pool_size.unwrap_or(4)
    }

    /// Returns the effective artifact queue capacity, defaulting to 256.
    pub fn effective_artifact_queue_capacity(&self) -> usize {
        self.artifact_queue_capacity
            .unwrap_or(constants::DEFAULT_ARTIFACT_QUEUE_CAPACITY)
    }

    /// Returns the effective completed-record retention, defaulting to 90 days.
    pub fn effective_retention_completed_days(&self) -> u32 {
        self.retention_completed_days.unwrap_or(90)
    }

    /// Returns the effective failed-record retention, defaulting to 30 days.
    pub fn effective_retention_failed_days(&self) -> u32 {
        self.retention_failed_days.unwrap_or(30)
    }

    /// Returns the effective artifact retention, defaulting to 365 days.
    pub fn effective_retention_artifact_days(&self) -> u32 {
        self.retention_artifact_days.unwrap_or(365)
    }
}
