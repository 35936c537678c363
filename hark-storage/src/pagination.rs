//! Keyset cursor pagination, no OFFSET/LIMIT.
//! Constant-time page retrieval regardless of position.

use hark_core::errors::StorageError;
use serde::{Deserialize, Serialize};

/// A cursor for keyset pagination. Composite: (sort_value, id).
/// Encoded as `sort_value|id`; the sort value is the unix-ms column the
/// listing orders by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    pub last_sort_value: i64,
    pub last_id: String,
}

impl PaginationCursor {
    pub fn encode(&self) -> String {
        format!("{}|{}", self.last_sort_value, self.last_id)
    }

    pub fn decode(encoded: &str) -> Result<Self, StorageError> {
        let (value, id) = encoded
            .split_once('|')
            .ok_or_else(|| StorageError::InvalidCursor {
                message: format!("missing separator in `{encoded}`"),
            })?;
        let last_sort_value = value.parse().map_err(|_| StorageError::InvalidCursor {
            message: format!("non-numeric sort value in `{encoded}`"),
        })?;
        Ok(Self {
            last_sort_value,
            last_id: id.to_string(),
        })
    }
}

/// A paginated result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

impl<T> PaginatedResult<T> {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            has_more: false,
            next_cursor: None,
        }
    }
}
