//! ReferenceSource trait: pluggable reference-record lookup.

use crate::errors::ReferenceError;
use crate::types::ReferenceRecord;

/// Looks up reference records by jurisdiction id across the two
/// namespaces. The resolver probes voicemail first, then master, then
/// degrades to the fallback record; a source only answers what it has.
pub trait ReferenceSource: Send + Sync {
    fn lookup_voicemail(
        &self,
        jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError>;

    fn lookup_master(
        &self,
        jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError>;
}

/// Source with no records. Every resolution lands on the fallback record.
pub struct EmptyReferenceSource;

impl ReferenceSource for EmptyReferenceSource {
    fn lookup_voicemail(
        &self,
        _jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError> {
        Ok(None)
    }

    fn lookup_master(
        &self,
        _jurisdiction_id: &str,
    ) -> Result<Option<ReferenceRecord>, ReferenceError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_misses_both_namespaces() {
        let source = EmptyReferenceSource;
        assert!(source.lookup_voicemail("VM-2024-000001").unwrap().is_none());
        assert!(source.lookup_master("GEN-2024-000001").unwrap().is_none());
    }
}
