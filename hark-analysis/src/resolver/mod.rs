//! Call identity resolution and reference record lookup.
//!
//! Resolution is total: every filename maps to exactly one canonical call
//! id, and every call id maps to exactly one reference record. Unknown
//! inputs fall through to deterministic defaults instead of erroring.

use std::sync::OnceLock;

use hark_core::traits::ReferenceSource;
use hark_core::types::ReferenceRecord;
use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

/// Which store satisfied a reference lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceNamespace {
    Voicemail,
    Master,
    Default,
}

impl ReferenceNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceNamespace::Voicemail => "voicemail",
            ReferenceNamespace::Master => "master",
            ReferenceNamespace::Default => "default",
        }
    }
}

impl std::fmt::Display for ReferenceNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct CallIdPatterns {
    voicemail: Option<Regex>,
    agent: Option<Regex>,
    embedded: Option<Regex>,
}

/// Compiled once; a pattern that fails to build is disabled and resolution
/// falls through to the hash form, keeping the function total.
fn patterns() -> &'static CallIdPatterns {
    fn build(source: &str) -> Option<Regex> {
        match Regex::new(source) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!(pattern = source, error = %e, "call id pattern failed to compile");
                None
            }
        }
    }
    static PATTERNS: OnceLock<CallIdPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CallIdPatterns {
        voicemail: build(r"^voicemail_\d+_VM_(\d{4})_(\d{6})\.wav"),
        agent: build(r"^agent_call_\d+_GEN_(\d{4})_(\d{6})\.wav"),
        embedded: build(r"(VM|GEN)-\d{4}-\d{6}"),
    })
}

/// Maps an audio filename to its canonical call id.
///
/// Recognized layouts are tried in order; anything else gets a stable
/// hash-derived id so repeated runs agree on the same identity.
pub fn resolve_call_id(filename: &str) -> String {
    let patterns = patterns();
    if let Some(caps) = patterns
        .voicemail
        .as_ref()
        .and_then(|re| re.captures(filename))
    {
        return format!("VM-{}-{}", &caps[1], &caps[2]);
    }
    if let Some(caps) = patterns.agent.as_ref().and_then(|re| re.captures(filename)) {
        return format!("GEN-{}-{}", &caps[1], &caps[2]);
    }
    if let Some(mat) = patterns.embedded.as_ref().and_then(|re| re.find(filename)) {
        return mat.as_str().to_string();
    }
    hashed_call_id(filename)
}

fn hashed_call_id(filename: &str) -> String {
    let digest = format!("{:016X}", xxh3_64(filename.as_bytes()));
    let prefix = if filename.to_lowercase().contains("voicemail") {
        "VM"
    } else {
        "GEN"
    };
    format!("{}-2024-{}", prefix, &digest[..6])
}

/// Looks up the reference record for `call_id`, trying the voicemail store
/// first, then the master store, then the built-in default record.
///
/// Lookup errors degrade to the next store in the chain. Evaluation always
/// receives a record.
pub fn resolve_reference(
    source: &dyn ReferenceSource,
    call_id: &str,
) -> (ReferenceRecord, ReferenceNamespace) {
    match source.lookup_voicemail(call_id) {
        Ok(Some(record)) => return (record, ReferenceNamespace::Voicemail),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(call_id, error = %e, "voicemail reference lookup failed");
        }
    }
    match source.lookup_master(call_id) {
        Ok(Some(record)) => return (record, ReferenceNamespace::Master),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(call_id, error = %e, "master reference lookup failed");
        }
    }
    tracing::debug!(call_id, "no reference record found; using default");
    (ReferenceRecord::fallback(), ReferenceNamespace::Default)
}
