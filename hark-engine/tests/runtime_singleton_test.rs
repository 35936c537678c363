//! Global runtime lifecycle. One test function on purpose: the singleton
//! is process-wide, so ordering across #[test] threads is not defined.

use hark_core::errors::PipelineError;
use hark_engine::{get, initialize, is_initialized, RuntimeOptions};

#[test]
fn initialize_once_then_reuse() {
    assert!(!is_initialized());
    assert!(matches!(get(), Err(PipelineError::Runtime { .. })));

    let dir = tempfile::tempdir().unwrap();
    initialize(RuntimeOptions {
        db_path: Some(dir.path().join("hark.db")),
        config_toml: Some("[extraction]\nchunk_delay_ms = 0\n".to_string()),
        ..RuntimeOptions::default()
    })
    .unwrap();

    assert!(is_initialized());
    let runtime = get().unwrap();
    assert!(runtime.db().path().is_some());

    let second = initialize(RuntimeOptions {
        db_path: Some(dir.path().join("other.db")),
        ..RuntimeOptions::default()
    });
    assert!(matches!(second, Err(PipelineError::Runtime { .. })));

    // The global runtime holds its connections until process exit; the
    // directory has to stay alive at least as long.
    std::mem::forget(dir);
}
