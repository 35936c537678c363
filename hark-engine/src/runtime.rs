//! HarkRuntime, a singleton via `OnceLock`, lock-free after initialization.
//!
//! The runtime owns the configuration, the database manager, the wired
//! extraction and evaluation engines, and the event dispatcher. It is
//! initialized once through [`initialize`] and shared through [`get`] for
//! the life of the process; embedders that want several isolated instances
//! construct [`HarkRuntime`] directly instead.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use hark_analysis::{EntityExtractor, LexiconRecognizer, RuleEvaluator};
use hark_core::config::HarkConfig;
use hark_core::errors::{PipelineError, StorageError};
use hark_core::events::{EventDispatcher, HarkEventHandler};
use hark_core::logging;
use hark_core::traits::{EntityRecognizer, NullRecognizer, ReferenceSource};
use hark_storage::{ArtifactWriter, DatabaseManager};
use tracing::{info, warn};

use crate::stores::{StorageArtifactSink, StorageReferenceSource};

/// Global singleton. Lock-free after the first `initialize()` call.
static RUNTIME: OnceLock<Arc<HarkRuntime>> = OnceLock::new();

/// Options for constructing a runtime.
#[derive(Default)]
pub struct RuntimeOptions {
    /// Path to hark.db. Defaults to the configured storage path, resolved
    /// under `project_root` when relative.
    pub db_path: Option<PathBuf>,
    /// Where layered configuration (`hark.toml`) is looked up.
    pub project_root: Option<PathBuf>,
    /// Inline TOML configuration. Takes precedence over file lookup and is
    /// validated strictly.
    pub config_toml: Option<String>,
    /// Recognizer backend. Defaults to the built-in lexicon recognizer.
    pub recognizer: Option<Arc<dyn EntityRecognizer>>,
    /// Event handlers registered before the first pipeline run.
    pub handlers: Vec<Arc<dyn HarkEventHandler>>,
}

/// The wired engine: every subsystem constructed, connected, and ready.
///
/// `DatabaseManager` serializes writes internally and pools reads, the
/// evaluator and extractor are stateless across calls, and the dispatcher
/// isolates handler panics, so the runtime is shared by plain `Arc` with no
/// additional locking.
pub struct HarkRuntime {
    pub(crate) config: HarkConfig,
    pub(crate) db: Arc<DatabaseManager>,
    pub(crate) dispatcher: EventDispatcher,
    pub(crate) evaluator: RuleEvaluator,
    pub(crate) extractor: EntityExtractor,
    pub(crate) artifacts: Arc<ArtifactWriter>,
    pub(crate) reference_source: Arc<dyn ReferenceSource>,
}

impl std::fmt::Debug for HarkRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarkRuntime").finish_non_exhaustive()
    }
}

impl HarkRuntime {
    /// Construct a runtime from options.
    ///
    /// Fatal: unusable inline config, an unopenable database, or an
    /// evaluator that cannot compile its strategies. Everything else
    /// degrades with a warning: config file problems fall back to
    /// defaults, a failed artifact connection disables the audit channel,
    /// and a failed lexicon build falls back to the null recognizer.
    pub fn new(opts: RuntimeOptions) -> Result<Self, PipelineError> {
        logging::init();

        let config = match &opts.config_toml {
            Some(toml_str) => {
                let config = HarkConfig::from_toml(toml_str)?;
                HarkConfig::validate(&config)?;
                config
            }
            None => {
                let root = opts.project_root.clone().unwrap_or_else(|| PathBuf::from("."));
                match HarkConfig::load(&root, None) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(error = %e, "config load failed, using defaults");
                        HarkConfig::default()
                    }
                }
            }
        };

        let db_path = resolve_db_path(&opts, &config);
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::SqliteError {
                message: format!("create database directory {}: {e}", parent.display()),
            })?;
        }
        let db = Arc::new(DatabaseManager::open_with_pool_size(
            &db_path,
            config.storage.effective_read_pool_size(),
        )?);

        // Artifact channel is best-effort: losing it loses audit copies of
        // entity bags, nothing else.
        let artifacts = Arc::new(match db.open_artifact_connection() {
            Ok(conn) => {
                ArtifactWriter::spawn(conn, config.storage.effective_artifact_queue_capacity())
            }
            Err(e) => {
                warn!(error = %e, "artifact connection failed, artifact writes disabled");
                ArtifactWriter::offline()
            }
        });

        let evaluator = RuleEvaluator::new(&config.evaluation)?;

        let recognizer: Arc<dyn EntityRecognizer> = match opts.recognizer {
            Some(recognizer) => recognizer,
            None => match LexiconRecognizer::new() {
                Ok(recognizer) => Arc::new(recognizer),
                Err(e) => {
                    warn!(error = %e, "lexicon recognizer build failed, extraction disabled");
                    Arc::new(NullRecognizer)
                }
            },
        };
        let extractor = EntityExtractor::new(
            config.extraction.clone(),
            recognizer,
            Arc::new(StorageArtifactSink::new(artifacts.clone())),
        );

        let reference_source: Arc<dyn ReferenceSource> =
            Arc::new(StorageReferenceSource::new(db.clone()));

        let mut dispatcher = EventDispatcher::new();
        for handler in opts.handlers {
            dispatcher.register(handler);
        }

        info!(
            db = %db_path.display(),
            handlers = dispatcher.handler_count(),
            "runtime ready"
        );
        Ok(Self {
            config,
            db,
            dispatcher,
            evaluator,
            extractor,
            artifacts,
            reference_source,
        })
    }

    pub fn config(&self) -> &HarkConfig {
        &self.config
    }

    pub fn db(&self) -> &DatabaseManager {
        &self.db
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Block until every queued entity artifact is on disk.
    pub fn flush_artifacts(&self) -> Result<(), StorageError> {
        self.artifacts.flush()
    }
}

fn resolve_db_path(opts: &RuntimeOptions, config: &HarkConfig) -> PathBuf {
    if let Some(path) = &opts.db_path {
        return path.clone();
    }
    let configured = PathBuf::from(config.storage.effective_db_path());
    match &opts.project_root {
        Some(root) if configured.is_relative() => root.join(configured),
        _ => configured,
    }
}

/// Initialize the global runtime singleton.
///
/// Errors when construction fails or the runtime is already initialized.
pub fn initialize(opts: RuntimeOptions) -> Result<(), PipelineError> {
    let runtime = Arc::new(HarkRuntime::new(opts)?);
    RUNTIME.set(runtime).map_err(|_| PipelineError::Runtime {
        message: "runtime already initialized".to_string(),
    })
}

/// Get the global runtime. Lock-free after initialization.
pub fn get() -> Result<Arc<HarkRuntime>, PipelineError> {
    RUNTIME.get().cloned().ok_or_else(|| PipelineError::Runtime {
        message: "runtime not initialized, call initialize() first".to_string(),
    })
}

/// Whether `initialize()` has completed.
pub fn is_initialized() -> bool {
    RUNTIME.get().is_some()
}
