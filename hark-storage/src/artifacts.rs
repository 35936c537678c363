//! Background artifact writer.
//!
//! A dedicated connection on its own thread, fed by a bounded channel.
//! A full queue drops the artifact with a warn instead of blocking the
//! extraction path; the audit trail is best-effort by contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use hark_core::errors::StorageError;
use rusqlite::Connection;
use tracing::{debug, error, warn};

use crate::queries::audit::{self, ArtifactRow};

/// One artifact queued for persistence.
#[derive(Debug, Clone)]
pub struct ArtifactInsert {
    pub artifact_key: String,
    pub call_id: Option<String>,
    pub payload_json: String,
    pub created_at: i64,
}

enum Command {
    Persist(ArtifactInsert),
    Flush(Sender<()>),
}

/// Totals reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactWriterStats {
    pub persisted: u64,
    pub failed: u64,
    pub dropped: u64,
}

/// Owns the writer thread. Dropping the writer closes the channel; the
/// thread drains what was queued and exits.
pub struct ArtifactWriter {
    tx: Option<Sender<Command>>,
    handle: Option<JoinHandle<ArtifactWriterStats>>,
    dropped: AtomicU64,
}

impl ArtifactWriter {
    /// Spawn the writer thread over a dedicated connection. If the thread
    /// cannot be spawned the writer runs offline and drops everything.
    pub fn spawn(conn: Connection, capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        match std::thread::Builder::new()
            .name("hark-artifacts".to_string())
            .spawn(move || run_writer(conn, rx))
        {
            Ok(handle) => Self {
                tx: Some(tx),
                handle: Some(handle),
                dropped: AtomicU64::new(0),
            },
            Err(e) => {
                error!(error = %e, "failed to spawn artifact writer; artifacts disabled");
                Self::offline()
            }
        }
    }

    /// Writer with no thread. Every enqueue drops. Used when storage is
    /// unavailable.
    pub fn offline() -> Self {
        Self {
            tx: None,
            handle: None,
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue one artifact. Returns false when it was dropped (full queue
    /// or offline writer).
    pub fn enqueue(&self, artifact: ArtifactInsert) -> bool {
        let Some(tx) = &self.tx else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        match tx.try_send(Command::Persist(artifact)) {
            Ok(()) => true,
            Err(err) => {
                if let TrySendError::Full(Command::Persist(a)) = &err {
                    warn!(artifact_key = %a.artifact_key, "artifact queue full, dropping");
                }
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Block until everything queued so far has been written.
    pub fn flush(&self) -> Result<(), StorageError> {
        let Some(tx) = &self.tx else {
            return Ok(());
        };
        let (ack_tx, ack_rx) = bounded(1);
        tx.send(Command::Flush(ack_tx))
            .map_err(|_| StorageError::SqliteError {
                message: "artifact writer disconnected".to_string(),
            })?;
        ack_rx.recv().map_err(|_| StorageError::SqliteError {
            message: "artifact writer exited before flush ack".to_string(),
        })
    }

    /// Close the queue, drain it, and return the totals.
    pub fn shutdown(mut self) -> ArtifactWriterStats {
        self.join()
    }

    fn join(&mut self) -> ArtifactWriterStats {
        self.tx.take();
        let mut stats = match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => ArtifactWriterStats::default(),
        };
        stats.dropped += self.dropped.swap(0, Ordering::Relaxed);
        stats
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        let stats = self.join();
        if stats.persisted > 0 || stats.failed > 0 || stats.dropped > 0 {
            debug!(
                persisted = stats.persisted,
                failed = stats.failed,
                dropped = stats.dropped,
                "artifact writer stopped"
            );
        }
    }
}

fn run_writer(conn: Connection, rx: Receiver<Command>) -> ArtifactWriterStats {
    let mut stats = ArtifactWriterStats::default();
    while let Ok(command) = rx.recv() {
        match command {
            Command::Persist(a) => {
                let row = ArtifactRow {
                    artifact_key: a.artifact_key,
                    call_id: a.call_id,
                    payload_json: a.payload_json,
                    created_at: a.created_at,
                };
                match audit::insert_artifact(&conn, &row) {
                    Ok(()) => stats.persisted += 1,
                    Err(e) => {
                        stats.failed += 1;
                        error!(artifact_key = %row.artifact_key, error = %e, "artifact persist failed");
                    }
                }
            }
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    stats
}
