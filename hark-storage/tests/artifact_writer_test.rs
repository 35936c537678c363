//! Background artifact writer against a file-backed database, plus the
//! evaluation run history it shares a migration with.

use hark_storage::queries::audit;
use hark_storage::{now_ms, ArtifactInsert, ArtifactWriter, DatabaseManager};

fn open_db() -> (DatabaseManager, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let manager = DatabaseManager::open(&dir.path().join("hark-test.db")).unwrap();
    (manager, dir)
}

fn insert(key: &str, call_id: Option<&str>) -> ArtifactInsert {
    ArtifactInsert {
        artifact_key: key.to_string(),
        call_id: call_id.map(str::to_string),
        payload_json: r#"{"persons":[{"text":"Sarah Chen","confidence":0.95}]}"#.to_string(),
        created_at: now_ms(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Writer thread
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn enqueued_artifacts_are_visible_after_flush() {
    let (manager, _dir) = open_db();
    let writer = ArtifactWriter::spawn(manager.open_artifact_connection().unwrap(), 64);

    assert!(writer.enqueue(insert("GEN-2024-000001-a1", Some("GEN-2024-000001"))));
    assert!(writer.enqueue(insert("GEN-2024-000001-a2", Some("GEN-2024-000001"))));
    assert!(writer.enqueue(insert("ad-hoc-payload", None)));
    writer.flush().unwrap();

    let by_call = manager
        .with_reader(|conn| audit::query_artifacts_by_call(conn, "GEN-2024-000001"))
        .unwrap();
    assert_eq!(by_call.len(), 2);

    let row = manager
        .with_reader(|conn| audit::get_artifact(conn, "ad-hoc-payload"))
        .unwrap()
        .unwrap();
    assert!(row.call_id.is_none());
    assert!(row.payload_json.contains("Sarah Chen"));

    let stats = writer.shutdown();
    assert_eq!(stats.persisted, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(stats.dropped, 0);

    let total = manager.with_reader(audit::count_artifacts).unwrap();
    assert_eq!(total, 3);
}

#[test]
fn shutdown_drains_the_queue() {
    let (manager, _dir) = open_db();
    let writer = ArtifactWriter::spawn(manager.open_artifact_connection().unwrap(), 256);

    for i in 0..50 {
        assert!(writer.enqueue(insert(&format!("key-{i:03}"), None)));
    }
    // No flush: shutdown itself must not lose queued work.
    let stats = writer.shutdown();
    assert_eq!(stats.persisted, 50);

    let total = manager.with_reader(audit::count_artifacts).unwrap();
    assert_eq!(total, 50);
}

#[test]
fn reenqueued_key_replaces_payload() {
    let (manager, _dir) = open_db();
    let writer = ArtifactWriter::spawn(manager.open_artifact_connection().unwrap(), 64);

    writer.enqueue(insert("GEN-2024-000002-a1", Some("GEN-2024-000002")));
    let mut second = insert("GEN-2024-000002-a1", Some("GEN-2024-000002"));
    second.payload_json = r#"{"persons":[]}"#.to_string();
    writer.enqueue(second);
    writer.flush().unwrap();

    let row = manager
        .with_reader(|conn| audit::get_artifact(conn, "GEN-2024-000002-a1"))
        .unwrap()
        .unwrap();
    assert_eq!(row.payload_json, r#"{"persons":[]}"#);

    let stats = writer.shutdown();
    assert_eq!(stats.persisted, 2);

    let total = manager.with_reader(audit::count_artifacts).unwrap();
    assert_eq!(total, 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Evaluation run history
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn run_history_records_start_and_completion() {
    let (manager, _dir) = open_db();
    let started = now_ms();

    let run_id = manager
        .with_writer(|conn| audit::insert_run_start(conn, started, Some("GEN-2024-000001")))
        .unwrap();

    let runs = manager
        .with_reader(|conn| audit::query_recent_runs(conn, 10))
        .unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "running");
    assert!(runs[0].completed_at.is_none());

    manager
        .with_writer(|conn| {
            audit::update_run_complete(
                conn,
                run_id,
                started + 1200,
                6,
                2,
                0,
                1200,
                "completed",
                None,
            )
        })
        .unwrap();

    let runs = manager
        .with_reader(|conn| audit::query_recent_runs(conn, 10))
        .unwrap();
    assert_eq!(runs[0].status, "completed");
    assert_eq!(runs[0].completed_at, Some(started + 1200));
    assert_eq!(runs[0].rules_evaluated, Some(6));
    assert_eq!(runs[0].violation_count, Some(2));
    assert_eq!(runs[0].duration_ms, Some(1200));
    assert!(runs[0].error.is_none());
}

#[test]
fn run_history_is_newest_first_and_limited() {
    let (manager, _dir) = open_db();
    let base = now_ms();

    manager
        .with_writer(|conn| {
            for i in 0..5i64 {
                audit::insert_run_start(conn, base + i * 100, None)?;
            }
            Ok(())
        })
        .unwrap();

    let runs = manager
        .with_reader(|conn| audit::query_recent_runs(conn, 3))
        .unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0].started_at, base + 400);
    assert_eq!(runs[2].started_at, base + 200);

    let total = manager.with_reader(audit::count_runs).unwrap();
    assert_eq!(total, 5);
}

#[test]
fn failed_run_keeps_the_error() {
    let (manager, _dir) = open_db();
    let started = now_ms();

    let run_id = manager
        .with_writer(|conn| audit::insert_run_start(conn, started, Some("GEN-2024-000009")))
        .unwrap();
    manager
        .with_writer(|conn| {
            audit::update_run_complete(
                conn,
                run_id,
                started + 40,
                0,
                0,
                0,
                40,
                "failed",
                Some("transcription failed: decoder error"),
            )
        })
        .unwrap();

    let runs = manager
        .with_reader(|conn| audit::query_recent_runs(conn, 1))
        .unwrap();
    assert_eq!(runs[0].status, "failed");
    assert_eq!(
        runs[0].error.as_deref(),
        Some("transcription failed: decoder error")
    );
}
