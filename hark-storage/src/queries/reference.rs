//! Queries for reference_records, the two-namespace reference store.
//!
//! Namespace strings are `voicemail` and `master`; the CHECK constraint
//! rejects anything else. The resolver probes voicemail before master.

use hark_core::errors::StorageError;
use hark_core::types::ReferenceRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};

fn map_record(row: &Row<'_>) -> rusqlite::Result<ReferenceRecord> {
    let expected_json: String = row.get(12)?;
    Ok(ReferenceRecord {
        agent_name: row.get(0)?,
        agent_alias: row.get(1)?,
        customer_name: row.get(2)?,
        customer_state: row.get(3)?,
        company_name: row.get(4)?,
        do_not_call: row.get::<_, i32>(5)? != 0,
        attorney_retained: row.get::<_, i32>(6)? != 0,
        bankruptcy_filed: row.get::<_, i32>(7)? != 0,
        cease_and_desist: row.get::<_, i32>(8)? != 0,
        cure_period_expired: row.get::<_, i32>(9)? != 0,
        third_party_risk: row.get::<_, i32>(10)? != 0,
        voicemail_context: row.get::<_, i32>(11)? != 0,
        expected_violations: serde_json::from_str(&expected_json).unwrap_or_default(),
    })
}

pub fn upsert_reference(
    conn: &Connection,
    namespace: &str,
    call_id: &str,
    record: &ReferenceRecord,
    updated_at: i64,
) -> Result<(), StorageError> {
    let expected_json =
        serde_json::to_string(&record.expected_violations).map_err(|e| {
            StorageError::SqliteError {
                message: format!("serialize expected violations for {call_id}: {e}"),
            }
        })?;
    conn.execute(
        "INSERT INTO reference_records (
            namespace, call_id, agent_name, agent_alias, customer_name,
            customer_state, company_name, do_not_call, attorney_retained,
            bankruptcy_filed, cease_and_desist, cure_period_expired,
            third_party_risk, voicemail_context, expected_violations_json,
            updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(namespace, call_id) DO UPDATE SET
            agent_name = excluded.agent_name,
            agent_alias = excluded.agent_alias,
            customer_name = excluded.customer_name,
            customer_state = excluded.customer_state,
            company_name = excluded.company_name,
            do_not_call = excluded.do_not_call,
            attorney_retained = excluded.attorney_retained,
            bankruptcy_filed = excluded.bankruptcy_filed,
            cease_and_desist = excluded.cease_and_desist,
            cure_period_expired = excluded.cure_period_expired,
            third_party_risk = excluded.third_party_risk,
            voicemail_context = excluded.voicemail_context,
            expected_violations_json = excluded.expected_violations_json,
            updated_at = excluded.updated_at",
        params![
            namespace,
            call_id,
            record.agent_name,
            record.agent_alias,
            record.customer_name,
            record.customer_state,
            record.company_name,
            record.do_not_call as i32,
            record.attorney_retained as i32,
            record.bankruptcy_filed as i32,
            record.cease_and_desist as i32,
            record.cure_period_expired as i32,
            record.third_party_risk as i32,
            record.voicemail_context as i32,
            expected_json,
            updated_at
        ],
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;
    Ok(())
}

pub fn get_reference(
    conn: &Connection,
    namespace: &str,
    call_id: &str,
) -> Result<Option<ReferenceRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT agent_name, agent_alias, customer_name, customer_state, company_name,
                    do_not_call, attorney_retained, bankruptcy_filed, cease_and_desist,
                    cure_period_expired, third_party_risk, voicemail_context,
                    expected_violations_json
             FROM reference_records WHERE namespace = ?1 AND call_id = ?2",
        )
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })?;

    stmt.query_row(params![namespace, call_id], map_record)
        .optional()
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}

pub fn count_in_namespace(conn: &Connection, namespace: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM reference_records WHERE namespace = ?1",
        params![namespace],
        |row| row.get(0),
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })
}
