//! Log persistence. Log entries are immutable once written.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use super::types::{new_id, now_epoch, NewResearchLog, ResearchLog};

const LOG_COLUMNS: &str =
    "id, session_id, timestamp, type, level, message, agent, phase, metadata, created_at";

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<ResearchLog> {
    Ok(ResearchLog {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        timestamp: row.get("timestamp")?,
        log_type: row.get("type")?,
        level: row.get("level")?,
        message: row.get("message")?,
        agent: row.get("agent")?,
        phase: row.get("phase")?,
        metadata: row.get("metadata")?,
        created_at: row.get("created_at")?,
    })
}

/// Insert a log entry and return the stored row. Fails if `session_id` does
/// not reference an existing session.
pub fn create_log(conn: &Connection, new: &NewResearchLog) -> Result<ResearchLog> {
    let id = new.id.clone().unwrap_or_else(new_id);
    let created_at = new.created_at.unwrap_or_else(now_epoch);

    let log = conn.query_row(
        &format!(
            "INSERT INTO research_logs ({LOG_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
             RETURNING {LOG_COLUMNS}"
        ),
        params![
            id,
            new.session_id,
            new.timestamp,
            new.log_type,
            new.level,
            new.message,
            new.agent,
            new.phase,
            new.metadata,
            created_at,
        ],
        log_from_row,
    )?;

    tracing::debug!(id = %log.id, session = %log.session_id, level = %log.level, "log inserted");
    Ok(log)
}

/// All log entries of a session in insertion order.
pub fn list_logs(conn: &Connection, session_id: &str) -> Result<Vec<ResearchLog>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOG_COLUMNS} FROM research_logs WHERE session_id = ?1 ORDER BY rowid"
    ))?;
    let logs = stmt
        .query_map(params![session_id], log_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}
