//! Session persistence: create, list, fetch with children, partial update.

use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::types::{
    new_id, now_epoch, NewResearchSession, ResearchSession, SessionDetail, SessionUpdate,
    DEFAULT_STATUS,
};

/// Maximum number of sessions returned by [`list_sessions`].
pub const LIST_LIMIT: usize = 50;

const SESSION_COLUMNS: &str = "id, original_prompt, clarification_questions, clarification_answers, \
     plan, data_collection, verbose_log, final_report, status, created_at, updated_at";

pub(crate) fn session_from_row(row: &Row<'_>) -> rusqlite::Result<ResearchSession> {
    Ok(ResearchSession {
        id: row.get("id")?,
        original_prompt: row.get("original_prompt")?,
        clarification_questions: row.get("clarification_questions")?,
        clarification_answers: row.get("clarification_answers")?,
        plan: row.get("plan")?,
        data_collection: row.get("data_collection")?,
        verbose_log: row.get("verbose_log")?,
        final_report: row.get("final_report")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Insert a session and return the stored row.
pub fn create_session(conn: &Connection, new: &NewResearchSession) -> Result<ResearchSession> {
    let now = now_epoch();
    let id = new.id.clone().unwrap_or_else(new_id);
    let created_at = new.created_at.unwrap_or(now);
    let updated_at = new.updated_at.unwrap_or(created_at);

    let session = conn.query_row(
        &format!(
            "INSERT INTO research_sessions ({SESSION_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
             RETURNING {SESSION_COLUMNS}"
        ),
        params![
            id,
            new.original_prompt,
            new.clarification_questions,
            new.clarification_answers,
            new.plan,
            new.data_collection,
            new.verbose_log,
            new.final_report,
            new.status.as_deref().unwrap_or(DEFAULT_STATUS),
            created_at,
            updated_at,
        ],
        session_from_row,
    )?;

    tracing::debug!(id = %session.id, "session inserted");
    Ok(session)
}

/// Up to [`LIST_LIMIT`] sessions, oldest first. Insertion order breaks ties.
pub fn list_sessions(conn: &Connection) -> Result<Vec<ResearchSession>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SESSION_COLUMNS} FROM research_sessions ORDER BY created_at ASC, rowid ASC LIMIT ?1"
    ))?;
    let sessions = stmt
        .query_map(params![LIST_LIMIT as i64], session_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

/// Fetch a single session row.
pub fn find_session(conn: &Connection, id: &str) -> Result<Option<ResearchSession>> {
    let session = conn
        .query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM research_sessions WHERE id = ?1"),
            params![id],
            session_from_row,
        )
        .optional()?;
    Ok(session)
}

/// Fetch a session with all of its tasks and logs, or `None` if absent.
pub fn get_session(conn: &Connection, id: &str) -> Result<Option<SessionDetail>> {
    let Some(session) = find_session(conn, id)? else {
        return Ok(None);
    };

    let tasks = super::tasks::list_tasks(conn, id)?;
    let logs = super::logs::list_logs(conn, id)?;

    Ok(Some(SessionDetail {
        session,
        tasks,
        logs,
    }))
}

/// Apply a partial update. Returns the updated row, or `None` if the session
/// does not exist. An empty update returns the current row untouched.
pub fn update_session(
    conn: &Connection,
    id: &str,
    update: &SessionUpdate,
) -> Result<Option<ResearchSession>> {
    if update.is_empty() {
        return find_session(conn, id);
    }
    let assignments = collect_assignments(update);

    let set_clause = assignments
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let id_param = assignments.len() + 1;

    let mut values: Vec<Value> = assignments.into_iter().map(|(_, v)| v).collect();
    values.push(Value::Text(id.to_string()));

    let session = conn
        .query_row(
            &format!(
                "UPDATE research_sessions SET {set_clause} WHERE id = ?{id_param} \
                 RETURNING {SESSION_COLUMNS}"
            ),
            params_from_iter(values),
            session_from_row,
        )
        .optional()?;

    Ok(session)
}

fn collect_assignments(update: &SessionUpdate) -> Vec<(&'static str, Value)> {
    fn text(v: &Option<String>) -> Value {
        match v {
            Some(s) => Value::Text(s.clone()),
            None => Value::Null,
        }
    }

    let mut out = Vec::new();
    if let Some(v) = &update.original_prompt {
        out.push(("original_prompt", Value::Text(v.clone())));
    }
    let nullable = [
        ("clarification_questions", &update.clarification_questions),
        ("clarification_answers", &update.clarification_answers),
        ("plan", &update.plan),
        ("data_collection", &update.data_collection),
        ("verbose_log", &update.verbose_log),
        ("final_report", &update.final_report),
    ];
    for (column, field) in nullable {
        if let Some(v) = field {
            out.push((column, text(v)));
        }
    }
    if let Some(v) = &update.status {
        out.push(("status", Value::Text(v.clone())));
    }
    if let Some(v) = update.created_at {
        out.push(("created_at", Value::Integer(v)));
    }
    if let Some(v) = update.updated_at {
        out.push(("updated_at", Value::Integer(v)));
    }
    out
}
