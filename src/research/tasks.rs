//! Task persistence. Tasks are insert-only.

use anyhow::Result;
use rusqlite::{params, Connection, Row};

use super::types::{new_id, now_epoch, NewResearchTask, ResearchTask};

const TASK_COLUMNS: &str = "id, session_id, tier, title, direction, target, learning, \
     grounding_chunks, web_search_queries, urls_metadata, created_at, updated_at";

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<ResearchTask> {
    Ok(ResearchTask {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        tier: row.get("tier")?,
        title: row.get("title")?,
        direction: row.get("direction")?,
        target: row.get("target")?,
        learning: row.get("learning")?,
        grounding_chunks: row.get("grounding_chunks")?,
        web_search_queries: row.get("web_search_queries")?,
        urls_metadata: row.get("urls_metadata")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Insert a task and return the stored row. Fails if `session_id` does not
/// reference an existing session.
pub fn create_task(conn: &Connection, new: &NewResearchTask) -> Result<ResearchTask> {
    let now = now_epoch();
    let id = new.id.clone().unwrap_or_else(new_id);
    let created_at = new.created_at.unwrap_or(now);
    let updated_at = new.updated_at.unwrap_or(created_at);

    let task = conn.query_row(
        &format!(
            "INSERT INTO research_tasks ({TASK_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             RETURNING {TASK_COLUMNS}"
        ),
        params![
            id,
            new.session_id,
            new.tier,
            new.title,
            new.direction,
            new.target,
            new.learning,
            new.grounding_chunks,
            new.web_search_queries,
            new.urls_metadata,
            created_at,
            updated_at,
        ],
        task_from_row,
    )?;

    tracing::debug!(id = %task.id, session = %task.session_id, tier = task.tier, "task inserted");
    Ok(task)
}

/// All tasks of a session in insertion order.
pub fn list_tasks(conn: &Connection, session_id: &str) -> Result<Vec<ResearchTask>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM research_tasks WHERE session_id = ?1 ORDER BY rowid"
    ))?;
    let tasks = stmt
        .query_map(params![session_id], task_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::sessions::create_session;
    use crate::research::types::NewResearchSession;

    fn task(session_id: &str, tier: i64) -> NewResearchTask {
        NewResearchTask {
            session_id: session_id.into(),
            tier,
            title: format!("tier {tier}"),
            direction: "look wider".into(),
            target: "primary sources".into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_and_list_tasks() {
        let conn = crate::db::open_memory_database().unwrap();
        create_session(
            &conn,
            &NewResearchSession {
                id: Some("s1".into()),
                original_prompt: "p".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let first = create_task(&conn, &task("s1", 1)).unwrap();
        create_task(&conn, &task("s1", 2)).unwrap();

        assert_eq!(first.session_id, "s1");
        assert!(first.learning.is_none());

        let tasks = list_tasks(&conn, "s1").unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id, first.id);
        assert_eq!(tasks[1].tier, 2);
    }

    #[test]
    fn orphan_task_is_rejected() {
        let conn = crate::db::open_memory_database().unwrap();
        assert!(create_task(&conn, &task("missing", 1)).is_err());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM research_tasks", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
