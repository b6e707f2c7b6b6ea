//! SQL DDL for the research tables.
//!
//! Defines `research_sessions`, `research_tasks`, `research_logs`, their
//! lookup indexes and `schema_meta`. All DDL uses `IF NOT EXISTS` for idempotent initialization.
//! Timestamps are integer seconds since the Unix epoch.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- One research run and its progressively written artifacts
CREATE TABLE IF NOT EXISTS research_sessions (
    id TEXT PRIMARY KEY,
    original_prompt TEXT NOT NULL,
    clarification_questions TEXT,
    clarification_answers TEXT,
    plan TEXT,
    data_collection TEXT,
    verbose_log TEXT,
    final_report TEXT,
    status TEXT NOT NULL DEFAULT 'in_progress',
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
);

-- Sub-tasks of a session's research plan
CREATE TABLE IF NOT EXISTS research_tasks (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES research_sessions(id) ON DELETE CASCADE,
    tier INTEGER NOT NULL,
    title TEXT NOT NULL,
    direction TEXT NOT NULL,
    target TEXT NOT NULL,
    learning TEXT,
    grounding_chunks TEXT,
    web_search_queries TEXT,
    urls_metadata TEXT,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
);

-- Events emitted while a session runs
CREATE TABLE IF NOT EXISTS research_logs (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES research_sessions(id) ON DELETE CASCADE,
    timestamp INTEGER NOT NULL,
    type TEXT NOT NULL,
    level TEXT NOT NULL,
    message TEXT NOT NULL,
    agent TEXT,
    phase TEXT,
    metadata TEXT,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);

CREATE INDEX IF NOT EXISTS idx_sessions_created ON research_sessions(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_session ON research_tasks(session_id);
CREATE INDEX IF NOT EXISTS idx_logs_session ON research_logs(session_id);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
