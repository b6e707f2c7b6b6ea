use deep_research::db;
use tempfile::TempDir;

#[test]
fn open_database_creates_file_and_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("research.db");

    let conn = db::open_database(&path).unwrap();
    assert!(path.exists());

    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    for expected in ["research_logs", "research_sessions", "research_tasks", "schema_meta"] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

#[test]
fn open_database_sets_pragmas() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("research.db")).unwrap();

    let journal: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(journal.to_lowercase(), "wal");

    let fk: i64 = conn
        .pragma_query_value(None, "foreign_keys", |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);

    let busy: i64 = conn
        .pragma_query_value(None, "busy_timeout", |row| row.get(0))
        .unwrap();
    assert_eq!(busy, 5000);
}

#[test]
fn reopening_keeps_existing_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("research.db");

    {
        let conn = db::open_database(&path).unwrap();
        conn.execute(
            "INSERT INTO research_sessions (id, original_prompt) VALUES ('s1', 'p')",
            [],
        )
        .unwrap();
    }

    let conn = db::open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM research_sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn session_defaults_are_filled_by_sqlite() {
    let conn = db::open_memory_database().unwrap();
    conn.execute(
        "INSERT INTO research_sessions (id, original_prompt) VALUES ('s1', 'p')",
        [],
    )
    .unwrap();

    let (status, created, updated): (String, i64, i64) = conn
        .query_row(
            "SELECT status, created_at, updated_at FROM research_sessions WHERE id = 's1'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .unwrap();
    assert_eq!(status, "in_progress");
    assert!(created > 0);
    assert_eq!(created, updated);
}
