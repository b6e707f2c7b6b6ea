//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta`. Databases created by
//! [`init_schema`](super::schema::init_schema) start at version 1; each later
//! [`Migration`] moves them one version forward.

use rusqlite::Connection;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// One forward step. `sql` brings a database at `version - 1` to `version`.
pub struct Migration {
    pub version: u32,
    pub sql: &'static str,
}

/// Steps after the base schema, oldest first.
const MIGRATIONS: &[Migration] = &[];

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations.
pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let version = get_schema_version(conn)?;
    if version > CURRENT_SCHEMA_VERSION {
        tracing::warn!(
            schema_version = version,
            supported = CURRENT_SCHEMA_VERSION,
            "database schema is newer than this binary"
        );
        return Ok(());
    }
    apply_migrations(conn, MIGRATIONS)
}

/// Apply every step newer than the stored version. Each step and its version
/// bump commit together or not at all.
fn apply_migrations(conn: &Connection, migrations: &[Migration]) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    let start = version;
    for migration in migrations.iter().filter(|m| m.version > start) {
        tracing::info!(from = version, to = migration.version, "running migration");

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        update_schema_version(&tx, migration.version)?;
        tx.commit()?;

        version = migration.version;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count > 0
    }

    #[test]
    fn get_schema_version_returns_1_on_fresh_db() {
        let conn = test_db();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn run_migrations_keeps_current_version() {
        let conn = test_db();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn pending_steps_apply_in_order() {
        let conn = test_db();
        let steps = [
            Migration {
                version: 2,
                sql: "CREATE TABLE research_tags (session_id TEXT, tag TEXT);",
            },
            Migration {
                version: 3,
                sql: "CREATE INDEX idx_tags_session ON research_tags(session_id);",
            },
        ];

        apply_migrations(&conn, &steps).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 3);
        assert!(table_exists(&conn, "research_tags"));

        // already applied steps are skipped
        apply_migrations(&conn, &steps).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 3);
    }

    #[test]
    fn failed_step_rolls_back_with_its_version() {
        let conn = test_db();
        let steps = [Migration {
            version: 2,
            sql: "CREATE TABLE research_tags (tag TEXT); INSERT INTO no_such_table VALUES (1);",
        }];

        assert!(apply_migrations(&conn, &steps).is_err());
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
        assert!(!table_exists(&conn, "research_tags"));
    }

    #[test]
    fn newer_database_is_left_alone() {
        let conn = test_db();
        update_schema_version(&conn, CURRENT_SCHEMA_VERSION + 5).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION + 5);
    }
}
