//! Database schema migrations for habitrack.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{info, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "migrated database schema");
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version; 0 for a fresh database.
pub(crate) fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: users, habits and checkoffs.
///
/// Names are the keys: a habit is identified by (user, name), a checkoff by
/// (user, habit, timestamp).
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            user_name TEXT PRIMARY KEY,
            password  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habits (
            user_name   TEXT NOT NULL,
            habit_name  TEXT NOT NULL,
            periodicity TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL,
            required_checkoffs INTEGER NOT NULL DEFAULT 1,
            PRIMARY KEY (user_name, habit_name)
        );

        CREATE TABLE IF NOT EXISTS checkoffs (
            user_name  TEXT NOT NULL,
            habit_name TEXT NOT NULL,
            checkoff   TEXT NOT NULL,
            PRIMARY KEY (user_name, habit_name, checkoff)
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        conn.execute(
            "INSERT INTO habits (user_name, habit_name, periodicity, created_at)
             VALUES ('u', 'read', 'daily', '2024-01-01 00:00:00')",
            [],
        )
        .unwrap();
        let required: i64 = conn
            .query_row("SELECT required_checkoffs FROM habits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(required, 1);
    }

    #[test]
    fn migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn rerun_keeps_rows() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO habits (user_name, habit_name, periodicity, created_at, required_checkoffs)
             VALUES ('u', 'restock', 'biweekly', '2023-12-01 00:00:00', 3)",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let (name, required): (String, i64) = conn
            .query_row(
                "SELECT habit_name, required_checkoffs FROM habits",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(name, "restock");
        assert_eq!(required, 3);
        assert_eq!(get_schema_version(&conn), 1);
    }
}
