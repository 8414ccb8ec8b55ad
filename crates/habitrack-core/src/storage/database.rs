//! SQLite-backed habit and user storage.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so that lexical order
//! equals chronological order.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::data_dir;
use super::migrations;
use super::store::{HabitStore, UserStore};
use crate::error::{DatabaseError, Result, TrackingError};
use crate::habit::{Habit, HabitInfo};
use crate::period::Periodicity;
use crate::timestamp::{format_timestamp, STORAGE_FORMAT};

/// SQLite database holding users, habits and checkoffs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/habitrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("habitrack.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened database");
        Self::with_connection(conn)
    }

    /// Open a fresh in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn parse_stored(table: &'static str, value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, STORAGE_FORMAT).map_err(|e| DatabaseError::CorruptRecord {
        table,
        message: format!("bad timestamp '{value}': {e}"),
    })
}

impl HabitStore for Database {
    fn load_habit_infos(&self, user: &str) -> Result<Vec<HabitInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT h.habit_name, h.description, h.periodicity, h.required_checkoffs, h.created_at,
                    (SELECT COUNT(*) FROM checkoffs c
                      WHERE c.user_name = h.user_name AND c.habit_name = h.habit_name)
             FROM habits h
             WHERE h.user_name = ?1
             ORDER BY h.rowid",
        )?;
        let rows = stmt.query_map(params![user], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut infos = Vec::new();
        for row in rows {
            let (name, description, periodicity, required, created_at, count) = row?;
            let periodicity: Periodicity =
                periodicity
                    .parse()
                    .map_err(|e: TrackingError| DatabaseError::CorruptRecord {
                        table: "habits",
                        message: e.to_string(),
                    })?;
            infos.push(HabitInfo {
                name,
                description,
                periodicity,
                required_checkoffs: required,
                created_at: parse_stored("habits", &created_at)?,
                checkoff_count: count as usize,
            });
        }
        Ok(infos)
    }

    fn load_checkoffs(&self, user: &str, habit: &str) -> Result<Vec<NaiveDateTime>> {
        let mut stmt = self.conn.prepare(
            "SELECT checkoff FROM checkoffs
             WHERE user_name = ?1 AND habit_name = ?2
             ORDER BY checkoff",
        )?;
        let rows = stmt.query_map(params![user, habit], |row| row.get::<_, String>(0))?;

        let mut checkoffs = Vec::new();
        for row in rows {
            let raw = row?;
            match parse_stored("checkoffs", &raw) {
                Ok(ts) => checkoffs.push(ts),
                Err(err) => warn!(%user, %habit, %err, "skipping stored checkoff"),
            }
        }
        Ok(checkoffs)
    }

    fn save_habit(&mut self, user: &str, habit: &Habit) -> Result<()> {
        upsert_habit(&self.conn, user, habit)
    }

    fn save_habit_with_checkoffs(&mut self, user: &str, habit: &Habit) -> Result<()> {
        let tx = self.conn.transaction()?;
        upsert_habit(&tx, user, habit)?;
        for &at in habit.checkoffs() {
            insert_checkoff(&tx, user, habit.name(), at)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_habit(&mut self, user: &str, habit: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM checkoffs WHERE user_name = ?1 AND habit_name = ?2",
            params![user, habit],
        )?;
        tx.execute(
            "DELETE FROM habits WHERE user_name = ?1 AND habit_name = ?2",
            params![user, habit],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn add_checkoff_record(&mut self, user: &str, habit: &str, at: NaiveDateTime) -> Result<()> {
        insert_checkoff(&self.conn, user, habit, at)
    }

    fn delete_checkoff_record(
        &mut self,
        user: &str,
        habit: &str,
        at: NaiveDateTime,
    ) -> Result<()> {
        self.conn.execute(
            "DELETE FROM checkoffs WHERE user_name = ?1 AND habit_name = ?2 AND checkoff = ?3",
            params![user, habit, format_timestamp(at)],
        )?;
        Ok(())
    }
}

fn upsert_habit(conn: &Connection, user: &str, habit: &Habit) -> Result<()> {
    conn.execute(
        "INSERT INTO habits (user_name, habit_name, periodicity, description, created_at, required_checkoffs)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_name, habit_name) DO UPDATE SET
            periodicity = excluded.periodicity,
            description = excluded.description,
            required_checkoffs = excluded.required_checkoffs",
        params![
            user,
            habit.name(),
            habit.periodicity().as_str(),
            habit.description(),
            format_timestamp(habit.created_at()),
            habit.required_checkoffs(),
        ],
    )?;
    Ok(())
}

fn insert_checkoff(conn: &Connection, user: &str, habit: &str, at: NaiveDateTime) -> Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO checkoffs (user_name, habit_name, checkoff) VALUES (?1, ?2, ?3)",
        params![user, habit, format_timestamp(at)],
    )?;
    if inserted == 0 {
        return Err(TrackingError::duplicate_checkoff(at).into());
    }
    Ok(())
}

impl UserStore for Database {
    fn register_user(&mut self, user: &str, password_digest: &str) -> Result<()> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (user_name, password) VALUES (?1, ?2)",
            params![user, password_digest],
        )?;
        if inserted == 0 {
            return Err(TrackingError::DuplicateName {
                kind: "User",
                name: user.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn password_digest(&self, user: &str) -> Result<Option<String>> {
        let digest = self
            .conn
            .query_row(
                "SELECT password FROM users WHERE user_name = ?1",
                params![user],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(digest)
    }

    fn delete_user(&mut self, user: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM checkoffs WHERE user_name = ?1", params![user])?;
        tx.execute("DELETE FROM habits WHERE user_name = ?1", params![user])?;
        tx.execute("DELETE FROM users WHERE user_name = ?1", params![user])?;
        tx.commit()?;
        Ok(())
    }
}
