pub mod analyze;
pub mod checkoff;
pub mod config;
pub mod demo;
pub mod habit;
pub mod user;

use std::error::Error;

use chrono::NaiveDateTime;
use habitrack_core::timestamp::truncate_to_minute;
use habitrack_core::{auth, AuthError, Database, Session};
use serde::Serialize;

/// Account given through the global `--user` / `--password` options.
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn user(&self) -> Result<&str, AuthError> {
        self.user.as_deref().ok_or(AuthError::MissingUser)
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Open the database and log in.
    pub fn session(&self) -> Result<Session<Database>, Box<dyn Error>> {
        let user = self.user()?;
        let db = Database::open()?;
        auth::login(&db, user, self.password())?;
        Ok(Session::login(db, user)?)
    }
}

/// Local wall-clock time to the minute; the only place the CLI reads the
/// clock.
pub fn now() -> NaiveDateTime {
    truncate_to_minute(chrono::Local::now().naive_local())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
