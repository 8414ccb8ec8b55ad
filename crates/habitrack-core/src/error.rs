//! Core error types for habitrack-core.
//!
//! Domain failures (`TrackingError`) are kept separate from infrastructure
//! failures (database, configuration, I/O) so the presentation layer can
//! render the former as user-facing messages.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Core error type for habitrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid operation on the habit model
    #[error(transparent)]
    Tracking(#[from] TrackingError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Violated preconditions of tracking and analysis operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackingError {
    /// A timestamp lies outside the window an operation accepts.
    #[error("Invalid range: {timestamp} {relation} {reference}")]
    InvalidRange {
        timestamp: NaiveDateTime,
        relation: &'static str,
        reference: NaiveDateTime,
    },

    /// Referenced habit or checkoff does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Habit or user name already taken
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// Group operation on zero habits
    #[error("Empty collection: {0}")]
    EmptyCollection(&'static str),

    /// Rejected field value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl TrackingError {
    /// `timestamp` precedes `reference`.
    pub fn before(timestamp: NaiveDateTime, reference: NaiveDateTime) -> Self {
        TrackingError::InvalidRange {
            timestamp,
            relation: "is before",
            reference,
        }
    }

    /// `timestamp` is later than `reference`.
    pub fn after(timestamp: NaiveDateTime, reference: NaiveDateTime) -> Self {
        TrackingError::InvalidRange {
            timestamp,
            relation: "is after",
            reference,
        }
    }

    pub fn habit_not_found(name: &str) -> Self {
        TrackingError::NotFound {
            kind: "Habit",
            key: name.to_string(),
        }
    }

    pub fn checkoff_not_found(timestamp: NaiveDateTime) -> Self {
        TrackingError::NotFound {
            kind: "Checkoff",
            key: timestamp.to_string(),
        }
    }

    pub fn duplicate_checkoff(timestamp: NaiveDateTime) -> Self {
        TrackingError::DuplicateName {
            kind: "Checkoff",
            name: timestamp.to_string(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be turned back into a domain value
    #[error("Corrupt record in '{table}': {message}")]
    CorruptRecord { table: &'static str, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials for user '{0}'")]
    InvalidCredentials(String),

    #[error("No user given; pass --user or set HABITRACK_USER")]
    MissingUser,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl CoreError {
    /// The domain error, if this is one.
    pub fn as_tracking(&self) -> Option<&TrackingError> {
        match self {
            CoreError::Tracking(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
