//! # Habitrack Core Library
//!
//! This library provides the core logic for habitrack, a periodic habit
//! tracker. All operations are exposed through the standalone `habitrack`
//! CLI, which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Periods**: timestamps map to integer period indices relative to a
//!   habit's analysis anchor
//! - **Analysis**: streaks and success rates computed over fulfilled periods,
//!   for single habits and for groups
//! - **Session**: a user's habits, written through to a store
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`Habit`]: Habit entity and its checkoff log
//! - [`Session`]: Per-user habit collection
//! - [`Database`]: Habit and account persistence
//! - [`Config`]: Application configuration management
//!
//! "Now" is never read from the clock here; every time-dependent operation
//! takes it as a parameter.

pub mod analysis;
pub mod auth;
pub mod checkoff;
pub mod demo;
pub mod error;
pub mod group;
pub mod habit;
pub mod period;
pub mod session;
pub mod storage;
pub mod timestamp;

pub use analysis::{HabitAnalysis, StreakPolicy, SuccessRate};
pub use error::{AuthError, ConfigError, CoreError, DatabaseError, TrackingError};
pub use group::GroupLeader;
pub use habit::{Habit, HabitInfo, HabitUpdate};
pub use period::Periodicity;
pub use session::Session;
pub use storage::{Config, Database, HabitStore, MemoryStore, UserStore};
