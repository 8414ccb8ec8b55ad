//! Persistence seams for habits and users.
//!
//! Implemented by [`Database`](super::Database) for on-disk storage and by
//! [`MemoryStore`] for tests and throwaway sessions.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::{Result, TrackingError};
use crate::habit::{Habit, HabitInfo};

/// Per-user habit persistence.
pub trait HabitStore {
    /// Habit attributes for `user`, in creation order.
    fn load_habit_infos(&self, user: &str) -> Result<Vec<HabitInfo>>;

    /// Checkoff timestamps of one habit, oldest first.
    fn load_checkoffs(&self, user: &str, habit: &str) -> Result<Vec<NaiveDateTime>>;

    /// Insert the habit's attributes, or overwrite them if it already exists.
    /// Checkoffs are not touched.
    fn save_habit(&mut self, user: &str, habit: &Habit) -> Result<()>;

    /// Remove a habit together with its checkoffs.
    fn delete_habit(&mut self, user: &str, habit: &str) -> Result<()>;

    /// # Errors
    /// `DuplicateName` if the checkoff is already stored.
    fn add_checkoff_record(&mut self, user: &str, habit: &str, at: NaiveDateTime) -> Result<()>;

    fn delete_checkoff_record(&mut self, user: &str, habit: &str, at: NaiveDateTime)
        -> Result<()>;

    /// Store a new habit together with its checkoffs. If any write fails the
    /// habit is removed again.
    fn save_habit_with_checkoffs(&mut self, user: &str, habit: &Habit) -> Result<()> {
        self.save_habit(user, habit)?;
        for &at in habit.checkoffs() {
            if let Err(err) = self.add_checkoff_record(user, habit.name(), at) {
                if let Err(cleanup) = self.delete_habit(user, habit.name()) {
                    warn!(%user, habit = %habit.name(), error = %cleanup, "failed to drop partially saved habit");
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Fully hydrated habits for `user`.
    fn load_habits(&self, user: &str) -> Result<Vec<Habit>> {
        self.load_habit_infos(user)?
            .into_iter()
            .map(|info| {
                let checkoffs = self.load_checkoffs(user, &info.name)?;
                Ok(Habit::restore(info, checkoffs))
            })
            .collect()
    }
}

/// User accounts.
pub trait UserStore {
    /// # Errors
    /// `DuplicateName` if the user name is taken.
    fn register_user(&mut self, user: &str, password_digest: &str) -> Result<()>;

    fn password_digest(&self, user: &str) -> Result<Option<String>>;

    /// Remove the user with all their habits and checkoffs.
    fn delete_user(&mut self, user: &str) -> Result<()>;
}

/// Non-persistent store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: BTreeMap<String, String>,
    habits: Vec<(String, HabitInfo)>,
    checkoffs: BTreeSet<(String, String, NaiveDateTime)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn checkoff_count(&self, user: &str, habit: &str) -> usize {
        self.checkoffs
            .iter()
            .filter(|(u, h, _)| u == user && h == habit)
            .count()
    }
}

impl HabitStore for MemoryStore {
    fn load_habit_infos(&self, user: &str) -> Result<Vec<HabitInfo>> {
        Ok(self
            .habits
            .iter()
            .filter(|(owner, _)| owner == user)
            .map(|(_, info)| HabitInfo {
                checkoff_count: self.checkoff_count(user, &info.name),
                ..info.clone()
            })
            .collect())
    }

    fn load_checkoffs(&self, user: &str, habit: &str) -> Result<Vec<NaiveDateTime>> {
        Ok(self
            .checkoffs
            .iter()
            .filter(|(u, h, _)| u == user && h == habit)
            .map(|(_, _, at)| *at)
            .collect())
    }

    fn save_habit(&mut self, user: &str, habit: &Habit) -> Result<()> {
        let info = habit.info();
        match self
            .habits
            .iter_mut()
            .find(|(owner, existing)| owner == user && existing.name == info.name)
        {
            Some((_, existing)) => *existing = info,
            None => self.habits.push((user.to_string(), info)),
        }
        Ok(())
    }

    fn delete_habit(&mut self, user: &str, habit: &str) -> Result<()> {
        self.habits
            .retain(|(owner, info)| !(owner == user && info.name == habit));
        self.checkoffs.retain(|(u, h, _)| !(u == user && h == habit));
        Ok(())
    }

    fn add_checkoff_record(&mut self, user: &str, habit: &str, at: NaiveDateTime) -> Result<()> {
        if !self
            .checkoffs
            .insert((user.to_string(), habit.to_string(), at))
        {
            return Err(TrackingError::duplicate_checkoff(at).into());
        }
        Ok(())
    }

    fn delete_checkoff_record(
        &mut self,
        user: &str,
        habit: &str,
        at: NaiveDateTime,
    ) -> Result<()> {
        self.checkoffs
            .remove(&(user.to_string(), habit.to_string(), at));
        Ok(())
    }
}

impl UserStore for MemoryStore {
    fn register_user(&mut self, user: &str, password_digest: &str) -> Result<()> {
        if self.users.contains_key(user) {
            return Err(TrackingError::DuplicateName {
                kind: "User",
                name: user.to_string(),
            }
            .into());
        }
        self.users
            .insert(user.to_string(), password_digest.to_string());
        Ok(())
    }

    fn password_digest(&self, user: &str) -> Result<Option<String>> {
        Ok(self.users.get(user).cloned())
    }

    fn delete_user(&mut self, user: &str) -> Result<()> {
        self.users.remove(user);
        self.habits.retain(|(owner, _)| owner != user);
        self.checkoffs.retain(|(u, _, _)| u != user);
        Ok(())
    }
}
