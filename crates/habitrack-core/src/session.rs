//! A logged-in user's habits, kept in sync with a [`HabitStore`].

use chrono::NaiveDateTime;
use tracing::info;

use crate::error::{Result, TrackingError};
use crate::group::filter_habits;
use crate::habit::{Habit, HabitUpdate};
use crate::period::Periodicity;
use crate::storage::HabitStore;
use crate::timestamp::truncate_to_minute;

/// Owns one user's habits. Every mutation is written through to the store.
pub struct Session<S: HabitStore> {
    user: String,
    store: S,
    habits: Vec<Habit>,
    allow_future_checkoffs: bool,
}

impl<S: HabitStore> Session<S> {
    /// Load `user`'s habits from `store`.
    pub fn login(store: S, user: impl Into<String>) -> Result<Self> {
        let user = user.into();
        let habits = store.load_habits(&user)?;
        info!(%user, habits = habits.len(), "logged in");
        Ok(Self {
            user,
            store,
            habits,
            allow_future_checkoffs: false,
        })
    }

    /// Accept checkoffs later than the `now` passed to [`Session::check_off`].
    pub fn allow_future_checkoffs(mut self, allow: bool) -> Self {
        self.allow_future_checkoffs = allow;
        self
    }

    /// Drop the in-memory habits and hand the store back.
    pub fn logout(self) -> S {
        info!(user = %self.user, "logged out");
        self.store
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn habit_names(&self) -> Vec<&str> {
        self.habits.iter().map(Habit::name).collect()
    }

    /// # Errors
    /// `NotFound` if the user has no habit called `name`.
    pub fn habit(&self, name: &str) -> Result<&Habit> {
        self.habits
            .iter()
            .find(|h| h.name() == name)
            .ok_or_else(|| TrackingError::habit_not_found(name).into())
    }

    fn habit_mut(&mut self, name: &str) -> Result<&mut Habit, TrackingError> {
        self.habits
            .iter_mut()
            .find(|h| h.name() == name)
            .ok_or_else(|| TrackingError::habit_not_found(name))
    }

    pub fn habits_with(&self, periodicity: Periodicity, required_checkoffs: Option<u32>) -> Vec<&Habit> {
        filter_habits(&self.habits, periodicity, required_checkoffs)
    }

    /// Add a habit, persisting it with any checkoffs it already carries.
    /// Nothing is kept if the store rejects any part of it.
    ///
    /// # Errors
    /// `DuplicateName` if the name is taken, `InvalidValue` if it is blank.
    pub fn create_habit(&mut self, habit: Habit) -> Result<()> {
        if habit.name().trim().is_empty() {
            return Err(TrackingError::InvalidValue {
                field: "name",
                message: "habit name must not be empty".into(),
            }
            .into());
        }
        if self.habits.iter().any(|h| h.name() == habit.name()) {
            return Err(TrackingError::DuplicateName {
                kind: "Habit",
                name: habit.name().to_string(),
            }
            .into());
        }

        self.store.save_habit_with_checkoffs(&self.user, &habit)?;
        info!(user = %self.user, habit = %habit.name(), periodicity = %habit.periodicity(), "created habit");
        self.habits.push(habit);
        Ok(())
    }

    /// Remove a habit and all its checkoffs, returning it.
    pub fn delete_habit(&mut self, name: &str) -> Result<Habit> {
        let pos = self
            .habits
            .iter()
            .position(|h| h.name() == name)
            .ok_or_else(|| TrackingError::habit_not_found(name))?;
        self.store.delete_habit(&self.user, name)?;
        info!(user = %self.user, habit = %name, "deleted habit");
        Ok(self.habits.remove(pos))
    }

    pub fn update_habit(&mut self, name: &str, update: HabitUpdate) -> Result<&Habit> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.name() == name)
            .ok_or_else(|| TrackingError::habit_not_found(name))?;
        let mut edited = self.habits[idx].clone();
        edited.update(update);
        self.store.save_habit(&self.user, &edited)?;
        info!(user = %self.user, habit = %name, "updated habit");
        self.habits[idx] = edited;
        Ok(&self.habits[idx])
    }

    /// Log a checkoff at `at`, truncated to the minute. Returns `false` if
    /// that minute was already logged.
    ///
    /// # Errors
    /// `NotFound` for an unknown habit; `InvalidRange` when `at` precedes the
    /// habit's creation, or lies after `now` and future checkoffs are not
    /// allowed.
    pub fn check_off(&mut self, name: &str, at: NaiveDateTime, now: NaiveDateTime) -> Result<bool> {
        let at = truncate_to_minute(at);
        if at > now && !self.allow_future_checkoffs {
            return Err(TrackingError::after(at, now).into());
        }
        let user = self.user.clone();
        let habit = self.habit_mut(name)?;
        if !habit.add_checkoff(at)? {
            return Ok(false);
        }
        if let Err(err) = self.store.add_checkoff_record(&user, name, at) {
            // keep memory and store in step
            let _ = self.habit_mut(name).map(|h| h.remove_checkoff(at));
            return Err(err);
        }
        info!(%user, habit = %name, %at, "checked off");
        Ok(true)
    }

    /// Remove the checkoff logged in the same minute as `at`. The habit is
    /// left unchanged if the store fails.
    pub fn remove_checkoff(&mut self, name: &str, at: NaiveDateTime) -> Result<()> {
        let at = truncate_to_minute(at);
        if !self.habit(name)?.has_checkoff(at) {
            return Err(TrackingError::checkoff_not_found(at).into());
        }
        let user = self.user.clone();
        self.store.delete_checkoff_record(&user, name, at)?;
        self.habit_mut(name)?.remove_checkoff(at)?;
        info!(%user, habit = %name, %at, "removed checkoff");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::habit::HabitInfo;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    /// Memory store whose checkoff writes fail on demand.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_checkoff_writes: bool,
    }

    impl FlakyStore {
        fn check(&self) -> Result<()> {
            if self.fail_checkoff_writes {
                return Err(std::io::Error::other("disk full").into());
            }
            Ok(())
        }
    }

    impl HabitStore for FlakyStore {
        fn load_habit_infos(&self, user: &str) -> Result<Vec<HabitInfo>> {
            self.inner.load_habit_infos(user)
        }

        fn load_checkoffs(&self, user: &str, habit: &str) -> Result<Vec<NaiveDateTime>> {
            self.inner.load_checkoffs(user, habit)
        }

        fn save_habit(&mut self, user: &str, habit: &Habit) -> Result<()> {
            self.inner.save_habit(user, habit)
        }

        fn delete_habit(&mut self, user: &str, habit: &str) -> Result<()> {
            self.inner.delete_habit(user, habit)
        }

        fn add_checkoff_record(&mut self, user: &str, habit: &str, at: NaiveDateTime) -> Result<()> {
            self.check()?;
            self.inner.add_checkoff_record(user, habit, at)
        }

        fn delete_checkoff_record(
            &mut self,
            user: &str,
            habit: &str,
            at: NaiveDateTime,
        ) -> Result<()> {
            self.check()?;
            self.inner.delete_checkoff_record(user, habit, at)
        }
    }

    fn session() -> Session<MemoryStore> {
        let mut session = Session::login(MemoryStore::new(), "ann").unwrap();
        session
            .create_habit(Habit::new("read", Periodicity::Daily, at(1, 0)))
            .unwrap();
        session
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut session = session();
        let err = session
            .create_habit(Habit::new("read", Periodicity::Weekly, at(1, 0)))
            .unwrap_err();
        assert!(matches!(
            err.as_tracking(),
            Some(TrackingError::DuplicateName { kind: "Habit", .. })
        ));
        assert_eq!(session.habits().len(), 1);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut session = session();
        assert!(matches!(
            session.create_habit(Habit::new("  ", Periodicity::Daily, at(1, 0))),
            Err(CoreError::Tracking(TrackingError::InvalidValue { field: "name", .. }))
        ));
    }

    #[test]
    fn mutations_survive_logout_and_login() {
        let mut session = session();
        assert!(session.check_off("read", at(2, 8), at(3, 0)).unwrap());
        assert!(!session.check_off("read", at(2, 8), at(3, 0)).unwrap());
        session.check_off("read", at(3, 8), at(3, 9)).unwrap();
        session.remove_checkoff("read", at(3, 8)).unwrap();
        session
            .update_habit(
                "read",
                HabitUpdate {
                    description: Some("20 pages".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let store = session.logout();
        let session = Session::login(store, "ann").unwrap();
        let habit = session.habit("read").unwrap();
        assert_eq!(habit.checkoffs(), &[at(2, 8)]);
        assert_eq!(habit.description(), "20 pages");
    }

    #[test]
    fn checkoffs_in_one_minute_are_stored_once() {
        let mut session = session();
        let first = at(2, 8) + chrono::Duration::milliseconds(7_257);
        let second = at(2, 8) + chrono::Duration::milliseconds(7_264);
        assert!(session.check_off("read", first, at(3, 0)).unwrap());
        assert!(!session.check_off("read", second, at(3, 0)).unwrap());
        assert_eq!(session.store().load_checkoffs("ann", "read").unwrap(), vec![at(2, 8)]);

        session.remove_checkoff("read", second).unwrap();
        assert!(session.store().load_checkoffs("ann", "read").unwrap().is_empty());
        assert!(session.habit("read").unwrap().checkoffs().is_empty());
    }

    #[test]
    fn failed_store_write_leaves_habit_unchanged() {
        let mut session = Session::login(FlakyStore::default(), "ann").unwrap();
        session
            .create_habit(Habit::new("read", Periodicity::Daily, at(1, 0)))
            .unwrap();
        session.check_off("read", at(2, 8), at(3, 0)).unwrap();

        session.store.fail_checkoff_writes = true;
        assert!(session.remove_checkoff("read", at(2, 8)).is_err());
        assert!(session.check_off("read", at(3, 8), at(4, 0)).is_err());
        assert_eq!(session.habit("read").unwrap().checkoffs(), &[at(2, 8)]);

        session.store.fail_checkoff_writes = false;
        let store = session.logout();
        let session = Session::login(store, "ann").unwrap();
        assert_eq!(session.habit("read").unwrap().checkoffs(), &[at(2, 8)]);
    }

    #[test]
    fn failed_create_leaves_nothing_behind() {
        let mut session = Session::login(
            FlakyStore {
                fail_checkoff_writes: true,
                ..Default::default()
            },
            "ann",
        )
        .unwrap();
        let mut habit = Habit::new("read", Periodicity::Daily, at(1, 0));
        habit.add_checkoff(at(2, 8)).unwrap();
        assert!(session.create_habit(habit).is_err());
        assert!(session.habit_names().is_empty());
        assert!(session.store().load_habit_infos("ann").unwrap().is_empty());
    }

    #[test]
    fn future_checkoffs_need_opt_in() {
        let mut session = session();
        let err = session.check_off("read", at(5, 0), at(4, 0)).unwrap_err();
        assert!(matches!(
            err.as_tracking(),
            Some(TrackingError::InvalidRange { relation: "is after", .. })
        ));
        let mut session = session.allow_future_checkoffs(true);
        assert!(session.check_off("read", at(5, 0), at(4, 0)).unwrap());
    }

    #[test]
    fn unknown_habit_is_not_found() {
        let mut session = session();
        assert!(session.habit("run").is_err());
        assert!(session.check_off("run", at(2, 0), at(2, 0)).is_err());
        assert!(session.delete_habit("run").is_err());
        assert!(session.remove_checkoff("read", at(2, 0)).is_err());
    }

    #[test]
    fn delete_removes_from_store() {
        let mut session = session();
        session.check_off("read", at(2, 8), at(2, 9)).unwrap();
        let removed = session.delete_habit("read").unwrap();
        assert_eq!(removed.checkoffs().len(), 1);
        assert!(session.habit_names().is_empty());
        assert!(session.store().load_habits("ann").unwrap().is_empty());
    }

    #[test]
    fn sessions_are_per_user() {
        let session = session();
        let store = session.logout();
        let other = Session::login(store, "bob").unwrap();
        assert!(other.habits().is_empty());
    }

    #[test]
    fn habits_with_filters() {
        let mut session = session();
        session
            .create_habit(Habit::new("climb", Periodicity::Weekly, at(1, 0)))
            .unwrap();
        let weekly: Vec<&str> = session
            .habits_with(Periodicity::Weekly, None)
            .into_iter()
            .map(|h| h.name())
            .collect();
        assert_eq!(weekly, vec!["climb"]);
    }
}
