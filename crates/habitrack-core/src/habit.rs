//! The habit entity and its per-habit analysis.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{current_run, longest_run, HabitAnalysis, StreakPolicy, SuccessRate};
use crate::checkoff::{
    checkoffs_between, distinct_periods, fulfilled_periods, period_counts, tag_periods, PeriodCheckoff,
};
use crate::error::TrackingError;
use crate::period::{analysis_anchor, period_index, Periodicity};
use crate::timestamp::truncate_to_minute;

/// A tracked activity and its completion log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Habit {
    name: String,
    description: String,
    periodicity: Periodicity,
    required_checkoffs: u32,
    created_at: NaiveDateTime,
    /// Sorted ascending, no duplicates at minute resolution, none before
    /// `created_at`.
    checkoffs: Vec<NaiveDateTime>,
}

/// Editable habit attributes; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitUpdate {
    pub description: Option<String>,
    pub periodicity: Option<Periodicity>,
    pub required_checkoffs: Option<u32>,
}

/// Habit attributes without the checkoff log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitInfo {
    pub name: String,
    pub description: String,
    pub periodicity: Periodicity,
    pub required_checkoffs: u32,
    pub created_at: NaiveDateTime,
    pub checkoff_count: usize,
}

impl Habit {
    /// `created_at` is truncated to the minute.
    pub fn new(name: impl Into<String>, periodicity: Periodicity, created_at: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            periodicity,
            required_checkoffs: 1,
            created_at: truncate_to_minute(created_at),
            checkoffs: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Checkoffs needed for a period to count as fulfilled (at least 1).
    pub fn with_required_checkoffs(mut self, required: u32) -> Self {
        self.required_checkoffs = required.max(1);
        self
    }

    /// Rebuild a habit from stored records.
    ///
    /// Records that would violate the checkoff invariants are dropped.
    pub fn restore(
        info: HabitInfo,
        checkoffs: impl IntoIterator<Item = NaiveDateTime>,
    ) -> Self {
        let mut habit = Habit::new(info.name, info.periodicity, info.created_at)
            .with_description(info.description)
            .with_required_checkoffs(info.required_checkoffs);
        for checkoff in checkoffs {
            if let Err(err) = habit.add_checkoff(checkoff) {
                warn!(habit = %habit.name, %err, "dropping stored checkoff");
            }
        }
        habit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    pub fn required_checkoffs(&self) -> u32 {
        self.required_checkoffs
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// All checkoffs, oldest first.
    pub fn checkoffs(&self) -> &[NaiveDateTime] {
        &self.checkoffs
    }

    pub fn checkoffs_between(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Vec<NaiveDateTime> {
        checkoffs_between(&self.checkoffs, start, end)
    }

    pub fn info(&self) -> HabitInfo {
        HabitInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            periodicity: self.periodicity,
            required_checkoffs: self.required_checkoffs,
            created_at: self.created_at,
            checkoff_count: self.checkoffs.len(),
        }
    }

    /// Log a checkoff, truncated to the minute. Returns `false` if that
    /// minute is already logged, which leaves the habit unchanged.
    ///
    /// # Errors
    /// `InvalidRange` if `timestamp` precedes the habit's creation.
    pub fn add_checkoff(&mut self, timestamp: NaiveDateTime) -> Result<bool, TrackingError> {
        let timestamp = truncate_to_minute(timestamp);
        if timestamp < self.created_at {
            return Err(TrackingError::before(timestamp, self.created_at));
        }
        match self.checkoffs.binary_search(&timestamp) {
            Ok(_) => Ok(false),
            Err(pos) => {
                self.checkoffs.insert(pos, timestamp);
                Ok(true)
            }
        }
    }

    /// Whether a checkoff is logged in the same minute as `timestamp`.
    pub fn has_checkoff(&self, timestamp: NaiveDateTime) -> bool {
        self.checkoffs
            .binary_search(&truncate_to_minute(timestamp))
            .is_ok()
    }

    /// # Errors
    /// `NotFound` if no checkoff falls in the same minute as `timestamp`.
    pub fn remove_checkoff(&mut self, timestamp: NaiveDateTime) -> Result<(), TrackingError> {
        let timestamp = truncate_to_minute(timestamp);
        let pos = self
            .checkoffs
            .binary_search(&timestamp)
            .map_err(|_| TrackingError::checkoff_not_found(timestamp))?;
        self.checkoffs.remove(pos);
        Ok(())
    }

    pub fn update(&mut self, update: HabitUpdate) {
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(periodicity) = update.periodicity {
            self.periodicity = periodicity;
        }
        if let Some(required) = update.required_checkoffs {
            self.required_checkoffs = required.max(1);
        }
    }

    /// Current streak under the default policy.
    pub fn current_streak(&self, as_of: NaiveDateTime) -> Result<u32, TrackingError> {
        self.current_streak_with(as_of, StreakPolicy::default())
    }

    pub fn current_streak_with(
        &self,
        as_of: NaiveDateTime,
        policy: StreakPolicy,
    ) -> Result<u32, TrackingError> {
        Ok(self.analyze(as_of, None, policy)?.current_streak)
    }

    /// Longest run of consecutive fulfilled periods over the whole log.
    pub fn longest_streak(&self) -> u32 {
        longest_run(&self.fulfilled(self.anchor(None), None))
    }

    /// Fulfilled periods over periods elapsed from creation through `as_of`.
    pub fn success_rate(&self, as_of: NaiveDateTime) -> Result<SuccessRate, TrackingError> {
        Ok(self.analyze(as_of, None, StreakPolicy::default())?.success_rate)
    }

    /// Streaks and success rate as seen at `as_of`.
    ///
    /// With `since`, periods are re-anchored at that date (when it is later
    /// than creation) and earlier checkoffs are ignored. Checkoffs after
    /// `as_of` never count.
    ///
    /// # Errors
    /// `InvalidRange` if `as_of` precedes the analysis anchor.
    pub fn analyze(
        &self,
        as_of: NaiveDateTime,
        since: Option<NaiveDate>,
        policy: StreakPolicy,
    ) -> Result<HabitAnalysis, TrackingError> {
        let anchor = self.anchor(since);
        if as_of < self.created_at {
            return Err(TrackingError::before(as_of, self.created_at));
        }
        let current_period = period_index(as_of, self.periodicity, anchor)?;
        let periods = self.fulfilled(anchor, Some(as_of));

        let analysis = HabitAnalysis {
            name: self.name.clone(),
            periodicity: self.periodicity,
            required_checkoffs: self.required_checkoffs,
            max_streak: longest_run(&periods),
            current_streak: current_run(&periods, current_period, policy),
            success_rate: SuccessRate::new(periods.len() as u32, (current_period + 1) as u32),
        };
        debug!(
            habit = %self.name,
            %as_of,
            max_streak = analysis.max_streak,
            current_streak = analysis.current_streak,
            rate = %analysis.success_rate,
            "analyzed habit"
        );
        Ok(analysis)
    }

    /// Checkoffs from the analysis anchor up to `until`, tagged with their
    /// period index.
    pub fn checkoff_periods(
        &self,
        since: Option<NaiveDate>,
        until: Option<NaiveDateTime>,
    ) -> Result<Vec<PeriodCheckoff>, TrackingError> {
        let anchor = self.anchor(since);
        tag_periods(&self.checkoffs, self.periodicity, anchor, Some(anchor), until)
    }

    fn anchor(&self, since: Option<NaiveDate>) -> NaiveDateTime {
        analysis_anchor(self.created_at, since)
    }

    fn fulfilled(&self, anchor: NaiveDateTime, until: Option<NaiveDateTime>) -> BTreeSet<i64> {
        let window = checkoffs_between(&self.checkoffs, Some(anchor), until);
        // every checkoff in the window is at or after the anchor
        if self.required_checkoffs == 1 {
            return distinct_periods(&window, self.periodicity, anchor, None).unwrap_or_default();
        }
        let counts = period_counts(&window, self.periodicity, anchor, None).unwrap_or_default();
        fulfilled_periods(&counts, self.required_checkoffs)
    }
}
