//! Aggregations over groups of habits.
//!
//! Groups are usually homogeneous in periodicity; mixed groups are accepted
//! and compared as-is.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::analysis::{HabitAnalysis, StreakPolicy, SuccessRate};
use crate::error::TrackingError;
use crate::habit::Habit;
use crate::period::Periodicity;

/// The habit that wins a group comparison, with the winning value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLeader<T> {
    pub name: String,
    pub value: T,
}

/// Habit with the greatest longest streak; the first one wins ties.
pub fn max_longest_streak<'a, I>(habits: I) -> Result<GroupLeader<u32>, TrackingError>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let mut best: Option<(&Habit, u32)> = None;
    for habit in habits {
        let streak = habit.longest_streak();
        if best.map_or(true, |(_, value)| streak > value) {
            best = Some((habit, streak));
        }
    }
    best.map(|(habit, value)| GroupLeader {
        name: habit.name().to_string(),
        value,
    })
    .ok_or(TrackingError::EmptyCollection("max_longest_streak needs at least one habit"))
}

/// Habit with the lowest success rate at `as_of`; the first one wins ties.
pub fn min_success_rate<'a, I>(
    habits: I,
    as_of: NaiveDateTime,
) -> Result<GroupLeader<SuccessRate>, TrackingError>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let mut worst: Option<(&Habit, SuccessRate)> = None;
    for habit in habits {
        let rate = habit.success_rate(as_of)?;
        if worst.map_or(true, |(_, value)| rate.cmp_rate(&value) == Ordering::Less) {
            worst = Some((habit, rate));
        }
    }
    worst
        .map(|(habit, value)| GroupLeader {
            name: habit.name().to_string(),
            value,
        })
        .ok_or(TrackingError::EmptyCollection("min_success_rate needs at least one habit"))
}

/// Partition by periodicity, keeping input order inside each partition.
pub fn group_by_periodicity<'a, I>(habits: I) -> BTreeMap<Periodicity, Vec<&'a Habit>>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let mut groups: BTreeMap<Periodicity, Vec<&Habit>> = BTreeMap::new();
    for habit in habits {
        groups.entry(habit.periodicity()).or_default().push(habit);
    }
    groups
}

/// Habits matching the given periodicity and, if set, required checkoffs.
pub fn filter_habits<'a, I>(
    habits: I,
    periodicity: Periodicity,
    required_checkoffs: Option<u32>,
) -> Vec<&'a Habit>
where
    I: IntoIterator<Item = &'a Habit>,
{
    habits
        .into_iter()
        .filter(|h| h.periodicity() == periodicity)
        .filter(|h| required_checkoffs.map_or(true, |r| h.required_checkoffs() == r))
        .collect()
}

/// Analysis row for every habit, in input order.
pub fn analyze_group<'a, I>(
    habits: I,
    as_of: NaiveDateTime,
    since: Option<NaiveDate>,
    policy: StreakPolicy,
) -> Result<Vec<HabitAnalysis>, TrackingError>
where
    I: IntoIterator<Item = &'a Habit>,
{
    habits
        .into_iter()
        .map(|habit| habit.analyze(as_of, since, policy))
        .collect()
}

/// Habits with a current streak at `as_of`, with its length.
pub fn active_streaks<'a, I>(
    habits: I,
    as_of: NaiveDateTime,
    policy: StreakPolicy,
) -> Result<Vec<GroupLeader<u32>>, TrackingError>
where
    I: IntoIterator<Item = &'a Habit>,
{
    let mut active = Vec::new();
    for habit in habits {
        let streak = habit.current_streak_with(as_of, policy)?;
        if streak > 0 {
            active.push(GroupLeader {
                name: habit.name().to_string(),
                value: streak,
            });
        }
    }
    Ok(active)
}
