//! Periodicity and period index arithmetic.
//!
//! Periods are fixed-length windows anchored at a reference timestamp
//! (normally the midnight of a habit's creation day), so period boundaries
//! never move when the analysis runs at a different time.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::TrackingError;

/// How often a habit is expected to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 4] = [
        Periodicity::Daily,
        Periodicity::Weekly,
        Periodicity::Biweekly,
        Periodicity::Monthly,
    ];

    /// Length of one period in days. Monthly is a fixed 30-day window.
    pub fn length_days(self) -> i64 {
        match self {
            Periodicity::Daily => 1,
            Periodicity::Weekly => 7,
            Periodicity::Biweekly => 14,
            Periodicity::Monthly => 30,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.length_days())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
            Periodicity::Biweekly => "biweekly",
            Periodicity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            "biweekly" => Ok(Periodicity::Biweekly),
            "monthly" => Ok(Periodicity::Monthly),
            other => Err(TrackingError::InvalidValue {
                field: "periodicity",
                message: format!("'{other}' is not one of daily, weekly, biweekly, monthly"),
            }),
        }
    }
}

/// Number of days in one period of `periodicity`.
pub fn period_length_days(periodicity: Periodicity) -> i64 {
    periodicity.length_days()
}

/// Index of the period containing `timestamp`, counted in whole periods
/// from `reference`.
///
/// # Errors
/// `InvalidRange` when `timestamp` precedes `reference`.
pub fn period_index(
    timestamp: NaiveDateTime,
    periodicity: Periodicity,
    reference: NaiveDateTime,
) -> Result<i64, TrackingError> {
    if timestamp < reference {
        return Err(TrackingError::before(timestamp, reference));
    }
    let elapsed = (timestamp - reference).num_seconds();
    Ok(elapsed / periodicity.duration().num_seconds())
}

/// Midnight of the later of `created_at` and `since`.
///
/// A `since` earlier than creation is ignored.
pub fn analysis_anchor(created_at: NaiveDateTime, since: Option<NaiveDate>) -> NaiveDateTime {
    let created = created_at.date();
    let day = match since {
        Some(since) if since > created => since,
        _ => created,
    };
    day.and_time(NaiveTime::MIN)
}
