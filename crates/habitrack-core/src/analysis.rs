//! Streak and success-rate primitives over sets of fulfilled periods.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackingError;
use crate::period::Periodicity;

/// How the period containing the analysis time is treated when it has not
/// been fulfilled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// The open period never breaks a streak: a run ending in the current or
    /// the immediately preceding period is still current.
    #[default]
    Grace,
    /// The current period must itself be fulfilled for a streak to be current.
    Strict,
}

impl FromStr for StreakPolicy {
    type Err = TrackingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grace" => Ok(StreakPolicy::Grace),
            "strict" => Ok(StreakPolicy::Strict),
            other => Err(TrackingError::InvalidValue {
                field: "streak_policy",
                message: format!("'{other}' is not one of grace, strict"),
            }),
        }
    }
}

impl fmt::Display for StreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreakPolicy::Grace => f.write_str("grace"),
            StreakPolicy::Strict => f.write_str("strict"),
        }
    }
}

/// Length of the longest run of consecutive periods.
pub fn longest_run(periods: &BTreeSet<i64>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<i64> = None;
    for &period in periods {
        run = match previous {
            Some(p) if p + 1 == period => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(period);
    }
    longest
}

/// Length of the run that is still alive at `current_period`.
///
/// Periods after `current_period` are ignored.
pub fn current_run(periods: &BTreeSet<i64>, current_period: i64, policy: StreakPolicy) -> u32 {
    let last = match periods.range(..=current_period).next_back() {
        Some(&last) => last,
        None => return 0,
    };
    let allowed_gap = match policy {
        StreakPolicy::Grace => 1,
        StreakPolicy::Strict => 0,
    };
    if current_period - last > allowed_gap {
        return 0;
    }

    let mut run = 0;
    let mut expected = last;
    for &period in periods.range(..=last).rev() {
        if period != expected {
            break;
        }
        run += 1;
        expected -= 1;
    }
    run
}

const MAX_RATE_DECIMALS: u32 = 15;

/// Fulfilled periods over elapsed periods, kept as an exact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRate {
    pub fulfilled: u32,
    pub elapsed: u32,
}

impl SuccessRate {
    /// `elapsed` is clamped to at least one period.
    pub fn new(fulfilled: u32, elapsed: u32) -> Self {
        let elapsed = elapsed.max(1);
        Self {
            fulfilled: fulfilled.min(elapsed),
            elapsed,
        }
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.fulfilled) / f64::from(self.elapsed)
    }

    /// Ratio rounded to `decimals` places. More than 15 places are treated
    /// as 15, the precision limit of an `f64`.
    pub fn rounded(&self, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals.min(MAX_RATE_DECIMALS) as i32);
        (self.ratio() * factor).round() / factor
    }

    /// Exact comparison of the two ratios.
    pub fn cmp_rate(&self, other: &SuccessRate) -> Ordering {
        let lhs = u64::from(self.fulfilled) * u64::from(other.elapsed);
        let rhs = u64::from(other.fulfilled) * u64::from(self.elapsed);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for SuccessRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fulfilled, self.elapsed)
    }
}

/// Streak and rate summary for one habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitAnalysis {
    pub name: String,
    pub periodicity: Periodicity,
    pub required_checkoffs: u32,
    pub max_streak: u32,
    pub current_streak: u32,
    pub success_rate: SuccessRate,
}
