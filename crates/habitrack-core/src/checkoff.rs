//! Checkoff filtering: mapping completion timestamps onto periods.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::TrackingError;
use crate::period::{period_index, Periodicity};

/// A checkoff together with the index of the period that contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCheckoff {
    pub timestamp: NaiveDateTime,
    pub period: i64,
}

/// Distinct indices of the periods holding at least one checkoff at or after
/// `start_date`.
///
/// # Errors
/// `InvalidRange` if a retained checkoff precedes `reference`.
pub fn distinct_periods(
    checkoffs: &[NaiveDateTime],
    periodicity: Periodicity,
    reference: NaiveDateTime,
    start_date: Option<NaiveDateTime>,
) -> Result<BTreeSet<i64>, TrackingError> {
    Ok(period_counts(checkoffs, periodicity, reference, start_date)?
        .into_keys()
        .collect())
}

/// Number of checkoffs per period, for checkoffs at or after `start_date`.
pub fn period_counts(
    checkoffs: &[NaiveDateTime],
    periodicity: Periodicity,
    reference: NaiveDateTime,
    start_date: Option<NaiveDateTime>,
) -> Result<BTreeMap<i64, u32>, TrackingError> {
    let mut counts = BTreeMap::new();
    for &checkoff in checkoffs {
        if start_date.is_some_and(|start| checkoff < start) {
            continue;
        }
        let period = period_index(checkoff, periodicity, reference)?;
        *counts.entry(period).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Periods whose checkoff count reaches `required`.
pub fn fulfilled_periods(counts: &BTreeMap<i64, u32>, required: u32) -> BTreeSet<i64> {
    counts
        .iter()
        .filter(|&(_, &count)| count >= required)
        .map(|(&period, _)| period)
        .collect()
}

/// Checkoffs within `[start, end]`; open bounds when `None`.
pub fn checkoffs_between(
    checkoffs: &[NaiveDateTime],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<NaiveDateTime> {
    checkoffs
        .iter()
        .copied()
        .filter(|c| start.map_or(true, |s| *c >= s) && end.map_or(true, |e| *c <= e))
        .collect()
}

/// Tag each checkoff at or after `start_date` with its period index.
pub fn tag_periods(
    checkoffs: &[NaiveDateTime],
    periodicity: Periodicity,
    reference: NaiveDateTime,
    start_date: Option<NaiveDateTime>,
    end_date: Option<NaiveDateTime>,
) -> Result<Vec<PeriodCheckoff>, TrackingError> {
    checkoffs_between(checkoffs, start_date, end_date)
        .into_iter()
        .map(|timestamp| {
            Ok(PeriodCheckoff {
                timestamp,
                period: period_index(timestamp, periodicity, reference)?,
            })
        })
        .collect()
}
