use chrono::{NaiveDate, NaiveDateTime};
use clap::{Subcommand, ValueEnum};
use habitrack_core::group::{active_streaks, analyze_group, max_longest_streak, min_success_rate};
use habitrack_core::timestamp::{parse_date, parse_timestamp};
use habitrack_core::{Config, GroupLeader, Habit, HabitAnalysis, Periodicity, StreakPolicy};
use serde::Serialize;

use super::{now, print_json, Credentials};

#[derive(Subcommand)]
pub enum AnalyzeAction {
    /// Streaks and success rate of one habit
    Habit {
        name: String,
        /// Count only checkoffs from this day on, with periods anchored there
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        /// Analysis time (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        as_of: Option<NaiveDateTime>,
        /// Overrides analysis.streak_policy
        #[arg(long)]
        policy: Option<StreakPolicy>,
    },
    /// Compare a group of habits
    Group {
        /// Restrict the group to one periodicity
        #[arg(long, short)]
        periodicity: Option<Periodicity>,
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        #[arg(long, value_parser = parse_timestamp)]
        as_of: Option<NaiveDateTime>,
        #[arg(long)]
        policy: Option<StreakPolicy>,
        #[arg(long, value_enum, default_value_t = Metric::All)]
        metric: Metric,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    All,
    MaxStreak,
    Active,
    MinRate,
}

/// One analysis row as printed.
#[derive(Serialize)]
struct Report {
    name: String,
    periodicity: Periodicity,
    required_checkoffs: u32,
    max_streak: u32,
    current_streak: u32,
    success_rate: f64,
    fulfilled_periods: u32,
    elapsed_periods: u32,
}

impl Report {
    fn new(analysis: HabitAnalysis, decimals: u32) -> Self {
        Self {
            success_rate: analysis.success_rate.rounded(decimals),
            fulfilled_periods: analysis.success_rate.fulfilled,
            elapsed_periods: analysis.success_rate.elapsed,
            name: analysis.name,
            periodicity: analysis.periodicity,
            required_checkoffs: analysis.required_checkoffs,
            max_streak: analysis.max_streak,
            current_streak: analysis.current_streak,
        }
    }
}

#[derive(Serialize)]
struct RateLeader {
    name: String,
    success_rate: f64,
    fulfilled_periods: u32,
    elapsed_periods: u32,
}

#[derive(Serialize)]
struct GroupReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    habits: Option<Vec<Report>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longest_streak: Option<GroupLeader<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lowest_success_rate: Option<RateLeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_streaks: Option<Vec<GroupLeader<u32>>>,
}

pub fn run(action: AnalyzeAction, creds: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let decimals = config.analysis.rate_decimals;
    let session = creds.session()?;

    match action {
        AnalyzeAction::Habit {
            name,
            since,
            as_of,
            policy,
        } => {
            let policy = policy.unwrap_or(config.analysis.streak_policy);
            let analysis = session
                .habit(&name)?
                .analyze(as_of.unwrap_or_else(now), since, policy)?;
            print_json(&Report::new(analysis, decimals))?;
        }
        AnalyzeAction::Group {
            periodicity,
            since,
            as_of,
            policy,
            metric,
        } => {
            let policy = policy.unwrap_or(config.analysis.streak_policy);
            let as_of = as_of.unwrap_or_else(now);
            let habits: Vec<&Habit> = match periodicity {
                Some(p) => session.habits_with(p, None),
                None => session.habits().iter().collect(),
            };
            let wants = |m: Metric| metric == Metric::All || metric == m;

            let mut report = GroupReport {
                habits: None,
                longest_streak: None,
                lowest_success_rate: None,
                active_streaks: None,
            };
            if metric == Metric::All {
                let rows = analyze_group(habits.iter().copied(), as_of, since, policy)?;
                report.habits = Some(rows.into_iter().map(|a| Report::new(a, decimals)).collect());
            }
            if wants(Metric::MaxStreak) {
                report.longest_streak = Some(max_longest_streak(habits.iter().copied())?);
            }
            if wants(Metric::MinRate) {
                let leader = min_success_rate(habits.iter().copied(), as_of)?;
                report.lowest_success_rate = Some(RateLeader {
                    name: leader.name,
                    success_rate: leader.value.rounded(decimals),
                    fulfilled_periods: leader.value.fulfilled,
                    elapsed_periods: leader.value.elapsed,
                });
            }
            if wants(Metric::Active) {
                report.active_streaks = Some(active_streaks(habits.iter().copied(), as_of, policy)?);
            }
            print_json(&report)?;
        }
    }
    Ok(())
}
