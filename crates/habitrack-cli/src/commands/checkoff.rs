use chrono::{NaiveDate, NaiveDateTime};
use clap::Subcommand;
use habitrack_core::timestamp::{parse_date, parse_timestamp, truncate_to_minute};
use habitrack_core::Config;
use serde_json::json;

use super::{now, print_json, Credentials};

#[derive(Subcommand)]
pub enum CheckoffAction {
    /// Check off a habit
    Add {
        name: String,
        /// Checkoff time (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<NaiveDateTime>,
    },
    /// Remove the checkoff logged in the same minute
    Remove {
        name: String,
        #[arg(long, value_parser = parse_timestamp)]
        at: NaiveDateTime,
    },
    /// List checkoffs with their period index
    List {
        name: String,
        /// First day to include; also anchors the period numbering
        #[arg(long, value_parser = parse_date)]
        since: Option<NaiveDate>,
        /// Last day to include
        #[arg(long, value_parser = parse_date)]
        until: Option<NaiveDate>,
    },
}

pub fn run(action: CheckoffAction, creds: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut session = creds
        .session()?
        .allow_future_checkoffs(config.tracking.allow_future_checkoffs);

    match action {
        CheckoffAction::Add { name, at } => {
            let now = now();
            let at = at.map_or(now, truncate_to_minute);
            let added = session.check_off(&name, at, now)?;
            print_json(&json!({ "habit": name, "checkoff": at, "added": added }))?;
        }
        CheckoffAction::Remove { name, at } => {
            let at = truncate_to_minute(at);
            session.remove_checkoff(&name, at)?;
            print_json(&json!({ "habit": name, "checkoff": at, "removed": true }))?;
        }
        CheckoffAction::List { name, since, until } => {
            let until = until.and_then(|d| d.and_hms_opt(23, 59, 59));
            let checkoffs = session.habit(&name)?.checkoff_periods(since, until)?;
            print_json(&checkoffs)?;
        }
    }
    Ok(())
}
