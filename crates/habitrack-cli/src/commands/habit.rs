use chrono::NaiveDateTime;
use clap::Subcommand;
use habitrack_core::timestamp::parse_timestamp;
use habitrack_core::{Habit, HabitInfo, HabitUpdate, Periodicity};
use serde_json::json;

use super::{now, print_json, Credentials};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a habit
    Create {
        name: String,
        /// daily, weekly, biweekly or monthly
        #[arg(long, short)]
        periodicity: Periodicity,
        #[arg(long, short, default_value = "")]
        description: String,
        /// Checkoffs needed per period
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        required: u32,
        /// Creation time (defaults to now)
        #[arg(long, value_parser = parse_timestamp)]
        created: Option<NaiveDateTime>,
    },
    /// Delete a habit with all its checkoffs
    Delete { name: String },
    /// Change description, periodicity or required checkoffs
    Edit {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        periodicity: Option<Periodicity>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        required: Option<u32>,
    },
    /// List habits
    List {
        #[arg(long, short)]
        periodicity: Option<Periodicity>,
        #[arg(long)]
        required: Option<u32>,
    },
    /// Show a habit with its checkoffs
    Show { name: String },
}

pub fn run(action: HabitAction, creds: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = creds.session()?;

    match action {
        HabitAction::Create {
            name,
            periodicity,
            description,
            required,
            created,
        } => {
            let habit = Habit::new(name, periodicity, created.unwrap_or_else(now))
                .with_description(description)
                .with_required_checkoffs(required);
            let info = habit.info();
            session.create_habit(habit)?;
            print_json(&info)?;
        }
        HabitAction::Delete { name } => {
            session.delete_habit(&name)?;
            print_json(&json!({ "deleted": name }))?;
        }
        HabitAction::Edit {
            name,
            description,
            periodicity,
            required,
        } => {
            let update = HabitUpdate {
                description,
                periodicity,
                required_checkoffs: required,
            };
            let habit = session.update_habit(&name, update)?;
            print_json(&habit.info())?;
        }
        HabitAction::List {
            periodicity,
            required,
        } => {
            let infos: Vec<HabitInfo> = match periodicity {
                Some(p) => session
                    .habits_with(p, required)
                    .into_iter()
                    .map(Habit::info)
                    .collect(),
                None => session
                    .habits()
                    .iter()
                    .filter(|h| required.map_or(true, |r| h.required_checkoffs() == r))
                    .map(Habit::info)
                    .collect(),
            };
            print_json(&infos)?;
        }
        HabitAction::Show { name } => {
            print_json(session.habit(&name)?)?;
        }
    }
    Ok(())
}
