use clap::Subcommand;
use habitrack_core::{demo, Database};
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum DemoAction {
    /// Reset the demo account and load the example habits
    Seed,
}

pub fn run(action: DemoAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DemoAction::Seed => {
            let mut db = Database::open()?;
            let habits = demo::seed(&mut db)?;
            print_json(&json!({
                "user": demo::DEMO_USER,
                "password": demo::DEMO_PASSWORD,
                "habits": habits,
            }))?;
        }
    }
    Ok(())
}
