use clap::Subcommand;
use habitrack_core::{auth, Database};
use serde_json::json;

use super::{print_json, Credentials};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create the account given by --user / --password
    Register,
    /// Delete the account and all its habits
    Delete,
}

pub fn run(action: UserAction, creds: &Credentials) -> Result<(), Box<dyn std::error::Error>> {
    let user = creds.user()?;
    let mut db = Database::open()?;

    match action {
        UserAction::Register => {
            auth::register(&mut db, user, creds.password())?;
            print_json(&json!({ "registered": user }))?;
        }
        UserAction::Delete => {
            auth::delete_account(&mut db, user, creds.password())?;
            print_json(&json!({ "deleted": user }))?;
        }
    }
    Ok(())
}
