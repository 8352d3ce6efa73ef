//! CLI command implementations.

mod auth;
mod contacts;
mod incidents;
mod profile;
mod register;
mod users;

pub use auth::{login, logout, status};
pub use contacts::{contacts_add, contacts_delete, contacts_list, contacts_update};
pub use incidents::{
    incidents_add, incidents_deactivate, incidents_list, incidents_reactivate, incidents_update,
    IncidentChanges, NewIncident,
};
pub use profile::{history, password_change, profile_show, profile_update, ProfileChanges};
pub use register::{forgot_password, register_admin};
pub use users::users_list;

use crate::output;
use crate::prompt;
use anyhow::{bail, Result};
use console_api::validate_password;

/// Prompt for a new password that satisfies the account policy, twice.
fn new_password(label: &str) -> Result<String> {
    let password = prompt::password(label)?;
    let check = validate_password(&password);
    if !check.is_valid() {
        for error in &check.errors {
            eprintln!("  - {}", error);
        }
        bail!("Password does not meet the requirements");
    }
    println!("Strength: {}", check.strength);

    let confirm = prompt::password("Confirm password")?;
    if confirm != password {
        bail!("Passwords do not match");
    }
    Ok(password)
}

/// Print a labelled optional value.
fn print_opt(label: &str, value: Option<&str>) {
    output::print_row(label, output::or_dash(value));
}
