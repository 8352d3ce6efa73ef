//! Signed-in account commands: profile, password and login history.

use super::print_opt;
use crate::context::Console;
use crate::output::{self, OutputFormat};
use crate::prompt;
use anyhow::{anyhow, Result};
use clap::Args;
use console_api::{password_strength, ChangePasswordForm, ProfileUpdate};

/// Profile fields to change. With none given the command asks for each.
#[derive(Args, Debug, Default)]
pub struct ProfileChanges {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub middle_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    /// Date of birth as YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<String>,
}

impl ProfileChanges {
    fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.middle_name,
            &self.last_name,
            &self.email,
            &self.phone,
            &self.address,
            &self.gender,
            &self.date_of_birth,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

/// Show the signed-in user's profile.
pub async fn profile_show(console: &Console) -> Result<()> {
    console.require_admin().await?;
    let profile = console.api.profile().await.map_err(|e| console.fail(e))?;

    match console.format {
        OutputFormat::Json => output::print_json(&profile)?,
        OutputFormat::Text => {
            output::print_heading("Profile");
            output::print_row("Id", &profile.id);
            output::print_row("First name", &profile.first_name);
            print_opt("Middle name", profile.middle_name.as_deref());
            output::print_row("Last name", &profile.last_name);
            output::print_row("Email", &profile.email);
            print_opt("Phone", profile.phone_number.as_deref());
            print_opt("Address", profile.address.as_deref());
            print_opt("Gender", profile.gender.as_deref());
            print_opt("Date of birth", profile.date_of_birth.as_deref());
            output::print_row("Role", profile.role_label());
            output::print_row("Email verified", output::yes_no(profile.is_email_verified));
            output::print_row("Phone verified", output::yes_no(profile.is_phone_verified));
            print_opt("Member since", profile.created_at.as_deref());
        }
    }
    Ok(())
}

/// Update the signed-in user's profile.
pub async fn profile_update(console: &Console, changes: ProfileChanges) -> Result<()> {
    console.require_admin().await?;
    let profile = console.api.profile().await.map_err(|e| console.fail(e))?;
    let mut update = ProfileUpdate::from_profile(&profile);

    if changes.is_empty() {
        update.first_name = prompt::with_default("First name", &update.first_name)?;
        update.middle_name = prompt::with_default("Middle name", &update.middle_name)?;
        update.last_name = prompt::with_default("Last name", &update.last_name)?;
        update.email = prompt::with_default("Email", &update.email)?;
        update.phone_number = prompt::with_default("Phone", &update.phone_number)?;
        update.address = prompt::with_default("Address", &update.address)?;
        update.gender = prompt::with_default("Gender", &update.gender)?;
        let date = prompt::line("Date of birth (YYYY-MM-DD, empty to keep)")?;
        if !date.is_empty() {
            update.set_date_of_birth(&date).map_err(|e| anyhow!(e))?;
        }
    } else {
        let ProfileChanges {
            first_name,
            middle_name,
            last_name,
            email,
            phone,
            address,
            gender,
            date_of_birth,
        } = changes;
        if let Some(v) = first_name {
            update.first_name = v;
        }
        if let Some(v) = middle_name {
            update.middle_name = v;
        }
        if let Some(v) = last_name {
            update.last_name = v;
        }
        if let Some(v) = email {
            update.email = v;
        }
        if let Some(v) = phone {
            update.phone_number = v;
        }
        if let Some(v) = address {
            update.address = v;
        }
        if let Some(v) = gender {
            update.gender = v;
        }
        if let Some(date) = date_of_birth {
            update.set_date_of_birth(&date).map_err(|e| anyhow!(e))?;
        }
    }

    console
        .api
        .update_profile(&update)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success("Profile updated", console.format);
    Ok(())
}

/// Change the signed-in user's password.
pub async fn password_change(console: &Console) -> Result<()> {
    console.require_admin().await?;

    let form = ChangePasswordForm {
        current_password: prompt::password("Current password")?,
        new_password: prompt::password("New password")?,
        confirm_password: prompt::password("Confirm new password")?,
    };
    form.validate()?;
    if console.format == OutputFormat::Text {
        println!("Strength: {}", password_strength(&form.new_password));
    }

    console
        .api
        .change_password(&form.current_password, &form.new_password)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success("Password changed", console.format);
    Ok(())
}

/// Show recent logins of the signed-in user.
pub async fn history(console: &Console, limit: usize) -> Result<()> {
    console.require_admin().await?;
    let mut entries = console
        .api
        .login_history()
        .await
        .map_err(|e| console.fail(e))?;
    entries.truncate(limit);

    match console.format {
        OutputFormat::Json => output::print_json(&entries)?,
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No login history");
                return Ok(());
            }
            println!(
                "{:<20} {:<8} {:<16} {:<7} {}",
                "Time", "Status", "IP", "Active", "Client"
            );
            output::print_divider(90);
            for entry in &entries {
                let status = match entry.failure_reason.as_deref() {
                    Some(reason) if !reason.is_empty() => {
                        format!("{} ({})", entry.login_status, reason)
                    }
                    _ => entry.login_status.clone(),
                };
                println!(
                    "{:<20} {:<8} {:<16} {:<7} {}",
                    output::truncate(&entry.login_timestamp, 20),
                    status,
                    output::truncate(&entry.ip_address, 16),
                    output::yes_no(entry.is_active),
                    output::truncate(&entry.user_agent, 40),
                );
            }
        }
    }
    Ok(())
}
