//! Registered user listing.

use crate::context::Console;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use console_api::{filter_users, Role};

/// List users, optionally filtered by search term and role.
pub async fn users_list(console: &Console, search: Option<&str>, role: Option<Role>) -> Result<()> {
    console.require_admin().await?;
    let users = console.api.users().await.map_err(|e| console.fail(e))?;
    let shown = filter_users(&users, search.unwrap_or(""), role.map(Role::id));

    match console.format {
        OutputFormat::Json => output::print_json(&shown)?,
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No users found");
                return Ok(());
            }
            println!(
                "{:<8} {:<26} {:<30} {:<10} {:<9} {}",
                "ID", "Name", "Email", "Role", "Verified", "Last login"
            );
            output::print_divider(110);
            for user in &shown {
                println!(
                    "{:<8} {:<26} {:<30} {:<10} {:<9} {}",
                    output::truncate(&user.id, 8),
                    output::truncate(&user.full_name(), 26),
                    output::truncate(&user.email, 30),
                    user.role_label(),
                    output::yes_no(user.is_email_verified),
                    output::or_dash(user.last_login.as_deref()),
                );
            }
            println!("\n{} of {} users", shown.len(), users.len());
        }
    }
    Ok(())
}
