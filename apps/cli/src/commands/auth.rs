//! Authentication commands.

use crate::context::Console;
use crate::output::{self, OutputFormat};
use crate::prompt;
use anyhow::{bail, Result};
use console_auth::{decide, GuardDecision, RouteRequirements, SessionState};
use console_storage::ExpiryStatus;
use serde_json::json;

/// Login with email and password.
pub async fn login(console: &Console) -> Result<()> {
    let format = console.format;
    console.session.check_auth_status().await;
    let snapshot = console.session.snapshot();

    if let GuardDecision::Redirect(_) = decide(&RouteRequirements::public(), &snapshot) {
        if let Some(user) = &snapshot.user {
            output::print_success(&format!("Already logged in as {}", user.email), format);
            return Ok(());
        }
    }

    let email = prompt::required("Email")?;
    let password = prompt::password("Password")?;

    if format == OutputFormat::Text {
        println!("Logging in...");
    }

    let user = match console
        .session
        .login_with_credentials(&email, &password)
        .await
    {
        Ok(user) => user,
        Err(e) => bail!("Login failed: {}", e.user_message()),
    };

    if !user.is_admin(console.config.admin_role_id) {
        output::print_error(
            "This account is not an admin. Console commands will be refused.",
            format,
        );
    }
    output::print_success(&format!("Logged in as {}", user.display_name()), format);
    Ok(())
}

/// Logout and clear session.
pub async fn logout(console: &Console) -> Result<()> {
    if !console.tokens().has_token() {
        output::print_success("Not logged in", console.format);
        return Ok(());
    }
    console.session.logout().await;
    output::print_success("Logged out successfully", console.format);
    Ok(())
}

/// Check authentication status.
pub async fn status(console: &Console) -> Result<()> {
    let state = console.session.check_auth_status().await;
    let snapshot = console.session.snapshot();
    let record = console.tokens().load_record();
    let expires_at = record.as_ref().and_then(|r| r.expires_at);
    let refresh_expires_at = record.as_ref().and_then(|r| r.refresh_expires_at);
    let has_refresh = record.as_ref().is_some_and(|r| r.refresh_token.is_some());
    let expiry = match console.tokens().expiry_status() {
        ExpiryStatus::Valid => "valid",
        ExpiryStatus::Expired => "expired",
        ExpiryStatus::Unknown => "unknown",
    };

    match console.format {
        OutputFormat::Json => output::print_json(&json!({
            "api_url": console.config.api_base_url.as_str(),
            "logged_in": snapshot.is_authenticated,
            "is_admin": snapshot.is_admin,
            "user": snapshot.user,
            "token_expiry": expiry,
            "token_expires_at": expires_at.map(|at| at.to_rfc3339()),
            "has_refresh_token": has_refresh,
            "refresh_expires_at": refresh_expires_at.map(|at| at.to_rfc3339()),
        }))?,
        OutputFormat::Text => {
            output::print_row("Server", console.config.api_base_url.as_str());
            output::print_row("Store", &console.local_store().display().to_string());
            match &state {
                SessionState::Authenticated(user) => {
                    output::print_row("Auth", "logged in");
                    output::print_row("User", &user.display_name());
                    output::print_row("Email", &user.email);
                    output::print_row(
                        "Role",
                        user.role_name
                            .as_deref()
                            .unwrap_or(console_api::role_name(user.role_id)),
                    );
                    output::print_row("Admin", output::yes_no(snapshot.is_admin));
                    let expires = match expires_at {
                        Some(at) => format!("{} ({})", at.format("%Y-%m-%d %H:%M:%S UTC"), expiry),
                        None => expiry.to_string(),
                    };
                    output::print_row("Token", &expires);
                    let refresh = match (has_refresh, refresh_expires_at) {
                        (true, Some(at)) => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                        (true, None) => "stored".to_string(),
                        (false, _) => "none".to_string(),
                    };
                    output::print_row("Refresh", &refresh);
                }
                _ => {
                    output::print_row("Auth", "not logged in");
                    if let Some(last) = console.session.cached_user() {
                        output::print_row("Last user", &last.email);
                    }
                }
            }
        }
    }
    Ok(())
}
