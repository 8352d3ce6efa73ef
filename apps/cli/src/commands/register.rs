//! Pre-login flows: first admin registration and password reset.

use super::new_password;
use crate::context::Console;
use crate::output::{self, OutputFormat};
use crate::prompt;
use anyhow::{bail, Result};
use console_api::{is_valid_otp, OTP_LENGTH};

/// Register the first admin account.
///
/// By default the email is verified with a one-time code first; `direct`
/// skips verification for backends that allow it.
pub async fn register_admin(console: &Console, direct: bool) -> Result<()> {
    let format = console.format;
    if console.api.admin_exists().await {
        bail!("An admin account already exists. Log in with 'responder login'.");
    }

    let email = prompt::required("Admin email")?;

    if direct {
        let password = new_password("Password")?;
        console
            .api
            .create_admin(&email, &password)
            .await
            .map_err(|e| console.fail(e))?;
        output::print_success(&format!("Admin account created for {}", email), format);
        return Ok(());
    }

    let dispatch = console
        .api
        .send_admin_otp(&email)
        .await
        .map_err(|e| console.fail(e))?;
    if format == OutputFormat::Text {
        match dispatch.expiry() {
            Some(at) => println!(
                "Verification code sent to {} (valid until {}).",
                email,
                at.format("%H:%M UTC")
            ),
            None => println!("Verification code sent to {}.", email),
        }
    }

    let otp = read_code()?;
    console
        .api
        .verify_admin_otp(&email, &otp)
        .await
        .map_err(|e| console.fail(e))?;

    let password = new_password("Password")?;
    console
        .api
        .create_admin_with_otp(&email, &otp, &password)
        .await
        .map_err(|e| console.fail(e))?;

    output::print_success(&format!("Admin account created for {}", email), format);
    Ok(())
}

/// Reset a forgotten password with an emailed code.
pub async fn forgot_password(console: &Console) -> Result<()> {
    let format = console.format;
    let email = prompt::required("Email")?;

    console
        .api
        .forgot_password(&email)
        .await
        .map_err(|e| console.fail(e))?;
    if format == OutputFormat::Text {
        println!("If the account exists, a verification code was sent to {}.", email);
    }

    let code = read_code()?;
    console
        .api
        .verify_forgot_password_otp(&email, &code)
        .await
        .map_err(|e| console.fail(e))?;

    let password = new_password("New password")?;
    console
        .api
        .reset_password(&email, &code, &password)
        .await
        .map_err(|e| console.fail(e))?;

    output::print_success("Password reset. You can now log in.", format);
    Ok(())
}

fn read_code() -> Result<String> {
    let code = prompt::required("Verification code")?;
    if !is_valid_otp(&code) {
        bail!("Verification code must be {} digits", OTP_LENGTH);
    }
    Ok(code)
}
