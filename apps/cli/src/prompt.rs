//! Interactive prompts.

use anyhow::{bail, Result};
use std::io::{self, Write};

/// Read one trimmed line; empty input is an error.
pub fn required(label: &str) -> Result<String> {
    let value = line(label)?;
    if value.is_empty() {
        bail!("{} is required", label);
    }
    Ok(value)
}

/// Read one trimmed line, possibly empty.
pub fn line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Read a line, keeping `current` when the input is empty.
pub fn with_default(label: &str, current: &str) -> Result<String> {
    let value = line(&format!("{} [{}]", label, current))?;
    Ok(if value.is_empty() {
        current.to_string()
    } else {
        value
    })
}

/// Read a password without echo; empty input is an error.
pub fn password(label: &str) -> Result<String> {
    let value = rpassword::prompt_password(format!("{}: ", label))?;
    if value.is_empty() {
        bail!("{} is required", label);
    }
    Ok(value)
}

/// Ask user for confirmation.
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
