//! Emergency contact management.

use crate::context::Console;
use crate::output::{self, OutputFormat};
use crate::prompt;
use anyhow::{bail, Result};
use console_api::{filter_contacts, ContactDraft, ContactType};

/// List contacts, optionally filtered by a search term.
pub async fn contacts_list(console: &Console, search: Option<&str>) -> Result<()> {
    console.require_admin().await?;
    let contacts = console.api.contacts().await.map_err(|e| console.fail(e))?;
    let shown = filter_contacts(&contacts, search.unwrap_or(""));

    match console.format {
        OutputFormat::Json => output::print_json(&shown)?,
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No contacts found");
                return Ok(());
            }
            println!("{:<8} {:<24} {:<9} {:<24} {}", "ID", "Name", "Type", "Value", "Description");
            output::print_divider(100);
            for contact in shown {
                println!(
                    "{:<8} {:<24} {:<9} {:<24} {}",
                    output::truncate(&contact.id, 8),
                    output::truncate(&contact.name, 24),
                    contact.contact_type,
                    output::truncate(&contact.value, 24),
                    output::truncate(&contact.description, 40),
                );
            }
        }
    }
    Ok(())
}

/// Add a contact.
pub async fn contacts_add(
    console: &Console,
    name: String,
    contact_type: ContactType,
    value: String,
    description: Option<String>,
) -> Result<()> {
    console.require_admin().await?;
    let draft = ContactDraft {
        name: non_blank("Name", name)?,
        description: description.unwrap_or_default(),
        contact_type,
        value: non_blank("Value", value)?,
    };

    let contact = console
        .api
        .create_contact(&draft)
        .await
        .map_err(|e| console.fail(e))?;
    match console.format {
        OutputFormat::Json => output::print_json(&contact)?,
        OutputFormat::Text => {
            output::print_success(&format!("Contact added: {}", contact.id), console.format)
        }
    }
    Ok(())
}

/// Edit a contact; unspecified fields keep their current value.
pub async fn contacts_update(
    console: &Console,
    id: &str,
    name: Option<String>,
    contact_type: Option<ContactType>,
    value: Option<String>,
    description: Option<String>,
) -> Result<()> {
    console.require_admin().await?;
    let contacts = console.api.contacts().await.map_err(|e| console.fail(e))?;
    let Some(mut contact) = contacts.into_iter().find(|c| c.id == id) else {
        bail!("Contact {} not found", id);
    };

    if let Some(name) = name {
        contact.name = non_blank("Name", name)?;
    }
    if let Some(kind) = contact_type {
        contact.contact_type = kind.to_string();
    }
    if let Some(value) = value {
        contact.value = non_blank("Value", value)?;
    }
    if let Some(description) = description {
        contact.description = description;
    }

    console
        .api
        .update_contact(&contact)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(&format!("Contact {} updated", id), console.format);
    Ok(())
}

/// Delete a contact.
pub async fn contacts_delete(console: &Console, id: &str, yes: bool) -> Result<()> {
    console.require_admin().await?;
    if !yes && !prompt::confirm(&format!("Delete contact {}?", id)) {
        output::print_success("Cancelled", console.format);
        return Ok(());
    }

    console
        .api
        .delete_contact(id)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(&format!("Contact {} deleted", id), console.format);
    Ok(())
}

fn non_blank(label: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("{} must not be empty", label);
    }
    Ok(value)
}
