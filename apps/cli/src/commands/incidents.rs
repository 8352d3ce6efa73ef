//! Incident type catalogue management.

use crate::context::Console;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use clap::Args;
use console_api::{filter_incident_types, IncidentType, IncidentTypeDraft};

/// Fields of a new incident type.
#[derive(Args, Debug)]
pub struct NewIncident {
    /// Incident name, e.g. "Structure Fire"
    pub name: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Route reports of this type to the fire bureau
    #[arg(long)]
    pub bfp: bool,
    /// Route reports of this type to the police
    #[arg(long)]
    pub pnp: bool,
}

/// Fields to change on an incident type.
#[derive(Args, Debug, Default)]
pub struct IncidentChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(long)]
    pub bfp: Option<bool>,
    #[arg(long)]
    pub pnp: Option<bool>,
}

/// List incident types.
pub async fn incidents_list(
    console: &Console,
    search: Option<&str>,
    active_only: bool,
) -> Result<()> {
    console.require_admin().await?;
    let incidents = console
        .api
        .incident_types()
        .await
        .map_err(|e| console.fail(e))?;
    let shown: Vec<&IncidentType> = filter_incident_types(&incidents, search.unwrap_or(""))
        .into_iter()
        .filter(|i| !active_only || i.is_active)
        .collect();

    match console.format {
        OutputFormat::Json => output::print_json(&shown)?,
        OutputFormat::Text => {
            if shown.is_empty() {
                println!("No incident types found");
                return Ok(());
            }
            println!(
                "{:<8} {:<24} {:<7} {:<4} {:<4} {}",
                "ID", "Name", "Active", "BFP", "PNP", "Description"
            );
            output::print_divider(100);
            for incident in shown {
                println!(
                    "{:<8} {:<24} {:<7} {:<4} {:<4} {}",
                    output::truncate(&incident.id, 8),
                    output::truncate(&incident.name_of_incident, 24),
                    output::yes_no(incident.is_active),
                    output::yes_no(incident.is_bfp_true),
                    output::yes_no(incident.is_pnp_true),
                    output::truncate(&incident.description, 48),
                );
            }
        }
    }
    Ok(())
}

/// Add an incident type, recorded as added by the signed-in admin.
pub async fn incidents_add(console: &Console, incident: NewIncident) -> Result<()> {
    let admin = console.require_admin().await?;
    let name = incident.name.trim();
    if name.is_empty() {
        bail!("Incident name must not be empty");
    }

    let draft = IncidentTypeDraft {
        id: None,
        name_of_incident: name.to_string(),
        description: incident.description.trim().to_string(),
        is_active: true,
        is_bfp_true: incident.bfp,
        is_pnp_true: incident.pnp,
        who_added_it_id: admin.id,
    };
    console
        .api
        .create_incident_type(&draft)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(
        &format!("Incident type '{}' added", draft.name_of_incident),
        console.format,
    );
    Ok(())
}

/// Edit an incident type; unspecified fields keep their current value.
pub async fn incidents_update(
    console: &Console,
    id: &str,
    changes: IncidentChanges,
) -> Result<()> {
    let admin = console.require_admin().await?;
    let existing = find(console, id).await?;
    let mut draft = IncidentTypeDraft::from_existing(&existing, &admin.id);

    if let Some(name) = changes.name {
        let name = name.trim();
        if name.is_empty() {
            bail!("Incident name must not be empty");
        }
        draft.name_of_incident = name.to_string();
    }
    if let Some(description) = changes.description {
        draft.description = description.trim().to_string();
    }
    if let Some(bfp) = changes.bfp {
        draft.is_bfp_true = bfp;
    }
    if let Some(pnp) = changes.pnp {
        draft.is_pnp_true = pnp;
    }

    console
        .api
        .update_incident_type(id, &draft)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(&format!("Incident type {} updated", id), console.format);
    Ok(())
}

/// Mark an incident type inactive.
pub async fn incidents_deactivate(console: &Console, id: &str) -> Result<()> {
    console.require_admin().await?;
    console
        .api
        .deactivate_incident_type(id)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(&format!("Incident type {} deactivated", id), console.format);
    Ok(())
}

/// Make an inactive incident type available again.
pub async fn incidents_reactivate(console: &Console, id: &str) -> Result<()> {
    console.require_admin().await?;
    console
        .api
        .reactivate_incident_type(id)
        .await
        .map_err(|e| console.fail(e))?;
    output::print_success(&format!("Incident type {} reactivated", id), console.format);
    Ok(())
}

async fn find(console: &Console, id: &str) -> Result<IncidentType> {
    let incidents = console
        .api
        .incident_types()
        .await
        .map_err(|e| console.fail(e))?;
    match incidents.into_iter().find(|i| i.id == id) {
        Some(incident) => Ok(incident),
        None => bail!("Incident type {} not found", id),
    }
}
