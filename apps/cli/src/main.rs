//! Responder CLI - admin console for the emergency-response backend.

mod commands;
mod context;
mod output;
mod prompt;

use clap::{Parser, Subcommand};
use console_api::{ContactType, Role};
use console_config::{init_logging, Config, Paths};
use context::Console;
use tracing::debug;

/// Responder CLI - manage contacts, incident types and users of the
/// emergency-response backend.
#[derive(Parser)]
#[command(name = "responder")]
#[command(about = "Admin console for the emergency-response backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Logout and clear the stored session
    Logout,

    /// Check authentication status
    Status,

    /// Create the first admin account
    RegisterAdmin {
        /// Skip email verification
        #[arg(long)]
        direct: bool,
    },

    /// Reset a forgotten password with an emailed code
    ForgotPassword,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage your password
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Show your recent logins
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Manage emergency contacts
    Contacts {
        #[command(subcommand)]
        command: ContactCommands,
    },

    /// Browse registered users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage incident types
    Incidents {
        #[command(subcommand)]
        command: IncidentCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show,
    /// Update your profile; prompts for each field when none are given
    Update(commands::ProfileChanges),
}

#[derive(Subcommand)]
enum PasswordCommands {
    /// Change your password
    Change,
}

#[derive(Subcommand)]
enum ContactCommands {
    /// List contacts
    List {
        /// Filter by name, type, value or description
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a contact
    Add {
        /// Contact name
        name: String,
        /// phone, email or facebook
        #[arg(short = 't', long = "type")]
        contact_type: ContactType,
        /// Phone number, address or page
        #[arg(long)]
        value: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Update a contact
    Update {
        /// Contact ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(short = 't', long = "type")]
        contact_type: Option<ContactType>,
        #[arg(long)]
        value: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a contact
    Delete {
        /// Contact ID
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Filter by name or email
        #[arg(short, long)]
        search: Option<String>,
        /// Filter by role id or name (Admin, User, Ambulance, PNP, BFP)
        #[arg(short, long)]
        role: Option<Role>,
    },
}

#[derive(Subcommand)]
enum IncidentCommands {
    /// List incident types
    List {
        /// Filter by name or description
        #[arg(short, long)]
        search: Option<String>,
        /// Hide inactive types
        #[arg(long)]
        active: bool,
    },
    /// Add an incident type
    Add(commands::NewIncident),
    /// Update an incident type
    Update {
        /// Incident type ID
        id: String,
        #[command(flatten)]
        changes: commands::IncidentChanges,
    },
    /// Mark an incident type inactive
    Deactivate {
        /// Incident type ID
        id: String,
    },
    /// Make an incident type active again
    Reactivate {
        /// Incident type ID
        id: String,
    },
}

async fn run(cli: Cli, console: Console) -> anyhow::Result<()> {
    let console = &console;
    match cli.command {
        Commands::Login => commands::login(console).await,
        Commands::Logout => commands::logout(console).await,
        Commands::Status => commands::status(console).await,
        Commands::RegisterAdmin { direct } => commands::register_admin(console, direct).await,
        Commands::ForgotPassword => commands::forgot_password(console).await,
        Commands::Profile { command } => match command {
            ProfileCommands::Show => commands::profile_show(console).await,
            ProfileCommands::Update(changes) => commands::profile_update(console, changes).await,
        },
        Commands::Password { command } => match command {
            PasswordCommands::Change => commands::password_change(console).await,
        },
        Commands::History { limit } => commands::history(console, limit).await,
        Commands::Contacts { command } => match command {
            ContactCommands::List { search } => {
                commands::contacts_list(console, search.as_deref()).await
            }
            ContactCommands::Add {
                name,
                contact_type,
                value,
                description,
            } => commands::contacts_add(console, name, contact_type, value, description).await,
            ContactCommands::Update {
                id,
                name,
                contact_type,
                value,
                description,
            } => {
                commands::contacts_update(console, &id, name, contact_type, value, description)
                    .await
            }
            ContactCommands::Delete { id, yes } => {
                commands::contacts_delete(console, &id, yes).await
            }
        },
        Commands::Users { command } => match command {
            UserCommands::List { search, role } => {
                commands::users_list(console, search.as_deref(), role).await
            }
        },
        Commands::Incidents { command } => match command {
            IncidentCommands::List { search, active } => {
                commands::incidents_list(console, search.as_deref(), active).await
            }
            IncidentCommands::Add(incident) => commands::incidents_add(console, incident).await,
            IncidentCommands::Update { id, changes } => {
                commands::incidents_update(console, &id, changes).await
            }
            IncidentCommands::Deactivate { id } => {
                commands::incidents_deactivate(console, &id).await
            }
            IncidentCommands::Reactivate { id } => {
                commands::incidents_reactivate(console, &id).await
            }
        },
    }
}

fn open(cli: &Cli) -> anyhow::Result<Console> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    init_logging(&paths, &level, cli.verbose);
    debug!(api = %config.api_base_url, "configuration loaded");

    Console::open(&paths, config, cli.format)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let result = match open(&cli) {
        Ok(console) => run(cli, console).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string(), format);
        std::process::exit(1);
    }
}
