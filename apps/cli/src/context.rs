//! Wiring shared by every command: storage, API client, session and guard.

use crate::output::OutputFormat;
use anyhow::{anyhow, bail, Result};
use console_api::ConsoleApi;
use console_auth::{
    decide, ApiClient, AuthError, GuardDecision, ReqwestTransport, RouteRequirements,
    SessionManager, SessionUser,
};
use console_config::{Config, Paths};
use console_storage::{CookieStore, FileStorage, TokenStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a command needs to talk to the backend.
pub struct Console {
    pub config: Config,
    pub session: SessionManager,
    pub api: ConsoleApi,
    pub format: OutputFormat,
    local_store: PathBuf,
}

impl Console {
    pub fn open(paths: &Paths, config: Config, format: OutputFormat) -> Result<Self> {
        paths.ensure_dirs()?;

        let local = FileStorage::open(paths.local_store_file())?;
        let local_store = local.path().to_path_buf();
        let cookies = CookieStore::new(
            Arc::new(FileStorage::open(paths.cookie_store_file())?),
            config.uses_https(),
        );
        match cookies.purge_expired() {
            Ok(0) => {}
            Ok(purged) => debug!(purged, "dropped expired cookies"),
            Err(e) => warn!(error = %e, "failed to purge expired cookies"),
        }

        let tokens = TokenStore::new(Arc::new(local), cookies);
        let transport = Arc::new(ReqwestTransport::new()?);
        let client = Arc::new(ApiClient::new(config.clone(), tokens, transport));

        Ok(Self {
            session: SessionManager::new(client.clone()),
            api: ConsoleApi::new(client),
            config,
            format,
            local_store,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        self.session.client().tokens()
    }

    pub fn local_store(&self) -> &PathBuf {
        &self.local_store
    }

    /// Validate the stored session and require an admin.
    pub async fn require_admin(&self) -> Result<SessionUser> {
        self.session.check_auth_status().await;
        let snapshot = self.session.snapshot();

        match decide(&RouteRequirements::admin(), &snapshot) {
            GuardDecision::Render => snapshot
                .user
                .ok_or_else(|| anyhow!("session has no user")),
            GuardDecision::ShowLoading => bail!("Session is still being validated"),
            GuardDecision::Redirect(route) => {
                debug!(%route, "guard redirected");
                if snapshot.is_authenticated {
                    bail!("Access denied: this console requires an admin account")
                } else {
                    bail!("Not logged in. Run 'responder login' first")
                }
            }
        }
    }

    /// Convert an API error for display, dropping the session when the
    /// server refused it.
    pub fn fail(&self, error: AuthError) -> anyhow::Error {
        if error.requires_login() {
            self.session.expire();
            return anyhow!("{} Run 'responder login'.", error.user_message());
        }
        anyhow!(error.user_message())
    }
}
