//! Session management over the API client and token store.
//!
//! [`SessionManager`] owns the current user. It starts in `Loading` on every
//! process start, even when tokens exist, and only leaves it once
//! [`SessionManager::check_auth_status`] has validated (or rejected) the
//! stored session. State changes are published on a `watch` channel.

use crate::client::token_record_from_payload;
use crate::jwt::{decode_claims, JwtClaims};
use crate::session_fsm::{SessionInput, SessionMachine, SessionPhase};
use crate::transport::Method;
use crate::{ApiClient, AuthError, AuthResult, SessionUser};
use chrono::Utc;
use console_storage::ExpiryStatus;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const PROFILE_ENDPOINT: &str = "/auth/profile";

/// Published session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(SessionUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Point-in-time view consumed by the route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSnapshot {
    pub loading: bool,
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub user: Option<SessionUser>,
}

/// Owner of the signed-in user.
pub struct SessionManager {
    client: Arc<ApiClient>,
    admin_role_id: i64,
    default_role_id: i64,
    profile_timeout: Duration,
    fsm: Mutex<SessionMachine>,
    state_tx: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let config = client.config();
        let (state_tx, _) = watch::channel(SessionState::Loading);
        Self {
            admin_role_id: config.admin_role_id,
            default_role_id: config.default_role_id,
            profile_timeout: config.profile_timeout,
            client,
            fsm: Mutex::new(SessionMachine::new()),
            state_tx,
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.fsm.lock().state().clone()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state().user().cloned()
    }

    /// User cached by the last login. Advisory only.
    pub fn cached_user(&self) -> Option<SessionUser> {
        self.client.tokens().user_snapshot()
    }

    /// Validate the stored session and leave `Loading`.
    ///
    /// Always ends in `Authenticated` or `Unauthenticated`. Any failure clears
    /// the token store.
    pub async fn check_auth_status(&self) -> SessionState {
        match self.validate_stored_session().await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "stored session validated");
                self.apply(SessionInput::SessionValidated, Some(user))
            }
            Ok(None) => {
                debug!("no stored session");
                self.apply(SessionInput::NoSession, None)
            }
            Err(e) => {
                warn!(error = %e, "stored session rejected");
                self.client.tokens().clear_tokens();
                self.apply(SessionInput::SessionRejected, None)
            }
        }
    }

    async fn validate_stored_session(&self) -> AuthResult<Option<SessionUser>> {
        let tokens = self.client.tokens();
        let Some(token) = tokens.get_token() else {
            return Ok(None);
        };

        let claims = decode_claims(&token);
        let jwt_expiry = claims.as_ref().and_then(JwtClaims::expires_at);

        let expired = match jwt_expiry {
            Some(exp) => Utc::now() >= exp,
            None => tokens.is_token_expired(),
        };
        if expired {
            return Err(AuthError::SessionExpired);
        }

        // Claims are trusted only while some expiry vouches for the token.
        let expiry_known = jwt_expiry.is_some() || tokens.expiry_status() == ExpiryStatus::Valid;
        if let Some(claims) = &claims {
            if expiry_known {
                if let Some(user) = SessionUser::from_claims(claims, self.default_role_id) {
                    debug!("session user taken from token claims");
                    return Ok(Some(user));
                }
            }
        }

        debug!("validating session through the profile endpoint");
        let profile = tokio::time::timeout(
            self.profile_timeout,
            self.client.request(Method::Get, PROFILE_ENDPOINT, None),
        )
        .await
        .map_err(|_| AuthError::Timeout)??;

        let mut user = SessionUser::from_profile(&profile, self.default_role_id)?;
        if let Some(claims) = &claims {
            user.apply_claim_roles(claims);
        }
        Ok(Some(user))
    }

    /// Record a successful credential login.
    ///
    /// Role data in the access token's claims overrides the payload's.
    pub fn login(&self, payload: &Value) -> AuthResult<SessionUser> {
        let tokens = self.client.tokens();
        let token = token_record_from_payload(payload)
            .map(|record| record.access_token)
            .or_else(|| tokens.get_token());
        let claims = token.as_deref().and_then(decode_claims);

        let user = SessionUser::from_login_payload(payload, claims.as_ref(), self.default_role_id)?;

        if let Err(e) = tokens.set_user_snapshot(&user) {
            warn!(error = %e, "failed to cache user snapshot");
        }
        self.apply(SessionInput::LoginSucceeded, Some(user.clone()));
        info!(user_id = %user.id, is_admin = user.is_admin(self.admin_role_id), "login successful");
        Ok(user)
    }

    /// Log in with credentials: token exchange followed by [`Self::login`].
    pub async fn login_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<SessionUser> {
        let payload = self.client.login(email, password).await?;
        self.login(&payload)
    }

    /// End the session. Local state is cleared even if the server call fails.
    pub async fn logout(&self) {
        self.client.logout().await;
        self.apply(SessionInput::LoggedOut, None);
    }

    /// Drop the session after the server refused it mid-flight.
    pub fn expire(&self) {
        self.client.tokens().clear_tokens();
        self.apply(SessionInput::AuthFailed, None);
    }

    /// User present and a token on record. Expiry is not consulted.
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some() && self.client.tokens().has_token()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user()
            .is_some_and(|user| user.is_admin(self.admin_role_id))
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        let state = self.state();
        let user = state.user().cloned();
        AuthSnapshot {
            loading: state == SessionState::Loading,
            is_authenticated: user.is_some() && self.client.tokens().has_token(),
            is_admin: user
                .as_ref()
                .is_some_and(|user| user.is_admin(self.admin_role_id)),
            user,
        }
    }

    fn apply(&self, input: SessionInput, user: Option<SessionUser>) -> SessionState {
        let mut fsm = self.fsm.lock();
        let before = fsm.state().clone();

        if fsm.consume(&input).is_err() {
            debug!(state = ?before, input = ?input, "ignoring session transition");
            return self.state();
        }

        let after = fsm.state().clone();
        let state = match (&after, user) {
            (SessionPhase::Authenticated, Some(user)) => SessionState::Authenticated(user),
            (SessionPhase::Authenticated, None) => self.state(),
            (SessionPhase::Unauthenticated, _) => SessionState::Unauthenticated,
            (SessionPhase::Loading, _) => SessionState::Loading,
        };

        if before != after {
            info!(from = ?before, to = ?after, "session state changed");
        }
        self.state_tx.send_replace(state.clone());
        state
    }
}
