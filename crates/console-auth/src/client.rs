//! API client with bearer auth, token refresh and a single 401 retry.
//!
//! Every request to the backend goes through [`ApiClient`]. Before sending,
//! an access token whose recorded expiry has passed is refreshed. A 401 on
//! the first attempt triggers one refresh and one resend; a 401 on the
//! resend clears the token store and surfaces [`AuthError::SessionExpired`].
//!
//! Concurrent refreshes are collapsed: refresh runs under an async mutex and
//! bumps a generation counter on success. A caller that observed generation
//! N before its request and finds the counter past N once it holds the lock
//! reuses that refresh instead of starting another.

use crate::fields::{parse_timestamp, pick_i64, pick_string};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use console_config::Config;
use console_storage::{TokenRecord, TokenStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const ACCESS_TOKEN_KEYS: [&str; 4] = ["accessToken", "AccessToken", "token", "Token"];
const REFRESH_TOKEN_KEYS: [&str; 2] = ["refreshToken", "RefreshToken"];
const ACCESS_EXPIRY_KEYS: [&str; 4] = [
    "accessTokenExpiresAt",
    "AccessTokenExpiresAt",
    "expiresAt",
    "ExpiresAt",
];
const ACCESS_EXPIRES_IN_KEYS: [&str; 3] = ["expiresIn", "ExpiresIn", "expires_in"];
const REFRESH_EXPIRY_KEYS: [&str; 2] = ["refreshTokenExpiresAt", "RefreshTokenExpiresAt"];

/// Whether a request carries the stored access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Bearer,
    Anonymous,
}

/// Client for the console REST API.
pub struct ApiClient {
    config: Config,
    tokens: TokenStore,
    transport: Arc<dyn HttpTransport>,
    refresh_lock: Mutex<()>,
    refresh_generation: AtomicU64,
}

impl ApiClient {
    pub fn new(config: Config, tokens: TokenStore, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            tokens,
            transport,
            refresh_lock: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Authenticated request returning the response body as JSON.
    ///
    /// An empty body yields `Value::Null`; a non-JSON body yields the text as
    /// `Value::String`.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> AuthResult<Value> {
        let response = self.execute(method, endpoint, body, Access::Bearer).await?;
        Ok(parse_body(&response.body))
    }

    /// Request sent without the stored token and without refresh handling.
    pub async fn request_anonymous(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> AuthResult<Value> {
        let response = self
            .execute(method, endpoint, body, Access::Anonymous)
            .await?;
        Ok(parse_body(&response.body))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> AuthResult<T> {
        let value = self.request(Method::Get, endpoint, None).await?;
        decode(value)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AuthResult<T> {
        let value = self
            .request(Method::Post, endpoint, Some(serde_json::to_value(body)?))
            .await?;
        decode(value)
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> AuthResult<T> {
        let value = self
            .request(Method::Put, endpoint, Some(serde_json::to_value(body)?))
            .await?;
        decode(value)
    }

    pub async fn patch<T: DeserializeOwned>(&self, endpoint: &str) -> AuthResult<T> {
        let value = self.request(Method::Patch, endpoint, None).await?;
        decode(value)
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> AuthResult<T> {
        let value = self.request(Method::Delete, endpoint, None).await?;
        decode(value)
    }

    /// Exchange credentials for tokens and store them.
    ///
    /// Returns the raw response so the session layer can read identity and
    /// role fields from it.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Value> {
        debug!(email, "attempting login");
        let payload = self
            .request_anonymous(
                Method::Post,
                "/auth/login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;

        let record = token_record_from_payload(&payload).ok_or_else(|| {
            AuthError::InvalidResponse("login response carried no access token".to_string())
        })?;
        self.tokens.store_record(&record)?;
        info!("login tokens stored");
        Ok(payload)
    }

    /// End the session server-side (best effort) and clear local tokens.
    pub async fn logout(&self) {
        let bearer = self.tokens.get_token();
        let refresh_token = self.tokens.get_refresh_token();

        if bearer.is_some() {
            match self.send_once(Method::Post, "/auth/logout", None, bearer).await {
                Ok(response) if response.is_success() => debug!("server session ended"),
                Ok(response) => warn!(status = response.status, "logout request rejected"),
                Err(e) => warn!(error = %e, "logout request failed"),
            }
        }

        if let Some(refresh_token) = refresh_token {
            let body = json!({ "refreshToken": refresh_token });
            match self
                .send_once(Method::Post, "/auth/revoke", Some(body), None)
                .await
            {
                Ok(response) if response.is_success() => debug!("refresh token revoked"),
                Ok(response) => warn!(status = response.status, "refresh token revocation rejected"),
                Err(e) => warn!(error = %e, "refresh token revocation failed"),
            }
        }

        self.tokens.clear_tokens();
        info!("logged out");
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        access: Access,
    ) -> AuthResult<ApiResponse> {
        if access == Access::Anonymous {
            let response = self.send_once(method, endpoint, body, None).await?;
            return into_result(response, endpoint);
        }

        let path = endpoint_path(endpoint);
        let mut is_retry = false;
        loop {
            let mut generation = self.refresh_generation.load(Ordering::Acquire);

            if !is_retry && self.tokens.is_token_expired() {
                debug!(endpoint = path, "stored access token expired, refreshing first");
                self.refresh(generation).await?;
                generation = self.refresh_generation.load(Ordering::Acquire);
            }

            let bearer = self.tokens.get_token();
            let response = self
                .send_once(method, endpoint, body.clone(), bearer)
                .await?;

            if response.status != 401 {
                return into_result(response, endpoint);
            }

            if is_retry {
                warn!(endpoint = path, "request rejected again after refresh");
                self.tokens.clear_tokens();
                return Err(AuthError::SessionExpired);
            }

            debug!(endpoint = path, "got 401, refreshing and retrying once");
            self.refresh(generation).await?;
            is_retry = true;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        bearer: Option<String>,
    ) -> AuthResult<ApiResponse> {
        let url = self.config.endpoint_url(endpoint)?;
        let endpoint = endpoint_path(endpoint);
        debug!(%method, endpoint, "sending request");

        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                bearer,
                body,
            })
            .await
            .map_err(|e| {
                warn!(%method, endpoint, error = %e, "request failed before a response");
                AuthError::ServerUnreachable(format!(
                    "{} ({})",
                    self.config.api_base_url, e
                ))
            })?;

        debug!(%method, endpoint, status = response.status, "response received");
        Ok(response)
    }

    /// Refresh the token pair unless another caller already did since
    /// `observed_generation`. Any failure clears the store.
    async fn refresh(&self, observed_generation: u64) -> AuthResult<()> {
        let _guard = self.refresh_lock.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != observed_generation {
            debug!("reusing refresh completed by a concurrent request");
            return Ok(());
        }

        match self.perform_refresh().await {
            Ok(()) => {
                self.refresh_generation.fetch_add(1, Ordering::AcqRel);
                info!("access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                self.tokens.clear_tokens();
                Err(AuthError::SessionExpired)
            }
        }
    }

    async fn perform_refresh(&self) -> AuthResult<()> {
        let refresh_token = self.tokens.get_refresh_token().ok_or_else(|| {
            AuthError::InvalidResponse("no refresh token stored".to_string())
        })?;

        let response = self
            .send_once(
                Method::Post,
                "/auth/refresh",
                Some(json!({ "refreshToken": refresh_token })),
                None,
            )
            .await?;
        let response = into_result(response, "/auth/refresh")?;

        let payload = parse_body(&response.body);
        let record = token_record_from_payload(&payload).ok_or_else(|| {
            AuthError::InvalidResponse("refresh response carried no access token".to_string())
        })?;
        self.tokens.store_record(&record)?;
        Ok(())
    }
}

/// Read a token pair from a login or refresh response, in either casing.
pub(crate) fn token_record_from_payload(payload: &Value) -> Option<TokenRecord> {
    let access_token = pick_string(payload, &ACCESS_TOKEN_KEYS)?;

    let expires_at = pick_string(payload, &ACCESS_EXPIRY_KEYS)
        .and_then(|raw| parse_timestamp(&raw))
        .or_else(|| {
            pick_i64(payload, &ACCESS_EXPIRES_IN_KEYS).and_then(expiry_from_seconds)
        });

    Some(TokenRecord {
        access_token,
        expires_at,
        refresh_token: pick_string(payload, &REFRESH_TOKEN_KEYS),
        refresh_expires_at: pick_string(payload, &REFRESH_EXPIRY_KEYS)
            .and_then(|raw| parse_timestamp(&raw)),
    })
}

/// Absolute expiry for a relative lifetime. Out-of-range lifetimes read as
/// unknown.
fn expiry_from_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    Utc::now().checked_add_signed(Duration::try_seconds(seconds)?)
}

/// Human-readable message for a failed response.
///
/// Tried in order: a JSON string body, a `message` field, the first entry of
/// an `errors` map, the raw text of a non-JSON body, then
/// `"<status> <status text>"`.
pub fn extract_error_message(status: u16, status_text: &str, body: &str) -> String {
    let fallback = || format!("{} {}", status, status_text).trim().to_string();

    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            let text = body.trim();
            return if text.is_empty() {
                fallback()
            } else {
                text.to_string()
            };
        }
    };

    match &parsed {
        Value::String(s) if !s.trim().is_empty() => s.clone(),
        Value::Object(_) => pick_string(&parsed, &["message", "Message"])
            .or_else(|| first_error_entry(&parsed))
            .unwrap_or_else(fallback),
        _ => fallback(),
    }
}

fn first_error_entry(parsed: &Value) -> Option<String> {
    let errors = parsed.get("errors").or_else(|| parsed.get("Errors"))?;
    let first = match errors {
        Value::Object(map) => map.values().next()?,
        Value::Array(items) => items.first()?,
        other => other,
    };
    match first {
        Value::String(s) => Some(s.clone()),
        Value::Array(messages) => messages
            .iter()
            .find_map(|m| m.as_str().map(str::to_string)),
        _ => None,
    }
}

/// Endpoint without its query string. Queries may carry credentials and
/// never reach logs or errors.
fn endpoint_path(endpoint: &str) -> &str {
    endpoint
        .split_once('?')
        .map_or(endpoint, |(path, _)| path)
}

fn into_result(response: ApiResponse, endpoint: &str) -> AuthResult<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    let endpoint = endpoint_path(endpoint);

    let message = extract_error_message(response.status, &response.status_text, &response.body);
    warn!(endpoint, status = response.status, message = %message, "request failed");
    Err(match response.status {
        400 => AuthError::BadRequest(message),
        404 => AuthError::EndpointNotFound(endpoint.to_string()),
        status => AuthError::Http { status, message },
    })
}

fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value) -> AuthResult<T> {
    serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}
