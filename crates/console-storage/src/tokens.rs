//! Token persistence across the persistent store and the cookie jar.
//!
//! Writes go to both mediums. Reads try the persistent store first and fall
//! back to the cookie jar; a cookie hit is copied back into the persistent
//! store. Read failures are logged and treated as "absent" so a broken
//! store can only ever log the user out.

use crate::{CookieStore, KeyValueStorage, StorageKeys, StorageResult};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Cookie lifetime for an access token written without an expiry.
pub const DEFAULT_ACCESS_COOKIE_DAYS: i64 = 7;

/// Cookie lifetime for a refresh token written without an expiry.
pub const DEFAULT_REFRESH_COOKIE_DAYS: i64 = 30;

/// What the store knows about the access token's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Expiry recorded and in the future.
    Valid,
    /// Expiry recorded and reached.
    Expired,
    /// No usable expiry on record.
    Unknown,
}

/// Access and refresh tokens issued together by login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

/// Dual-medium token store.
#[derive(Clone)]
pub struct TokenStore {
    persistent: Arc<dyn KeyValueStorage>,
    cookies: CookieStore,
}

impl TokenStore {
    pub fn new(persistent: Arc<dyn KeyValueStorage>, cookies: CookieStore) -> Self {
        Self { persistent, cookies }
    }

    /// The cookie jar half of the store.
    pub fn cookies(&self) -> &CookieStore {
        &self.cookies
    }

    /// Store the access token. An empty token is ignored.
    ///
    /// Without `expires_at` the persistent expiry is removed and the cookie
    /// lives for [`DEFAULT_ACCESS_COOKIE_DAYS`].
    pub fn set_token(&self, token: &str, expires_at: Option<DateTime<Utc>>) -> StorageResult<()> {
        self.write_token(
            StorageKeys::AUTH_TOKEN,
            StorageKeys::TOKEN_EXPIRES_AT,
            token,
            expires_at,
            DEFAULT_ACCESS_COOKIE_DAYS,
        )
    }

    pub fn get_token(&self) -> Option<String> {
        self.read_through(
            StorageKeys::AUTH_TOKEN,
            Some(StorageKeys::TOKEN_EXPIRES_AT),
            DEFAULT_ACCESS_COOKIE_DAYS,
        )
    }

    /// Store the refresh token. An empty token is ignored.
    pub fn set_refresh_token(
        &self,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()> {
        self.write_token(
            StorageKeys::REFRESH_TOKEN,
            StorageKeys::REFRESH_TOKEN_EXPIRES_AT,
            token,
            expires_at,
            DEFAULT_REFRESH_COOKIE_DAYS,
        )
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.read_through(
            StorageKeys::REFRESH_TOKEN,
            Some(StorageKeys::REFRESH_TOKEN_EXPIRES_AT),
            DEFAULT_REFRESH_COOKIE_DAYS,
        )
    }

    /// Write both tokens of a record.
    pub fn store_record(&self, record: &TokenRecord) -> StorageResult<()> {
        self.set_token(&record.access_token, record.expires_at)?;
        if let Some(refresh_token) = &record.refresh_token {
            self.set_refresh_token(refresh_token, record.refresh_expires_at)?;
        }
        Ok(())
    }

    /// Current record, if an access token is present.
    pub fn load_record(&self) -> Option<TokenRecord> {
        let access_token = self.get_token()?;
        Some(TokenRecord {
            access_token,
            expires_at: self.token_expires_at(),
            refresh_token: self.get_refresh_token(),
            refresh_expires_at: self.read_timestamp(StorageKeys::REFRESH_TOKEN_EXPIRES_AT),
        })
    }

    /// Remove every session key from both mediums. Never fails.
    pub fn clear_tokens(&self) {
        for key in StorageKeys::ALL {
            if let Err(e) = self.persistent.delete(key) {
                tracing::warn!(key, error = %e, "failed to clear persistent key");
            }
            if let Err(e) = self.cookies.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear cookie");
            }
        }
        tracing::debug!("token store cleared");
    }

    pub fn has_token(&self) -> bool {
        self.get_token().is_some()
    }

    /// Recorded access token expiry.
    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.read_timestamp(StorageKeys::TOKEN_EXPIRES_AT)
    }

    pub fn expiry_status(&self) -> ExpiryStatus {
        match self.token_expires_at() {
            Some(expires_at) if Utc::now() >= expires_at => ExpiryStatus::Expired,
            Some(_) => ExpiryStatus::Valid,
            None => ExpiryStatus::Unknown,
        }
    }

    /// True only when an expiry is on record and has been reached.
    pub fn is_token_expired(&self) -> bool {
        self.expiry_status() == ExpiryStatus::Expired
    }

    /// Cache the signed-in user in both mediums.
    pub fn set_user_snapshot<T: Serialize>(&self, user: &T) -> StorageResult<()> {
        let json = serde_json::to_string(user)?;
        self.persistent.set(StorageKeys::USER, &json)?;
        self.cookies.set(
            StorageKeys::USER,
            &json,
            Utc::now() + Duration::days(DEFAULT_ACCESS_COOKIE_DAYS),
        )
    }

    /// Cached user, if present and readable as `T`.
    pub fn user_snapshot<T: DeserializeOwned>(&self) -> Option<T> {
        let json = self.read_through(StorageKeys::USER, None, DEFAULT_ACCESS_COOKIE_DAYS)?;
        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable user snapshot");
                None
            }
        }
    }

    fn write_token(
        &self,
        key: &str,
        expiry_key: &str,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
        default_cookie_days: i64,
    ) -> StorageResult<()> {
        if token.is_empty() {
            return Ok(());
        }

        self.persistent.set(key, token)?;
        match expires_at {
            Some(expires_at) => self.persistent.set(expiry_key, &expires_at.to_rfc3339())?,
            None => {
                self.persistent.delete(expiry_key)?;
            }
        }

        let cookie_expiry =
            expires_at.unwrap_or_else(|| Utc::now() + Duration::days(default_cookie_days));
        self.cookies.set(key, token, cookie_expiry)
    }

    /// Read `key` from whichever medium holds it and repair the other one.
    ///
    /// A persistent hit re-sets a missing cookie, expiring at the recorded
    /// expiry under `expiry_key` or after `default_cookie_days`. A cookie hit
    /// back-fills the persistent store.
    fn read_through(
        &self,
        key: &str,
        expiry_key: Option<&str>,
        default_cookie_days: i64,
    ) -> Option<String> {
        match self.persistent.get(key) {
            Ok(Some(value)) => {
                self.repair_cookie(key, &value, expiry_key, default_cookie_days);
                return Some(value);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key, error = %e, "persistent store read failed"),
        }

        let value = match self.cookies.get(key) {
            Ok(value) => value?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cookie read failed");
                return None;
            }
        };

        tracing::debug!(key, "recovered value from cookie, back-filling persistent store");
        if let Err(e) = self.persistent.set(key, &value) {
            tracing::warn!(key, error = %e, "failed to back-fill persistent store");
        }
        Some(value)
    }

    fn repair_cookie(
        &self,
        key: &str,
        value: &str,
        expiry_key: Option<&str>,
        default_cookie_days: i64,
    ) {
        match self.cookies.get(key) {
            Ok(Some(_)) => return,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(key, error = %e, "cookie read failed");
                return;
            }
        }

        let now = Utc::now();
        let expires = match expiry_key.and_then(|k| self.read_timestamp(k)) {
            Some(at) if at <= now => return,
            Some(at) => at,
            None => now + Duration::days(default_cookie_days),
        };

        tracing::debug!(key, "cookie missing, restoring it from persistent store");
        if let Err(e) = self.cookies.set(key, value, expires) {
            tracing::warn!(key, error = %e, "failed to restore cookie");
        }
    }

    fn read_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = match self.persistent.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "persistent store read failed");
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(parsed) => Some(parsed.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring unparseable expiry");
                None
            }
        }
    }
}
