//! Cookie jar with browser-style expiry.
//!
//! Each cookie is kept as a JSON [`CookieRecord`] under its own name in a
//! [`KeyValueStorage`] backend. Expired cookies read as absent and are
//! removed the moment they are looked at.

use crate::{KeyValueStorage, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// A stored cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub same_site: SameSite,
    pub secure: bool,
}

impl CookieRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// Cookie jar over a key/value backend.
#[derive(Clone)]
pub struct CookieStore {
    backend: Arc<dyn KeyValueStorage>,
    secure: bool,
}

impl CookieStore {
    /// `secure` marks every cookie written with the `Secure` attribute; set it
    /// when the backend is served over HTTPS.
    pub fn new(backend: Arc<dyn KeyValueStorage>, secure: bool) -> Self {
        Self { backend, secure }
    }

    /// Write a cookie with `path=/` and `SameSite=Lax`.
    pub fn set(&self, name: &str, value: &str, expires: DateTime<Utc>) -> StorageResult<()> {
        let record = CookieRecord {
            value: value.to_string(),
            expires,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            secure: self.secure,
        };
        let json = serde_json::to_string(&record)?;
        self.backend.set(name, &json)
    }

    /// Full record of a live cookie.
    pub fn record(&self, name: &str) -> StorageResult<Option<CookieRecord>> {
        let Some(json) = self.backend.get(name)? else {
            return Ok(None);
        };

        let record: CookieRecord = match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(cookie = name, error = %e, "dropping unreadable cookie");
                self.backend.delete(name)?;
                return Ok(None);
            }
        };

        if record.is_expired_at(Utc::now()) {
            tracing::debug!(cookie = name, "cookie expired");
            self.backend.delete(name)?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Value of a live cookie.
    pub fn get(&self, name: &str) -> StorageResult<Option<String>> {
        Ok(self.record(name)?.map(|record| record.value))
    }

    /// Delete a cookie, returning whether it existed.
    pub fn remove(&self, name: &str) -> StorageResult<bool> {
        self.backend.delete(name)
    }

    /// Remove every expired cookie. Returns how many were dropped.
    pub fn purge_expired(&self) -> StorageResult<usize> {
        let mut purged = 0;
        for name in self.backend.keys()? {
            if self.record(&name)?.is_none() {
                purged += 1;
            }
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use chrono::Duration;

    fn jar(secure: bool) -> (Arc<MemoryStorage>, CookieStore) {
        let backend = Arc::new(MemoryStorage::new());
        let store = CookieStore::new(backend.clone(), secure);
        (backend, store)
    }

    #[test]
    fn test_live_cookie_round_trip() {
        let (_, jar) = jar(false);
        jar.set("authToken", "abc", Utc::now() + Duration::days(1)).unwrap();

        assert_eq!(jar.get("authToken").unwrap(), Some("abc".to_string()));
        let record = jar.record("authToken").unwrap().unwrap();
        assert_eq!(record.path, "/");
        assert_eq!(record.same_site, SameSite::Lax);
        assert!(!record.secure);
    }

    #[test]
    fn test_expired_cookie_reads_as_absent_and_is_purged() {
        let (backend, jar) = jar(false);
        jar.set("authToken", "abc", Utc::now() - Duration::seconds(1)).unwrap();

        assert_eq!(jar.get("authToken").unwrap(), None);
        assert!(!backend.has("authToken").unwrap());
    }

    #[test]
    fn test_unreadable_cookie_is_dropped() {
        let (backend, jar) = jar(false);
        backend.set("authToken", "garbage").unwrap();

        assert_eq!(jar.get("authToken").unwrap(), None);
        assert!(!backend.has("authToken").unwrap());
    }

    #[test]
    fn test_purge_expired() {
        let (_, jar) = jar(false);
        jar.set("old", "1", Utc::now() - Duration::days(1)).unwrap();
        jar.set("new", "2", Utc::now() + Duration::days(1)).unwrap();

        assert_eq!(jar.purge_expired().unwrap(), 1);
        assert_eq!(jar.get("new").unwrap(), Some("2".to_string()));
    }
}
