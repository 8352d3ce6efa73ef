//! Configuration management for the console.
//!
//! Settings come from an optional `config.json` in the base directory and are
//! then overridden by environment variables. The API base URL and both role
//! ids have no defaults: a console that does not know which backend it talks
//! to, or which role is the admin role, refuses to start.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable holding the API base URL (e.g. `https://host/api/v1`).
pub const ENV_API_URL: &str = "RESPONDER_API_URL";
/// Environment variable holding the admin role id.
pub const ENV_ADMIN_ROLE_ID: &str = "RESPONDER_ADMIN_ROLE_ID";
/// Environment variable holding the role id assigned when a token carries none.
pub const ENV_DEFAULT_ROLE_ID: &str = "RESPONDER_DEFAULT_ROLE_ID";
/// Environment variable overriding the profile validation timeout.
pub const ENV_PROFILE_TIMEOUT_SECS: &str = "RESPONDER_PROFILE_TIMEOUT_SECS";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "RESPONDER_LOG_LEVEL";
const ENV_APP_NAME: &str = "RESPONDER_APP_NAME";
const ENV_SYSTEM_NAME: &str = "RESPONDER_SYSTEM_NAME";
const ENV_REGION: &str = "RESPONDER_REGION";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default upper bound on the profile fetch made while validating a session.
pub const DEFAULT_PROFILE_TIMEOUT_SECS: u64 = 10;

/// Unvalidated settings as read from the config file and environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub admin_role_id: Option<i64>,
    #[serde(default)]
    pub default_role_id: Option<i64>,
    #[serde(default)]
    pub profile_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub system_name: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl RawConfig {
    /// Load settings from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawConfig = serde_json::from_str(&content)?;
        Ok(raw)
    }

    /// Override settings from the process environment.
    pub fn apply_env(&mut self) -> CoreResult<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override settings from an arbitrary variable lookup.
    ///
    /// Empty values are ignored. Numeric variables that do not parse are a
    /// configuration error rather than being silently dropped.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = Some(url);
        }
        if let Some(value) = get(ENV_ADMIN_ROLE_ID) {
            self.admin_role_id = Some(parse_number(ENV_ADMIN_ROLE_ID, &value)?);
        }
        if let Some(value) = get(ENV_DEFAULT_ROLE_ID) {
            self.default_role_id = Some(parse_number(ENV_DEFAULT_ROLE_ID, &value)?);
        }
        if let Some(value) = get(ENV_PROFILE_TIMEOUT_SECS) {
            self.profile_timeout_secs = Some(parse_number(ENV_PROFILE_TIMEOUT_SECS, &value)?);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = Some(level);
        }
        if let Some(name) = get(ENV_APP_NAME) {
            self.app_name = Some(name);
        }
        if let Some(name) = get(ENV_SYSTEM_NAME) {
            self.system_name = Some(name);
        }
        if let Some(region) = get(ENV_REGION) {
            self.region = Some(region);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> CoreResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{key} must be a number, got {value:?}")))
}

/// Validated console configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint path is appended to, without a trailing slash.
    pub api_base_url: Url,
    /// Role id that grants admin access.
    pub admin_role_id: i64,
    /// Role id assumed when a token carries no role claim.
    pub default_role_id: i64,
    /// Upper bound on the profile fetch made while validating a session.
    pub profile_timeout: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    pub app_name: Option<String>,
    pub system_name: Option<String>,
    pub region: Option<String>,
}

impl Config {
    /// Load configuration from the config file (if any) and the environment.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut raw = if config_path.exists() {
            RawConfig::load_from_file(&config_path)?
        } else {
            RawConfig::default()
        };
        raw.apply_env()?;

        Self::from_raw(raw)
    }

    /// Validate raw settings.
    pub fn from_raw(raw: RawConfig) -> CoreResult<Self> {
        let api_url = raw
            .api_url
            .ok_or_else(|| CoreError::Config(format!("{ENV_API_URL} is not set")))?;
        let api_base_url = Url::parse(api_url.trim().trim_end_matches('/'))?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "{ENV_API_URL} must be an http(s) URL, got {api_url}"
            )));
        }

        let admin_role_id = raw
            .admin_role_id
            .ok_or_else(|| CoreError::Config(format!("{ENV_ADMIN_ROLE_ID} is not set")))?;
        let default_role_id = raw
            .default_role_id
            .ok_or_else(|| CoreError::Config(format!("{ENV_DEFAULT_ROLE_ID} is not set")))?;

        let profile_timeout_secs = raw
            .profile_timeout_secs
            .unwrap_or(DEFAULT_PROFILE_TIMEOUT_SECS);
        if profile_timeout_secs == 0 {
            return Err(CoreError::Config(format!(
                "{ENV_PROFILE_TIMEOUT_SECS} must be greater than zero"
            )));
        }

        Ok(Self {
            api_base_url,
            admin_role_id,
            default_role_id,
            profile_timeout: Duration::from_secs(profile_timeout_secs),
            log_level: raw
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            app_name: raw.app_name,
            system_name: raw.system_name,
            region: raw.region,
        })
    }

    /// Full URL for an endpoint path such as `/auth/login`.
    pub fn endpoint_url(&self, endpoint: &str) -> CoreResult<Url> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Url::parse(&format!("{base}/{endpoint}")).map_err(CoreError::from)
    }

    /// Whether the backend is served over HTTPS (cookies get the `Secure` flag).
    pub fn uses_https(&self) -> bool {
        self.api_base_url.scheme() == "https"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn complete_raw() -> RawConfig {
        RawConfig {
            api_url: Some("https://responder.example.com/api/v1/".to_string()),
            admin_role_id: Some(1),
            default_role_id: Some(2),
            ..Default::default()
        }
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_raw_applies_defaults() {
        let config = Config::from_raw(complete_raw()).unwrap();
        assert_eq!(config.admin_role_id, 1);
        assert_eq!(config.default_role_id, 2);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(
            config.profile_timeout,
            Duration::from_secs(DEFAULT_PROFILE_TIMEOUT_SECS)
        );
        assert!(config.uses_https());
    }

    #[test]
    fn test_missing_api_url_is_fatal() {
        let raw = RawConfig {
            api_url: None,
            ..complete_raw()
        };
        let err = Config::from_raw(raw).unwrap_err();
        assert!(err.to_string().contains(ENV_API_URL));
    }

    #[test]
    fn test_missing_role_ids_are_fatal() {
        let raw = RawConfig {
            admin_role_id: None,
            ..complete_raw()
        };
        assert!(Config::from_raw(raw).is_err());

        let raw = RawConfig {
            default_role_id: None,
            ..complete_raw()
        };
        assert!(Config::from_raw(raw).is_err());
    }

    #[test]
    fn test_non_http_url_rejected() {
        let raw = RawConfig {
            api_url: Some("ftp://responder.example.com".to_string()),
            ..complete_raw()
        };
        assert!(matches!(Config::from_raw(raw), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let config = Config::from_raw(complete_raw()).unwrap();
        assert_eq!(
            config.endpoint_url("/auth/login").unwrap().as_str(),
            "https://responder.example.com/api/v1/auth/login"
        );
        assert_eq!(
            config
                .endpoint_url("iam/change-pass?currentPassword=a&newPassword=b")
                .unwrap()
                .as_str(),
            "https://responder.example.com/api/v1/iam/change-pass?currentPassword=a&newPassword=b"
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut raw = complete_raw();
        raw.apply_env_with(env_from(&[
            (ENV_API_URL, "http://localhost:5000/api/v1"),
            (ENV_ADMIN_ROLE_ID, "7"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_DEFAULT_ROLE_ID, ""),
        ]))
        .unwrap();

        let config = Config::from_raw(raw).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/api/v1");
        assert_eq!(config.admin_role_id, 7);
        assert_eq!(config.default_role_id, 2);
        assert_eq!(config.log_level, "debug");
        assert!(!config.uses_https());
    }

    #[test]
    fn test_env_rejects_non_numeric_role() {
        let mut raw = complete_raw();
        let result = raw.apply_env_with(env_from(&[(ENV_ADMIN_ROLE_ID, "admin")]));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let raw = RawConfig {
            profile_timeout_secs: Some(0),
            ..complete_raw()
        };
        assert!(Config::from_raw(raw).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "api_url": "https://a.example.com/api", "admin_role_id": 1, "default_role_id": 2, "region": "VII" }"#,
        )
        .unwrap();

        let raw = RawConfig::load_from_file(&config_path).unwrap();
        assert_eq!(raw.region.as_deref(), Some("VII"));
        let config = Config::from_raw(raw).unwrap();
        assert_eq!(config.api_base_url.as_str(), "https://a.example.com/api");
    }
}
