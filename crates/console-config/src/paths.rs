//! File system paths for the console.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Environment variable that relocates the base directory.
const ENV_HOME: &str = "RESPONDER_HOME";

/// Manages file system paths for the console.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for console state (~/.responder)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance.
    ///
    /// Uses `$RESPONDER_HOME` when set, otherwise `~/.responder`.
    pub fn new() -> CoreResult<Self> {
        if let Some(base) = std::env::var_os(ENV_HOME).filter(|value| !value.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(base)));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".responder"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.responder).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.responder/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the storage directory (~/.responder/storage).
    pub fn storage_dir(&self) -> PathBuf {
        self.base_dir.join("storage")
    }

    /// Persistent key/value store (~/.responder/storage/local.json).
    pub fn local_store_file(&self) -> PathBuf {
        self.storage_dir().join("local.json")
    }

    /// Cookie jar (~/.responder/storage/cookies.json).
    pub fn cookie_store_file(&self) -> PathBuf {
        self.storage_dir().join("cookies.json")
    }

    /// Get the logs directory (~/.responder/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the console log file path (~/.responder/logs/console.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("console.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.storage_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
