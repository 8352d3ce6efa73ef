//! Client-side storage for the Responder console.
//!
//! Two mediums back every session: a persistent key/value store and a
//! cookie jar with browser-style expiry. [`TokenStore`] keeps tokens in
//! both and reads the persistent store first.

mod cookies;
mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use cookies::{CookieRecord, CookieStore, SameSite};
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use tokens::{
    ExpiryStatus, TokenRecord, TokenStore, DEFAULT_ACCESS_COOKIE_DAYS, DEFAULT_REFRESH_COOKIE_DAYS,
};
pub use traits::KeyValueStorage;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backing file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Backing file exists but is not a valid store
    #[error("Corrupt store {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Encoding(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
