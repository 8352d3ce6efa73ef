//! Authentication and API error types.

use thiserror::Error;

/// Error type for API calls and session handling.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend could not be reached at all
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// HTTP 400 with the server's validation message
    #[error("{0}")]
    BadRequest(String),

    /// HTTP 404
    #[error("Endpoint not found: {0} (check the server address)")]
    EndpointNotFound(String),

    /// Refresh failed or a retried request was rejected again
    #[error("Session expired")]
    SessionExpired,

    /// Any other non-2xx response
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Profile response without an id or email
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// 2xx response whose body could not be used
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Profile validation did not finish in time
    #[error("Operation timed out")]
    Timeout,

    /// Caller-supplied value rejected before sending
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] console_storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] console_config::CoreError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::ServerUnreachable(_) | AuthError::Timeout => true,
            AuthError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the caller should send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, AuthError::SessionExpired)
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::ServerUnreachable(_) => {
                "Unable to connect to the server. Check your connection and make sure the server is running."
                    .to_string()
            }
            AuthError::BadRequest(message) => message.clone(),
            AuthError::EndpointNotFound(_) => {
                "API endpoint not found. Please check the server configuration.".to_string()
            }
            AuthError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            AuthError::Http { message, .. } => message.clone(),
            AuthError::Timeout => "The server took too long to respond.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
