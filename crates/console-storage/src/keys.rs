//! Storage key constants.

/// Keys shared by the persistent store and the cookie jar.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token
    pub const AUTH_TOKEN: &'static str = "authToken";

    /// Refresh token
    pub const REFRESH_TOKEN: &'static str = "refreshToken";

    /// Access token expiry (RFC 3339)
    pub const TOKEN_EXPIRES_AT: &'static str = "tokenExpiresAt";

    /// Refresh token expiry (RFC 3339)
    pub const REFRESH_TOKEN_EXPIRES_AT: &'static str = "refreshTokenExpiresAt";

    /// Cached user snapshot (JSON)
    pub const USER: &'static str = "user";

    /// Every key the session subsystem writes.
    pub const ALL: [&'static str; 5] = [
        Self::AUTH_TOKEN,
        Self::REFRESH_TOKEN,
        Self::TOKEN_EXPIRES_AT,
        Self::REFRESH_TOKEN_EXPIRES_AT,
        Self::USER,
    ];
}
