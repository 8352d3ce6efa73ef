//! JWT payload decoding.
//!
//! The signature is never verified here; the server does that. Claims are
//! only read to recover the user's identity and role without a round trip.

use crate::fields::{as_i64, pick_i64, pick_string};
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

const NAME_IDENTIFIER_CLAIM: &str =
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
const EMAIL_CLAIM: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress";
const ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

const ID_KEYS: [&str; 4] = ["sub", "userId", "id", NAME_IDENTIFIER_CLAIM];
const FIRST_NAME_KEYS: [&str; 2] = ["firstName", "given_name"];
const LAST_NAME_KEYS: [&str; 2] = ["lastName", "family_name"];
const EMAIL_KEYS: [&str; 3] = ["email", "username", EMAIL_CLAIM];
const ROLE_ID_KEYS: [&str; 3] = ["roleId", "RoleId", "role_id"];
const ROLE_NAME_KEYS: [&str; 4] = ["role", "Role", "roleName", ROLE_CLAIM];

/// Decoded JWT payload.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtClaims {
    payload: Value,
}

/// Decode the payload (second segment) of a JWT.
///
/// Returns `None` for anything that is not a dot-separated token whose second
/// segment is base64url-encoded JSON object.
pub fn decode_claims(token: &str) -> Option<JwtClaims> {
    let segment = token.split('.').nth(1)?.trim_end_matches('=');
    if segment.is_empty() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .ok()?;

    match serde_json::from_slice::<Value>(&bytes).ok()? {
        payload @ Value::Object(_) => Some(JwtClaims { payload }),
        _ => None,
    }
}

impl JwtClaims {
    /// `exp` claim, seconds since the epoch.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let seconds = as_i64(self.payload.get("exp")?)?;
        Utc.timestamp_opt(seconds, 0).single()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| now >= exp)
    }

    pub fn user_id(&self) -> Option<String> {
        pick_string(&self.payload, &ID_KEYS)
    }

    pub fn first_name(&self) -> Option<String> {
        pick_string(&self.payload, &FIRST_NAME_KEYS)
    }

    pub fn last_name(&self) -> Option<String> {
        pick_string(&self.payload, &LAST_NAME_KEYS)
    }

    pub fn email(&self) -> Option<String> {
        pick_string(&self.payload, &EMAIL_KEYS)
    }

    pub fn role_id(&self) -> Option<i64> {
        pick_i64(&self.payload, &ROLE_ID_KEYS)
    }

    /// Role name. A role claim carried as an array yields its first entry.
    pub fn role_name(&self) -> Option<String> {
        pick_string(&self.payload, &ROLE_NAME_KEYS).or_else(|| {
            ROLE_NAME_KEYS.iter().find_map(|key| {
                self.payload
                    .get(*key)?
                    .as_array()?
                    .iter()
                    .find_map(|v| v.as_str().map(str::to_string))
            })
        })
    }
}

#[cfg(test)]
pub(crate) fn encode_test_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{body}.signature")
}
