//! Session user normalisation.
//!
//! A [`SessionUser`] is rebuilt from one of three sources: JWT claims, the
//! profile endpoint, or a login response. Role data from the JWT always wins
//! over role data from a response body.

use crate::fields::{pick_i64, pick_string};
use crate::jwt::JwtClaims;
use crate::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const PROFILE_ID_KEYS: [&str; 4] = ["Id", "id", "userId", "UserId"];
const PROFILE_EMAIL_KEYS: [&str; 2] = ["Email", "email"];
const PROFILE_FIRST_NAME_KEYS: [&str; 2] = ["FirstName", "firstName"];
const PROFILE_LAST_NAME_KEYS: [&str; 2] = ["LastName", "lastName"];
const PROFILE_ROLE_ID_KEYS: [&str; 3] = ["RoleId", "roleId", "role_id"];
const PROFILE_ROLE_NAME_KEYS: [&str; 4] = ["Role", "role", "RoleName", "roleName"];

const LOGIN_ID_KEYS: [&str; 4] = ["userId", "id", "Id", "UserId"];
const LOGIN_EMAIL_KEYS: [&str; 2] = ["email", "Email"];
const LOGIN_FIRST_NAME_KEYS: [&str; 2] = ["firstName", "FirstName"];
const LOGIN_LAST_NAME_KEYS: [&str; 2] = ["lastName", "LastName"];
const LOGIN_ROLE_ID_KEYS: [&str; 3] = ["roleId", "RoleId", "role_id"];
const LOGIN_ROLE_NAME_KEYS: [&str; 4] = ["role", "Role", "roleName", "RoleName"];

/// The signed-in user as the console sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
}

impl SessionUser {
    /// Build a user from JWT claims. Needs at least an id or an email.
    pub fn from_claims(claims: &JwtClaims, default_role_id: i64) -> Option<Self> {
        let id = claims.user_id();
        let email = claims.email();
        if id.is_none() && email.is_none() {
            return None;
        }

        Some(Self {
            id: id.unwrap_or_default(),
            first_name: claims.first_name().unwrap_or_default(),
            last_name: claims.last_name().unwrap_or_default(),
            email: email.unwrap_or_default(),
            role_id: claims.role_id().unwrap_or(default_role_id),
            role_name: claims.role_name(),
        })
    }

    /// Build a user from a profile response.
    pub fn from_profile(profile: &Value, default_role_id: i64) -> AuthResult<Self> {
        let id = pick_string(profile, &PROFILE_ID_KEYS);
        let email = pick_string(profile, &PROFILE_EMAIL_KEYS);
        if id.is_none() && email.is_none() {
            return Err(AuthError::InvalidProfile(
                "response has neither an id nor an email".to_string(),
            ));
        }

        Ok(Self {
            id: id.unwrap_or_default(),
            first_name: pick_string(profile, &PROFILE_FIRST_NAME_KEYS).unwrap_or_default(),
            last_name: pick_string(profile, &PROFILE_LAST_NAME_KEYS).unwrap_or_default(),
            email: email.unwrap_or_default(),
            role_id: pick_i64(profile, &PROFILE_ROLE_ID_KEYS).unwrap_or(default_role_id),
            role_name: pick_string(profile, &PROFILE_ROLE_NAME_KEYS),
        })
    }

    /// Build a user from a login response, merging in JWT claims.
    ///
    /// Identity comes from the payload, falling back to the claims. Role id
    /// and role name come from the claims when present, else the payload.
    pub fn from_login_payload(
        payload: &Value,
        claims: Option<&JwtClaims>,
        default_role_id: i64,
    ) -> AuthResult<Self> {
        let from_claims = |f: fn(&JwtClaims) -> Option<String>| claims.and_then(f);

        let id = pick_string(payload, &LOGIN_ID_KEYS).or_else(|| from_claims(JwtClaims::user_id));
        let email =
            pick_string(payload, &LOGIN_EMAIL_KEYS).or_else(|| from_claims(JwtClaims::email));
        if id.is_none() && email.is_none() {
            return Err(AuthError::InvalidResponse(
                "login response identifies no user".to_string(),
            ));
        }

        let mut user = Self {
            id: id.unwrap_or_default(),
            first_name: pick_string(payload, &LOGIN_FIRST_NAME_KEYS)
                .or_else(|| from_claims(JwtClaims::first_name))
                .unwrap_or_default(),
            last_name: pick_string(payload, &LOGIN_LAST_NAME_KEYS)
                .or_else(|| from_claims(JwtClaims::last_name))
                .unwrap_or_default(),
            email: email.unwrap_or_default(),
            role_id: pick_i64(payload, &LOGIN_ROLE_ID_KEYS).unwrap_or(default_role_id),
            role_name: pick_string(payload, &LOGIN_ROLE_NAME_KEYS),
        };
        if let Some(claims) = claims {
            user.apply_claim_roles(claims);
        }
        Ok(user)
    }

    /// Overwrite role data with whatever the claims carry.
    pub fn apply_claim_roles(&mut self, claims: &JwtClaims) {
        if let Some(role_id) = claims.role_id() {
            self.role_id = role_id;
        }
        if let Some(role_name) = claims.role_name() {
            self.role_name = Some(role_name);
        }
    }

    /// Admin iff the role id matches or the role name is "admin".
    pub fn is_admin(&self, admin_role_id: i64) -> bool {
        self.role_id == admin_role_id
            || self
                .role_name
                .as_deref()
                .is_some_and(|name| name.trim().eq_ignore_ascii_case("admin"))
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
