//! Typed wrappers over the console's REST endpoints.
//!
//! Pre-login flows (admin registration, password reset) are sent without the
//! stored token; everything else goes through the authenticated path and
//! inherits its refresh and retry handling.

use crate::models::{
    Contact, ContactDraft, IncidentType, IncidentTypeDraft, LoginHistoryEntry, OtpDispatch,
    Profile, ProfileUpdate, UserAccount,
};
use console_auth::{ApiClient, AuthError, AuthResult, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Endpoint surface of the console backend.
#[derive(Clone)]
pub struct ConsoleApi {
    client: Arc<ApiClient>,
}

impl ConsoleApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    // Admin registration

    /// Whether an admin account exists. Any failure reads as `false`.
    pub async fn admin_exists(&self) -> bool {
        match self
            .client
            .request_anonymous(Method::Get, "/auth/admin-exists", None)
            .await
        {
            Ok(value) => value
                .get("exists")
                .or_else(|| value.get("Exists"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            Err(e) => {
                warn!(error = %e, "admin existence check failed");
                false
            }
        }
    }

    /// Create the first admin directly.
    pub async fn create_admin(&self, email: &str, password: &str) -> AuthResult<Value> {
        self.anonymous_post(
            "/auth/create-admin",
            json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Email a verification code for admin registration.
    pub async fn send_admin_otp(&self, email: &str) -> AuthResult<OtpDispatch> {
        let value = self
            .anonymous_post("/auth/send-admin-otp", json!({ "email": email }))
            .await?;
        decode_or_default(value)
    }

    pub async fn verify_admin_otp(&self, email: &str, otp: &str) -> AuthResult<Value> {
        self.anonymous_post(
            "/auth/verify-admin-otp",
            json!({ "email": email, "otp": otp }),
        )
        .await
    }

    /// Create an admin account once the emailed code has been verified.
    pub async fn create_admin_with_otp(
        &self,
        email: &str,
        otp: &str,
        password: &str,
    ) -> AuthResult<Value> {
        self.anonymous_post(
            "/auth/create-admin-with-otp",
            json!({ "email": email, "otp": otp, "password": password }),
        )
        .await
    }

    // Password reset

    pub async fn forgot_password(&self, email: &str) -> AuthResult<Value> {
        self.anonymous_post("/auth/forgot-password", json!({ "email": email }))
            .await
    }

    pub async fn verify_forgot_password_otp(
        &self,
        email: &str,
        verification_code: &str,
    ) -> AuthResult<Value> {
        self.anonymous_post(
            "/auth/verify-forgot-password-otp",
            json!({ "email": email, "verificationCode": verification_code }),
        )
        .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        verification_code: &str,
        new_password: &str,
    ) -> AuthResult<Value> {
        self.anonymous_post(
            "/auth/reset-password",
            json!({
                "email": email,
                "verificationCode": verification_code,
                "newPassword": new_password
            }),
        )
        .await
    }

    // Profile

    pub async fn profile(&self) -> AuthResult<Profile> {
        self.client.get("/auth/profile").await
    }

    pub async fn login_history(&self) -> AuthResult<Vec<LoginHistoryEntry>> {
        self.list("/auth/my-login-history").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> AuthResult<Value> {
        self.client.post("/iam/update", update).await
    }

    /// Change the signed-in user's password. The server checks the current one.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<Value> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("currentPassword", current_password)
            .append_pair("newPassword", new_password)
            .finish();
        self.client
            .request(Method::Post, &format!("/iam/change-pass?{query}"), None)
            .await
    }

    // Contacts

    pub async fn contacts(&self) -> AuthResult<Vec<Contact>> {
        self.list("/admin/contact").await
    }

    /// Create a contact and return it as stored by the server.
    pub async fn create_contact(&self, draft: &ContactDraft) -> AuthResult<Contact> {
        self.client.post("/admin/contact", draft).await
    }

    /// Replace a contact. The id travels in the body.
    pub async fn update_contact(&self, contact: &Contact) -> AuthResult<Value> {
        self.client.put("/admin/contact", contact).await
    }

    pub async fn delete_contact(&self, id: &str) -> AuthResult<Value> {
        let id = path_id(id)?;
        self.client.delete(&format!("/admin/contact/{id}")).await
    }

    // Users

    pub async fn users(&self) -> AuthResult<Vec<UserAccount>> {
        self.list("/admin/userlist").await
    }

    // Incident types

    pub async fn incident_types(&self) -> AuthResult<Vec<IncidentType>> {
        self.list("/TypeOfIncident/all").await
    }

    pub async fn create_incident_type(&self, draft: &IncidentTypeDraft) -> AuthResult<Value> {
        self.client.post("/TypeOfIncident", draft).await
    }

    pub async fn update_incident_type(
        &self,
        id: &str,
        draft: &IncidentTypeDraft,
    ) -> AuthResult<Value> {
        let id = path_id(id)?;
        let mut draft = draft.clone();
        draft.id = Some(id.to_string());
        self.client
            .put(&format!("/TypeOfIncident/{id}"), &draft)
            .await
    }

    /// Soft-delete: the server marks the type inactive.
    pub async fn deactivate_incident_type(&self, id: &str) -> AuthResult<Value> {
        let id = path_id(id)?;
        self.client.delete(&format!("/TypeOfIncident/{id}")).await
    }

    pub async fn reactivate_incident_type(&self, id: &str) -> AuthResult<Value> {
        let id = path_id(id)?;
        self.client
            .patch(&format!("/TypeOfIncident/{id}/reactivate"))
            .await
    }

    async fn anonymous_post(&self, endpoint: &str, body: Value) -> AuthResult<Value> {
        self.client
            .request_anonymous(Method::Post, endpoint, Some(body))
            .await
    }

    /// Fetch a list. An empty body is an empty list; any other non-array body
    /// is logged and read as empty.
    async fn list<T: DeserializeOwned>(&self, endpoint: &str) -> AuthResult<Vec<T>> {
        match self.client.request(Method::Get, endpoint, None).await? {
            Value::Null => Ok(Vec::new()),
            value @ Value::Array(_) => {
                let items: Vec<T> = serde_json::from_value(value)
                    .map_err(|e| AuthError::InvalidResponse(format!("{endpoint}: {e}")))?;
                debug!(endpoint, count = items.len(), "list fetched");
                Ok(items)
            }
            other => {
                warn!(endpoint, kind = json_kind(&other), "expected a list, ignoring response");
                Ok(Vec::new())
            }
        }
    }
}

/// Id usable as a single path segment.
fn path_id(id: &str) -> AuthResult<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains(|c: char| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace())
    {
        return Err(AuthError::InvalidInput(format!("invalid id {id:?}")));
    }
    Ok(id)
}

fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> AuthResult<T> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| AuthError::InvalidResponse(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_id() {
        assert_eq!(path_id(" 42 ").unwrap(), "42");
        assert_eq!(
            path_id("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
        for bad in ["", "  ", "1/2", "1?x", "a b", "%2F"] {
            assert!(matches!(path_id(bad), Err(AuthError::InvalidInput(_))), "{bad}");
        }
    }

    #[test]
    fn test_decode_or_default() {
        let dispatch: OtpDispatch = decode_or_default(Value::Null).unwrap();
        assert_eq!(dispatch, OtpDispatch::default());
        let dispatch: OtpDispatch =
            decode_or_default(json!({ "expiresAt": "2030-01-01T00:00:00Z" })).unwrap();
        assert!(dispatch.expiry().is_some());
    }
}
