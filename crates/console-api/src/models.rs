//! Resource records returned by the console endpoints.
//!
//! Every record deserializes from both casings the backend uses. Fields the
//! console only displays stay as text; timestamps are not reparsed.

use crate::lenient;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    Ambulance,
    Pnp,
    Bfp,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::User, Role::Ambulance, Role::Pnp, Role::Bfp];

    pub fn id(self) -> i64 {
        match self {
            Role::Admin => 1,
            Role::User => 2,
            Role::Ambulance => 3,
            Role::Pnp => 4,
            Role::Bfp => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Ambulance => "Ambulance",
            Role::Pnp => "PNP",
            Role::Bfp => "BFP",
        }
    }

    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }
}

impl FromStr for Role {
    type Err = String;

    /// Accepts a role id or a role name in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Role::from_id(id).ok_or_else(|| format!("unknown role id {id}"));
        }
        Role::ALL
            .into_iter()
            .find(|role| role.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role {s:?}"))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display name for a role id, `"Unknown"` when unmapped.
pub fn role_name(role_id: i64) -> &'static str {
    Role::from_id(role_id).map_or("Unknown", Role::name)
}

/// Channel a contact is reached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Phone,
    Email,
    Facebook,
}

impl ContactType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContactType::Phone => "phone",
            ContactType::Email => "email",
            ContactType::Facebook => "facebook",
        }
    }
}

impl FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phone" => Ok(ContactType::Phone),
            "email" => Ok(ContactType::Email),
            "facebook" => Ok(ContactType::Facebook),
            other => Err(format!(
                "unknown contact type {other:?} (expected phone, email or facebook)"
            )),
        }
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emergency contact published to responders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, alias = "Id", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, alias = "Name", deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, alias = "Description", deserialize_with = "lenient::string")]
    pub description: String,
    /// Free text on the wire; see [`Contact::kind`].
    #[serde(
        rename = "type",
        alias = "Type",
        default,
        deserialize_with = "lenient::string"
    )]
    pub contact_type: String,
    #[serde(default, alias = "Value", deserialize_with = "lenient::string")]
    pub value: String,
    #[serde(
        default,
        alias = "CreatedAt",
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(
        default,
        alias = "UpdatedAt",
        deserialize_with = "lenient::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
}

impl Contact {
    /// Parsed contact type, if it is one the console knows.
    pub fn kind(&self) -> Option<ContactType> {
        self.contact_type.parse().ok()
    }
}

/// Body of a contact creation. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactDraft {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub value: String,
}

/// Account listed on the user management page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default, alias = "Id", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, alias = "FirstName", deserialize_with = "lenient::string")]
    pub first_name: String,
    #[serde(default, alias = "LastName", deserialize_with = "lenient::string")]
    pub last_name: String,
    #[serde(default, alias = "Email", deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, alias = "PhoneNumber", deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, alias = "RoleId", deserialize_with = "lenient::int")]
    pub role_id: i64,
    #[serde(default, alias = "RoleName", deserialize_with = "lenient::opt_string")]
    pub role_name: Option<String>,
    #[serde(default, alias = "IsEmailVerified", deserialize_with = "lenient::flag")]
    pub is_email_verified: bool,
    #[serde(default, alias = "IsPhoneVerified", deserialize_with = "lenient::flag")]
    pub is_phone_verified: bool,
    #[serde(default, alias = "CreatedAt", deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, alias = "LastLogin", deserialize_with = "lenient::opt_string")]
    pub last_login: Option<String>,
}

impl UserAccount {
    /// Role name sent by the server, else the role table's name.
    pub fn role_label(&self) -> String {
        self.role_name
            .clone()
            .unwrap_or_else(|| role_name(self.role_id).to_string())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Incident category responders can report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentType {
    #[serde(default, alias = "Id", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, alias = "NameOfIncident", deserialize_with = "lenient::string")]
    pub name_of_incident: String,
    #[serde(default, alias = "Description", deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, alias = "AddedDateTime", deserialize_with = "lenient::opt_string")]
    pub added_date_time: Option<String>,
    #[serde(
        rename = "whoAddedItID",
        alias = "WhoAddedItID",
        alias = "whoAddedItId",
        default,
        deserialize_with = "lenient::opt_string"
    )]
    pub who_added_it_id: Option<String>,
    #[serde(default, alias = "IsActive", deserialize_with = "lenient::flag")]
    pub is_active: bool,
    /// Routed to the fire bureau.
    #[serde(
        rename = "isBFPTrue",
        alias = "IsBFPTrue",
        default,
        deserialize_with = "lenient::flag"
    )]
    pub is_bfp_true: bool,
    /// Routed to the police.
    #[serde(
        rename = "isPNPTrue",
        alias = "IsPNPTrue",
        default,
        deserialize_with = "lenient::flag"
    )]
    pub is_pnp_true: bool,
    #[serde(default, alias = "CreatedAt", deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, alias = "UpdatedAt", deserialize_with = "lenient::opt_string")]
    pub updated_at: Option<String>,
}

/// Body of an incident type creation or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentTypeDraft {
    /// Set on updates only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name_of_incident: String,
    pub description: String,
    pub is_active: bool,
    #[serde(rename = "isBFPTrue")]
    pub is_bfp_true: bool,
    #[serde(rename = "isPNPTrue")]
    pub is_pnp_true: bool,
    #[serde(rename = "whoAddedItID")]
    pub who_added_it_id: String,
}

impl IncidentTypeDraft {
    /// Draft pre-filled from an existing record, for partial edits.
    pub fn from_existing(incident: &IncidentType, editor_id: &str) -> Self {
        Self {
            id: Some(incident.id.clone()),
            name_of_incident: incident.name_of_incident.clone(),
            description: incident.description.clone(),
            is_active: incident.is_active,
            is_bfp_true: incident.is_bfp_true,
            is_pnp_true: incident.is_pnp_true,
            who_added_it_id: editor_id.to_string(),
        }
    }
}

/// One sign-in attempt of the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginHistoryEntry {
    #[serde(default, alias = "Id", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, alias = "IpAddress", deserialize_with = "lenient::string")]
    pub ip_address: String,
    #[serde(default, alias = "UserAgent", deserialize_with = "lenient::string")]
    pub user_agent: String,
    #[serde(default, alias = "LoginTimestamp", deserialize_with = "lenient::string")]
    pub login_timestamp: String,
    #[serde(default, alias = "LogoutTimestamp", deserialize_with = "lenient::opt_string")]
    pub logout_timestamp: Option<String>,
    #[serde(default, alias = "LoginStatus", deserialize_with = "lenient::string")]
    pub login_status: String,
    #[serde(default, alias = "FailureReason", deserialize_with = "lenient::opt_string")]
    pub failure_reason: Option<String>,
    #[serde(default, alias = "IsActive", deserialize_with = "lenient::flag")]
    pub is_active: bool,
}

/// Full profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, alias = "Id", alias = "userId", alias = "UserId", deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, alias = "FirstName", deserialize_with = "lenient::string")]
    pub first_name: String,
    #[serde(default, alias = "MiddleName", deserialize_with = "lenient::opt_string")]
    pub middle_name: Option<String>,
    #[serde(default, alias = "LastName", deserialize_with = "lenient::string")]
    pub last_name: String,
    #[serde(default, alias = "Email", deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, alias = "PhoneNumber", deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, alias = "RoleId", deserialize_with = "lenient::opt_int")]
    pub role_id: Option<i64>,
    #[serde(default, alias = "IsEmailVerified", deserialize_with = "lenient::flag")]
    pub is_email_verified: bool,
    #[serde(default, alias = "IsPhoneVerified", deserialize_with = "lenient::flag")]
    pub is_phone_verified: bool,
    #[serde(default, alias = "CreatedAt", deserialize_with = "lenient::opt_string")]
    pub created_at: Option<String>,
    #[serde(default, alias = "Address", deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(default, alias = "Gender", deserialize_with = "lenient::opt_string")]
    pub gender: Option<String>,
    #[serde(default, alias = "DateOfBirth", deserialize_with = "lenient::opt_string")]
    pub date_of_birth: Option<String>,
}

impl Profile {
    pub fn role_label(&self) -> &'static str {
        self.role_id.map_or("Unknown", role_name)
    }
}

/// Placeholder sent in `hashPass`; the server keeps the stored hash.
const HASH_PASS_PLACEHOLDER: &str = "placeholder";

/// Body of `POST /iam/update`.
///
/// The server loads the stored user and overwrites the fields sent, so the
/// update always carries the full editable set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub address: String,
    pub gender: String,
    pub phone_number: String,
    pub email: String,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    hash_pass: &'static str,
}

impl ProfileUpdate {
    /// Update that rewrites the profile unchanged; edit fields from here.
    ///
    /// A profile without a role keeps the admin role, which is the only role
    /// that can reach this console.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            first_name: profile.first_name.clone(),
            middle_name: profile.middle_name.clone().unwrap_or_default(),
            last_name: profile.last_name.clone(),
            address: profile.address.clone().unwrap_or_default(),
            gender: profile.gender.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
            email: profile.email.clone(),
            role_id: profile.role_id.unwrap_or(Role::Admin.id()),
            date_of_birth: profile.date_of_birth.clone(),
            hash_pass: HASH_PASS_PLACEHOLDER,
        }
    }

    /// Set the date of birth from `YYYY-MM-DD`, sent as an RFC 3339 instant.
    pub fn set_date_of_birth(&mut self, date: &str) -> Result<(), String> {
        let parsed = chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date {date:?}: {e}"))?;
        let instant = parsed
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            .ok_or_else(|| format!("invalid date {date:?}"))?;
        self.date_of_birth = Some(instant);
        Ok(())
    }
}

/// Response of `POST /auth/send-admin-otp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpDispatch {
    #[serde(default, alias = "ExpiresAt", deserialize_with = "lenient::opt_string")]
    pub expires_at: Option<String>,
}

impl OtpDispatch {
    /// When the code stops being accepted. Offset-less values are UTC.
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.expires_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}
