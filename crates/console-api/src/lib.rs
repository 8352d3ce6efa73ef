//! Endpoint surface of the Responder console.
//!
//! [`ConsoleApi`] wraps every backend endpoint the console drives behind typed
//! methods. Records accept both the PascalCase and camelCase shapes the
//! backend returns. Client-side checks (password policy, OTP format, search
//! filters) live alongside so every front end applies the same rules.

mod api;
mod filters;
mod lenient;
mod models;
mod password;
mod validation;

#[cfg(test)]
mod tests;

pub use api::ConsoleApi;
pub use filters::{filter_contacts, filter_incident_types, filter_users};
pub use models::{
    role_name, Contact, ContactDraft, ContactType, IncidentType, IncidentTypeDraft,
    LoginHistoryEntry, OtpDispatch, Profile, ProfileUpdate, Role, UserAccount,
};
pub use password::{password_strength, validate_password, PasswordCheck, PasswordStrength};
pub use validation::{is_valid_otp, ChangePasswordForm, FormError, OTP_LENGTH};
