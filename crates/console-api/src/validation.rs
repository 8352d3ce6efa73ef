//! Form checks applied before anything is sent.

use thiserror::Error;

/// Digits in an emailed verification code.
pub const OTP_LENGTH: usize = 6;

const MIN_NEW_PASSWORD_LENGTH: usize = 8;

/// True for exactly six ASCII digits.
pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Reasons the change-password form is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Current password is required")]
    CurrentPasswordRequired,

    #[error("New password must be at least {MIN_NEW_PASSWORD_LENGTH} characters long")]
    NewPasswordTooShort,

    #[error("New passwords do not match")]
    ConfirmationMismatch,

    #[error("New password must be different from current password")]
    PasswordUnchanged,
}

/// The change-password form.
#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    /// First failing rule, checked in form order.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.current_password.is_empty() {
            return Err(FormError::CurrentPasswordRequired);
        }
        if self.new_password.chars().count() < MIN_NEW_PASSWORD_LENGTH {
            return Err(FormError::NewPasswordTooShort);
        }
        if self.new_password != self.confirm_password {
            return Err(FormError::ConfirmationMismatch);
        }
        if self.current_password == self.new_password {
            return Err(FormError::PasswordUnchanged);
        }
        Ok(())
    }
}
