//! Password policy for new admin and reset passwords.

use serde::Serialize;
use std::fmt;

pub const MIN_PASSWORD_LENGTH: usize = 12;

const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";
const COMMON_PATTERNS: [&str; 5] = ["123", "abc", "qwe", "password", "admin"];

/// Coarse strength classification shown next to the policy result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    pub fn as_str(self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
            PasswordStrength::VeryStrong => "very-strong",
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`validate_password`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordCheck {
    /// Every rule the password breaks, in policy order.
    pub errors: Vec<String>,
    pub strength: PasswordStrength,
}

impl PasswordCheck {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Composition {
    length: usize,
    lower: bool,
    upper: bool,
    digit: bool,
    special: bool,
}

impl Composition {
    fn of(password: &str) -> Self {
        Self {
            length: password.chars().count(),
            lower: password.chars().any(|c| c.is_ascii_lowercase()),
            upper: password.chars().any(|c| c.is_ascii_uppercase()),
            digit: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        }
    }
}

/// Check a password against the policy.
pub fn validate_password(password: &str) -> PasswordCheck {
    let composition = Composition::of(password);
    let mut errors = Vec::new();

    if composition.length < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if !composition.lower {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !composition.upper {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }
    if !composition.digit {
        errors.push("Password must contain at least one number".to_string());
    }
    if !composition.special {
        errors.push("Password must contain at least one special character".to_string());
    }
    if has_triple_repeat(password) {
        errors.push("Password cannot contain repeated characters".to_string());
    }
    if has_common_pattern(password) {
        errors.push("Password cannot contain common patterns".to_string());
    }

    PasswordCheck {
        errors,
        strength: strength_of(composition),
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    strength_of(Composition::of(password))
}

fn strength_of(c: Composition) -> PasswordStrength {
    let all_classes = c.lower && c.upper && c.digit && c.special;
    let score = [
        c.length >= 8,
        c.length >= 12,
        c.length >= 16,
        c.lower,
        c.upper,
        c.digit,
        c.special,
        c.length >= 16 && all_classes,
    ]
    .into_iter()
    .filter(|met| *met)
    .count();

    match score {
        0..=3 => PasswordStrength::Weak,
        4..=5 => PasswordStrength::Medium,
        6..=7 => PasswordStrength::Strong,
        _ => PasswordStrength::VeryStrong,
    }
}

/// Same character three or more times in a row.
fn has_triple_repeat(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

fn has_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();
    COMMON_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}
