//! User account types and credential rules.

use serde::{Deserialize, Serialize};
use tenura_core::{AppError, AppResult, NonEmptyString, UserId};

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Structural check only: one `@`, non-empty local part, and a domain
    /// containing a `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' must contain '@'"
            )));
        };

        if local.is_empty() || domain.contains('@') {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' is malformed"
            )));
        }

        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(AppError::Validation(format!(
                "email domain '{domain}' is malformed"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length; bounds the cost of hashing untrusted input.
pub const PASSWORD_MAX_LENGTH: usize = 128;

static COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "admin123",
    "letmein1",
    "passw0rd",
    "trustno1",
];

/// Validates a plaintext password before it is hashed.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();

    if length < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if length > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err(AppError::Validation(
            "password is too common".to_owned(),
        ));
    }

    Ok(())
}

/// User profile without credentials or memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    id: UserId,
    username: NonEmptyString,
    email: EmailAddress,
    full_name: NonEmptyString,
    short_name: String,
    is_active: bool,
}

impl UserAccount {
    /// Creates a user account. Usernames may not contain whitespace.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        short_name: impl Into<String>,
        is_active: bool,
    ) -> AppResult<Self> {
        let username = NonEmptyString::for_field("username", username)?;
        if username.as_str().chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "username must not contain whitespace".to_owned(),
            ));
        }

        Ok(Self {
            id,
            username,
            email: EmailAddress::new(email)?,
            full_name: NonEmptyString::for_field("full_name", full_name)?,
            short_name: short_name.into().trim().to_owned(),
            is_active,
        })
    }

    /// Returns the user id.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the short name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.short_name.as_str()
    }

    /// Returns whether the account may log in.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
