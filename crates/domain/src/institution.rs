use serde::{Deserialize, Serialize};
use tenura_core::{AppResult, InstitutionId, NonEmptyString};

use crate::EmailAddress;

/// Tenant whose rows are isolated from other tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    id: InstitutionId,
    name: NonEmptyString,
    code: NonEmptyString,
    address: String,
    phone_number: String,
    email: Option<EmailAddress>,
    is_active: bool,
}

impl Institution {
    /// Creates an institution. The code is upper-cased.
    pub fn new(
        id: InstitutionId,
        name: impl Into<String>,
        code: impl Into<String>,
        address: impl Into<String>,
        phone_number: impl Into<String>,
        email: Option<String>,
        is_active: bool,
    ) -> AppResult<Self> {
        let email = match email.map(|email| email.trim().to_owned()) {
            Some(email) if !email.is_empty() => Some(EmailAddress::new(email)?),
            _ => None,
        };

        Ok(Self {
            id,
            name: NonEmptyString::for_field("name", name)?,
            code: NonEmptyString::for_field("code", code.into().to_uppercase())?,
            address: address.into().trim().to_owned(),
            phone_number: phone_number.into().trim().to_owned(),
            email,
            is_active,
        })
    }

    /// Returns the institution id.
    #[must_use]
    pub fn id(&self) -> InstitutionId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the unique institution code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the postal address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Returns the phone number.
    #[must_use]
    pub fn phone_number(&self) -> &str {
        self.phone_number.as_str()
    }

    /// Returns the contact email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_ref().map(EmailAddress::as_str)
    }

    /// Returns whether the institution is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
