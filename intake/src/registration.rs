//! Registration records and the details-form validation that produces them.

use crate::options::ProblemOption;
use serde::Deserialize;
use thiserror::Error;

/// Maximum length of the name field, in characters.
pub const MAX_NAME_LEN: usize = 100;
/// Maximum length of the email field, in characters.
pub const MAX_EMAIL_LEN: usize = 100;
/// Maximum length of the phone field, in characters.
pub const MAX_PHONE_LEN: usize = 20;

/// Raw details submitted by a visitor, exactly as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DetailsForm {
    /// Visitor's name
    #[serde(default)]
    pub name: String,
    /// Visitor's email address
    #[serde(default)]
    pub email: String,
    /// Visitor's phone number (optional)
    #[serde(default)]
    pub phone: String,
}

impl DetailsForm {
    /// Build a form from field values.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// Why a details form could not become a [`Registration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DetailsError {
    /// Name or email is empty after trimming.
    #[error("name and email are required")]
    MissingFields,

    /// A field exceeds its length limit.
    #[error("input too long: name/email at most 100 characters, phone at most 20")]
    TooLong,
}

/// A validated registration, ready to persist.
///
/// Fields are trimmed and within their length limits. Once built, a
/// registration cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    email: String,
    phone: String,
    problem: ProblemOption,
}

impl Registration {
    /// Validate a details form for the given option.
    ///
    /// Missing fields are reported before oversized ones.
    ///
    /// # Errors
    ///
    /// - [`DetailsError::MissingFields`] if name or email is blank
    /// - [`DetailsError::TooLong`] if any field exceeds its limit
    pub fn new(problem: ProblemOption, form: &DetailsForm) -> Result<Self, DetailsError> {
        let name = form.name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();

        if name.is_empty() || email.is_empty() {
            return Err(DetailsError::MissingFields);
        }

        if name.chars().count() > MAX_NAME_LEN
            || email.chars().count() > MAX_EMAIL_LEN
            || phone.chars().count() > MAX_PHONE_LEN
        {
            return Err(DetailsError::TooLong);
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            problem,
        })
    }

    /// Registrant's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registrant's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Registrant's phone number; empty when none was given.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// The option registered for.
    #[must_use]
    pub const fn problem(&self) -> ProblemOption {
        self.problem
    }
}
