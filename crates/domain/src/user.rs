//! User domain types and contact validation rules.

use serde::{Deserialize, Serialize};
use userhub_core::{AppError, AppResult};

use crate::PersonalIdentificationCode;

uuid_identifier!(
    /// Unique identifier for a user record.
    UserId
);

/// A natural person known to the system, shared across institutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Globally unique national identification code.
    pub personal_identification_code: PersonalIdentificationCode,
    /// Given name(s).
    pub forename: String,
    /// Family name.
    pub surname: String,
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') || domain.ends_with('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if local.chars().any(char::is_whitespace) || domain.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(
                "email address must not contain whitespace".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

const ESTONIAN_PHONE_PREFIX: &str = "+372";

/// Phone number in Estonian national format: `+372` followed by 7 or 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Creates a validated phone number.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if !Self::is_valid(trimmed) {
            return Err(AppError::Validation(format!(
                "phone number '{trimmed}' must be '+372' followed by 7 or 8 digits"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns whether the value matches the accepted phone format.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        let Some(subscriber) = value.strip_prefix(ESTONIAN_PHONE_PREFIX) else {
            return false;
        };

        matches!(subscriber.len(), 7 | 8) && subscriber.bytes().all(|byte| byte.is_ascii_digit())
    }

    /// Returns the validated phone string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Display name split into forename and surname.
///
/// Every whitespace-separated token may contain letters and hyphens only. The last token is the
/// surname, everything before it is the forename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    forename: String,
    surname: String,
}

impl PersonName {
    /// Parses a full display name.
    pub fn parse(value: &str) -> AppResult<Self> {
        let tokens = value.split_whitespace().collect::<Vec<_>>();

        let Some((surname, forenames)) = tokens.split_last() else {
            return Err(AppError::Validation("name must not be empty".to_owned()));
        };

        if forenames.is_empty() {
            return Err(AppError::Validation(
                "name must contain a forename and a surname".to_owned(),
            ));
        }

        if let Some(token) = tokens.iter().find(|token| !is_name_token(token)) {
            return Err(AppError::Validation(format!(
                "name part '{token}' may contain only letters and hyphens"
            )));
        }

        Ok(Self {
            forename: forenames.join(" "),
            surname: (*surname).to_owned(),
        })
    }

    /// Builds a name from separately entered parts.
    pub fn from_parts(forename: &str, surname: &str) -> AppResult<Self> {
        let forename = normalized_part(forename, "forename")?;
        let surname = normalized_part(surname, "surname")?;

        Ok(Self { forename, surname })
    }

    /// Returns the forename part.
    #[must_use]
    pub fn forename(&self) -> &str {
        self.forename.as_str()
    }

    /// Returns the surname part.
    #[must_use]
    pub fn surname(&self) -> &str {
        self.surname.as_str()
    }
}

fn normalized_part(value: &str, label: &str) -> AppResult<String> {
    let tokens = value.split_whitespace().collect::<Vec<_>>();
    if tokens.is_empty() {
        return Err(AppError::Validation(format!("{label} must not be empty")));
    }

    if let Some(token) = tokens.iter().find(|token| !is_name_token(token)) {
        return Err(AppError::Validation(format!(
            "{label} part '{token}' may contain only letters and hyphens"
        )));
    }

    Ok(tokens.join(" "))
}

fn is_name_token(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
        && token
            .chars()
            .all(|character| character.is_alphabetic() || character == '-')
}
