//! Shared primitives for all Rust crates in Userhub.

#![forbid(unsafe_code)]

/// Named business-rule denials.
pub mod denial;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use denial::Denial;

/// Result type used across Userhub crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Institution identifier used as the scoping key for every institution-owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstitutionId(Uuid);

impl InstitutionId {
    /// Creates a random institution identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an institution identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for InstitutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for InstitutionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist or lives in another institution.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks the required privilege.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A protected business rule refused the mutation.
    #[error("{0}")]
    Denied(Denial),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<Denial> for AppError {
    fn from(value: Denial) -> Self {
        Self::Denied(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, Denial, InstitutionId, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn institution_id_formats_as_uuid() {
        let institution_id = InstitutionId::new();
        assert_eq!(institution_id.to_string().len(), 36);
    }

    #[test]
    fn denied_error_displays_fixed_message() {
        let error = AppError::from(Denial::RootRoleModification);
        assert_eq!(error.to_string(), Denial::RootRoleModification.message());
    }
}
