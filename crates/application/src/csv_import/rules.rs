use std::collections::HashSet;

use userhub_core::AppError;
use userhub_domain::{EmailAddress, PersonName, PersonalIdentificationCode, PhoneNumber};

use super::ImportError;

/// Check applied to one attribute value.
pub trait FieldRule: Send + Sync {
    /// Returns a human-readable message when the value is rejected.
    fn check(&self, value: &str) -> Result<(), String>;
}

/// Rejects empty values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredRule;

impl FieldRule for RequiredRule {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("value is required".to_owned());
        }

        Ok(())
    }
}

/// National identification code format, birth date and checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonalCodeRule;

impl FieldRule for PersonalCodeRule {
    fn check(&self, value: &str) -> Result<(), String> {
        skip_empty(value, |value| {
            PersonalIdentificationCode::parse(value)
                .map(|_| ())
                .map_err(rejection)
        })
    }
}

/// Structural email check.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailRule;

impl FieldRule for EmailRule {
    fn check(&self, value: &str) -> Result<(), String> {
        skip_empty(value, |value| {
            EmailAddress::new(value).map(|_| ()).map_err(rejection)
        })
    }
}

/// Estonian phone number format.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneRule;

impl FieldRule for PhoneRule {
    fn check(&self, value: &str) -> Result<(), String> {
        skip_empty(value, |value| {
            PhoneNumber::new(value).map(|_| ()).map_err(rejection)
        })
    }
}

/// Full display name of at least two letter-and-hyphen tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonNameRule;

impl FieldRule for PersonNameRule {
    fn check(&self, value: &str) -> Result<(), String> {
        skip_empty(value, |value| {
            PersonName::parse(value).map(|_| ()).map_err(rejection)
        })
    }
}

/// Every name of a comma- or slash-separated list must be known.
#[derive(Debug, Clone, Default)]
pub struct KnownNamesRule {
    label: String,
    known: HashSet<String>,
}

impl KnownNamesRule {
    /// Creates a rule over a set of known names, `label` names the kind in messages.
    pub fn new(label: impl Into<String>, known: impl IntoIterator<Item = String>) -> Self {
        Self {
            label: label.into(),
            known: known.into_iter().collect(),
        }
    }

    /// Splits a list cell into trimmed, distinct, non-empty names in input order.
    #[must_use]
    pub fn split(value: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        value
            .split([',', '/'])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(*name))
            .map(str::to_owned)
            .collect()
    }
}

impl FieldRule for KnownNamesRule {
    fn check(&self, value: &str) -> Result<(), String> {
        let unknown = Self::split(value)
            .into_iter()
            .filter(|name| !self.known.contains(name))
            .collect::<Vec<_>>();

        if unknown.is_empty() {
            return Ok(());
        }

        Err(format!(
            "unknown {} '{}' in the institution",
            self.label,
            unknown.join("', '")
        ))
    }
}

fn rejection(error: AppError) -> String {
    match error {
        AppError::Validation(message) => message,
        other => other.to_string(),
    }
}

fn skip_empty(value: &str, check: impl FnOnce(&str) -> Result<(), String>) -> Result<(), String> {
    match value.trim() {
        "" => Ok(()),
        value => check(value),
    }
}

/// Ordered rules per attribute.
#[derive(Default)]
pub struct RuleSet {
    entries: Vec<(String, Vec<Box<dyn FieldRule>>)>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule for an attribute.
    #[must_use]
    pub fn rule(mut self, attribute: &str, rule: impl FieldRule + 'static) -> Self {
        let rule: Box<dyn FieldRule> = Box::new(rule);
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing == attribute)
        {
            Some((_, rules)) => rules.push(rule),
            None => self.entries.push((attribute.to_owned(), vec![rule])),
        }

        self
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(super) fn ensure_attributes_known(&self, attributes: &[String]) -> Result<(), ImportError> {
        match self
            .entries
            .iter()
            .find(|(attribute, _)| !attributes.contains(attribute))
        {
            Some((attribute, _)) => Err(ImportError::Configuration(format!(
                "rule configured for unknown attribute '{attribute}'"
            ))),
            None => Ok(()),
        }
    }

    /// Runs all rules of an attribute, collecting every failure.
    pub(super) fn check(&self, attribute: &str, value: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(existing, _)| existing == attribute)
            .flat_map(|(_, rules)| rules.iter())
            .filter_map(|rule| rule.check(value).err())
            .collect()
    }
}
