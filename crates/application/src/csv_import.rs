//! Row-oriented CSV validation.
//!
//! Structural failures (unreadable file, header mismatch, wrong column count) abort the whole
//! file. Content failures are collected per row and never stop the iteration.

mod error;
mod reader;
mod rules;
mod validator;


pub use error::ImportError;
pub use reader::{CsvReader, CsvRows};
pub use rules::{
    EmailRule, FieldRule, KnownNamesRule, PersonNameRule, PersonalCodeRule, PhoneRule,
    RequiredRule, RuleSet,
};
pub use validator::{CsvValidator, FieldErrors, RowRecord, ValidatedRows};
