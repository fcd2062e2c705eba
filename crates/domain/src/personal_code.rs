//! Estonian personal identification code (isikukood) validation.
//!
//! Layout: `G YY MM DD SSS C` where `G` encodes century and sex, `YYMMDD` is the birth date,
//! `SSS` a serial number and `C` the checksum digit.

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use userhub_core::{AppError, AppResult};

const CODE_LENGTH: usize = 11;

/// Validated personal identification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonalIdentificationCode(String);

impl PersonalIdentificationCode {
    /// Parses and validates a personal identification code.
    pub fn parse(value: &str) -> AppResult<Self> {
        let trimmed = value.trim();
        if !Self::is_valid(trimmed) {
            return Err(AppError::Validation(format!(
                "'{trimmed}' is not a valid personal identification code"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns whether the candidate passes format, birth date and checksum checks.
    #[must_use]
    pub fn is_valid(value: &str) -> bool {
        let Some(digits) = to_digits(value) else {
            return false;
        };

        birth_date(&digits).is_some() && checksum(&digits) == digits[CODE_LENGTH - 1]
    }

    /// Returns the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for PersonalIdentificationCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<PersonalIdentificationCode> for String {
    fn from(value: PersonalIdentificationCode) -> Self {
        value.0
    }
}

impl Display for PersonalIdentificationCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn to_digits(value: &str) -> Option<[u32; CODE_LENGTH]> {
    if value.len() != CODE_LENGTH {
        return None;
    }

    let mut digits = [0_u32; CODE_LENGTH];
    for (slot, character) in digits.iter_mut().zip(value.chars()) {
        *slot = character.to_digit(10)?;
    }

    Some(digits)
}

fn birth_date(digits: &[u32; CODE_LENGTH]) -> Option<NaiveDate> {
    let century = match digits[0] {
        1 | 2 => 1800,
        3 | 4 => 1900,
        5 | 6 => 2000,
        _ => return None,
    };

    let year = century + digits[1] * 10 + digits[2];
    let month = digits[3] * 10 + digits[4];
    let day = digits[5] * 10 + digits[6];

    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Computes the expected checksum digit from the first ten digits.
fn checksum(digits: &[u32; CODE_LENGTH]) -> u32 {
    let payload = &digits[..CODE_LENGTH - 1];

    match weighted_remainder(payload, 1) {
        10 => match weighted_remainder(payload, 3) {
            10 => 0,
            remainder => remainder,
        },
        remainder => remainder,
    }
}

/// Weight for 1-indexed position `i` is `i % 10 + i / 10`; `first_position` shifts the sequence.
fn weighted_remainder(payload: &[u32], first_position: u32) -> u32 {
    payload
        .iter()
        .zip(first_position..)
        .map(|(digit, position)| digit * (position % 10 + position / 10))
        .sum::<u32>()
        % 11
}
