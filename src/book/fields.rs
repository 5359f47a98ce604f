//! Validated contact fields

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::error::{AssistError, Result};

pub const DATE_FORMAT: &str = "%d.%m.%Y";

#[allow(clippy::expect_used)]
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone regex pattern is invalid"));

/// A contact name, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub fn new(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Err(AssistError::Validation("Name is required.".to_string()));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A phone number of exactly ten digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    pub fn new(value: &str) -> Result<Self> {
        if !PHONE_REGEX.is_match(value) {
            return Err(AssistError::Validation(
                "Phone number must contain exactly 10 digits.".to_string(),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A birth date written `DD.MM.YYYY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Birthday(NaiveDate);

impl Birthday {
    /// Parse `DD.MM.YYYY`, rejecting dates after `today`
    pub fn parse(value: &str, today: NaiveDate) -> Result<Self> {
        let birthday = Self::parse_format(value)?;
        if birthday.0 > today {
            return Err(AssistError::Validation(
                "Birthday cannot be in the future.".to_string(),
            ));
        }
        Ok(birthday)
    }

    fn parse_format(value: &str) -> Result<Self> {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self)
            .map_err(|_| AssistError::Validation("Invalid date format. Use DD.MM.YYYY".to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl TryFrom<String> for Name {
    type Error = AssistError;
    fn try_from(value: String) -> Result<Self> {
        Name::new(&value)
    }
}

impl TryFrom<String> for Phone {
    type Error = AssistError;
    fn try_from(value: String) -> Result<Self> {
        Phone::new(&value)
    }
}

impl TryFrom<String> for Birthday {
    type Error = AssistError;
    fn try_from(value: String) -> Result<Self> {
        Birthday::parse_format(&value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.0
    }
}

impl From<Phone> for String {
    fn from(value: Phone) -> Self {
        value.0
    }
}

impl From<Birthday> for String {
    fn from(value: Birthday) -> Self {
        value.to_string()
    }
}
