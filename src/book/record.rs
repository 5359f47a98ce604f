//! A single contact record

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::book::fields::{Birthday, Name, Phone};
use crate::error::{AssistError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: Name,
    #[serde(default)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub birthday: Option<Birthday>,
}

impl Record {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self {
            name: Name::new(name)?,
            phones: Vec::new(),
            birthday: None,
        })
    }

    pub fn add_phone(&mut self, phone: &str) -> Result<()> {
        self.phones.push(Phone::new(phone)?);
        Ok(())
    }

    /// Replace `old` with `new`; fails when `old` is not on record
    pub fn edit_phone(&mut self, old: &str, new: &str) -> Result<()> {
        let index = self
            .phones
            .iter()
            .position(|p| p.as_str() == old)
            .ok_or_else(phone_not_found)?;
        self.phones[index] = Phone::new(new)?;
        Ok(())
    }

    pub fn find_phone(&self, phone: &str) -> Option<&Phone> {
        self.phones.iter().find(|p| p.as_str() == phone)
    }

    pub fn remove_phone(&mut self, phone: &str) -> Result<Phone> {
        let index = self
            .phones
            .iter()
            .position(|p| p.as_str() == phone)
            .ok_or_else(phone_not_found)?;
        Ok(self.phones.remove(index))
    }

    pub fn set_birthday(&mut self, value: &str, today: NaiveDate) -> Result<()> {
        self.birthday = Some(Birthday::parse(value, today)?);
        Ok(())
    }

    /// The birthday as shown to the user
    pub fn birthday_label(&self) -> String {
        match &self.birthday {
            Some(b) => b.to_string(),
            None => "Birthday: None".to_string(),
        }
    }

    pub fn phones_joined(&self, sep: &str) -> String {
        self.phones
            .iter()
            .map(Phone::as_str)
            .collect::<Vec<_>>()
            .join(sep)
    }
}

fn phone_not_found() -> AssistError {
    AssistError::Validation("Phone number not found.".to_string())
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phones = if self.phones.is_empty() {
            "No phones".to_string()
        } else {
            self.phones_joined("; ")
        };
        let birthday = self
            .birthday
            .map(|b| b.to_string())
            .unwrap_or_else(|| "No birthday".to_string());
        write!(
            f,
            "Contact name: {}, phones: {}, birthday: {}",
            self.name, phones, birthday
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_add_and_find_phone() {
        let mut record = Record::new("John").unwrap();
        record.add_phone("1234567890").unwrap();
        assert!(record.find_phone("1234567890").is_some());
        assert!(record.find_phone("0000000000").is_none());
        assert!(record.add_phone("12345").is_err());
        assert_eq!(record.phones.len(), 1);
    }

    #[test]
    fn test_edit_phone() {
        let mut record = Record::new("John").unwrap();
        record.add_phone("1234567890").unwrap();
        record.edit_phone("1234567890", "1112223333").unwrap();
        assert_eq!(record.phones_joined(", "), "1112223333");

        let err = record.edit_phone("9999999999", "1112223333").unwrap_err();
        assert_eq!(err.to_string(), "Phone number not found.");
        assert!(record.edit_phone("1112223333", "bad").is_err());
        assert_eq!(record.phones_joined(", "), "1112223333");
    }

    #[test]
    fn test_remove_phone() {
        let mut record = Record::new("John").unwrap();
        record.add_phone("1234567890").unwrap();
        record.add_phone("5555555555").unwrap();
        record.remove_phone("1234567890").unwrap();
        assert_eq!(record.phones_joined(", "), "5555555555");
        assert!(record.remove_phone("1234567890").is_err());
    }

    #[test]
    fn test_display() {
        let mut record = Record::new("Jane").unwrap();
        assert_eq!(
            record.to_string(),
            "Contact name: Jane, phones: No phones, birthday: No birthday"
        );
        record.add_phone("1234567890").unwrap();
        record.add_phone("5555555555").unwrap();
        record.set_birthday("15.04.1985", today()).unwrap();
        assert_eq!(
            record.to_string(),
            "Contact name: Jane, phones: 1234567890; 5555555555, birthday: 15.04.1985"
        );
        assert_eq!(record.birthday_label(), "15.04.1985");
    }
}
