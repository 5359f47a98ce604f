//! Address book: records keyed by name, kept in insertion order

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::book::record::Record;
use crate::error::{AssistError, Result};

pub const DEFAULT_BOOK_FILE: &str = "addressbook.json";
pub const GREETING_DATE_FORMAT: &str = "%Y.%m.%d";

/// Days ahead scanned by [`AddressBook::upcoming_birthdays`] by default
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressBook {
    records: IndexMap<String, Record>,
}

/// A contact to congratulate and the working day to do it on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingBirthday {
    pub name: String,
    pub congratulation_date: NaiveDate,
}

impl UpcomingBirthday {
    pub fn date_label(&self) -> String {
        self.congratulation_date.format(GREETING_DATE_FORMAT).to_string()
    }
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under its name
    pub fn add_record(&mut self, record: Record) {
        self.records.insert(record.name.as_str().to_string(), record);
    }

    pub fn find(&self, name: &str) -> Option<&Record> {
        self.records.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Record> {
        self.records.get_mut(name)
    }

    pub fn delete(&mut self, name: &str) -> Option<Record> {
        self.records.shift_remove(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Birthdays falling within `days` of `today`, weekend dates moved to Monday
    pub fn upcoming_birthdays(&self, today: NaiveDate, days: i64) -> Vec<UpcomingBirthday> {
        self.records
            .values()
            .filter_map(|record| {
                let born = record.birthday?.date();
                let mut next = occurrence_in(born, today.year());
                if next < today {
                    next = occurrence_in(born, today.year() + 1);
                }
                let greet = adjust_for_weekend(next);
                let ahead = (greet - today).num_days();
                (0..=days).contains(&ahead).then(|| UpcomingBirthday {
                    name: record.name.as_str().to_string(),
                    congratulation_date: greet,
                })
            })
            .collect()
    }

    /// Load a saved book; a missing file yields an empty one
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved address book, starting empty");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(AssistError::Persistence(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&content)
            .map_err(|e| AssistError::Persistence(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Save through a temporary file so a crash never leaves a torn book
    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)
            .map_err(|e| AssistError::Persistence(e.to_string()))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .and_then(|_| fs::rename(&tmp, path))
            .map_err(|e| AssistError::Persistence(format!("cannot write {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), records = self.len(), "address book saved");
        Ok(())
    }
}

/// The birthday's date in `year`; 29 February is kept on 28 February otherwise
fn occurrence_in(born: NaiveDate, year: i32) -> NaiveDate {
    born.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, born.month(), 28))
        .unwrap_or(born)
}

fn adjust_for_weekend(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

impl fmt::Display for AddressBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return write!(f, "Address book is empty.");
        }
        write!(f, "Address Book:")?;
        for record in self.records.values() {
            write!(f, "\n{}", record)?;
        }
        Ok(())
    }
}
