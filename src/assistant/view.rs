//! How the assistant presents contacts and messages

use std::io::Write;

use crate::book::{Record, UpcomingBirthday};
use crate::error::Result;

pub trait View {
    fn display_contact(&mut self, record: &Record) -> Result<()>;

    fn display_message(&mut self, message: &str) -> Result<()>;

    fn display_all_contacts<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>;

    fn display_birthdays(&mut self, birthdays: &[UpcomingBirthday]) -> Result<()>;
}

/// Plain-text view over any writer
pub struct ConsoleView<W: Write> {
    out: W,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> View for ConsoleView<W> {
    fn display_contact(&mut self, record: &Record) -> Result<()> {
        let birthday = match &record.birthday {
            Some(b) => b.to_string(),
            None => "None".to_string(),
        };
        writeln!(self.out, "Contact name: {}", record.name)?;
        writeln!(self.out, "Phones: {}", record.phones_joined(", "))?;
        writeln!(self.out, "Birthday: {}", birthday)?;
        Ok(())
    }

    fn display_message(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        Ok(())
    }

    fn display_all_contacts<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut any = false;
        for record in records {
            any = true;
            self.display_contact(record)?;
        }
        if !any {
            self.display_message("No contacts available.")?;
        }
        Ok(())
    }

    fn display_birthdays(&mut self, birthdays: &[UpcomingBirthday]) -> Result<()> {
        if birthdays.is_empty() {
            return self.display_message("No upcoming birthdays.");
        }
        for b in birthdays {
            writeln!(self.out, "{} - {}", b.name, b.date_label())?;
        }
        Ok(())
    }
}
