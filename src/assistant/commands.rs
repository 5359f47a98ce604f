//! Command parsing and handlers for the assistant

use chrono::NaiveDate;

use crate::assistant::view::View;
use crate::book::{AddressBook, Record, DEFAULT_WINDOW_DAYS};
use crate::error::{AssistError, Result};

const WRONG_ARGS: &str = "Invalid input. Please provide the correct number of arguments.";
const NOT_FOUND: &str = "Contact not found.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hello,
    Add,
    Change,
    Phone,
    All,
    AddBirthday,
    ShowBirthday,
    Birthdays,
    RemovePhone,
    Delete,
    Exit,
    Unknown,
}

impl Command {
    pub fn parse(word: &str) -> Self {
        match word {
            "hello" => Command::Hello,
            "add" => Command::Add,
            "change" => Command::Change,
            "phone" => Command::Phone,
            "all" => Command::All,
            "add-birthday" => Command::AddBirthday,
            "show-birthday" => Command::ShowBirthday,
            "birthdays" => Command::Birthdays,
            "remove-phone" => Command::RemovePhone,
            "delete" => Command::Delete,
            "close" | "exit" => Command::Exit,
            _ => Command::Unknown,
        }
    }
}

/// What the session should do after a line is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Split a line into a lower-cased command word and its arguments
pub fn parse_input(line: &str) -> (String, Vec<&str>) {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_lowercase();
    (command, parts.collect())
}

/// The assistant's state: the address book it edits
#[derive(Debug, Default)]
pub struct Assistant {
    book: AddressBook,
}

impl Assistant {
    pub fn new(book: AddressBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    /// Handle one input line. Input errors are shown to the user, not returned.
    pub fn handle<V: View>(&mut self, line: &str, today: NaiveDate, view: &mut V) -> Result<Flow> {
        let (word, args) = parse_input(line);
        let command = Command::parse(&word);
        tracing::debug!(?command, args = args.len(), "handling command");

        let result = match command {
            Command::Exit => {
                view.display_message("Good bye!")?;
                return Ok(Flow::Exit);
            }
            Command::Hello => view.display_message("How can I help you?"),
            Command::Add => self.add_contact(&args, view),
            Command::Change => self.change_phone(&args, view),
            Command::Phone => self.show_contact(&args, view),
            Command::All => view.display_all_contacts(self.book.records()),
            Command::AddBirthday => self.add_birthday(&args, today, view),
            Command::ShowBirthday => self.show_birthday(&args, view),
            Command::Birthdays => {
                view.display_birthdays(&self.book.upcoming_birthdays(today, DEFAULT_WINDOW_DAYS))
            }
            Command::RemovePhone => self.remove_phone(&args, view),
            Command::Delete => self.delete_contact(&args, view),
            Command::Unknown => view.display_message("Invalid command."),
        };

        match result {
            Err(AssistError::Validation(message)) => view.display_message(&message)?,
            other => other?,
        }
        Ok(Flow::Continue)
    }

    fn add_contact<V: View>(&mut self, args: &[&str], view: &mut V) -> Result<()> {
        let [name, phone, ..] = args else {
            return Err(wrong_args());
        };
        let message = match self.book.find_mut(name) {
            Some(record) => {
                record.add_phone(phone)?;
                "Contact updated."
            }
            None => {
                let mut record = Record::new(name)?;
                record.add_phone(phone)?;
                self.book.add_record(record);
                "Contact added."
            }
        };
        view.display_message(message)
    }

    fn change_phone<V: View>(&mut self, args: &[&str], view: &mut V) -> Result<()> {
        let [name, old, new] = args else {
            return Err(AssistError::Validation(
                "Invalid input. Please provide name, old phone, and new phone.".to_string(),
            ));
        };
        let record = self.book.find_mut(name).ok_or_else(not_found)?;
        if record.find_phone(old).is_none() {
            return view.display_message("Old phone number not found in contact.");
        }
        record.edit_phone(old, new)?;
        view.display_message("Phone number changed successfully.")
    }

    fn show_contact<V: View>(&self, args: &[&str], view: &mut V) -> Result<()> {
        let [name, ..] = args else {
            return Err(wrong_args());
        };
        let record = self.book.find(name).ok_or_else(not_found)?;
        view.display_contact(record)
    }

    fn add_birthday<V: View>(&mut self, args: &[&str], today: NaiveDate, view: &mut V) -> Result<()> {
        let [name, birthday] = args else {
            return Err(wrong_args());
        };
        let record = self.book.find_mut(name).ok_or_else(not_found)?;
        record.set_birthday(birthday, today)?;
        view.display_message("Birthday added successfully.")
    }

    fn show_birthday<V: View>(&self, args: &[&str], view: &mut V) -> Result<()> {
        let [name, ..] = args else {
            return Err(wrong_args());
        };
        let record = self.book.find(name).ok_or_else(not_found)?;
        view.display_message(&record.birthday_label())
    }

    fn remove_phone<V: View>(&mut self, args: &[&str], view: &mut V) -> Result<()> {
        let [name, phone] = args else {
            return Err(wrong_args());
        };
        let record = self.book.find_mut(name).ok_or_else(not_found)?;
        record.remove_phone(phone)?;
        view.display_message("Phone number removed.")
    }

    fn delete_contact<V: View>(&mut self, args: &[&str], view: &mut V) -> Result<()> {
        let [name] = args else {
            return Err(wrong_args());
        };
        self.book.delete(name).ok_or_else(not_found)?;
        view.display_message("Contact deleted.")
    }
}

fn wrong_args() -> AssistError {
    AssistError::Validation(WRONG_ARGS.to_string())
}

fn not_found() -> AssistError {
    AssistError::Validation(NOT_FOUND.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::view::ConsoleView;

    fn today() -> NaiveDate {
        // Monday
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    /// Feed lines to a fresh assistant and collect everything it printed
    fn converse(assistant: &mut Assistant, lines: &[&str]) -> Vec<String> {
        let mut view = ConsoleView::new(Vec::new());
        for line in lines {
            assistant.handle(line, today(), &mut view).unwrap();
        }
        String::from_utf8(view.into_inner())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_input() {
        let (cmd, args) = parse_input("  ADD John   1234567890 ");
        assert_eq!(cmd, "add");
        assert_eq!(args, vec!["John", "1234567890"]);
        assert_eq!(parse_input("").0, "");
    }

    #[test]
    fn test_hello_and_unknown() {
        let mut a = Assistant::default();
        assert_eq!(
            converse(&mut a, &["hello", "dance", ""]),
            vec!["How can I help you?", "Invalid command.", "Invalid command."]
        );
    }

    #[test]
    fn test_exit_commands_end_session() {
        let mut a = Assistant::default();
        let mut view = ConsoleView::new(Vec::new());
        assert_eq!(a.handle("exit", today(), &mut view).unwrap(), Flow::Exit);
        assert_eq!(a.handle("CLOSE", today(), &mut view).unwrap(), Flow::Exit);
        assert_eq!(String::from_utf8(view.into_inner()).unwrap(), "Good bye!\nGood bye!\n");
    }

    #[test]
    fn test_add_then_update() {
        let mut a = Assistant::default();
        let out = converse(
            &mut a,
            &["add John 1234567890", "add John 5555555555", "phone John"],
        );
        assert_eq!(
            out,
            vec![
                "Contact added.",
                "Contact updated.",
                "Contact name: John",
                "Phones: 1234567890, 5555555555",
                "Birthday: None",
            ]
        );
    }

    #[test]
    fn test_add_invalid_phone_does_not_create_contact() {
        let mut a = Assistant::default();
        let out = converse(&mut a, &["add John 123", "add John"]);
        assert_eq!(
            out,
            vec![
                "Phone number must contain exactly 10 digits.",
                WRONG_ARGS,
            ]
        );
        assert!(a.book().is_empty());
    }

    #[test]
    fn test_change_phone_paths() {
        let mut a = Assistant::default();
        let out = converse(
            &mut a,
            &[
                "add John 1234567890",
                "change John 1234567890",
                "change Ghost 1234567890 1112223333",
                "change John 9999999999 1112223333",
                "change John 1234567890 1112223333",
                "change John 1112223333 abc",
            ],
        );
        assert_eq!(
            out,
            vec![
                "Contact added.",
                "Invalid input. Please provide name, old phone, and new phone.",
                "Contact not found.",
                "Old phone number not found in contact.",
                "Phone number changed successfully.",
                "Phone number must contain exactly 10 digits.",
            ]
        );
        let record = a.book().find("John").unwrap();
        assert_eq!(record.phones_joined(","), "1112223333");
    }

    #[test]
    fn test_birthday_commands() {
        let mut a = Assistant::default();
        let out = converse(
            &mut a,
            &[
                "add Jane 1234567890",
                "show-birthday Jane",
                "add-birthday Jane 1990-06-05",
                "add-birthday Jane 05.06.2030",
                "add-birthday Jane 05.06.1990",
                "add-birthday Ghost 05.06.1990",
                "show-birthday Jane",
                "birthdays",
            ],
        );
        assert_eq!(
            out,
            vec![
                "Contact added.",
                "Birthday: None",
                "Invalid date format. Use DD.MM.YYYY",
                "Birthday cannot be in the future.",
                "Birthday added successfully.",
                "Contact not found.",
                "05.06.1990",
                "Jane - 2024.06.05",
            ]
        );
    }

    #[test]
    fn test_all_and_empty_birthdays() {
        let mut a = Assistant::default();
        let out = converse(&mut a, &["all", "birthdays", "add Bob 1234567890", "all"]);
        assert_eq!(
            out,
            vec![
                "No contacts available.",
                "No upcoming birthdays.",
                "Contact added.",
                "Contact name: Bob",
                "Phones: 1234567890",
                "Birthday: None",
            ]
        );
    }

    #[test]
    fn test_remove_phone_and_delete() {
        let mut a = Assistant::default();
        let out = converse(
            &mut a,
            &[
                "add Bob 1234567890",
                "remove-phone Bob 0000000000",
                "remove-phone Bob 1234567890",
                "delete Bob",
                "delete Bob",
                "phone Bob",
            ],
        );
        assert_eq!(
            out,
            vec![
                "Contact added.",
                "Phone number not found.",
                "Phone number removed.",
                "Contact deleted.",
                "Contact not found.",
                "Contact not found.",
            ]
        );
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut a = Assistant::default();
        let out = converse(&mut a, &["add John 1234567890", "phone john"]);
        assert_eq!(out[1], "Contact not found.");
    }
}
