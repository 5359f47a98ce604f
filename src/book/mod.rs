//! Contact storage used by the assistant

pub mod address_book;
pub mod fields;
pub mod record;

pub use address_book::{AddressBook, UpcomingBirthday, DEFAULT_BOOK_FILE, DEFAULT_WINDOW_DAYS};
pub use fields::{Birthday, Name, Phone};
pub use record::Record;
