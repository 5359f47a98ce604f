//! Interactive session: read commands until exit, then persist the book

use chrono::Local;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::assistant::commands::{Assistant, Flow};
use crate::assistant::view::{ConsoleView, View};
use crate::book::AddressBook;
use crate::error::Result;

pub const PROMPT: &str = "Enter a command: ";

/// A source of input lines; `None` means the user is done
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// What the input thread hands to the session
#[derive(Debug)]
pub enum Input {
    Line(String),
    Failed(std::io::Error),
    Eof,
    Interrupt,
}

/// Reads lines delivered over a channel, echoing the prompt to `out`.
/// `Eof`, `Interrupt` or a closed channel ends the session.
pub struct ChannelReader<W: Write> {
    events: Receiver<Input>,
    out: W,
}

impl<W: Write> ChannelReader<W> {
    pub fn new(events: Receiver<Input>, out: W) -> Self {
        Self { events, out }
    }
}

impl<W: Write> LineReader for ChannelReader<W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;
        match self.events.recv() {
            Ok(Input::Line(line)) => Ok(Some(line)),
            Ok(Input::Failed(e)) => Err(e.into()),
            Ok(Input::Eof) | Ok(Input::Interrupt) | Err(_) => Ok(None),
        }
    }
}

/// Forward every line of `input` to `events`, then `Eof`.
/// Other senders may outlive this thread, so end of input is sent explicitly.
pub fn spawn_line_feeder<R>(input: R, events: Sender<Input>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    thread::spawn(move || {
        for line in input.lines() {
            let event = match line {
                Ok(line) => Input::Line(line),
                Err(e) => {
                    let _ = events.send(Input::Failed(e));
                    return;
                }
            };
            if events.send(event).is_err() {
                return;
            }
        }
        let _ = events.send(Input::Eof);
    })
}

#[cfg(feature = "repl")]
pub struct EditorReader {
    editor: rustyline::DefaultEditor,
}

#[cfg(feature = "repl")]
impl EditorReader {
    pub fn new() -> Result<Self> {
        let editor = rustyline::DefaultEditor::new()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(Self { editor })
    }
}

#[cfg(feature = "repl")]
impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        use rustyline::error::ReadlineError;

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            // Ctrl-C and Ctrl-D both end the session so the book is saved
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e.into()),
            Err(e) => Err(std::io::Error::other(e.to_string()).into()),
        }
    }
}

/// One assistant run bound to a book file
pub struct Session {
    assistant: Assistant,
    book_path: PathBuf,
}

impl Session {
    pub fn open(book_path: &Path) -> Result<Self> {
        let book = AddressBook::load(book_path)?;
        tracing::info!(path = %book_path.display(), records = book.len(), "address book loaded");
        Ok(Self {
            assistant: Assistant::new(book),
            book_path: book_path.to_path_buf(),
        })
    }

    pub fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    /// Run until `exit`/`close` or end of input. The book is saved on every exit path.
    pub fn run<L: LineReader, V: View>(&mut self, reader: &mut L, view: &mut V) -> Result<()> {
        let outcome = self.converse(reader, view);
        let saved = self.assistant.book().save(&self.book_path);
        outcome.and(saved)
    }

    fn converse<L: LineReader, V: View>(&mut self, reader: &mut L, view: &mut V) -> Result<()> {
        view.display_message("Welcome to the assistant bot!")?;
        while let Some(line) = reader.read_line(PROMPT)? {
            let today = Local::now().date_naive();
            if self.assistant.handle(&line, today, view)? == Flow::Exit {
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Run the assistant on the process's terminal
pub fn run_chat(book_path: &Path) -> Result<()> {
    let mut session = Session::open(book_path)?;
    let mut view = ConsoleView::stdout();

    #[cfg(feature = "repl")]
    {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            let mut reader = EditorReader::new()?;
            return session.run(&mut reader, &mut view);
        }
    }

    // Ctrl-C ends the session like end of input, so the book is still saved
    let (events, reader_events) = mpsc::channel();
    let interrupt = events.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt.send(Input::Interrupt);
    }) {
        tracing::warn!("interrupt handler not installed: {}", e);
    }
    spawn_line_feeder(BufReader::new(std::io::stdin()), events);

    let mut reader = ChannelReader::new(reader_events, std::io::stdout());
    session.run(&mut reader, &mut view)
}
