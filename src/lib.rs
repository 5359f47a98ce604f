//! Assistbot - provision an isolated dependency environment and launch an entry program
//!
//! The bootstrap sequence selects a pinned runtime, copies the workspace into
//! its execution root, creates an isolated environment, installs the
//! dependency manifest and starts the entry program. The crate also ships the
//! contact assistant that serves as the default entry program.
//!
//! # Example
//!
//! ```no_run
//! use assistbot::{Bootstrap, BootstrapConfig};
//!
//! let config = BootstrapConfig::discover(None).unwrap();
//! let report = Bootstrap::python(config).up().unwrap();
//! std::process::exit(report.exit_code.unwrap_or(1));
//! ```

pub mod assistant;
pub mod book;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod output;

pub use assistant::{run_chat, Assistant, Session};
pub use book::{AddressBook, Record};
pub use bootstrap::{Bootstrap, BootstrapReport, PythonToolchain, Stage, Toolchain};
pub use config::BootstrapConfig;
pub use error::{AssistError, Result};
pub use manifest::{load_manifest, parse_manifest, Manifest};
pub use output::{format_output, Output, OutputFormat};
