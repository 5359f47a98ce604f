//! Output formatting

use crate::bootstrap::BootstrapReport;
use crate::manifest::Manifest;
use crate::output::human::format_human;
use crate::output::json::format_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Anything the CLI prints as a result
#[derive(Debug, Clone, Copy)]
pub enum Output<'a> {
    Report(&'a BootstrapReport),
    Manifest(&'a Manifest),
}

pub fn format_output(output: &Output<'_>, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(output),
        OutputFormat::Json => format_json(output),
    }
}
