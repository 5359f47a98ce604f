//! JSON output formatting

use serde_json::{json, Value};

use crate::output::formatter::Output;

pub fn format_json(output: &Output<'_>) -> String {
    let data: Value = match output {
        Output::Report(report) => serde_json::to_value(report).unwrap_or(json!(null)),
        Output::Manifest(manifest) => serde_json::to_value(manifest).unwrap_or(json!(null)),
    };

    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}
