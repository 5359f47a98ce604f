//! Human-readable output formatting

use bytesize::ByteSize;

use crate::bootstrap::BootstrapReport;
use crate::manifest::{Manifest, ManifestEntry};
use crate::output::formatter::Output;

pub fn format_human(output: &Output<'_>) -> String {
    match output {
        Output::Report(report) => format_report(report),
        Output::Manifest(manifest) => format_manifest(manifest),
    }
}

fn format_report(report: &BootstrapReport) -> String {
    let mut output = String::from("Bootstrap\n---------\n");

    for (i, record) in report.stages.iter().enumerate() {
        output.push_str(&format!(
            "{}. {:<15} {} ({} ms)\n",
            i + 1,
            record.stage,
            record.detail,
            record.elapsed_ms
        ));
    }

    if let Some(version) = &report.runtime_version {
        output.push_str(&format!("\nRuntime:   {}\n", version));
    }
    if let Some(ws) = &report.workspace {
        output.push_str(&format!(
            "Workspace: {} files, {} directories, {}\n",
            ws.files,
            ws.dirs,
            ByteSize(ws.bytes)
        ));
    }
    if !report.packages.is_empty() {
        output.push_str(&format!("Packages:  {}\n", report.packages.len()));
        for package in &report.packages {
            output.push_str(&format!("  {}\n", package));
        }
    }
    if let Some(code) = report.exit_code {
        output.push_str(&format!("Exit code: {}\n", code));
    }

    output.trim_end().to_string()
}

fn format_manifest(manifest: &Manifest) -> String {
    if manifest.is_empty() {
        return "Manifest is empty.".to_string();
    }

    let requirements = manifest.requirements().count();
    let mut output = format!(
        "Manifest ({} requirements, {} options)\n",
        requirements,
        manifest.entries.len() - requirements
    );
    for entry in &manifest.entries {
        let line = match entry {
            ManifestEntry::Requirement(r) => r.line,
            ManifestEntry::Directive(d) => d.line,
        };
        output.push_str(&format!("{:>4}  {}\n", line, entry));
    }
    output.trim_end().to_string()
}
