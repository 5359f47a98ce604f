//! Assistbot CLI - bootstrap an isolated environment or talk to the assistant

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;

use assistbot::cli::{Args, SubCommand, WorkspaceArgs};
use assistbot::logging::init_tracing;
use assistbot::{
    format_output, load_manifest, run_chat, Bootstrap, BootstrapConfig, BootstrapReport, Output,
    OutputFormat,
};

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<u8> {
    let format = if args.json { OutputFormat::Json } else { OutputFormat::Human };

    match args.command {
        SubCommand::Build { workspace } => {
            let bootstrap = bootstrap_for(&args.config, workspace)?;
            let report = bootstrap.build()?;
            print_report(&report, &format, args.verbose);
            Ok(0)
        }

        SubCommand::Run { workspace } => {
            let bootstrap = bootstrap_for(&args.config, workspace)?;
            let report = bootstrap.run()?;
            print_report(&report, &format, args.verbose);
            Ok(entry_status(&report))
        }

        SubCommand::Up { workspace } => {
            let bootstrap = bootstrap_for(&args.config, workspace)?;
            let report = bootstrap.up()?;
            print_report(&report, &format, args.verbose);
            Ok(entry_status(&report))
        }

        SubCommand::Chat { book } => {
            run_chat(&book).with_context(|| format!("assistant session on {}", book.display()))?;
            Ok(0)
        }

        SubCommand::Manifest { path } => {
            let manifest = load_manifest(&path)
                .with_context(|| format!("reading manifest {}", path.display()))?;
            println!("{}", format_output(&Output::Manifest(&manifest), &format));
            Ok(0)
        }
    }
}

fn bootstrap_for(
    config: &Option<std::path::PathBuf>,
    overrides: WorkspaceArgs,
) -> anyhow::Result<Bootstrap> {
    let mut config = BootstrapConfig::discover(config.as_deref())?;
    if let Some(source) = overrides.source {
        config.workspace.source = source;
    }
    if let Some(destination) = overrides.destination {
        config.workspace.destination = destination;
    }
    Ok(Bootstrap::python(config))
}

/// The report goes to stderr so the entry program owns stdout
fn print_report(report: &BootstrapReport, format: &OutputFormat, verbose: bool) {
    if verbose || *format == OutputFormat::Json {
        eprintln!("{}", format_output(&Output::Report(report), format));
    }
}

/// Exit codes outside 0..=255 are reported as a generic failure
fn entry_status(report: &BootstrapReport) -> u8 {
    report
        .exit_code
        .and_then(|code| u8::try_from(code).ok())
        .unwrap_or(1)
}
