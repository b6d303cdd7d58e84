//! Fmt command implementation.
//!
//! Reads each definition file and writes it back in canonical form.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::{BlazonError, Result};
use crate::output::{display_path, plural, Printer};

use super::{collect_files, document_from_source, emit, read_source};

/// Rewrite definition files in canonical form
#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Files or directories to format
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Report files that would change without writing them
    #[arg(long)]
    pub check: bool,

    /// Print formatted output instead of writing files
    #[arg(long, conflicts_with = "check")]
    pub stdout: bool,
}

/// Outcome of formatting a batch of files.
#[derive(Debug, Default, PartialEq)]
pub struct FmtReport {
    pub unchanged: usize,
    pub changed: Vec<PathBuf>,
}

pub fn run(args: FmtArgs, config: &Config, printer: &Printer) -> Result<FmtReport> {
    let files = collect_files(&args.paths, config);
    let mut report = FmtReport::default();

    for path in &files {
        let source = read_source(path)?;
        let mut coa = document_from_source(&source, config)?;
        if let Some(key) = coa.source_key().map(str::to_string) {
            let mut options = coa.options().clone();
            options.root_key = key;
            coa.set_options(options);
        }
        let formatted = coa.to_string();

        if args.stdout {
            emit(&mut std::io::stdout().lock(), &formatted)?;
            continue;
        }
        if formatted == source {
            report.unchanged += 1;
            continue;
        }
        if args.check {
            printer.warning("Unformatted", &display_path(path));
        } else {
            fs::write(path, &formatted).map_err(|e| BlazonError::Io {
                path: path.clone(),
                message: format!("Failed to write file: {}", e),
            })?;
            printer.status("Formatted", &display_path(path));
        }
        report.changed.push(path.clone());
    }

    if args.stdout {
        return Ok(report);
    }
    if args.check && !report.changed.is_empty() {
        return Err(BlazonError::InvariantViolation {
            message: format!(
                "{} not in canonical form",
                plural(report.changed.len(), "file", "files")
            ),
            help: Some("Run `blazon fmt` without --check to rewrite them".to_string()),
        });
    }
    printer.success(
        "Finished",
        &format!(
            "{} ({} unchanged)",
            plural(report.changed.len(), "file", "files"),
            report.unchanged
        ),
    );
    Ok(report)
}
