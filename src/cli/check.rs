//! Check command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::{BlazonError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, summary, validate_document};

use super::{collect_files, read_document};

/// Parse and lint definition files
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: CheckArgs, config: &Config, printer: &Printer) -> Result<()> {
    let files = collect_files(&args.paths, config);
    let metadata = config.metadata();
    let mut failed = 0;

    for path in &files {
        let shown = display_path(path);
        printer.status("Checking", &shown);

        let coa = read_document(path, config)?;
        let result = validate_document(&coa, metadata.as_ref());
        print_diagnostics(&result, &shown, printer);

        let fails = result.has_errors() || (args.strict && result.has_warnings());
        if fails {
            failed += 1;
        }
        if !result.is_ok() {
            printer.info("Summary", &format!("{}: {}", shown, summary(&result)));
        }
    }

    if failed > 0 {
        return Err(BlazonError::InvariantViolation {
            message: format!("{} failed the lint", plural(failed, "file", "files")),
            help: None,
        });
    }
    printer.success("Finished", &format!("{} checked", plural(files.len(), "file", "files")));
    Ok(())
}
