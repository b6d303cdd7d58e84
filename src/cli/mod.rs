pub mod check;
pub mod colours;
pub mod completions;
pub mod extract;
pub mod fmt;
pub mod info;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{BlazonError, Result};
use crate::model::CoatOfArms;

/// Extension of coat-of-arms definition files.
pub const DOCUMENT_EXTENSION: &str = "txt";

/// blazon - coat-of-arms definition toolkit
#[derive(Parser, Debug)]
#[command(name = "blazon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ./blazon.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Write every colour as rgb { r g b }
    #[arg(long, global = true)]
    pub force_rgb: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite definition files in canonical form
    Fmt(fmt::FmtArgs),

    /// Parse and lint definition files
    Check(check::CheckArgs),

    /// Summarize a definition file
    Info(info::InfoArgs),

    /// Print layers as bare emblem blocks for pasting
    Extract(extract::ExtractArgs),

    /// List the named colour palette
    Colours(colours::ColoursArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

impl Cli {
    /// Effective configuration: the config file, then command-line flags.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(Path::new("."))?,
        };
        if self.force_rgb {
            config.force_rgb = true;
        }
        Ok(config)
    }
}

/// Read a definition file into a document set up from `config`.
pub fn read_document(path: &Path, config: &Config) -> Result<CoatOfArms> {
    let source = read_source(path)?;
    document_from_source(&source, config)
}

/// Parse already-loaded text into a document set up from `config`.
pub fn document_from_source(source: &str, config: &Config) -> Result<CoatOfArms> {
    let mut coa = CoatOfArms::with_metadata(config.metadata());
    coa.set_options(config.export_options());
    coa.parse(source, None)?;
    Ok(coa)
}

/// Write command output, passing write failures (such as a closed pipe)
/// back to the caller.
pub fn emit(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| BlazonError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })
}

/// Expand the given paths into definition files. Directories are walked
/// for `.txt` files; files named directly are always kept.
pub fn collect_files(paths: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|ext| ext == DOCUMENT_EXTENSION))
            .filter(|p| !config.is_excluded(p))
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
