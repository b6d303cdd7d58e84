//! Extract command implementation.
//!
//! Prints selected layers as bare emblem blocks, ready to paste into
//! another document.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::{BlazonError, Result};
use crate::model::CoatOfArms;
use crate::types::LayerId;

use super::{emit, read_document};

/// Print layers as bare emblem blocks for pasting
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Definition file
    pub file: PathBuf,

    /// Extract every layer of this container, keeping its membership
    #[arg(long, conflicts_with = "layers")]
    pub container: Option<String>,

    /// Layer ids to extract (all layers when none are given)
    #[arg(long = "layer", value_name = "ID")]
    pub layers: Vec<String>,
}

/// Resolve the selection to layer ids and whether container fields are kept.
pub fn selection(coa: &CoatOfArms, args: &ExtractArgs) -> Result<(Vec<LayerId>, bool)> {
    if let Some(container) = &args.container {
        let ids = coa.container_layers(container);
        if ids.is_empty() {
            return Err(BlazonError::unknown_container(container));
        }
        return Ok((ids, true));
    }
    if args.layers.is_empty() {
        let ids = coa.layers().iter().map(|l| l.id().clone()).collect();
        return Ok((ids, false));
    }
    let ids = args.layers.iter().map(|s| LayerId::from(s.as_str())).collect();
    Ok((ids, false))
}

pub fn run(args: ExtractArgs, config: &Config) -> Result<()> {
    let coa = read_document(&args.file, config)?;
    let (ids, keep_containers) = selection(&coa, &args)?;
    let text = coa.export_layers(&ids, keep_containers)?;
    tracing::debug!(layers = ids.len(), keep_containers, "extracted layers");

    emit(&mut std::io::stdout().lock(), &text)
}
