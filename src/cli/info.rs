//! Info command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::model::CoatOfArms;
use crate::output::{plural, Printer};
use crate::types::{Colour, Layer};

use super::read_document;

/// Summarize a definition file
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Definition file
    pub file: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Document summary, top layer last.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub pattern: String,
    pub colours: Vec<String>,
    pub layers: Vec<LayerSummary>,
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub name: String,
    pub texture: String,
    pub colours: Vec<String>,
    pub instances: usize,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub layers: usize,
}

fn colour_label(colour: &Colour) -> String {
    match colour.name() {
        Some(name) => name.name().to_string(),
        None => colour.to_hex(),
    }
}

impl DocumentSummary {
    pub fn of(coa: &CoatOfArms) -> Self {
        let layers = coa.layers().iter().map(LayerSummary::of).collect();
        let containers = coa
            .containers()
            .into_iter()
            .map(|tag| ContainerSummary {
                layers: coa.container_layers(&tag.id).len(),
                id: tag.id,
                name: tag.name,
            })
            .collect();
        Self {
            pattern: coa.pattern().to_string(),
            colours: coa.base_colours().iter().map(colour_label).collect(),
            layers,
            containers,
        }
    }
}

impl LayerSummary {
    fn of(layer: &Layer) -> Self {
        let count = usize::from(layer.colour_count());
        Self {
            id: layer.id().to_string(),
            name: layer.name().to_string(),
            texture: layer.texture().to_string(),
            colours: layer.colours()[..count].iter().map(colour_label).collect(),
            instances: layer.instance_count(),
            visible: layer.visible(),
            container: layer.container().map(|tag| tag.name.clone()),
        }
    }
}

pub fn run(args: InfoArgs, config: &Config, printer: &Printer) -> Result<()> {
    let coa = read_document(&args.file, config)?;
    let summary = DocumentSummary::of(&coa);
    let mut stdout = std::io::stdout().lock();

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| {
            crate::error::BlazonError::invariant(format!("Failed to encode summary: {}", e))
        })?;
        writeln!(stdout, "{}", json)?;
        return Ok(());
    }

    writeln!(stdout, "{} {}", printer.bold("pattern"), summary.pattern)?;
    for (channel, colour) in coa.base_colours().iter().enumerate() {
        writeln!(
            stdout,
            "{} {} {}",
            printer.bold(&format!("color{}", channel + 1)),
            printer.swatch(colour),
            summary.colours[channel]
        )?;
    }

    writeln!(stdout)?;
    writeln!(
        stdout,
        "{}",
        printer.bold(&plural(summary.layers.len(), "layer", "layers"))
    )?;
    for layer in summary.layers.iter().rev() {
        let mut line = format!(
            "  {} {} ({})",
            layer.name,
            printer.dim(&layer.texture),
            plural(layer.instances, "instance", "instances")
        );
        if let Some(container) = &layer.container {
            line.push_str(&format!(" in {}", printer.cyan(container)));
        }
        if !layer.visible {
            line.push_str(&format!(" {}", printer.dim("hidden")));
        }
        writeln!(stdout, "{}", line)?;
    }

    if !summary.containers.is_empty() {
        writeln!(stdout)?;
        for container in &summary.containers {
            writeln!(
                stdout,
                "{} {} ({})",
                printer.bold("container"),
                container.name,
                plural(container.layers, "layer", "layers")
            )?;
        }
    }
    Ok(())
}
