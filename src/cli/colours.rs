//! Colours command implementation.

use std::io::Write;

use clap::Args;

use crate::error::Result;
use crate::output::{plural, Printer};
use crate::types::{Colour, NamedColour};

/// List the named colour palette
#[derive(Args, Debug)]
pub struct ColoursArgs {
    /// Show which background each colour is drawn against, e.g. `black`
    /// or `rgb { 20 20 20 }`
    #[arg(long, value_name = "COLOUR")]
    pub against: Option<String>,
}

/// One palette row: name, swatch, and the background when requested.
pub fn palette_line(colour: NamedColour, background: Option<&Colour>, printer: &Printer) -> String {
    let sample = Colour::named(colour);
    let mut line = format!("{:<14} {}", colour.name(), printer.swatch(&sample));
    if let Some(background) = background {
        let shown = sample.contrasting(background);
        line.push_str(&format!(" on {}", printer.swatch(&shown)));
    }
    line
}

pub fn run(args: ColoursArgs, printer: &Printer) -> Result<()> {
    let background = args.against.as_deref().map(Colour::from_script);
    let mut stdout = std::io::stdout().lock();
    for colour in NamedColour::ALL {
        writeln!(stdout, "{}", palette_line(colour, background.as_ref(), printer))?;
    }
    printer.info(
        "Listed",
        &plural(NamedColour::ALL.len(), "colour", "colours"),
    );
    Ok(())
}
