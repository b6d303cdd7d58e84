//! Terminal output for the blazon CLI.
//!
//! Status lines go to stderr in Cargo style, with the verb right-aligned
//! and coloured. Stdout carries only command output (documents, JSON,
//! tables) so it can be piped.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::types::Colour;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Colour is enabled when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_color(io::stderr().is_terminal())
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    /// Progress line with a green verb, e.g. "  Formatting coats/house.txt".
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Completion line with a green verb, e.g. "  Finished 3 files".
    pub fn success(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Informational line with a cyan verb.
    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    /// Warning line with a yellow verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Error line with a red verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Grey text for secondary details such as texture paths.
    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    /// Bold text for labels.
    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    /// Cyan text for container names.
    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Severity label, red for errors and yellow otherwise.
    pub fn severity(&self, label: &str, is_error: bool) -> String {
        let color = if is_error { RED } else { YELLOW };
        if self.color {
            format!("{BOLD}{color}{label}{RESET}")
        } else {
            label.to_string()
        }
    }

    /// A colour sample: a true-colour block followed by the hex value, or
    /// just the hex value without colour support.
    pub fn swatch(&self, colour: &Colour) -> String {
        let hex = colour.to_hex();
        if self.color {
            let [r, g, b] = colour.channels();
            format!("\x1b[48;2;{r};{g};{b}m  {RESET} {hex}")
        } else {
            hex
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(stderr, "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}");
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// Pluralize a count: `plural(1, "layer", "layers")` gives "1 layer".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedColour;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "layer", "layers"), "1 layer");
        assert_eq!(plural(0, "layer", "layers"), "0 layers");
        assert_eq!(plural(3, "instance", "instances"), "3 instances");
    }

    #[test]
    fn test_display_path_absolute() {
        let p = Path::new("/nonexistent/coats/house.txt");
        assert_eq!(display_path(p), "/nonexistent/coats/house.txt");
    }

    #[test]
    fn test_plain_printer_formatting() {
        let printer = Printer::with_color(false);
        assert_eq!(printer.bold("x"), "x");
        assert_eq!(printer.severity("error", true), "error");
        assert_eq!(printer.swatch(&Colour::named(NamedColour::Red)), "#722116");
    }

    #[test]
    fn test_coloured_text_helpers() {
        let printer = Printer::with_color(true);
        assert_eq!(printer.bold("pattern"), "\x1b[1mpattern\x1b[0m");
        assert_eq!(printer.dim("ce_lion.dds"), "\x1b[2mce_lion.dds\x1b[0m");
        assert_eq!(printer.cyan("Beasts"), "\x1b[36mBeasts\x1b[0m");
        assert_eq!(Printer::with_color(false).dim("hidden"), "hidden");
    }

    #[test]
    fn test_coloured_swatch() {
        let printer = Printer::with_color(true);
        let swatch = printer.swatch(&Colour::rgb(1, 2, 3));
        assert!(swatch.starts_with("\x1b[48;2;1;2;3m"));
        assert!(swatch.ends_with("#010203"));
    }
}
