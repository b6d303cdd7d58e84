//! Lint for coat-of-arms documents.
//!
//! Runs a suite of checks against a parsed document and reports errors
//! and warnings. Used by `blazon check`.

mod checks;
mod warning;

pub use checks::{check_containers, check_instances, check_textures, check_visibility};
pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::model::{CoatOfArms, TextureMetadata};
use crate::output::{plural, Printer};

/// Run all checks against a document.
pub fn validate_document(coa: &CoatOfArms, metadata: &dyn TextureMetadata) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_textures(coa, metadata));
    result.merge(checks::check_visibility(coa));
    result.merge(checks::check_containers(coa));
    result.merge(checks::check_instances(coa));

    result
}

/// Print diagnostics for one file to stderr.
pub fn print_diagnostics(result: &ValidationResult, source: &str, printer: &Printer) {
    for d in result.iter() {
        let label = printer.severity(&d.severity.to_string(), d.severity == Severity::Error);
        eprintln!("{}[{}]: {}", label, d.code, d.message);
        eprintln!("  {} {}", printer.dim("-->"), source);
        if let Some(help) = &d.help {
            eprintln!("  {} {}", printer.dim("help:"), help);
        }
    }
}

/// One-line summary of a result.
pub fn summary(result: &ValidationResult) -> String {
    format!(
        "{}, {}",
        plural(result.error_count(), "error", "errors"),
        plural(result.warning_count(), "warning", "warnings")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoMetadata;

    #[test]
    fn test_validate_empty_document() {
        let coa = CoatOfArms::new();
        let result = validate_document(&coa, &NoMetadata);
        assert!(result.is_ok());
        assert_eq!(summary(&result), "0 errors, 0 warnings");
    }

    #[test]
    fn test_validate_collects_all_checks() {
        let mut coa = CoatOfArms::new();
        let hidden = coa.add_layer("", None).unwrap();
        coa.set_layer_visible(&hidden, false).unwrap();
        let result = validate_document(&coa, &NoMetadata);
        assert_eq!(result.warning_count(), 2);
        assert_eq!(summary(&result), "0 errors, 2 warnings");
    }
}
