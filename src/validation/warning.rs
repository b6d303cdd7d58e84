//! Lint diagnostics.

use std::fmt;

use crate::types::LayerId;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding about a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Machine-readable code, e.g. `blazon::lint::hidden-layer`.
    pub code: String,
    pub message: String,
    /// Layer the finding is about, when there is one.
    pub layer: Option<LayerId>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            layer: None,
            help: None,
        }
    }

    pub fn with_layer(mut self, layer: &LayerId) -> Self {
        self.layer = Some(layer.clone());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// Diagnostics collected from the lint checks, in check order.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// No diagnostics at all.
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Diagnostics with the given code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }
}

impl Extend<Diagnostic> for ValidationResult {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_severity() {
        let mut result = ValidationResult::new();
        assert!(result.is_ok());
        result.push(Diagnostic::warning("blazon::lint::a", "first"));
        result.push(Diagnostic::warning("blazon::lint::a", "second"));
        result.push(Diagnostic::error("blazon::lint::b", "third"));
        assert_eq!(result.warning_count(), 2);
        assert_eq!(result.error_count(), 1);
        assert!(result.has_errors());
        assert_eq!(result.with_code("blazon::lint::a").count(), 2);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut a = ValidationResult::new();
        a.push(Diagnostic::error("blazon::lint::x", "x"));
        let mut b = ValidationResult::new();
        b.push(Diagnostic::warning("blazon::lint::y", "y"));
        a.merge(b);
        let codes: Vec<_> = a.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["blazon::lint::x", "blazon::lint::y"]);
    }

    #[test]
    fn test_diagnostic_display_and_context() {
        let d = Diagnostic::warning("blazon::lint::hidden-layer", "layer is hidden")
            .with_layer(&LayerId::from("L1"))
            .with_help("Remove it or make it visible");
        assert_eq!(d.to_string(), "warning[blazon::lint::hidden-layer]: layer is hidden");
        assert_eq!(d.layer, Some(LayerId::from("L1")));
        assert_eq!(d.help.as_deref(), Some("Remove it or make it visible"));
    }
}
