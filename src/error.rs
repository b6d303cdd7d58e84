use miette::Diagnostic;
use thiserror::Error;

use crate::parser::Location;

/// Main error type for blazon operations
#[derive(Error, Diagnostic, Debug)]
pub enum BlazonError {
    #[error("IO error: {0}")]
    #[diagnostic(code(blazon::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(blazon::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error at {location} (byte {}): {message}", .location.offset)]
    #[diagnostic(code(blazon::parse))]
    Parse {
        message: String,
        location: Location,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown {kind}: {id}")]
    #[diagnostic(code(blazon::reference))]
    Reference { kind: &'static str, id: String },

    #[error("Invariant violation: {message}")]
    #[diagnostic(code(blazon::invariant))]
    InvariantViolation {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid colour: {message}")]
    #[diagnostic(code(blazon::colour))]
    InvalidColour {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Snapshot error: {message}")]
    #[diagnostic(code(blazon::snapshot))]
    Snapshot { message: String },

    #[error("Config error: {message}")]
    #[diagnostic(code(blazon::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl BlazonError {
    /// Unknown layer identifier.
    pub fn unknown_layer(id: impl ToString) -> Self {
        BlazonError::Reference {
            kind: "layer",
            id: id.to_string(),
        }
    }

    /// Unknown container identifier.
    pub fn unknown_container(id: impl ToString) -> Self {
        BlazonError::Reference {
            kind: "container",
            id: id.to_string(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        BlazonError::InvariantViolation {
            message: message.into(),
            help: None,
        }
    }

    /// Byte offset of a parse error, if this is one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            BlazonError::Parse { location, .. } => Some(location.offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlazonError>;
