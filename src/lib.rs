//! blazon - coat-of-arms definition toolkit
//!
//! A library for reading, editing and writing layered coat-of-arms
//! definitions: a background pattern with three colours and a stack of
//! emblem layers, optionally grouped into containers.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod types;
pub mod validation;

pub use config::Config;
pub use error::{BlazonError, Result};
pub use model::{
    CoatOfArms, ContainerSplit, ExportOptions, History, NoMetadata, SharedMetadata, Snapshot,
    TextureMetadata,
};
pub use types::{Colour, ContainerTag, Instance, Layer, LayerId, Mask, NamedColour, Symmetry, Vec2};
pub use validation::{validate_document, Diagnostic, Severity, ValidationResult};
