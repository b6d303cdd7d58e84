//! Reader and writer for coat-of-arms definition text.
//!
//! The text format is a brace-delimited key/value language:
//!
//! ```text
//! coa_export = {
//!     pattern = "pattern_solid.dds"
//!     color1 = red
//!     colored_emblem = {
//!         texture = "ce_lion.dds"
//!         instance = { position = { 0.5 0.5 } scale = { 0.7 0.7 } }
//!     }
//! }
//! ```
//!
//! [`parse`] turns text into a generic [`Map`] tree and [`serialize`] turns a
//! tree back into text. Neither knows what the keys mean; that mapping lives
//! in [`crate::model`].
//!
//! # Usage
//!
//! ```
//! use blazon::parser::{parse, serialize};
//!
//! let tree = parse("coa = { color1 = red }").unwrap();
//! assert_eq!(serialize(&tree), "coa = {\n\tcolor1 = red\n}\n");
//! ```

mod reader;
mod writer;
pub mod span;
pub mod types;

pub use reader::{parse, META_PREFIX};
pub use span::{offset_to_location, Location};
pub use types::{is_repeated_key, Block, Map, Value, REPEATED_KEYS};
pub use writer::{format_float, inline, quote_if_needed, serialize};
