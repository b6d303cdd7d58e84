//! Core domain types for blazon.
//!
//! This module contains the entities a document is built from:
//! - `Colour` - RGB colour with an optional palette tag
//! - `NamedColour` - the fixed palette of named colours
//! - `Instance` - one placement of an emblem
//! - `Layer` - an emblem texture with colours and its instances
//! - `Symmetry` - how a layer's instances are mirrored on export

mod colour;
mod instance;
mod layer;
mod palette;
mod symmetry;

pub use colour::{Colour, FALLBACK_COLOUR, MIN_COLOUR_DISTANCE};
pub use instance::{
    Instance, Vec2, DEFAULT_POSITION, DEFAULT_SCALE, NEW_INSTANCE_SCALE, SCALE_MAX, SCALE_MIN,
};
pub use layer::{
    channel_index, default_layer_name, ContainerTag, Layer, LayerId, Mask, DEFAULT_COLOUR_COUNT,
    DEFAULT_EMBLEM_COLOURS, EMPTY_LAYER_NAME,
};
pub use palette::NamedColour;
pub use symmetry::{Symmetry, GRID_COUNT, ROTATIONAL_COUNT};
