//! Layers: one emblem texture placed one or more times.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BlazonError, Result};

use super::colour::Colour;
use super::instance::{Instance, Vec2};
use super::palette::NamedColour;
use super::symmetry::Symmetry;

/// Default emblem colours, by channel.
pub const DEFAULT_EMBLEM_COLOURS: [NamedColour; 3] =
    [NamedColour::Yellow, NamedColour::Red, NamedColour::Red];

/// Colour count assumed when texture metadata has no entry.
pub const DEFAULT_COLOUR_COUNT: u8 = 3;

/// Display name used for layers without a texture.
pub const EMPTY_LAYER_NAME: &str = "empty";

/// Stable layer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(String);

impl LayerId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Container membership: an opaque id plus a display name.
///
/// Layers that share an id form one container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerTag {
    pub id: String,
    pub name: String,
}

impl ContainerTag {
    /// A new container with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }

    /// An independent container with the same display name.
    pub fn split(&self) -> Self {
        Self::new(self.name.clone())
    }

    /// Read the single-string form `container_<id>_<name>`.
    ///
    /// A value without the prefix is taken as a bare id with an empty name.
    pub fn from_legacy(tag: &str) -> Self {
        match tag.strip_prefix("container_") {
            Some(rest) => match rest.split_once('_') {
                Some((id, name)) => Self {
                    id: id.to_string(),
                    name: name.to_string(),
                },
                None => Self {
                    id: rest.to_string(),
                    name: String::new(),
                },
            },
            None => Self {
                id: tag.to_string(),
                name: String::new(),
            },
        }
    }
}

impl fmt::Display for ContainerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// Restriction of an emblem to pattern channels. Each slot is 0 (unused)
/// or a channel number 1..=3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask(pub [u8; 3]);

impl Mask {
    /// Build from up to three integers, padding with 0.
    pub fn from_values(values: &[i64]) -> Result<Self> {
        if values.len() > 3 {
            return Err(BlazonError::invariant(format!(
                "mask has {} entries, at most 3 allowed",
                values.len()
            )));
        }
        let mut slots = [0u8; 3];
        for (slot, &v) in slots.iter_mut().zip(values) {
            if !(0..=3).contains(&v) {
                return Err(BlazonError::invariant(format!(
                    "mask entry {} outside 0..=3",
                    v
                )));
            }
            *slot = v as u8;
        }
        Ok(Self(slots))
    }

    pub fn values(&self) -> [u8; 3] {
        self.0
    }
}

/// Name derived from a texture filename: the stem without extension, or
/// [`EMPTY_LAYER_NAME`].
pub fn default_layer_name(texture: &str) -> String {
    if texture.is_empty() {
        return EMPTY_LAYER_NAME.to_string();
    }
    let file = texture.rsplit(['/', '\\']).next().unwrap_or(texture);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

/// Check a 1-based colour channel index.
pub fn channel_index(channel: usize) -> Result<usize> {
    if (1..=3).contains(&channel) {
        Ok(channel - 1)
    } else {
        Err(BlazonError::InvariantViolation {
            message: format!("colour channel {} out of range", channel),
            help: Some("Channels are numbered 1 to 3".to_string()),
        })
    }
}

/// One emblem layer.
///
/// A layer always has at least one instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerRepr")]
pub struct Layer {
    id: LayerId,
    name: String,
    texture: String,
    colours: [Colour; 3],
    colour_count: u8,
    flip_x: bool,
    flip_y: bool,
    mask: Option<Mask>,
    visible: bool,
    container: Option<ContainerTag>,
    symmetry: Symmetry,
    instances: Vec<Instance>,
}

impl Layer {
    /// A new layer with default colours and one centred instance.
    pub fn new(texture: impl Into<String>) -> Self {
        let texture = texture.into();
        Self {
            id: LayerId::generate(),
            name: default_layer_name(&texture),
            texture,
            colours: DEFAULT_EMBLEM_COLOURS.map(Colour::named),
            colour_count: DEFAULT_COLOUR_COUNT,
            flip_x: false,
            flip_y: false,
            mask: None,
            visible: true,
            container: None,
            symmetry: Symmetry::None,
            instances: vec![Instance::default()],
        }
    }

    /// A layer with the given instances. An empty list gets one default
    /// instance.
    pub fn with_instances(texture: impl Into<String>, instances: Vec<Instance>) -> Self {
        let mut layer = Self::new(texture);
        if !instances.is_empty() {
            layer.instances = instances;
        }
        layer
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: LayerId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename. An empty name resets to the texture-derived default.
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = if name.trim().is_empty() {
            default_layer_name(&self.texture)
        } else {
            name
        };
    }

    pub fn texture(&self) -> &str {
        &self.texture
    }

    /// Change the texture. A name that was still the old default follows
    /// the new texture.
    pub fn set_texture(&mut self, texture: impl Into<String>) {
        let texture = texture.into();
        if self.name == default_layer_name(&self.texture) {
            self.name = default_layer_name(&texture);
        }
        self.texture = texture;
    }

    /// Colour of channel 1, 2 or 3.
    pub fn colour(&self, channel: usize) -> Result<Colour> {
        Ok(self.colours[channel_index(channel)?])
    }

    pub fn set_colour(&mut self, channel: usize, colour: Colour) -> Result<()> {
        self.colours[channel_index(channel)?] = colour;
        Ok(())
    }

    pub fn colours(&self) -> &[Colour; 3] {
        &self.colours
    }

    /// Number of channels the texture actually uses.
    pub fn colour_count(&self) -> u8 {
        self.colour_count
    }

    pub fn set_colour_count(&mut self, count: u8) {
        self.colour_count = count.clamp(1, 3);
    }

    pub fn flip_x(&self) -> bool {
        self.flip_x
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn set_flip(&mut self, flip_x: bool, flip_y: bool) {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
    }

    pub fn mask(&self) -> Option<Mask> {
        self.mask
    }

    pub fn set_mask(&mut self, mask: Option<Mask>) {
        self.mask = mask;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn container(&self) -> Option<&ContainerTag> {
        self.container.as_ref()
    }

    /// Container tags are managed by the document so it can keep
    /// containers contiguous.
    pub(crate) fn set_container(&mut self, container: Option<ContainerTag>) {
        self.container = container;
    }

    pub fn symmetry(&self) -> &Symmetry {
        &self.symmetry
    }

    /// Set the symmetry, with counts clamped to their allowed ranges.
    pub fn set_symmetry(&mut self, symmetry: Symmetry) {
        self.symmetry = symmetry.clamped();
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance(&self, index: usize) -> Result<&Instance> {
        let count = self.instances.len();
        self.instances
            .get(index)
            .ok_or_else(|| instance_out_of_range(index, count))
    }

    pub fn instance_mut(&mut self, index: usize) -> Result<&mut Instance> {
        let count = self.instances.len();
        self.instances
            .get_mut(index)
            .ok_or_else(|| instance_out_of_range(index, count))
    }

    /// Append an instance, returning its index.
    pub fn push_instance(&mut self, instance: Instance) -> usize {
        self.instances.push(instance);
        self.instances.len() - 1
    }

    /// Append a new editor instance at `position`, returning its index.
    pub fn add_instance(&mut self, position: Vec2) -> usize {
        self.push_instance(Instance::new(position))
    }

    /// Remove an instance. The last remaining instance cannot be removed.
    pub fn remove_instance(&mut self, index: usize) -> Result<Instance> {
        self.instance(index)?;
        if self.instances.len() == 1 {
            return Err(BlazonError::InvariantViolation {
                message: format!("cannot remove the last instance of layer {}", self.id),
                help: Some("Remove the layer instead".to_string()),
            });
        }
        Ok(self.instances.remove(index))
    }

    /// Take every instance, leaving the layer empty. Callers must restore
    /// at least one instance before the layer is observed again.
    pub(crate) fn take_instances(&mut self) -> Vec<Instance> {
        std::mem::take(&mut self.instances)
    }

    pub(crate) fn extend_instances(&mut self, instances: impl IntoIterator<Item = Instance>) {
        self.instances.extend(instances);
    }

    /// Deep copy with a fresh id, every instance shifted by `offset`.
    pub fn duplicate(&self, offset: Option<Vec2>) -> Layer {
        let mut copy = self.clone();
        copy.id = LayerId::generate();
        if let Some(offset) = offset {
            copy.instances = self
                .instances
                .iter()
                .map(|inst| inst.offset(offset.x, offset.y))
                .collect();
        }
        copy
    }

    /// Smallest instance depth, the layer's sort key when read from a file.
    pub fn min_depth(&self) -> f64 {
        self.instances
            .iter()
            .map(Instance::depth)
            .fold(f64::INFINITY, f64::min)
    }
}

fn instance_out_of_range(index: usize, count: usize) -> BlazonError {
    BlazonError::InvariantViolation {
        message: format!("instance {} out of range (layer has {})", index, count),
        help: None,
    }
}

/// Deserialized form, checked before it becomes a [`Layer`].
#[derive(Deserialize)]
struct LayerRepr {
    id: LayerId,
    name: String,
    texture: String,
    colours: [Colour; 3],
    colour_count: u8,
    flip_x: bool,
    flip_y: bool,
    mask: Option<Mask>,
    visible: bool,
    container: Option<ContainerTag>,
    symmetry: Symmetry,
    instances: Vec<Instance>,
}

impl TryFrom<LayerRepr> for Layer {
    type Error = BlazonError;

    fn try_from(repr: LayerRepr) -> Result<Self> {
        if repr.instances.is_empty() {
            return Err(BlazonError::invariant(format!(
                "layer {} has no instances",
                repr.id
            )));
        }
        if !(1..=3).contains(&repr.colour_count) {
            return Err(BlazonError::invariant(format!(
                "layer {} has colour count {}",
                repr.id, repr.colour_count
            )));
        }
        let mask = repr
            .mask
            .map(|mask| {
                let values = mask.values().map(i64::from);
                Mask::from_values(&values)
            })
            .transpose()?;
        Ok(Layer {
            id: repr.id,
            name: repr.name,
            texture: repr.texture,
            colours: repr.colours,
            colour_count: repr.colour_count,
            flip_x: repr.flip_x,
            flip_y: repr.flip_y,
            mask,
            visible: repr.visible,
            container: repr.container,
            symmetry: repr.symmetry.clamped(),
            instances: repr.instances,
        })
    }
}
