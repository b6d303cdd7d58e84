//! Reading and writing documents.
//!
//! Text is first parsed into the generic tree, then the document body is
//! located and mapped field by field. Writing goes the other way. Depth is
//! not kept from the input: it orders freshly read layers and is then
//! recomputed from sequence position on every write.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{BlazonError, Result};
use crate::parser::{self, Map, Value};
use crate::types::{
    default_layer_name, Colour, ContainerTag, Instance, Layer, LayerId, Mask, Symmetry, Vec2,
    DEFAULT_EMBLEM_COLOURS, DEFAULT_POSITION, DEFAULT_SCALE,
};

use super::metadata::{resolve_colour_count, TextureMetadata};
use super::{CoatOfArms, DEFAULT_BASE_COLOURS, DEFAULT_PATTERN};

const EMBLEM_KEY: &str = "colored_emblem";
const INSTANCE_KEY: &str = "instance";
const PATTERN_KEY: &str = "pattern";
const TEXTURE_KEY: &str = "texture";
const COLOUR_KEYS: [&str; 3] = ["color1", "color2", "color3"];

/// Added to every written depth so back layers never read as integers.
const DEPTH_BIAS: f64 = 0.01;

impl CoatOfArms {
    /// Read definition text into the document.
    ///
    /// A full document (one with a pattern or base colours) replaces the
    /// current content and `insert_after` is ignored. Bare emblem blocks
    /// are added as new layers with fresh ids, stacked directly above
    /// `insert_after` or on top of everything. Returns the ids of the
    /// layers read, back to front.
    ///
    /// On error the document is left untouched.
    pub fn parse(&mut self, text: &str, insert_after: Option<&LayerId>) -> Result<Vec<LayerId>> {
        let root = parser::parse(text)?;
        let empty = Map::new();
        let body = locate_body(&root).unwrap_or(&empty);
        let layers = read_layers(body, self.metadata());

        if !is_full_document(body) {
            let at = self.insertion_index(insert_after)?;
            let fresh = layers.into_iter().map(|layer| layer.duplicate(None));
            return Ok(self.stack_layers(at, fresh));
        }

        self.source_key = wrapper_key(&root).map(str::to_string);
        self.pattern = body
            .get(PATTERN_KEY)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PATTERN)
            .to_string();
        for (slot, (key, default)) in self
            .base_colours
            .iter_mut()
            .zip(COLOUR_KEYS.iter().zip(DEFAULT_BASE_COLOURS))
        {
            *slot = body
                .get(key)
                .map(colour_from_value)
                .unwrap_or_else(|| Colour::named(default));
        }

        let mut seen = HashSet::new();
        self.layers = layers
            .into_iter()
            .map(|mut layer| {
                if !seen.insert(layer.id().clone()) {
                    layer.set_id(LayerId::generate());
                }
                layer
            })
            .collect();
        self.validate_container_contiguity();
        tracing::debug!(
            pattern = %self.pattern,
            layers = self.layers.len(),
            "read document"
        );
        Ok(self.layers.iter().map(|layer| layer.id().clone()).collect())
    }

    /// Add the emblems found in `text` as new layers, whatever form the
    /// text has, moving every instance by `offset`.
    pub fn paste(
        &mut self,
        text: &str,
        insert_after: Option<&LayerId>,
        offset: Vec2,
    ) -> Result<Vec<LayerId>> {
        let root = parser::parse(text)?;
        let empty = Map::new();
        let body = locate_body(&root).unwrap_or(&empty);
        let at = self.insertion_index(insert_after)?;
        let shift = (offset != Vec2::default()).then_some(offset);
        let layers = read_layers(body, self.metadata())
            .into_iter()
            .map(|layer| layer.duplicate(shift));
        Ok(self.stack_layers(at, layers))
    }

    fn insertion_index(&self, insert_after: Option<&LayerId>) -> Result<usize> {
        match insert_after {
            Some(id) => Ok(self.index_of(id)? + 1),
            None => Ok(self.layers.len()),
        }
    }

    fn stack_layers(&mut self, at: usize, layers: impl IntoIterator<Item = Layer>) -> Vec<LayerId> {
        let mut ids = Vec::new();
        for (offset, layer) in layers.into_iter().enumerate() {
            ids.push(layer.id().clone());
            self.layers.insert(at + offset, layer);
        }
        self.validate_container_contiguity();
        tracing::debug!(layers = ids.len(), index = at, "inserted layers");
        ids
    }

    /// The document as a generic tree under the configured root key.
    pub fn to_tree(&self) -> Map {
        let force_rgb = self.options.force_rgb;
        let mut body = Map::new();
        body.insert(PATTERN_KEY, Value::str(&self.pattern));
        for (key, colour) in COLOUR_KEYS.iter().zip(&self.base_colours) {
            body.insert(*key, colour_value(colour, force_rgb));
        }
        let count = self.layers.len();
        for (index, layer) in self.layers.iter().enumerate() {
            let emblem = emblem_map(layer, depth_for(index, count), true, force_rgb);
            body.push(EMBLEM_KEY, Value::map(emblem));
        }

        let mut root = Map::new();
        root.insert(self.options.root_key.clone(), Value::map(body));
        root
    }

    /// The given layers as bare emblem blocks, back to front, for the
    /// clipboard. Container tags are dropped unless `keep_containers`.
    pub fn export_layers(&self, ids: &[LayerId], keep_containers: bool) -> Result<String> {
        let mut indices = ids
            .iter()
            .map(|id| self.index_of(id))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();

        let force_rgb = self.options.force_rgb;
        let count = indices.len();
        let mut root = Map::new();
        for (position, &index) in indices.iter().enumerate() {
            let emblem = emblem_map(
                &self.layers[index],
                depth_for(position, count),
                keep_containers,
                force_rgb,
            );
            root.push(EMBLEM_KEY, Value::map(emblem));
        }
        Ok(parser::serialize(&root))
    }
}

impl fmt::Display for CoatOfArms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&parser::serialize(&self.to_tree()))
    }
}

impl FromStr for CoatOfArms {
    type Err = BlazonError;

    fn from_str(s: &str) -> Result<Self> {
        let mut coa = CoatOfArms::new();
        coa.parse(s, None)?;
        Ok(coa)
    }
}

/// Depth written for the layer at `index` of `count`; the frontmost layer
/// has none.
fn depth_for(index: usize, count: usize) -> Option<f64> {
    let behind = count.checked_sub(index + 1)?;
    (behind > 0).then(|| behind as f64 + DEPTH_BIAS)
}

fn looks_like_body(map: &Map) -> bool {
    [PATTERN_KEY, EMBLEM_KEY, TEXTURE_KEY]
        .iter()
        .chain(COLOUR_KEYS.iter())
        .any(|key| map.contains_key(key))
}

/// Find the map holding the document fields: the root itself, the value
/// of its first key, or a single map nested one level further.
fn locate_body(root: &Map) -> Option<&Map> {
    if looks_like_body(root) {
        return Some(root);
    }
    let body = root.first()?.1.as_map()?;
    if looks_like_body(body) || body.len() != 1 {
        return Some(body);
    }
    match body.first().and_then(|(_, value)| value.as_map()) {
        Some(inner) if looks_like_body(inner) => Some(inner),
        _ => Some(body),
    }
}

/// Root key wrapping the document body, if any.
fn wrapper_key(root: &Map) -> Option<&str> {
    if looks_like_body(root) {
        return None;
    }
    root.first()
        .filter(|(_, value)| value.as_map().is_some())
        .map(|(key, _)| key.as_str())
}

fn is_full_document(body: &Map) -> bool {
    body.contains_key(PATTERN_KEY)
        || (!body.contains_key(TEXTURE_KEY) && COLOUR_KEYS.iter().any(|key| body.contains_key(key)))
}

/// Every emblem in `body`, back to front.
fn read_layers(body: &Map, metadata: &dyn TextureMetadata) -> Vec<Layer> {
    let emblems: Vec<&Map> = if body.contains_key(EMBLEM_KEY) {
        body.occurrences(EMBLEM_KEY)
            .into_iter()
            .filter_map(Value::as_map)
            .collect()
    } else if body.contains_key(TEXTURE_KEY) {
        vec![body]
    } else {
        Vec::new()
    };

    let mut layers: Vec<Layer> = emblems
        .into_iter()
        .map(|emblem| layer_from_map(emblem, metadata))
        .collect();
    layers.sort_by(|a, b| b.min_depth().total_cmp(&a.min_depth()));
    layers
}

fn layer_from_map(map: &Map, metadata: &dyn TextureMetadata) -> Layer {
    let texture = map.get(TEXTURE_KEY).and_then(Value::as_str).unwrap_or("");

    let seeds: Vec<&Map> = map
        .occurrences(INSTANCE_KEY)
        .into_iter()
        .filter_map(Value::as_map)
        .filter(|inst| !inst.get("mirror").and_then(Value::as_bool).unwrap_or(false))
        .collect();
    let (flip_x, flip_y) = seeds
        .first()
        .map(|inst| {
            let scale = read_vec2(inst, "scale", DEFAULT_SCALE);
            (scale.x < 0.0, scale.y < 0.0)
        })
        .unwrap_or((false, false));
    let mut instances: Vec<Instance> = seeds.into_iter().map(instance_from_map).collect();
    if instances.is_empty() {
        instances.push(Instance::from_parts(DEFAULT_POSITION, DEFAULT_SCALE, 0.0, 0.0));
    }

    let mut layer = Layer::with_instances(texture, instances);
    if let Some(id) = map.get("uuid").and_then(Value::as_str).filter(|s| !s.is_empty()) {
        layer.set_id(LayerId::from(id));
    }
    if let Some(name) = map.get("name").and_then(Value::as_str) {
        layer.set_name(name);
    }
    for (channel, key) in COLOUR_KEYS.iter().enumerate() {
        if let Some(value) = map.get(key) {
            // Channels 1..=3 always exist.
            let _ = layer.set_colour(channel + 1, colour_from_value(value));
        }
    }
    layer.set_colour_count(resolve_colour_count(metadata, texture));
    layer.set_flip(flip_x, flip_y);
    layer.set_mask(map.get("mask").and_then(mask_from_value));
    layer.set_visible(map.get("visible").and_then(Value::as_bool).unwrap_or(true));
    layer.set_container(container_from_map(map));
    if let Some(kind) = map.get("symmetry_type").and_then(Value::as_str) {
        let props = map
            .get("symmetry_properties")
            .map(Value::as_f64_array)
            .unwrap_or_default();
        layer.set_symmetry(Symmetry::from_properties(kind, &props));
    }
    layer
}

fn instance_from_map(map: &Map) -> Instance {
    Instance::from_parts(
        read_vec2(map, "position", DEFAULT_POSITION),
        read_vec2(map, "scale", DEFAULT_SCALE),
        map.get("rotation").and_then(Value::as_f64).unwrap_or(0.0),
        map.get("depth").and_then(Value::as_f64).unwrap_or(0.0),
    )
}

fn read_vec2(map: &Map, key: &str, default: Vec2) -> Vec2 {
    match map.get(key).map(Value::as_f64_array).as_deref() {
        Some([x, y, ..]) => Vec2::new(*x, *y),
        _ => default,
    }
}

fn colour_from_value(value: &Value) -> Colour {
    match value.as_str() {
        Some(text) => Colour::from_script(text),
        None => Colour::from_name(&parser::inline(value)),
    }
}

fn mask_from_value(value: &Value) -> Option<Mask> {
    let values: Option<Vec<i64>> = value
        .as_array()
        .map(|items| items.iter().map(Value::as_i64).collect())
        .unwrap_or_else(|| value.as_i64().map(|v| vec![v]));
    let Some(values) = values else {
        tracing::warn!(value = %parser::inline(value), "ignoring unreadable mask");
        return None;
    };
    match Mask::from_values(&values) {
        Ok(mask) => Some(mask),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring mask");
            None
        }
    }
}

fn container_from_map(map: &Map) -> Option<ContainerTag> {
    let id = map
        .get("container_uuid")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?;
    match map.get("container_name").and_then(Value::as_str) {
        Some(name) => Some(ContainerTag {
            id: id.to_string(),
            name: name.to_string(),
        }),
        None => Some(ContainerTag::from_legacy(id)),
    }
}

fn colour_value(colour: &Colour, force_rgb: bool) -> Value {
    match colour.name() {
        Some(_) if !force_rgb => Value::str(colour.to_script(false)),
        _ => Value::Raw(colour.to_script(true)),
    }
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Int(value as i64)
    } else {
        Value::Float(value)
    }
}

fn pair(v: Vec2) -> Value {
    Value::array(vec![Value::Float(v.x), Value::Float(v.y)])
}

fn emblem_map(layer: &Layer, depth: Option<f64>, keep_container: bool, force_rgb: bool) -> Map {
    let mut map = Map::new();
    map.insert("uuid", Value::str(layer.id().as_str()));
    if let Some(tag) = layer.container().filter(|_| keep_container) {
        map.insert("container_uuid", Value::str(&tag.id));
        map.insert("container_name", Value::str(&tag.name));
    }
    if layer.name() != default_layer_name(layer.texture()) {
        map.insert("name", Value::str(layer.name()));
    }
    map.insert(TEXTURE_KEY, Value::str(layer.texture()));
    for ((key, colour), default) in COLOUR_KEYS
        .iter()
        .zip(layer.colours())
        .zip(DEFAULT_EMBLEM_COLOURS)
    {
        if *colour != Colour::named(default) {
            map.insert(*key, colour_value(colour, force_rgb));
        }
    }
    if let Some(mask) = layer.mask() {
        let values = mask.values().iter().map(|&v| Value::Int(v as i64)).collect();
        map.insert("mask", Value::array(values));
    }
    if !layer.visible() {
        map.insert("visible", Value::Bool(false));
    }
    let symmetry = layer.symmetry();
    if !symmetry.is_none() {
        map.insert("symmetry_type", Value::str(symmetry.kind()));
        let props = symmetry.properties().into_iter().map(Value::Float).collect();
        map.insert("symmetry_properties", Value::array(props));
    }

    for seed in layer.instances() {
        let mirrors = symmetry.mirrors(seed);
        map.push(INSTANCE_KEY, Value::map(instance_map(layer, seed, depth, false)));
        for mirror in &mirrors {
            map.push(INSTANCE_KEY, Value::map(instance_map(layer, mirror, depth, true)));
        }
    }
    map
}

fn instance_map(layer: &Layer, inst: &Instance, depth: Option<f64>, mirror: bool) -> Map {
    let sign = |flip: bool| if flip { -1.0 } else { 1.0 };
    let scale = inst.scale();
    let mut map = Map::new();
    map.insert("position", pair(inst.position()));
    map.insert(
        "scale",
        pair(Vec2::new(
            scale.x * sign(layer.flip_x()),
            scale.y * sign(layer.flip_y()),
        )),
    );
    map.insert("rotation", number(inst.rotation()));
    if let Some(depth) = depth {
        map.insert("depth", Value::Float(depth));
    }
    if mirror {
        map.insert("mirror", Value::Bool(true));
    }
    map
}
