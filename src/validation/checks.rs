//! Lint checks over a document.
//!
//! Each check takes a `&CoatOfArms` and returns a `ValidationResult`.

use crate::model::{CoatOfArms, TextureMetadata};
use crate::types::{SCALE_MAX, SCALE_MIN};

use super::warning::{Diagnostic, ValidationResult};

/// Layers with no texture, or a texture the metadata does not know.
///
/// Unknown textures are only reported when the metadata knows at least one
/// texture.
pub fn check_textures(coa: &CoatOfArms, metadata: &dyn TextureMetadata) -> ValidationResult {
    let mut result = ValidationResult::new();

    for layer in coa.layers() {
        if layer.texture().is_empty() {
            result.push(
                Diagnostic::warning(
                    "blazon::lint::empty-texture",
                    format!("Layer '{}' has no texture", layer.name()),
                )
                .with_layer(layer.id())
                .with_help("Set a texture or remove the layer"),
            );
        } else if !metadata.is_empty() && !metadata.contains(layer.texture()) {
            result.push(
                Diagnostic::warning(
                    "blazon::lint::unknown-texture",
                    format!("Layer '{}' uses unknown texture '{}'", layer.name(), layer.texture()),
                )
                .with_layer(layer.id())
                .with_help("Add the texture under `textures` in blazon.yaml"),
            );
        }
    }

    result
}

/// Hidden layers, which the game still draws.
pub fn check_visibility(coa: &CoatOfArms) -> ValidationResult {
    let mut result = ValidationResult::new();

    for layer in coa.layers().iter().filter(|l| !l.visible()) {
        result.push(
            Diagnostic::warning(
                "blazon::lint::hidden-layer",
                format!("Layer '{}' is hidden", layer.name()),
            )
            .with_layer(layer.id())
            .with_help("Visibility is an editor setting; the game ignores it"),
        );
    }

    result
}

/// Containers holding a single layer.
///
/// Contiguity is not checked here: every parse and edit repairs it before a
/// document can be linted.
pub fn check_containers(coa: &CoatOfArms) -> ValidationResult {
    let mut result = ValidationResult::new();

    for tag in coa.containers() {
        let members = coa.container_layers(&tag.id);
        if let [only] = members.as_slice() {
            result.push(
                Diagnostic::warning(
                    "blazon::lint::single-layer-container",
                    format!("Container '{}' holds a single layer", tag),
                )
                .with_layer(only)
                .with_help("Dissolve the container or add layers to it"),
            );
        }
    }

    result
}

/// Instances placed off the shield or scaled outside the editor's range.
pub fn check_instances(coa: &CoatOfArms) -> ValidationResult {
    let mut result = ValidationResult::new();
    let in_unit = |v: f64| (0.0..=1.0).contains(&v);
    let in_scale = |v: f64| (SCALE_MIN..=SCALE_MAX).contains(&v);

    for layer in coa.layers() {
        for (index, inst) in layer.instances().iter().enumerate() {
            let pos = inst.position();
            if !in_unit(pos.x) || !in_unit(pos.y) {
                result.push(
                    Diagnostic::warning(
                        "blazon::lint::position-out-of-range",
                        format!(
                            "Layer '{}' instance {} is at ({}, {}), outside the shield",
                            layer.name(),
                            index,
                            pos.x,
                            pos.y
                        ),
                    )
                    .with_layer(layer.id()),
                );
            }
            let scale = inst.scale();
            if !in_scale(scale.x) || !in_scale(scale.y) {
                result.push(
                    Diagnostic::warning(
                        "blazon::lint::scale-out-of-range",
                        format!(
                            "Layer '{}' instance {} has scale ({}, {})",
                            layer.name(),
                            index,
                            scale.x,
                            scale.y
                        ),
                    )
                    .with_layer(layer.id())
                    .with_help(format!("Scale is expected between {} and {}", SCALE_MIN, SCALE_MAX)),
                );
            }
        }
    }

    result
}
