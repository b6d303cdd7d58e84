//! Layer sequence operations.

use crate::error::{BlazonError, Result};
use crate::types::{Colour, Layer, LayerId, Mask, Symmetry, Vec2, DEFAULT_POSITION};

use super::metadata::resolve_colour_count;
use super::CoatOfArms;

impl CoatOfArms {
    /// Layers back to front.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Position of a layer in the sequence (0 is furthest back).
    pub fn index_of(&self, id: &LayerId) -> Result<usize> {
        self.layers
            .iter()
            .position(|layer| layer.id() == id)
            .ok_or_else(|| BlazonError::unknown_layer(id))
    }

    pub fn layer(&self, id: &LayerId) -> Result<&Layer> {
        let index = self.index_of(id)?;
        Ok(&self.layers[index])
    }

    /// Mutable access to one layer. Container tags and identifiers stay
    /// under the document's control.
    pub fn layer_mut(&mut self, id: &LayerId) -> Result<&mut Layer> {
        let index = self.index_of(id)?;
        Ok(&mut self.layers[index])
    }

    /// The layer drawn directly in front of `id`, if any.
    pub fn layer_above(&self, id: &LayerId) -> Result<Option<&Layer>> {
        let index = self.index_of(id)?;
        Ok(self.layers.get(index + 1))
    }

    /// The layer drawn directly behind `id`, if any.
    pub fn layer_below(&self, id: &LayerId) -> Result<Option<&Layer>> {
        let index = self.index_of(id)?;
        Ok(index.checked_sub(1).map(|i| &self.layers[i]))
    }

    /// Add a new layer for `texture`, directly above `above` or on top of
    /// everything when `above` is `None`.
    pub fn add_layer(&mut self, texture: &str, above: Option<&LayerId>) -> Result<LayerId> {
        let mut layer = Layer::new(texture);
        layer.set_colour_count(resolve_colour_count(self.metadata(), texture));
        let index = match above {
            Some(target) => self.index_of(target)? + 1,
            None => self.layers.len(),
        };
        let id = layer.id().clone();
        self.layers.insert(index, layer);
        self.validate_container_contiguity();
        tracing::debug!(layer = %id, index, texture, "added layer");
        Ok(id)
    }

    /// Insert an existing layer at `index` (clamped to the sequence
    /// length). A layer whose id is already present gets a fresh one.
    pub fn insert_layer(&mut self, index: usize, mut layer: Layer) -> LayerId {
        if self.index_of(layer.id()).is_ok() {
            layer.set_id(LayerId::generate());
        }
        let id = layer.id().clone();
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
        self.validate_container_contiguity();
        id
    }

    pub fn remove_layer(&mut self, id: &LayerId) -> Result<Layer> {
        let index = self.index_of(id)?;
        let layer = self.layers.remove(index);
        self.validate_container_contiguity();
        tracing::debug!(layer = %id, index, "removed layer");
        Ok(layer)
    }

    /// Copy a layer directly above the original.
    pub fn duplicate_layer(&mut self, id: &LayerId) -> Result<LayerId> {
        self.duplicate_at(id, 1, None)
    }

    /// Copy a layer directly below the original.
    pub fn duplicate_layer_below(&mut self, id: &LayerId) -> Result<LayerId> {
        self.duplicate_at(id, 0, None)
    }

    /// Copy a layer above the original with every instance moved by
    /// `offset`.
    pub fn duplicate_layer_with_offset(&mut self, id: &LayerId, offset: Vec2) -> Result<LayerId> {
        self.duplicate_at(id, 1, Some(offset))
    }

    fn duplicate_at(&mut self, id: &LayerId, shift: usize, offset: Option<Vec2>) -> Result<LayerId> {
        let index = self.index_of(id)?;
        let copy = self.layers[index].duplicate(offset);
        let new_id = copy.id().clone();
        self.layers.insert(index + shift, copy);
        self.validate_container_contiguity();
        tracing::debug!(source = %id, layer = %new_id, "duplicated layer");
        Ok(new_id)
    }

    /// Move a layer so it ends up at `to_index` (clamped to the top).
    pub fn move_layer(&mut self, id: &LayerId, to_index: usize) -> Result<()> {
        let from = self.index_of(id)?;
        let layer = self.layers.remove(from);
        let to = to_index.min(self.layers.len());
        self.layers.insert(to, layer);
        self.validate_container_contiguity();
        tracing::debug!(layer = %id, from, to, "moved layer");
        Ok(())
    }

    /// Move a layer directly in front of `target`.
    pub fn move_layer_above(&mut self, id: &LayerId, target: &LayerId) -> Result<()> {
        self.move_relative(id, target, 1)
    }

    /// Move a layer directly behind `target`.
    pub fn move_layer_below(&mut self, id: &LayerId, target: &LayerId) -> Result<()> {
        self.move_relative(id, target, 0)
    }

    fn move_relative(&mut self, id: &LayerId, target: &LayerId, shift: usize) -> Result<()> {
        self.index_of(target)?;
        let from = self.index_of(id)?;
        if id == target {
            return Ok(());
        }
        let layer = self.layers.remove(from);
        let to = self.index_of(target)? + shift;
        self.layers.insert(to, layer);
        self.validate_container_contiguity();
        tracing::debug!(layer = %id, target = %target, to, "moved layer");
        Ok(())
    }

    /// Move a group of layers to the front, keeping their relative order.
    pub fn move_layers_to_top(&mut self, ids: &[LayerId]) -> Result<()> {
        let group = self.take_group(ids)?;
        self.layers.extend(group);
        self.validate_container_contiguity();
        Ok(())
    }

    /// Move a group of layers to the back, keeping their relative order.
    pub fn move_layers_to_bottom(&mut self, ids: &[LayerId]) -> Result<()> {
        let mut group = self.take_group(ids)?;
        group.append(&mut self.layers);
        self.layers = group;
        self.validate_container_contiguity();
        Ok(())
    }

    /// Swap a layer with the one in front of it. Returns `false` when it is
    /// already on top.
    pub fn shift_layer_up(&mut self, id: &LayerId) -> Result<bool> {
        let index = self.index_of(id)?;
        if index + 1 >= self.layers.len() {
            return Ok(false);
        }
        self.layers.swap(index, index + 1);
        self.validate_container_contiguity();
        Ok(true)
    }

    /// Swap a layer with the one behind it. Returns `false` when it is
    /// already at the back.
    pub fn shift_layer_down(&mut self, id: &LayerId) -> Result<bool> {
        let index = self.index_of(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.layers.swap(index, index - 1);
        self.validate_container_contiguity();
        Ok(true)
    }

    /// Remove the given layers from the sequence and return them in
    /// sequence order, together with the lowest index they occupied.
    pub(super) fn take_group_at(&mut self, ids: &[LayerId]) -> Result<(usize, Vec<Layer>)> {
        if ids.is_empty() {
            return Err(BlazonError::InvariantViolation {
                message: "no layers selected".to_string(),
                help: Some("Select at least one layer".to_string()),
            });
        }
        let mut indices = ids
            .iter()
            .map(|id| self.index_of(id))
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();

        let first = indices[0];
        let mut group: Vec<Layer> = indices
            .iter()
            .rev()
            .map(|&i| self.layers.remove(i))
            .collect();
        group.reverse();
        Ok((first, group))
    }

    fn take_group(&mut self, ids: &[LayerId]) -> Result<Vec<Layer>> {
        self.take_group_at(ids).map(|(_, group)| group)
    }

    /// Fold several layers with the same texture into the first one.
    ///
    /// The first id keeps its place and gains the other layers' instances
    /// in the given order; the other layers are removed.
    pub fn merge_layers(&mut self, ids: &[LayerId]) -> Result<LayerId> {
        let Some((keep, rest)) = ids.split_first() else {
            return Err(BlazonError::invariant("no layers to merge"));
        };
        let texture = self.layer(keep)?.texture().to_string();
        for id in rest {
            let other = self.layer(id)?;
            if other.texture() != texture {
                return Err(BlazonError::InvariantViolation {
                    message: format!(
                        "cannot merge {} ({}) into {} ({})",
                        id,
                        other.texture(),
                        keep,
                        texture
                    ),
                    help: Some("Only layers with the same texture can be merged".to_string()),
                });
            }
        }

        let mut gathered = Vec::new();
        for id in rest {
            if id == keep {
                continue;
            }
            if let Ok(index) = self.index_of(id) {
                let mut layer = self.layers.remove(index);
                gathered.extend(layer.take_instances());
            }
        }
        self.layer_mut(keep)?.extend_instances(gathered);
        self.validate_container_contiguity();
        tracing::debug!(layer = %keep, merged = rest.len(), "merged layers");
        Ok(keep.clone())
    }

    /// Break a layer into one layer per instance, in place. The first
    /// keeps the original id. Returns every resulting id back to front.
    pub fn split_layer(&mut self, id: &LayerId) -> Result<Vec<LayerId>> {
        let index = self.index_of(id)?;
        if self.layers[index].instance_count() < 2 {
            return Ok(vec![id.clone()]);
        }
        let mut instances = self.layers[index].take_instances();
        let tail = instances.split_off(1);
        self.layers[index].extend_instances(instances);

        let mut ids = vec![id.clone()];
        for (offset, instance) in tail.into_iter().enumerate() {
            let mut part = self.layers[index].duplicate(None);
            part.take_instances();
            part.extend_instances([instance]);
            ids.push(part.id().clone());
            self.layers.insert(index + 1 + offset, part);
        }
        self.validate_container_contiguity();
        tracing::debug!(layer = %id, parts = ids.len(), "split layer");
        Ok(ids)
    }

    /// Add an instance to a layer at `position` (centre when `None`).
    /// Returns the new instance's index.
    pub fn add_instance(&mut self, id: &LayerId, position: Option<Vec2>) -> Result<usize> {
        let layer = self.layer_mut(id)?;
        Ok(layer.add_instance(position.unwrap_or(DEFAULT_POSITION)))
    }

    /// Remove one instance. A layer's last instance cannot be removed.
    pub fn remove_instance(&mut self, id: &LayerId, index: usize) -> Result<()> {
        self.layer_mut(id)?.remove_instance(index)?;
        Ok(())
    }

    pub fn layer_colour(&self, id: &LayerId, channel: usize) -> Result<Colour> {
        self.layer(id)?.colour(channel)
    }

    pub fn set_layer_colour(&mut self, id: &LayerId, channel: usize, colour: Colour) -> Result<()> {
        self.layer_mut(id)?.set_colour(channel, colour)
    }

    /// Change a layer's texture and refresh its colour count.
    pub fn set_layer_texture(&mut self, id: &LayerId, texture: &str) -> Result<()> {
        let count = resolve_colour_count(self.metadata(), texture);
        let layer = self.layer_mut(id)?;
        layer.set_texture(texture);
        layer.set_colour_count(count);
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: &LayerId, visible: bool) -> Result<()> {
        self.layer_mut(id)?.set_visible(visible);
        Ok(())
    }

    pub fn set_layer_mask(&mut self, id: &LayerId, mask: Option<Mask>) -> Result<()> {
        self.layer_mut(id)?.set_mask(mask);
        Ok(())
    }

    pub fn set_layer_name(&mut self, id: &LayerId, name: &str) -> Result<()> {
        self.layer_mut(id)?.set_name(name);
        Ok(())
    }

    pub fn set_layer_flip(&mut self, id: &LayerId, flip_x: bool, flip_y: bool) -> Result<()> {
        self.layer_mut(id)?.set_flip(flip_x, flip_y);
        Ok(())
    }

    pub fn set_layer_symmetry(&mut self, id: &LayerId, symmetry: Symmetry) -> Result<()> {
        self.layer_mut(id)?.set_symmetry(symmetry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NamedColour;
    use pretty_assertions::assert_eq;

    fn doc_with(textures: &[&str]) -> (CoatOfArms, Vec<LayerId>) {
        let mut coa = CoatOfArms::new();
        let ids = textures
            .iter()
            .map(|t| coa.add_layer(t, None).unwrap())
            .collect();
        (coa, ids)
    }

    fn textures(coa: &CoatOfArms) -> Vec<&str> {
        coa.layers().iter().map(Layer::texture).collect()
    }

    #[test]
    fn test_add_layer_appends_or_inserts_above() {
        let (mut coa, ids) = doc_with(&["a.dds", "b.dds"]);
        coa.add_layer("c.dds", Some(&ids[0])).unwrap();
        assert_eq!(textures(&coa), vec!["a.dds", "c.dds", "b.dds"]);
    }

    #[test]
    fn test_add_layer_unknown_target() {
        let (mut coa, _) = doc_with(&["a.dds"]);
        let err = coa.add_layer("b.dds", Some(&LayerId::from("nope"))).unwrap_err();
        assert!(matches!(err, BlazonError::Reference { kind: "layer", .. }));
        assert_eq!(coa.layer_count(), 1);
    }

    #[test]
    fn test_add_layer_uses_metadata_colour_count() {
        use std::collections::HashMap;
        use std::sync::Arc;

        let mut table = HashMap::new();
        table.insert("ce_lion.dds".to_string(), 2u8);
        let mut coa = CoatOfArms::with_metadata(Arc::new(table));
        let lion = coa.add_layer("ce_lion.dds", None).unwrap();
        let other = coa.add_layer("ce_other.dds", None).unwrap();
        assert_eq!(coa.layer(&lion).unwrap().colour_count(), 2);
        assert_eq!(coa.layer(&other).unwrap().colour_count(), 3);
    }

    #[test]
    fn test_duplicate_above_and_below() {
        let (mut coa, ids) = doc_with(&["a.dds", "b.dds"]);
        let above = coa.duplicate_layer(&ids[0]).unwrap();
        assert_eq!(coa.index_of(&above).unwrap(), 1);
        let below = coa.duplicate_layer_below(&ids[1]).unwrap();
        assert_eq!(coa.index_of(&below).unwrap(), 2);
        assert_eq!(textures(&coa), vec!["a.dds", "a.dds", "b.dds", "b.dds"]);
    }

    #[test]
    fn test_duplicate_with_offset() {
        let (mut coa, ids) = doc_with(&["a.dds"]);
        let copy = coa
            .duplicate_layer_with_offset(&ids[0], Vec2::new(0.25, 0.0))
            .unwrap();
        let pos = coa.layer(&copy).unwrap().instance(0).unwrap().position();
        assert_eq!(pos, Vec2::new(0.75, 0.5));
    }

    #[test]
    fn test_move_layer_and_relative_moves() {
        let (mut coa, ids) = doc_with(&["a.dds", "b.dds", "c.dds"]);
        coa.move_layer(&ids[0], 2).unwrap();
        assert_eq!(textures(&coa), vec!["b.dds", "c.dds", "a.dds"]);

        coa.move_layer(&ids[0], 99).unwrap();
        assert_eq!(textures(&coa), vec!["b.dds", "c.dds", "a.dds"]);

        coa.move_layer_below(&ids[0], &ids[1]).unwrap();
        assert_eq!(textures(&coa), vec!["a.dds", "b.dds", "c.dds"]);

        coa.move_layer_above(&ids[0], &ids[2]).unwrap();
        assert_eq!(textures(&coa), vec!["b.dds", "c.dds", "a.dds"]);

        coa.move_layer_above(&ids[2], &ids[2]).unwrap();
        assert_eq!(textures(&coa), vec!["b.dds", "c.dds", "a.dds"]);
    }

    #[test]
    fn test_move_group_to_top_and_bottom() {
        let (mut coa, ids) = doc_with(&["a.dds", "b.dds", "c.dds", "d.dds"]);
        coa.move_layers_to_top(&[ids[2].clone(), ids[0].clone()]).unwrap();
        assert_eq!(textures(&coa), vec!["b.dds", "d.dds", "a.dds", "c.dds"]);

        coa.move_layers_to_bottom(&[ids[3].clone(), ids[2].clone()]).unwrap();
        assert_eq!(textures(&coa), vec!["d.dds", "c.dds", "b.dds", "a.dds"]);

        assert!(coa.move_layers_to_top(&[]).is_err());
    }

    #[test]
    fn test_shift_up_and_down() {
        let (mut coa, ids) = doc_with(&["a.dds", "b.dds"]);
        assert!(coa.shift_layer_up(&ids[0]).unwrap());
        assert_eq!(textures(&coa), vec!["b.dds", "a.dds"]);
        assert!(!coa.shift_layer_up(&ids[0]).unwrap());
        assert!(coa.shift_layer_down(&ids[0]).unwrap());
        assert!(!coa.shift_layer_down(&ids[0]).unwrap());
    }

    #[test]
    fn test_above_and_below_queries() {
        let (coa, ids) = doc_with(&["a.dds", "b.dds"]);
        assert_eq!(coa.layer_above(&ids[0]).unwrap().map(Layer::id), Some(&ids[1]));
        assert!(coa.layer_above(&ids[1]).unwrap().is_none());
        assert_eq!(coa.layer_below(&ids[1]).unwrap().map(Layer::id), Some(&ids[0]));
        assert!(coa.layer_below(&ids[0]).unwrap().is_none());
    }

    #[test]
    fn test_merge_layers() {
        let (mut coa, ids) = doc_with(&["star.dds", "moon.dds", "star.dds"]);
        coa.add_instance(&ids[2], Some(Vec2::new(0.1, 0.1))).unwrap();

        let err = coa.merge_layers(&[ids[0].clone(), ids[1].clone()]).unwrap_err();
        assert!(matches!(err, BlazonError::InvariantViolation { .. }));
        assert_eq!(coa.layer_count(), 3);

        let kept = coa.merge_layers(&[ids[0].clone(), ids[2].clone()]).unwrap();
        assert_eq!(kept, ids[0]);
        assert_eq!(coa.layer_count(), 2);
        assert_eq!(coa.layer(&ids[0]).unwrap().instance_count(), 3);
        assert!(coa.layer(&ids[2]).is_err());
    }

    #[test]
    fn test_split_layer() {
        let (mut coa, ids) = doc_with(&["a.dds", "star.dds", "b.dds"]);
        coa.add_instance(&ids[1], Some(Vec2::new(0.2, 0.2))).unwrap();
        coa.add_instance(&ids[1], Some(Vec2::new(0.8, 0.8))).unwrap();

        let parts = coa.split_layer(&ids[1]).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ids[1]);
        assert_eq!(
            textures(&coa),
            vec!["a.dds", "star.dds", "star.dds", "star.dds", "b.dds"]
        );
        for id in &parts {
            assert_eq!(coa.layer(id).unwrap().instance_count(), 1);
        }
        let last = coa.layer(&parts[2]).unwrap().instance(0).unwrap().position();
        assert_eq!(last, Vec2::new(0.8, 0.8));

        assert_eq!(coa.split_layer(&ids[0]).unwrap(), vec![ids[0].clone()]);
    }

    #[test]
    fn test_instance_floor() {
        let (mut coa, ids) = doc_with(&["a.dds"]);
        let err = coa.remove_instance(&ids[0], 0).unwrap_err();
        assert!(matches!(err, BlazonError::InvariantViolation { .. }));

        let idx = coa.add_instance(&ids[0], None).unwrap();
        assert_eq!(idx, 1);
        coa.remove_instance(&ids[0], 0).unwrap();
        assert_eq!(coa.layer(&ids[0]).unwrap().instance_count(), 1);
    }

    #[test]
    fn test_layer_colour_symmetry() {
        let (mut coa, ids) = doc_with(&["a.dds"]);
        for channel in 1..=3 {
            let colour = Colour::rgb(10 * channel as u8, 100, 200);
            coa.set_layer_colour(&ids[0], channel, colour).unwrap();
            assert_eq!(coa.layer_colour(&ids[0], channel).unwrap().channels(), colour.channels());
        }
        coa.set_layer_colour(&ids[0], 2, NamedColour::Blue.into()).unwrap();
        assert_eq!(
            coa.layer_colour(&ids[0], 2).unwrap().name(),
            Some(NamedColour::Blue)
        );
    }

    #[test]
    fn test_layer_setters() {
        let (mut coa, ids) = doc_with(&["ce_star.dds"]);
        let id = &ids[0];
        coa.set_layer_visible(id, false).unwrap();
        coa.set_layer_mask(id, Some(Mask([1, 0, 0]))).unwrap();
        coa.set_layer_name(id, "Star").unwrap();
        coa.set_layer_flip(id, true, false).unwrap();
        coa.set_layer_symmetry(id, Symmetry::rotational(4)).unwrap();
        coa.set_layer_texture(id, "ce_moon.dds").unwrap();

        let layer = coa.layer(id).unwrap();
        assert!(!layer.visible());
        assert_eq!(layer.mask(), Some(Mask([1, 0, 0])));
        assert_eq!(layer.name(), "Star");
        assert!(layer.flip_x());
        assert!(!layer.flip_y());
        assert_eq!(layer.symmetry().kind(), "rotational");
        assert_eq!(layer.texture(), "ce_moon.dds");
    }

    #[test]
    fn test_insert_layer_regenerates_duplicate_id() {
        let (mut coa, ids) = doc_with(&["a.dds"]);
        let clone = coa.layer(&ids[0]).unwrap().clone();
        let new_id = coa.insert_layer(0, clone);
        assert_ne!(new_id, ids[0]);
        assert_eq!(coa.index_of(&new_id).unwrap(), 0);
    }
}
