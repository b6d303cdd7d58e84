//! Container grouping and the contiguity pass.
//!
//! A container is a tag shared by neighbouring layers. Whenever the layer
//! order or tags change, [`CoatOfArms::validate_container_contiguity`]
//! walks the sequence: the first run of a tag keeps it, and every later
//! run of the same tag is given a new tag with the same display name.

use std::collections::HashSet;

use crate::error::{BlazonError, Result};
use crate::types::{ContainerTag, LayerId};

use super::CoatOfArms;

/// One repair made by the contiguity pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSplit {
    /// Tag the run carried before the repair.
    pub original: ContainerTag,
    /// Tag the run carries now.
    pub replacement: ContainerTag,
    /// Layers of the run, back to front.
    pub layers: Vec<LayerId>,
}

impl CoatOfArms {
    /// Make every container occupy one contiguous run, splitting off later
    /// runs under fresh tags. Returns the splits performed.
    pub fn validate_container_contiguity(&mut self) -> Vec<ContainerSplit> {
        let mut splits: Vec<ContainerSplit> = Vec::new();
        let mut closed: HashSet<String> = HashSet::new();
        // Original id of the run being walked, and whether it is being retagged.
        let mut current: Option<String> = None;
        let mut retagging = false;

        for layer in self.layers.iter_mut() {
            let Some(tag) = layer.container().cloned() else {
                if let Some(id) = current.take() {
                    closed.insert(id);
                }
                retagging = false;
                continue;
            };

            if current.as_deref() != Some(tag.id.as_str()) {
                if let Some(id) = current.take() {
                    closed.insert(id);
                }
                retagging = closed.contains(&tag.id);
                if retagging {
                    splits.push(ContainerSplit {
                        replacement: tag.split(),
                        original: tag.clone(),
                        layers: Vec::new(),
                    });
                }
                current = Some(tag.id.clone());
            }

            if retagging {
                if let Some(split) = splits.last_mut() {
                    layer.set_container(Some(split.replacement.clone()));
                    split.layers.push(layer.id().clone());
                }
            }
        }

        for split in &splits {
            tracing::debug!(
                container = %split.original.id,
                replacement = %split.replacement.id,
                name = %split.original.name,
                layers = split.layers.len(),
                "split non-contiguous container"
            );
        }
        splits
    }

    /// Distinct containers in order of first appearance, back to front.
    pub fn containers(&self) -> Vec<ContainerTag> {
        let mut seen = HashSet::new();
        self.layers
            .iter()
            .filter_map(|layer| layer.container())
            .filter(|tag| seen.insert(tag.id.clone()))
            .cloned()
            .collect()
    }

    /// Layers tagged with container `id`, back to front.
    pub fn container_layers(&self, id: &str) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|layer| layer.container().is_some_and(|tag| tag.id == id))
            .map(|layer| layer.id().clone())
            .collect()
    }

    fn container_range(&self, id: &str) -> Result<(usize, usize)> {
        let mut indices = self
            .layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.container().is_some_and(|tag| tag.id == id))
            .map(|(i, _)| i);
        let first = indices
            .next()
            .ok_or_else(|| BlazonError::unknown_container(id))?;
        let last = indices.last().unwrap_or(first);
        Ok((first, last))
    }

    /// Tag layers with `tag` (or clear their tag), then repair contiguity.
    pub fn set_container(
        &mut self,
        ids: &[LayerId],
        tag: Option<ContainerTag>,
    ) -> Result<Vec<ContainerSplit>> {
        let indices = ids
            .iter()
            .map(|id| self.index_of(id))
            .collect::<Result<Vec<_>>>()?;
        for index in indices {
            self.layers[index].set_container(tag.clone());
        }
        Ok(self.validate_container_contiguity())
    }

    /// Gather layers into a new container named `name`.
    ///
    /// The selection may be scattered; it is moved into one run at the
    /// position of its backmost layer, keeping relative order.
    pub fn create_container(&mut self, ids: &[LayerId], name: &str) -> Result<ContainerTag> {
        let (at, mut group) = self.take_group_at(ids)?;
        let tag = ContainerTag::new(name);
        for layer in group.iter_mut() {
            layer.set_container(Some(tag.clone()));
        }
        let count = group.len();
        let tail = self.layers.split_off(at);
        self.layers.extend(group);
        self.layers.extend(tail);
        self.validate_container_contiguity();
        tracing::debug!(container = %tag.id, name, layers = count, "created container");
        Ok(tag)
    }

    /// Copy a whole container directly above itself under a new tag with
    /// the same name. Returns the new tag.
    pub fn duplicate_container(&mut self, id: &str) -> Result<ContainerTag> {
        let (first, last) = self.container_range(id)?;
        let source = self.layers[first]
            .container()
            .cloned()
            .ok_or_else(|| BlazonError::unknown_container(id))?;
        let tag = ContainerTag::new(source.name);

        let copies: Vec<_> = self.layers[first..=last]
            .iter()
            .filter(|layer| layer.container().is_some_and(|t| t.id == id))
            .map(|layer| {
                let mut copy = layer.duplicate(None);
                copy.set_container(Some(tag.clone()));
                copy
            })
            .collect();
        let tail = self.layers.split_off(last + 1);
        self.layers.extend(copies);
        self.layers.extend(tail);
        self.validate_container_contiguity();
        Ok(tag)
    }

    pub fn rename_container(&mut self, id: &str, name: &str) -> Result<()> {
        self.container_range(id)?;
        for layer in self.layers.iter_mut() {
            let renamed = layer
                .container()
                .filter(|tag| tag.id == id)
                .map(|tag| ContainerTag {
                    id: tag.id.clone(),
                    name: name.to_string(),
                });
            if renamed.is_some() {
                layer.set_container(renamed);
            }
        }
        Ok(())
    }

    /// Remove a container, leaving its layers in place untagged. Returns
    /// the freed layers.
    pub fn dissolve_container(&mut self, id: &str) -> Result<Vec<LayerId>> {
        let members = self.container_layers(id);
        if members.is_empty() {
            return Err(BlazonError::unknown_container(id));
        }
        for layer in self.layers.iter_mut() {
            if layer.container().is_some_and(|tag| tag.id == id) {
                layer.set_container(None);
            }
        }
        Ok(members)
    }
}
