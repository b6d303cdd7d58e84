//! Snapshots and undo history.
//!
//! A [`Snapshot`] is an owned copy of everything a document holds, so
//! restoring one replaces the live state wholesale. [`History`] keeps a
//! linear stack of them. When to save (and how to serialize rapid edits
//! against saving) is decided by the caller.

use serde::{Deserialize, Serialize};

use crate::error::{BlazonError, Result};
use crate::types::{Colour, Layer};

use super::CoatOfArms;

/// Undo depth used when none is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Full copy of a document's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pattern: String,
    base_colours: [Colour; 3],
    layers: Vec<Layer>,
}

impl Snapshot {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| BlazonError::Snapshot {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BlazonError::Snapshot {
            message: e.to_string(),
        })
    }
}

impl CoatOfArms {
    /// Capture the current content.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pattern: self.pattern.clone(),
            base_colours: self.base_colours,
            layers: self.layers.clone(),
        }
    }

    /// Replace the current content with `snapshot`. Layer references held
    /// by the caller must be looked up again afterwards.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.pattern = snapshot.pattern.clone();
        self.base_colours = snapshot.base_colours;
        self.layers = snapshot.layers.clone();
        self.validate_container_contiguity();
        tracing::debug!(layers = self.layers.len(), "restored snapshot");
    }
}

/// Linear undo/redo stack.
#[derive(Debug, Clone)]
pub struct History {
    states: Vec<Snapshot>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A history keeping at most `limit` states (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            states: Vec::new(),
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Record a state after an edit. Redo states are dropped and the
    /// oldest states beyond the limit are discarded.
    pub fn save(&mut self, snapshot: Snapshot) {
        if !self.states.is_empty() {
            self.states.truncate(self.index + 1);
        }
        if self.states.last() == Some(&snapshot) {
            return;
        }
        self.states.push(snapshot);
        if self.states.len() > self.limit {
            let excess = self.states.len() - self.limit;
            self.states.drain(..excess);
        }
        self.index = self.states.len() - 1;
    }

    /// Step back, returning the state to restore.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.states.get(self.index)
    }

    /// Step forward, returning the state to restore.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.states.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.states.len()
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedColour, Vec2};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_is_independent() {
        let mut coa = CoatOfArms::new();
        let id = coa.add_layer("a.dds", None).unwrap();
        let snap = coa.snapshot();

        coa.set_layer_colour(&id, 1, NamedColour::Blue.into()).unwrap();
        coa.add_instance(&id, Some(Vec2::new(0.1, 0.1))).unwrap();
        coa.set_pattern("other.dds");
        assert_eq!(snap.layers()[0].instance_count(), 1);
        assert_eq!(snap.pattern(), "pattern_solid.dds");

        coa.restore(&snap);
        assert_eq!(coa.layer(&id).unwrap().instance_count(), 1);
        assert_eq!(coa.layer_colour(&id, 1).unwrap().name(), Some(NamedColour::Yellow));
        assert_eq!(coa.pattern(), "pattern_solid.dds");
    }

    #[test]
    fn test_snapshot_json() {
        let mut coa = CoatOfArms::new();
        let id = coa.add_layer("a.dds", None).unwrap();
        coa.set_layer_colour(&id, 2, Colour::rgb(1, 2, 3)).unwrap();
        let snap = coa.snapshot();
        let json = snap.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&json).unwrap(), snap);
        assert!(matches!(
            Snapshot::from_json("{"),
            Err(BlazonError::Snapshot { .. })
        ));
    }

    #[test]
    fn test_snapshot_json_rejects_broken_layers() {
        let mut coa = CoatOfArms::new();
        coa.add_layer("a.dds", None).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&coa.snapshot().to_json().unwrap()).unwrap();

        let mut no_instances = json.clone();
        no_instances["layers"][0]["instances"] = serde_json::json!([]);
        assert!(matches!(
            Snapshot::from_json(&no_instances.to_string()),
            Err(BlazonError::Snapshot { .. })
        ));

        let mut bad_mask = json;
        bad_mask["layers"][0]["mask"] = serde_json::json!([9, 9, 9]);
        assert!(matches!(
            Snapshot::from_json(&bad_mask.to_string()),
            Err(BlazonError::Snapshot { .. })
        ));
    }

    #[test]
    fn test_undo_redo() {
        let mut coa = CoatOfArms::new();
        let mut history = History::default();
        history.save(coa.snapshot());
        coa.add_layer("a.dds", None).unwrap();
        history.save(coa.snapshot());
        coa.add_layer("b.dds", None).unwrap();
        history.save(coa.snapshot());

        assert!(history.can_undo());
        coa.restore(history.undo().unwrap());
        assert_eq!(coa.layer_count(), 1);
        coa.restore(history.undo().unwrap());
        assert_eq!(coa.layer_count(), 0);
        assert!(history.undo().is_none());

        coa.restore(history.redo().unwrap());
        assert_eq!(coa.layer_count(), 1);
        assert!(history.can_redo());

        coa.add_layer("c.dds", None).unwrap();
        history.save(coa.snapshot());
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_history_limit() {
        let mut coa = CoatOfArms::new();
        let mut history = History::new(2);
        for texture in ["a.dds", "b.dds", "c.dds"] {
            coa.add_layer(texture, None).unwrap();
            history.save(coa.snapshot());
        }
        assert_eq!(history.len(), 2);
        coa.restore(history.undo().unwrap());
        assert_eq!(coa.layer_count(), 2);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_identical_state_not_saved_twice() {
        let coa = CoatOfArms::new();
        let mut history = History::default();
        history.save(coa.snapshot());
        history.save(coa.snapshot());
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
    }
}
