//! Emblem placements.

use serde::{Deserialize, Serialize};

/// Position assigned when none is given.
pub const DEFAULT_POSITION: Vec2 = Vec2::new(0.5, 0.5);

/// Scale of an instance read from a block that omits `scale`.
pub const DEFAULT_SCALE: Vec2 = Vec2::new(1.0, 1.0);

/// Scale of an instance created in the editor.
pub const NEW_INSTANCE_SCALE: Vec2 = Vec2::new(0.7, 0.7);

/// Smallest scale magnitude a setter accepts.
pub const SCALE_MIN: f64 = 0.01;

/// Largest scale magnitude a setter accepts.
pub const SCALE_MAX: f64 = 1.0;

/// A 2D vector in coat-of-arms space (0..1 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn clamped(self, min: f64, max: f64) -> Self {
        Self::new(self.x.clamp(min, max), self.y.clamp(min, max))
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One placement of a layer's emblem.
///
/// Scale is a magnitude; mirroring is a layer-level flag. `depth` only
/// matters while ordering freshly parsed layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    position: Vec2,
    scale: Vec2,
    rotation: f64,
    depth: f64,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION)
    }
}

impl Instance {
    /// A new editor instance at `position` with the editor's default scale.
    pub fn new(position: Vec2) -> Self {
        Self {
            position: position.clamped(0.0, 1.0),
            scale: NEW_INSTANCE_SCALE,
            rotation: 0.0,
            depth: 0.0,
        }
    }

    /// Build an instance from values read from a file. Scale signs are
    /// dropped and nothing is clamped.
    pub fn from_parts(position: Vec2, scale: Vec2, rotation: f64, depth: f64) -> Self {
        Self {
            position,
            scale: Vec2::new(scale.x.abs(), scale.y.abs()),
            rotation,
            depth,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the instance, clamping to 0..1.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position.clamped(0.0, 1.0);
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Resize the instance. Signs are dropped and the magnitude is clamped
    /// to [`SCALE_MIN`]..[`SCALE_MAX`].
    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = Vec2::new(scale.x.abs(), scale.y.abs()).clamped(SCALE_MIN, SCALE_MAX);
    }

    /// Rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: f64) {
        self.depth = depth;
    }

    /// Copy shifted by `(dx, dy)`, clamped to 0..1.
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        let mut moved = self.clone();
        moved.set_position(self.position.offset(dx, dy));
        moved
    }
}
