//! Document model: light shapes and the registry that owns them.
//!
//! `ShapeRegistry` is the single owner of every live `Shape`. It keeps them in
//! creation order (which is also paint order), enforces the capacity limit and
//! the minimum size floor, and carries the canvas-wide lock flag that makes
//! every shape non-interactive. Overlays and the gesture engine refer to shapes
//! only by `ShapeId`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Rgb;
use crate::config::EngineConfig;
use crate::error::CanvasError;
use crate::geom::{Point, Rect, Size};

/// Unique identifier for a shape.
pub type ShapeId = Uuid;

/// The kind of a shape. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Circle inscribed in the bounding box. Resizes with a locked aspect ratio.
    Circle,
    /// Axis-aligned rectangle. Width and height resize independently.
    Square,
}

impl ShapeKind {
    /// Whether the shape (and its overlay) is drawn with a 50% border radius.
    #[must_use]
    pub fn is_round(self) -> bool {
        matches!(self, Self::Circle)
    }

    /// Geometry after dragging the resize handle by `(dx, dy)` from `start`.
    ///
    /// The top-left corner stays put. Neither side goes below `min_size`, no
    /// matter how far the pointer travels past the shrinking boundary.
    #[must_use]
    pub fn resize(self, start: Rect, dx: f64, dy: f64, min_size: f64) -> Rect {
        match self {
            Self::Square => Rect {
                width: (start.width + dx).max(min_size),
                height: (start.height + dy).max(min_size),
                ..start
            },
            Self::Circle => {
                let size = (start.width + dx.max(dy)).max(min_size);
                Rect { width: size, height: size, ..start }
            }
        }
    }
}

/// A light source placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub rect: Rect,
    /// Fill color last applied by the color pipeline.
    pub color: Rgb,
}

impl Shape {
    /// Whether `pt` lies on the visible body of the shape.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        match self.kind {
            ShapeKind::Circle => self.rect.ellipse_contains(pt),
            ShapeKind::Square => self.rect.contains(pt),
        }
    }
}

/// Owner of all live shapes, in creation order.
pub struct ShapeRegistry {
    shapes: Vec<Shape>,
    locked: bool,
    next_offset: f64,
    config: EngineConfig,
}

impl ShapeRegistry {
    /// Create an empty, unlocked registry.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { shapes: Vec::new(), locked: false, next_offset: 0.0, config }
    }

    /// Create a shape of `kind` centered in `viewport`.
    ///
    /// Each call shifts the placement by one offset step (0, 20, 40, 60, 80 px
    /// with the default config, then back to 0) so consecutive shapes don't
    /// cover each other exactly. Fails with `CapacityExceeded` when full and
    /// `InvalidGeometry` when the placement is not finite, leaving the
    /// registry untouched either way.
    pub fn create(&mut self, kind: ShapeKind, viewport: Size, color: Rgb) -> Result<ShapeId, CanvasError> {
        self.ensure_capacity()?;

        let size = self.config.default_size;
        let offset = self.next_offset;
        let rect = Rect::new(
            (viewport.width - size) / 2.0 + offset,
            (viewport.height - size) / 2.0 + offset,
            size,
            size,
        );
        if !rect.is_finite() {
            return Err(CanvasError::InvalidGeometry(format!("{rect:?}")));
        }
        self.next_offset = advance_offset(offset, self.config.offset_step, self.config.offset_cycle);

        Ok(self.push(kind, rect, color))
    }

    /// Insert a shape with explicit geometry, as when restoring a snapshot.
    ///
    /// Sizes below the floor are raised to it.
    pub fn insert_restored(&mut self, kind: ShapeKind, rect: Rect, color: Rgb) -> Result<ShapeId, CanvasError> {
        self.ensure_capacity()?;
        if !rect.is_finite() {
            return Err(CanvasError::InvalidGeometry(format!("{rect:?}")));
        }
        let rect = self.floored(rect);
        Ok(self.push(kind, rect, color))
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        let idx = self.shapes.iter().position(|s| &s.id == id)?;
        Some(self.shapes.remove(idx))
    }

    /// Remove every shape, returning their ids in creation order.
    pub fn clear(&mut self) -> Vec<ShapeId> {
        self.shapes.drain(..).map(|s| s.id).collect()
    }

    /// Replace a shape's geometry and return the rect actually applied.
    ///
    /// Non-finite values are rejected. Width and height below the floor are
    /// raised to it; there is no upper bound.
    pub fn set_geometry(&mut self, id: &ShapeId, rect: Rect) -> Result<Rect, CanvasError> {
        if self.locked {
            return Err(CanvasError::Locked);
        }
        if !rect.is_finite() {
            return Err(CanvasError::InvalidGeometry(format!("{rect:?}")));
        }
        let rect = self.floored(rect);
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or(CanvasError::UnknownShape(*id))?;
        shape.rect = rect;
        Ok(rect)
    }

    /// Apply one fill color to every shape.
    pub fn recolor_all(&mut self, color: Rgb) {
        for shape in &mut self.shapes {
            shape.color = color;
        }
    }

    /// Return a reference to a shape by id.
    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    /// All shapes in creation order.
    #[must_use]
    pub fn all(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.iter()
    }

    /// Number of live shapes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Whether shapes are currently non-interactive.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    #[must_use]
    pub fn min_size(&self) -> f64 {
        self.config.min_size
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.config.max_shapes
    }

    fn ensure_capacity(&self) -> Result<(), CanvasError> {
        if self.shapes.len() >= self.config.max_shapes {
            return Err(CanvasError::CapacityExceeded { limit: self.config.max_shapes });
        }
        Ok(())
    }

    fn push(&mut self, kind: ShapeKind, rect: Rect, color: Rgb) -> ShapeId {
        let id = Uuid::new_v4();
        self.shapes.push(Shape { id, kind, rect, color });
        id
    }

    fn floored(&self, rect: Rect) -> Rect {
        let min = self.config.min_size;
        Rect { width: rect.width.max(min), height: rect.height.max(min), ..rect }
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn advance_offset(offset: f64, step: f64, cycle: f64) -> f64 {
    if cycle <= 0.0 {
        return 0.0;
    }
    let next = (offset + step) % cycle;
    if next.is_finite() { next } else { 0.0 }
}
