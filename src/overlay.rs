//! Selection overlays: the bounding box, resize handle and delete button drawn
//! around a shape.
//!
//! Every shape has exactly one overlay, created and removed together with it.
//! An overlay is pure derived state: its rect is copied from the shape by
//! `sync_to_shape` after every mutation and never driven on its own. At most
//! one overlay is visible, and it is always the overlay of the selected shape.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use crate::consts::{DELETE_BUTTON_SIZE_PX, HANDLE_SIZE_PX};
use crate::doc::{Shape, ShapeId, ShapeRegistry};
use crate::error::CanvasError;
use crate::geom::{Point, Rect};

/// Decoration attached to one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    /// The shape this overlay decorates.
    pub owner: ShapeId,
    /// Mirror of the owner's geometry.
    pub rect: Rect,
    pub visible: bool,
    /// Drawn with a 50% border radius (circle owners).
    pub rounded: bool,
}

impl Overlay {
    fn for_shape(shape: &Shape) -> Self {
        Self { owner: shape.id, rect: shape.rect, visible: false, rounded: shape.kind.is_round() }
    }

    /// Hit area of the resize handle, centered on the bottom-right corner.
    #[must_use]
    pub fn handle_rect(&self) -> Rect {
        let corner = Point::new(self.rect.x + self.rect.width, self.rect.y + self.rect.height);
        Rect::square_around(corner, HANDLE_SIZE_PX)
    }

    /// Hit area of the delete button, centered on the top-right corner.
    #[must_use]
    pub fn delete_rect(&self) -> Rect {
        let corner = Point::new(self.rect.x + self.rect.width, self.rect.y);
        Rect::square_around(corner, DELETE_BUTTON_SIZE_PX)
    }
}

/// All overlays plus the single selection.
#[derive(Debug, Default)]
pub struct SelectionOverlay {
    overlays: Vec<Overlay>,
    selected: Option<ShapeId>,
}

impl SelectionOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the (hidden) overlay for a newly added shape.
    pub fn attach(&mut self, shape: &Shape) {
        self.overlays.push(Overlay::for_shape(shape));
    }

    /// Drop the overlay of a removed shape. Clears the selection if it pointed
    /// at that shape and returns whether it did.
    pub fn detach(&mut self, id: &ShapeId) -> bool {
        self.overlays.retain(|o| &o.owner != id);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            return true;
        }
        false
    }

    /// Drop every overlay and the selection.
    pub fn clear(&mut self) {
        self.overlays.clear();
        self.selected = None;
    }

    /// Show the overlay of `id` and hide every other one.
    ///
    /// Rejected while the registry is locked; the call is not queued and state
    /// is left unchanged.
    pub fn select(&mut self, registry: &ShapeRegistry, id: &ShapeId) -> Result<(), CanvasError> {
        if registry.is_locked() {
            return Err(CanvasError::Locked);
        }
        if registry.get(id).is_none() || !self.overlays.iter().any(|o| &o.owner == id) {
            return Err(CanvasError::UnknownShape(*id));
        }
        for overlay in &mut self.overlays {
            overlay.visible = &overlay.owner == id;
        }
        self.selected = Some(*id);
        Ok(())
    }

    /// Hide the visible overlay, if any, and clear the selection. Returns the
    /// previously selected id.
    pub fn deselect(&mut self) -> Option<ShapeId> {
        self.hide_all();
        self.selected.take()
    }

    /// Hide every overlay without touching the selection id.
    fn hide_all(&mut self) {
        for overlay in &mut self.overlays {
            overlay.visible = false;
        }
    }

    /// Copy the shape's geometry into its overlay.
    pub fn sync_to_shape(&mut self, shape: &Shape) {
        if let Some(overlay) = self.overlays.iter_mut().find(|o| o.owner == shape.id) {
            overlay.rect = shape.rect;
        }
    }

    /// The selected shape, if any.
    #[must_use]
    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    /// The overlay currently shown, if any.
    #[must_use]
    pub fn visible(&self) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.visible)
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| &o.owner == id)
    }

    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}
