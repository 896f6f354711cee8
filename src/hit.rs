#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{ShapeId, ShapeRegistry};
use crate::geom::Point;
use crate::overlay::SelectionOverlay;

/// Which part of a shape (or its overlay) was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle,
    DeleteButton,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub shape_id: ShapeId,
    pub part: HitPart,
}

/// Test what is under `pt`.
///
/// The visible overlay is drawn on top of everything: its affordances win
/// first, and the rest of its bounding box counts as the owner's body even
/// where a circle leaves it empty. Other bodies are then tested topmost first,
/// which is reverse creation order. `None` means the pointer is on the bare
/// canvas.
#[must_use]
pub fn hit_test(pt: Point, registry: &ShapeRegistry, overlays: &SelectionOverlay) -> Option<Hit> {
    if let Some(overlay) = overlays.visible() {
        if overlay.handle_rect().contains(pt) {
            return Some(Hit { shape_id: overlay.owner, part: HitPart::ResizeHandle });
        }
        if overlay.delete_rect().contains(pt) {
            return Some(Hit { shape_id: overlay.owner, part: HitPart::DeleteButton });
        }
        if overlay.rect.contains(pt) {
            return Some(Hit { shape_id: overlay.owner, part: HitPart::Body });
        }
    }

    registry
        .iter()
        .rev()
        .find(|shape| shape.contains(pt))
        .map(|shape| Hit { shape_id: shape.id, part: HitPart::Body })
}
