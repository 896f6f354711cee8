//! Interaction engine: the pointer/keyboard state machine and shape operations.
//!
//! `EngineCore` is the explicit application context. It owns the shape
//! registry, the overlays, the lighting settings and the gesture state, and is
//! the only thing allowed to mutate them, so the cross-component invariants
//! (one selection, overlay mirrors shape, nothing moves while locked) are
//! maintained in one place. Handlers return `Action`s for the host to apply.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info, warn};

use crate::color::{Palette, Rgb};
use crate::config::EngineConfig;
use crate::doc::{Shape, ShapeId, ShapeKind, ShapeRegistry};
use crate::error::CanvasError;
use crate::geom::{Point, Rect, Size};
use crate::hit::{HitPart, hit_test};
use crate::input::{InputState, Key, Modifiers, PointerEvent, PointerNormalizer, PointerPhase, RawPointer};
use crate::overlay::{Overlay, SelectionOverlay};
use crate::settings::Settings;

/// Actions returned from handlers for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ShapeCreated { id: ShapeId, kind: ShapeKind, rect: Rect, color: Rgb },
    ShapeUpdated { id: ShapeId, rect: Rect },
    ShapeDeleted { id: ShapeId },
    SelectionChanged { id: Option<ShapeId> },
    /// Ask the user to confirm a keyboard delete; answer with `confirm_delete`.
    ConfirmDeleteRequested { id: ShapeId },
    /// New fill color for every shape.
    ShapesRecolored { color: Rgb },
    BackgroundChanged { color: Rgb },
    GlowChanged { glow: u8 },
    LockChanged { locked: bool },
    FullSurfaceChanged { on: bool, ambient: u8 },
    /// Transient state was reset after an internal inconsistency.
    RecoveryPrompt { message: String },
    RenderNeeded,
}

/// Core engine state.
pub struct EngineCore {
    registry: ShapeRegistry,
    overlays: SelectionOverlay,
    settings: Settings,
    input: InputState,
    normalizer: PointerNormalizer,
    /// Colors most recently applied to shapes and background.
    palette: Palette,
    viewport: Size,
    focused: Option<ShapeId>,
    pending_delete: Option<ShapeId>,
    config: EngineConfig,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let settings = Settings::default();
        Self {
            registry: ShapeRegistry::new(config),
            overlays: SelectionOverlay::new(),
            settings,
            input: InputState::default(),
            normalizer: PointerNormalizer::new(),
            palette: settings.palette(),
            viewport: Size::default(),
            focused: None,
            pending_delete: None,
            config,
        }
    }

    /// Update the viewport that new shapes are centered in.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    // --- Shape operations ---

    /// Create a shape of `kind`, colored from the current settings.
    ///
    /// Only the new shape receives the computed color; existing shapes keep
    /// theirs until the next recomputation.
    pub fn create_shape(&mut self, kind: ShapeKind) -> Result<Vec<Action>, CanvasError> {
        let color = self.settings.palette().shape;
        let id = match self.registry.create(kind, self.viewport, color) {
            Ok(id) => id,
            Err(e) => {
                warn!(?kind, error = %e, "shape not created");
                return Err(e);
            }
        };
        let Some(shape) = self.registry.get(&id) else {
            return Err(CanvasError::UnknownShape(id));
        };
        self.overlays.attach(shape);
        info!(%id, ?kind, count = self.registry.count(), "shape created");
        Ok(vec![
            Action::ShapeCreated { id, kind, rect: shape.rect, color: shape.color },
            Action::RenderNeeded,
        ])
    }

    /// Delete a shape and its overlay. Rejected while locked.
    pub fn remove_shape(&mut self, id: &ShapeId) -> Result<Vec<Action>, CanvasError> {
        if self.registry.is_locked() {
            return Err(CanvasError::Locked);
        }
        if self.registry.get(id).is_none() {
            return Err(CanvasError::UnknownShape(*id));
        }
        let mut actions = self.detach_shape(id);
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Delete every shape.
    pub fn clear_shapes(&mut self) -> Vec<Action> {
        let ids: Vec<ShapeId> = self.registry.iter().map(|s| s.id).collect();
        let mut actions = Vec::new();
        for id in &ids {
            actions.extend(self.detach_shape(id));
        }
        if !ids.is_empty() {
            info!(removed = ids.len(), "all shapes cleared");
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Replace a shape's geometry and resync its overlay.
    pub fn set_geometry(&mut self, id: &ShapeId, rect: Rect) -> Result<Vec<Action>, CanvasError> {
        let rect = self.registry.set_geometry(id, rect)?;
        if let Some(shape) = self.registry.get(id) {
            self.overlays.sync_to_shape(shape);
        }
        Ok(vec![Action::ShapeUpdated { id: *id, rect }])
    }

    /// Select a shape, showing only its overlay. Rejected while locked.
    pub fn select(&mut self, id: &ShapeId) -> Result<Vec<Action>, CanvasError> {
        let previous = self.overlays.selected();
        self.overlays.select(&self.registry, id)?;
        if previous == Some(*id) {
            return Ok(Vec::new());
        }
        debug!(%id, "shape selected");
        Ok(vec![Action::SelectionChanged { id: Some(*id) }])
    }

    /// Clear the selection, hiding the visible overlay.
    pub fn deselect(&mut self) -> Vec<Action> {
        match self.overlays.deselect() {
            Some(id) => {
                debug!(%id, "shape deselected");
                vec![Action::SelectionChanged { id: None }]
            }
            None => Vec::new(),
        }
    }

    /// Treat a click at `pt`: deselect when it lands on the bare canvas.
    pub fn click_at(&mut self, pt: Point) -> Vec<Action> {
        if hit_test(pt, &self.registry, &self.overlays).is_some() {
            return Vec::new();
        }
        self.deselect()
    }

    // --- Pointer input ---

    /// Normalize a raw mouse/touch event and feed it to the state machine.
    pub fn on_raw_pointer(&mut self, raw: &RawPointer) -> Vec<Action> {
        match self.normalizer.normalize(raw) {
            Some(event) => self.on_pointer(event),
            None => Vec::new(),
        }
    }

    /// Feed a normalized pointer event to the state machine.
    pub fn on_pointer(&mut self, event: PointerEvent) -> Vec<Action> {
        match event.phase {
            PointerPhase::Start => self.pointer_down(event.pos),
            PointerPhase::Move => self.pointer_move(event.pos),
            PointerPhase::End | PointerPhase::Cancel => self.pointer_up(event.phase),
        }
    }

    fn pointer_down(&mut self, pos: Point) -> Vec<Action> {
        if !self.input.is_idle() {
            debug!("pointer down during active gesture ignored");
            return Vec::new();
        }
        if self.registry.is_locked() {
            return Vec::new();
        }

        let Some(hit) = hit_test(pos, &self.registry, &self.overlays) else {
            return self.deselect();
        };
        let id = hit.shape_id;
        let Some(start_rect) = self.registry.get(&id).map(|s| s.rect) else {
            return self.recover("hit shape is missing from the registry");
        };

        match hit.part {
            HitPart::Body => {
                let actions = match self.select(&id) {
                    Ok(actions) => actions,
                    Err(e) => {
                        debug!(%id, error = %e, "drag not started");
                        return Vec::new();
                    }
                };
                self.input = InputState::Dragging { id, start_pointer: pos, start_rect };
                debug!(%id, "drag started");
                actions
            }
            HitPart::ResizeHandle => {
                self.input = InputState::Resizing { id, start_pointer: pos, start_rect };
                debug!(%id, "resize started");
                Vec::new()
            }
            HitPart::DeleteButton => match self.remove_shape(&id) {
                Ok(actions) => actions,
                Err(e) => {
                    debug!(%id, error = %e, "delete button ignored");
                    Vec::new()
                }
            },
        }
    }

    fn pointer_move(&mut self, pos: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Dragging { id, start_pointer, start_rect } => {
                let (dx, dy) = pos.delta_from(start_pointer);
                self.apply_gesture_geometry(id, start_rect.translated(dx, dy))
            }
            InputState::Resizing { id, start_pointer, start_rect } => {
                let Some(kind) = self.registry.get(&id).map(|s| s.kind) else {
                    return self.recover("resized shape is missing from the registry");
                };
                let (dx, dy) = pos.delta_from(start_pointer);
                let rect = kind.resize(start_rect, dx, dy, self.registry.min_size());
                self.apply_gesture_geometry(id, rect)
            }
        }
    }

    fn pointer_up(&mut self, phase: PointerPhase) -> Vec<Action> {
        if let Some(id) = self.input.active_shape() {
            debug!(%id, ?phase, "gesture ended");
        }
        self.input = InputState::Idle;
        Vec::new()
    }

    /// Apply a geometry computed by an active gesture. On a rejected rect the
    /// shape keeps its last valid geometry.
    fn apply_gesture_geometry(&mut self, id: ShapeId, rect: Rect) -> Vec<Action> {
        match self.set_geometry(&id, rect) {
            Ok(actions) => actions,
            Err(CanvasError::UnknownShape(_)) => self.recover("gesture target is missing from the registry"),
            Err(CanvasError::Locked) => {
                self.input = InputState::Idle;
                Vec::new()
            }
            Err(e) => {
                debug!(%id, error = %e, "gesture update skipped");
                Vec::new()
            }
        }
    }

    // --- Keyboard input ---

    /// Give keyboard focus to a shape.
    pub fn focus(&mut self, id: &ShapeId) -> Result<(), CanvasError> {
        if self.registry.get(id).is_none() {
            return Err(CanvasError::UnknownShape(*id));
        }
        self.focused = Some(*id);
        Ok(())
    }

    /// Drop keyboard focus. Any pending delete confirmation is abandoned.
    pub fn blur(&mut self) {
        self.focused = None;
        self.pending_delete = None;
    }

    /// Handle a key press aimed at the focused shape.
    ///
    /// Arrows nudge (faster with Shift), Enter selects, Delete/Backspace asks
    /// for confirmation, Escape cancels a pending delete or deselects.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        let Some(id) = self.focused else {
            return Vec::new();
        };
        if self.registry.is_locked() {
            return Vec::new();
        }

        if let Some((ux, uy)) = key.arrow_direction() {
            let Some(rect) = self.registry.get(&id).map(|s| s.rect) else {
                self.focused = None;
                return Vec::new();
            };
            let step = if modifiers.shift { self.config.key_step_fast } else { self.config.key_step };
            return match self.set_geometry(&id, rect.translated(ux * step, uy * step)) {
                Ok(actions) => actions,
                Err(e) => {
                    debug!(%id, error = %e, "keyboard nudge skipped");
                    Vec::new()
                }
            };
        }

        match key {
            Key::Enter => self.select(&id).unwrap_or_default(),
            Key::Delete | Key::Backspace => {
                self.pending_delete = Some(id);
                vec![Action::ConfirmDeleteRequested { id }]
            }
            Key::Escape => {
                if self.pending_delete.take().is_some() {
                    return Vec::new();
                }
                self.deselect()
            }
            _ => Vec::new(),
        }
    }

    /// Answer the pending delete confirmation.
    pub fn confirm_delete(&mut self, confirmed: bool) -> Vec<Action> {
        let Some(id) = self.pending_delete.take() else {
            return Vec::new();
        };
        if !confirmed {
            debug!(%id, "delete cancelled");
            return Vec::new();
        }
        match self.remove_shape(&id) {
            Ok(actions) => actions,
            Err(e) => {
                debug!(%id, error = %e, "confirmed delete not applied");
                Vec::new()
            }
        }
    }

    // --- Global state ---

    /// Engage or release the canvas lock.
    ///
    /// Engaging it aborts any gesture, hides every overlay and clears the
    /// selection. Releasing it only lifts the restriction.
    pub fn set_locked(&mut self, locked: bool) -> Vec<Action> {
        if self.registry.is_locked() == locked {
            return Vec::new();
        }
        self.registry.set_locked(locked);
        let mut actions = vec![Action::LockChanged { locked }];
        if locked {
            self.input = InputState::Idle;
            self.pending_delete = None;
            actions.extend(self.deselect());
        }
        info!(locked, "canvas lock changed");
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Reset transient state after an unexpected failure.
    ///
    /// Clears the lock, selection, visible overlays and any gesture. Shape
    /// geometry is left as is.
    pub fn recover(&mut self, reason: &str) -> Vec<Action> {
        warn!(reason, "interaction state reset");
        let mut actions = Vec::new();
        if self.registry.is_locked() {
            self.registry.set_locked(false);
            actions.push(Action::LockChanged { locked: false });
        }
        self.input = InputState::Idle;
        self.pending_delete = None;
        if self.focused.is_some_and(|id| self.registry.get(&id).is_none()) {
            self.focused = None;
        }
        actions.extend(self.deselect());
        actions.push(Action::RecoveryPrompt {
            message: "Something went wrong with that gesture. Your shapes are safe; please try again.".into(),
        });
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply a palette to every shape and the background.
    pub fn apply_palette(&mut self, palette: Palette) -> Vec<Action> {
        self.registry.recolor_all(palette.shape);
        self.palette = palette;
        vec![
            Action::ShapesRecolored { color: palette.shape },
            Action::BackgroundChanged { color: palette.background },
            Action::RenderNeeded,
        ]
    }

    /// Replace every shape with restored ones. Stops at capacity.
    pub fn restore_shapes(&mut self, shapes: impl IntoIterator<Item = (ShapeKind, Rect)>) -> Vec<Action> {
        self.input = InputState::Idle;
        self.focused = None;
        self.pending_delete = None;
        let mut actions = Vec::new();
        if self.overlays.selected().is_some() {
            actions.push(Action::SelectionChanged { id: None });
        }
        self.overlays.clear();
        actions.extend(self.registry.clear().into_iter().map(|id| Action::ShapeDeleted { id }));

        let color = self.settings.palette().shape;
        for (kind, rect) in shapes {
            match self.registry.insert_restored(kind, rect, color) {
                Ok(id) => {
                    if let Some(shape) = self.registry.get(&id) {
                        self.overlays.attach(shape);
                        actions.push(Action::ShapeCreated { id, kind, rect: shape.rect, color });
                    }
                }
                Err(CanvasError::CapacityExceeded { limit }) => {
                    warn!(limit, "restored shapes truncated at capacity");
                    break;
                }
                Err(e) => warn!(?kind, error = %e, "restored shape skipped"),
            }
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub(crate) fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    // --- Queries ---

    /// The currently selected shape, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ShapeId> {
        self.overlays.selected()
    }

    /// Look up a shape by id.
    #[must_use]
    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.registry.get(id)
    }

    /// All shapes in creation order.
    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        self.registry.all()
    }

    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.registry.count()
    }

    /// Look up the overlay of a shape.
    #[must_use]
    pub fn overlay(&self, id: &ShapeId) -> Option<&Overlay> {
        self.overlays.get(id)
    }

    #[must_use]
    pub fn overlays(&self) -> &SelectionOverlay {
        &self.overlays
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Colors most recently applied.
    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    #[must_use]
    pub fn input_state(&self) -> InputState {
        self.input
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.registry.is_locked()
    }

    #[must_use]
    pub fn focused(&self) -> Option<ShapeId> {
        self.focused
    }

    #[must_use]
    pub fn pending_delete(&self) -> Option<ShapeId> {
        self.pending_delete
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Remove a shape with its overlay and any transient state pointing at it.
    fn detach_shape(&mut self, id: &ShapeId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.registry.remove(id).is_none() {
            return actions;
        }
        if self.overlays.detach(id) {
            actions.push(Action::SelectionChanged { id: None });
        }
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        if self.pending_delete.as_ref() == Some(id) {
            self.pending_delete = None;
        }
        if self.input.active_shape().as_ref() == Some(id) {
            self.input = InputState::Idle;
        }
        info!(%id, count = self.registry.count(), "shape removed");
        actions.push(Action::ShapeDeleted { id: *id });
        actions
    }
}
