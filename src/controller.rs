//! Host entry point: global lighting controls on top of the engine.
//!
//! SYSTEM CONTEXT
//! ==============
//! `CanvasController` is what a host talks to. Pointer and keyboard input and
//! shape operations pass straight through to [`EngineCore`]; the slider
//! controls (warmth, ambient, base color) store their value immediately and
//! defer the color recomputation through a [`Coalescer`]. The host calls
//! [`CanvasController::tick`] from its frame loop to let a due recomputation
//! run. Lock and full-surface changes recompute at once.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::coalesce::Coalescer;
use crate::color::{Channel, Rgb};
use crate::config::EngineConfig;
use crate::consts::{LEVEL_MAX, STATE_KEY};
use crate::doc::{ShapeId, ShapeKind};
use crate::engine::{Action, EngineCore};
use crate::error::{CanvasError, PersistError};
use crate::geom::{Point, Rect};
use crate::input::{Key, Modifiers, PointerEvent, RawPointer};
use crate::persist::{KeyValueStore, SettingsRecord, ShapeRecord, Snapshot};
use crate::settings::{clamp_channel, clamp_level};

pub struct CanvasController {
    core: EngineCore,
    coalescer: Coalescer,
    /// Color recomputations performed so far.
    recomputes: usize,
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl CanvasController {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { core: EngineCore::new(config), coalescer: Coalescer::new(config.coalesce_window), recomputes: 0 }
    }

    /// Build with `EngineConfig::from_env()`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    // --- Sliders ---

    pub fn set_warmth(&mut self, value: i64) -> Vec<Action> {
        self.set_warmth_at(value, Instant::now())
    }

    pub fn set_warmth_at(&mut self, value: i64, now: Instant) -> Vec<Action> {
        self.core.settings_mut().warmth = clamp_level("warmth", value);
        self.mark_at(now)
    }

    /// Ignored while full-surface illumination pins ambient to 100.
    pub fn set_ambient(&mut self, value: i64) -> Vec<Action> {
        self.set_ambient_at(value, Instant::now())
    }

    pub fn set_ambient_at(&mut self, value: i64, now: Instant) -> Vec<Action> {
        let ambient = clamp_level("ambient", value);
        if self.core.settings().full_surface {
            debug!(ambient, "ambient change ignored during full-surface illumination");
            return Vec::new();
        }
        self.core.settings_mut().ambient = ambient;
        self.mark_at(now)
    }

    pub fn set_base_color(&mut self, color: Rgb) -> Vec<Action> {
        self.set_base_color_at(color, Instant::now())
    }

    pub fn set_base_color_at(&mut self, color: Rgb, now: Instant) -> Vec<Action> {
        self.core.settings_mut().base_color = color;
        self.mark_at(now)
    }

    /// Set one channel of the base color.
    pub fn set_channel(&mut self, channel: Channel, value: i64) -> Vec<Action> {
        self.set_channel_at(channel, value, Instant::now())
    }

    pub fn set_channel_at(&mut self, channel: Channel, value: i64, now: Instant) -> Vec<Action> {
        let control = match channel {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        let value = clamp_channel(control, value);
        let settings = self.core.settings_mut();
        settings.base_color = settings.base_color.with_channel(channel, value);
        self.mark_at(now)
    }

    /// Put the base color back to white.
    pub fn reset_base_color(&mut self) -> Vec<Action> {
        self.reset_base_color_at(Instant::now())
    }

    pub fn reset_base_color_at(&mut self, now: Instant) -> Vec<Action> {
        self.set_base_color_at(Rgb::WHITE, now)
    }

    /// Record a slider change. A burst whose window has already elapsed is
    /// flushed here so input alone keeps colors moving.
    fn mark_at(&mut self, now: Instant) -> Vec<Action> {
        self.coalescer.mark_at(now);
        self.tick_at(now)
    }

    /// Run the pending recomputation if its window has elapsed.
    pub fn tick(&mut self) -> Vec<Action> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Vec<Action> {
        match self.coalescer.take_due_at(now) {
            Some(coalesced) => {
                debug!(coalesced, "slider burst settled");
                self.recompute()
            }
            None => Vec::new(),
        }
    }

    /// Run the pending recomputation now, if any.
    pub fn flush(&mut self) -> Vec<Action> {
        match self.coalescer.take() {
            Some(coalesced) => {
                debug!(coalesced, "slider burst flushed");
                self.recompute()
            }
            None => Vec::new(),
        }
    }

    /// Whether slider changes are waiting for a recomputation.
    #[must_use]
    pub fn has_pending_update(&self) -> bool {
        self.coalescer.is_pending()
    }

    /// When the pending recomputation becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.coalescer.deadline()
    }

    #[must_use]
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    fn recompute(&mut self) -> Vec<Action> {
        self.recomputes += 1;
        let palette = self.core.settings().palette();
        debug!(shape = %palette.shape.to_css(), background = %palette.background.to_css(), "colors recomputed");
        self.core.apply_palette(palette)
    }

    /// Recompute at once, folding in any pending slider burst.
    fn recompute_now(&mut self) -> Vec<Action> {
        if let Some(coalesced) = self.coalescer.take() {
            debug!(coalesced, "pending slider burst folded into immediate recompute");
        }
        self.recompute()
    }

    // --- Other global controls ---

    /// Set the glow spread. Disabled while the canvas has no shapes.
    pub fn set_glow(&mut self, value: i64) -> Vec<Action> {
        if !self.glow_enabled() {
            debug!(value, "glow ignored: no shapes");
            return Vec::new();
        }
        let glow = clamp_level("glow", value);
        self.core.settings_mut().glow = glow;
        vec![Action::GlowChanged { glow }, Action::RenderNeeded]
    }

    #[must_use]
    pub fn glow_enabled(&self) -> bool {
        self.core.shape_count() > 0
    }

    /// Engage or release the canvas lock. A pending slider burst is flushed
    /// with it.
    pub fn set_locked(&mut self, locked: bool) -> Vec<Action> {
        let mut actions = self.core.set_locked(locked);
        if !actions.is_empty() {
            actions.extend(self.flush());
        }
        actions
    }

    /// Switch full-surface illumination on or off.
    ///
    /// On: remember the current ambient and pin it to 100. Off: restore the
    /// remembered value exactly.
    pub fn toggle_full_surface(&mut self) -> Vec<Action> {
        let settings = self.core.settings_mut();
        let on = !settings.full_surface;
        if on {
            settings.previous_ambient = settings.ambient;
            settings.ambient = LEVEL_MAX;
        } else {
            settings.ambient = settings.previous_ambient;
        }
        settings.full_surface = on;
        let ambient = settings.ambient;
        info!(on, ambient, "full-surface illumination toggled");

        let mut actions = vec![Action::FullSurfaceChanged { on, ambient }];
        if on && self.core.config().full_surface_clears_shapes {
            actions.extend(self.core.clear_shapes());
        }
        actions.extend(self.recompute_now());
        actions
    }

    // --- Canvas clicks ---

    /// A click that landed on the canvas background.
    pub fn click_on_empty_canvas(&mut self) -> Vec<Action> {
        self.core.deselect()
    }

    /// A click at `pt`; deselects when nothing is under it.
    pub fn click_at(&mut self, pt: Point) -> Vec<Action> {
        self.core.click_at(pt)
    }

    // --- Engine passthrough ---

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.core.set_viewport(width, height);
    }

    /// Create a shape.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::CapacityExceeded` when the canvas is full.
    pub fn create_shape(&mut self, kind: ShapeKind) -> Result<Vec<Action>, CanvasError> {
        self.core.create_shape(kind)
    }

    /// Delete a shape.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::Locked` while locked, `UnknownShape` for a stale id.
    pub fn remove_shape(&mut self, id: &ShapeId) -> Result<Vec<Action>, CanvasError> {
        self.core.remove_shape(id)
    }

    /// Select a shape.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::Locked` while locked, `UnknownShape` for a stale id.
    pub fn select(&mut self, id: &ShapeId) -> Result<Vec<Action>, CanvasError> {
        self.core.select(id)
    }

    pub fn deselect(&mut self) -> Vec<Action> {
        self.core.deselect()
    }

    /// Move or resize a shape directly.
    ///
    /// # Errors
    ///
    /// See [`EngineCore::set_geometry`].
    pub fn set_geometry(&mut self, id: &ShapeId, rect: Rect) -> Result<Vec<Action>, CanvasError> {
        self.core.set_geometry(id, rect)
    }

    pub fn on_pointer(&mut self, event: PointerEvent) -> Vec<Action> {
        self.core.on_pointer(event)
    }

    pub fn on_raw_pointer(&mut self, raw: &RawPointer) -> Vec<Action> {
        self.core.on_raw_pointer(raw)
    }

    /// Give keyboard focus to a shape.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::UnknownShape` for a stale id.
    pub fn focus(&mut self, id: &ShapeId) -> Result<(), CanvasError> {
        self.core.focus(id)
    }

    pub fn blur(&mut self) {
        self.core.blur();
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    pub fn confirm_delete(&mut self, confirmed: bool) -> Vec<Action> {
        self.core.confirm_delete(confirmed)
    }

    // --- Persistence ---

    /// Capture shapes and settings.
    ///
    /// During full-surface illumination the ambient value the user chose is
    /// saved, not the pinned 100.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let s = self.core.settings();
        Snapshot {
            shapes: self.core.shapes().iter().map(ShapeRecord::from_shape).collect(),
            settings: SettingsRecord {
                ambient: if s.full_surface { s.previous_ambient } else { s.ambient },
                warmth: s.warmth,
                glow: s.glow,
                base_color: s.base_color,
            },
        }
    }

    /// Replace the canvas with a snapshot. Full-surface illumination is
    /// switched off and colors are recomputed at once.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Vec<Action> {
        let record = snapshot.settings;
        let settings = self.core.settings_mut();
        settings.warmth = clamp_level("warmth", i64::from(record.warmth));
        settings.ambient = clamp_level("ambient", i64::from(record.ambient));
        settings.glow = clamp_level("glow", i64::from(record.glow));
        settings.base_color = record.base_color;
        let was_full = settings.full_surface;
        settings.full_surface = false;
        settings.previous_ambient = settings.ambient;

        let mut actions = Vec::new();
        if was_full {
            actions.push(Action::FullSurfaceChanged { on: false, ambient: settings.ambient });
        }
        actions.extend(self.core.restore_shapes(snapshot.shapes.iter().map(|r| (r.kind, r.rect()))));
        actions.extend(self.recompute_now());
        info!(shapes = self.core.shape_count(), "canvas restored");
        actions
    }

    /// Write the current snapshot under the state key.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if encoding or the store fails. The canvas is
    /// unaffected either way.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        let json = self.snapshot().to_json()?;
        if let Err(e) = store.set(STATE_KEY, &json) {
            warn!(error = %e, "saving state failed");
            return Err(e.into());
        }
        debug!(shapes = self.core.shape_count(), bytes = json.len(), "state saved");
        Ok(())
    }

    /// Restore from the state key, falling back to defaults when the record is
    /// missing, unreadable or malformed.
    pub fn load(&mut self, store: &dyn KeyValueStore) -> Vec<Action> {
        let snapshot = match store.get(STATE_KEY) {
            Ok(raw) => Snapshot::load_or_default(raw.as_deref()),
            Err(e) => {
                warn!(error = %e, "reading saved state failed; using defaults");
                Snapshot::default()
            }
        };
        self.restore(&snapshot)
    }
}
