//! JSON command scripts replayed against a [`CanvasController`].
//!
//! A script is a JSON array of steps tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "viewport", "width": 1280, "height": 720},
//!   {"op": "create", "kind": "circle"},
//!   {"op": "pointer", "phase": "start", "x": 640, "y": 360},
//!   {"op": "pointer", "phase": "move", "x": 700, "y": 380},
//!   {"op": "pointer", "phase": "end", "x": 700, "y": 380},
//!   {"op": "warmth", "value": 40},
//!   {"op": "wait", "ms": 20}
//! ]
//! ```
//!
//! Time is virtual: it starts at the replay's start instant and only moves on
//! `wait`, so slider coalescing behaves the same on every run. Shapes are
//! addressed by their index in creation order.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::color::{Channel, Rgb};
use crate::controller::CanvasController;
use crate::doc::{ShapeId, ShapeKind};
use crate::engine::Action;
use crate::error::ScriptError;
use crate::geom::Point;
use crate::input::{Key, Modifiers, MousePhase, PointerEvent, PointerPhase, RawPointer, TouchPhase};

/// One scripted host event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Viewport { width: f64, height: f64 },
    Create { kind: ShapeKind },
    Remove { index: usize },
    Select { index: usize },
    Deselect,
    /// Already-normalized pointer input.
    Pointer { phase: PointerPhase, x: f64, y: f64 },
    Mouse { phase: MousePhase, x: f64, y: f64 },
    Touch { phase: TouchPhase, #[serde(default)] contacts: Vec<Point> },
    CaptureLost,
    Focus { index: usize },
    Blur,
    Key { key: Key, #[serde(default)] modifiers: Modifiers },
    ConfirmDelete { confirmed: bool },
    Warmth { value: i64 },
    Ambient { value: i64 },
    Rgb { color: Rgb },
    Channel { channel: Channel, value: i64 },
    ResetRgb,
    Glow { value: i64 },
    Lock { locked: bool },
    FullSurface,
    Click { x: f64, y: f64 },
    /// Advance the virtual clock.
    Wait { ms: u64 },
    /// Force any pending color recomputation.
    Flush,
}

/// Parse a script from JSON text.
///
/// # Errors
///
/// Returns `ScriptError::Json` for malformed input or unknown ops.
pub fn parse_script(raw: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(raw)?)
}

/// Read and parse a script file.
///
/// # Errors
///
/// Returns `ScriptError::Io` if the file cannot be read, `Json` if it does not
/// parse.
pub fn load_script(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let raw = std::fs::read_to_string(path)?;
    parse_script(&raw)
}

/// Outcome of a replay.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Every action emitted, in order.
    pub actions: Vec<Action>,
    /// Steps executed.
    pub steps: usize,
    /// Steps that were rejected, e.g. a create at capacity.
    pub failed: usize,
}

/// Replays steps against a controller on a virtual clock.
pub struct ScriptRunner<'a> {
    controller: &'a mut CanvasController,
    now: Instant,
    report: RunReport,
}

impl<'a> ScriptRunner<'a> {
    #[must_use]
    pub fn new(controller: &'a mut CanvasController) -> Self {
        Self::starting_at(controller, Instant::now())
    }

    #[must_use]
    pub fn starting_at(controller: &'a mut CanvasController, start: Instant) -> Self {
        Self { controller, now: start, report: RunReport::default() }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Execute one step, then let any due recomputation run. A rejected step
    /// is logged and counted; replay continues.
    pub fn step(&mut self, step: &Step) {
        self.report.steps += 1;
        match self.apply(step) {
            Ok(actions) => self.report.actions.extend(actions),
            Err(e) => {
                warn!(step = self.report.steps, ?step, error = %e, "script step rejected");
                self.report.failed += 1;
            }
        }
        let due = self.controller.tick_at(self.now);
        self.report.actions.extend(due);
    }

    /// Execute every step and flush whatever is still pending.
    #[must_use]
    pub fn run(mut self, steps: &[Step]) -> RunReport {
        for step in steps {
            self.step(step);
        }
        self.finish()
    }

    /// Flush and return the report.
    #[must_use]
    pub fn finish(mut self) -> RunReport {
        let flushed = self.controller.flush();
        self.report.actions.extend(flushed);
        debug!(steps = self.report.steps, failed = self.report.failed, "script finished");
        self.report
    }

    fn shape_at(&self, index: usize) -> Result<ShapeId, ScriptError> {
        self.controller.core().shapes().get(index).map(|s| s.id).ok_or(ScriptError::NoShapeAt { index })
    }

    fn apply(&mut self, step: &Step) -> Result<Vec<Action>, ScriptError> {
        let now = self.now;
        let actions = match step {
            Step::Viewport { width, height } => {
                self.controller.set_viewport(*width, *height);
                Vec::new()
            }
            Step::Create { kind } => self.controller.create_shape(*kind)?,
            Step::Remove { index } => {
                let id = self.shape_at(*index)?;
                self.controller.remove_shape(&id)?
            }
            Step::Select { index } => {
                let id = self.shape_at(*index)?;
                self.controller.select(&id)?
            }
            Step::Deselect => self.controller.deselect(),
            Step::Pointer { phase, x, y } => self.controller.on_pointer(PointerEvent::new(*x, *y, *phase)),
            Step::Mouse { phase, x, y } => {
                self.controller.on_raw_pointer(&RawPointer::Mouse { phase: *phase, pos: Point::new(*x, *y) })
            }
            Step::Touch { phase, contacts } => {
                self.controller.on_raw_pointer(&RawPointer::Touch { phase: *phase, contacts: contacts.clone() })
            }
            Step::CaptureLost => self.controller.on_raw_pointer(&RawPointer::CaptureLost),
            Step::Focus { index } => {
                let id = self.shape_at(*index)?;
                self.controller.focus(&id)?;
                Vec::new()
            }
            Step::Blur => {
                self.controller.blur();
                Vec::new()
            }
            Step::Key { key, modifiers } => self.controller.on_key_down(key, *modifiers),
            Step::ConfirmDelete { confirmed } => self.controller.confirm_delete(*confirmed),
            Step::Warmth { value } => self.controller.set_warmth_at(*value, now),
            Step::Ambient { value } => self.controller.set_ambient_at(*value, now),
            Step::Rgb { color } => self.controller.set_base_color_at(*color, now),
            Step::Channel { channel, value } => self.controller.set_channel_at(*channel, *value, now),
            Step::ResetRgb => self.controller.reset_base_color_at(now),
            Step::Glow { value } => self.controller.set_glow(*value),
            Step::Lock { locked } => self.controller.set_locked(*locked),
            Step::FullSurface => self.controller.toggle_full_surface(),
            Step::Click { x, y } => self.controller.click_at(Point::new(*x, *y)),
            Step::Wait { ms } => {
                self.now += Duration::from_millis(*ms);
                Vec::new()
            }
            Step::Flush => self.controller.flush(),
        };
        Ok(actions)
    }
}
