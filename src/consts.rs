//! Shared numeric constants for the lightpad crate.

// ── Shapes ──────────────────────────────────────────────────────

/// Maximum number of concurrently live shapes.
pub const MAX_SHAPES: usize = 50;

/// Floor for shape width and height, in surface pixels.
pub const MIN_SHAPE_SIZE: f64 = 50.0;

/// Width and height of a freshly created shape.
pub const DEFAULT_SHAPE_SIZE: f64 = 200.0;

/// Offset added per creation so consecutive shapes don't stack exactly.
pub const CREATE_OFFSET_STEP: f64 = 20.0;

/// The creation offset wraps back to zero when it reaches this value.
pub const CREATE_OFFSET_CYCLE: f64 = 100.0;

// ── Overlay affordances ─────────────────────────────────────────

/// Side of the square resize handle drawn on the bottom-right corner.
pub const HANDLE_SIZE_PX: f64 = 16.0;

/// Diameter of the delete button drawn on the top-right corner.
pub const DELETE_BUTTON_SIZE_PX: f64 = 24.0;

// ── Keyboard ────────────────────────────────────────────────────

/// Arrow-key nudge distance.
pub const KEY_STEP_PX: f64 = 2.0;

/// Arrow-key nudge distance with Shift held.
pub const KEY_STEP_FAST_PX: f64 = 10.0;

// ── Controls ────────────────────────────────────────────────────

/// Upper bound of the warmth, ambient and glow sliders.
pub const LEVEL_MAX: u8 = 100;

/// Slider updates arriving within this window collapse into one recomputation.
pub const COALESCE_WINDOW_MS: u64 = 16;

/// Key under which the snapshot is stored.
pub const STATE_KEY: &str = "lightpad.state";
