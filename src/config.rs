//! Engine configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::consts::{
    COALESCE_WINDOW_MS, CREATE_OFFSET_CYCLE, CREATE_OFFSET_STEP, DEFAULT_SHAPE_SIZE, KEY_STEP_FAST_PX, KEY_STEP_PX,
    MAX_SHAPES, MIN_SHAPE_SIZE,
};

/// Tuning knobs for the engine. `Default` matches the documented behavior;
/// `from_env` lets a deployment override individual values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of live shapes.
    pub max_shapes: usize,
    /// Floor for shape width and height.
    pub min_size: f64,
    /// Side length of a freshly created shape.
    pub default_size: f64,
    /// Per-creation placement offset.
    pub offset_step: f64,
    /// Placement offset wraps to zero at this value.
    pub offset_cycle: f64,
    /// Slider coalescing window.
    pub coalesce_window: Duration,
    /// Arrow-key nudge distance.
    pub key_step: f64,
    /// Arrow-key nudge distance with Shift.
    pub key_step_fast: f64,
    /// Remove every shape when full-surface illumination is switched on.
    pub full_surface_clears_shapes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_shapes: MAX_SHAPES,
            min_size: MIN_SHAPE_SIZE,
            default_size: DEFAULT_SHAPE_SIZE,
            offset_step: CREATE_OFFSET_STEP,
            offset_cycle: CREATE_OFFSET_CYCLE,
            coalesce_window: Duration::from_millis(COALESCE_WINDOW_MS),
            key_step: KEY_STEP_PX,
            key_step_fast: KEY_STEP_FAST_PX,
            full_surface_clears_shapes: false,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Lengths that are not finite and positive fall back to their default.
    ///
    /// Optional:
    /// - `LIGHTPAD_MAX_SHAPES`: default 50
    /// - `LIGHTPAD_MIN_SIZE`: default 50
    /// - `LIGHTPAD_DEFAULT_SIZE`: default 200 (never below the minimum size)
    /// - `LIGHTPAD_OFFSET_STEP`: default 20
    /// - `LIGHTPAD_OFFSET_CYCLE`: default 100
    /// - `LIGHTPAD_COALESCE_MS`: default 16
    /// - `LIGHTPAD_KEY_STEP`: default 2
    /// - `LIGHTPAD_KEY_STEP_FAST`: default 10
    /// - `LIGHTPAD_FULL_SURFACE_CLEARS_SHAPES`: default false
    #[must_use]
    pub fn from_env() -> Self {
        let d = Self::default();
        let min_size = env_parse_len("LIGHTPAD_MIN_SIZE", d.min_size).max(1.0);
        Self {
            max_shapes: env_parse("LIGHTPAD_MAX_SHAPES", d.max_shapes),
            min_size,
            default_size: env_parse_len("LIGHTPAD_DEFAULT_SIZE", d.default_size).max(min_size),
            offset_step: finite_or(env_parse("LIGHTPAD_OFFSET_STEP", d.offset_step), d.offset_step).max(0.0),
            offset_cycle: env_parse_len("LIGHTPAD_OFFSET_CYCLE", d.offset_cycle),
            coalesce_window: Duration::from_millis(env_parse("LIGHTPAD_COALESCE_MS", COALESCE_WINDOW_MS)),
            key_step: env_parse_len("LIGHTPAD_KEY_STEP", d.key_step),
            key_step_fast: env_parse_len("LIGHTPAD_KEY_STEP_FAST", d.key_step_fast),
            full_surface_clears_shapes: env_parse("LIGHTPAD_FULL_SURFACE_CLEARS_SHAPES", d.full_surface_clears_shapes),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(&raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(raw: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.trim().parse::<T>().unwrap_or(default)
}

/// Parse a length in pixels; anything not finite and positive is the default.
fn env_parse_len(key: &str, default: f64) -> f64 {
    positive_or(env_parse(key, default), default)
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}
