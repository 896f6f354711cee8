//! Global lighting settings and slider value clamping.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use tracing::warn;

use crate::color::{Palette, Rgb, compute_colors};
use crate::consts::LEVEL_MAX;

/// Process-wide lighting state. Created at startup, restored from and saved to
/// a snapshot.
///
/// The lock flag is not here: it lives on the shape registry, which is what it
/// restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// 0 = most amber, 100 = neutral.
    pub warmth: u8,
    /// Share of the shape color spilled onto the background.
    pub ambient: u8,
    pub base_color: Rgb,
    /// Glow spread around each shape.
    pub glow: u8,
    /// Full-surface illumination is on; ambient is pinned to 100.
    pub full_surface: bool,
    /// Ambient captured when full-surface illumination was switched on.
    pub previous_ambient: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            warmth: LEVEL_MAX,
            ambient: 0,
            base_color: Rgb::WHITE,
            glow: 0,
            full_surface: false,
            previous_ambient: 0,
        }
    }
}

impl Settings {
    /// Colors for the current values.
    #[must_use]
    pub fn palette(&self) -> Palette {
        compute_colors(self.base_color, self.warmth, self.ambient)
    }
}

/// Clamp a 0–100 slider value. Out-of-range input is logged and pulled to the
/// nearest bound.
#[must_use]
pub fn clamp_level(control: &'static str, value: i64) -> u8 {
    clamp_control(control, value, LEVEL_MAX)
}

/// Clamp a 0–255 color channel value.
#[must_use]
pub fn clamp_channel(control: &'static str, value: i64) -> u8 {
    clamp_control(control, value, u8::MAX)
}

fn clamp_control(control: &'static str, value: i64, max: u8) -> u8 {
    let clamped = value.clamp(0, i64::from(max));
    if clamped != value {
        warn!(control, value, clamped, "control value out of range; clamped");
    }
    u8::try_from(clamped).unwrap_or(max)
}
