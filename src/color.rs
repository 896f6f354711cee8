//! Color computation for shapes and the canvas background.
//!
//! Warmth scales the green and blue channels of the base color; red is never
//! attenuated. Higher warmth moves both factors toward 1.0, so warmth 100 on a
//! white base yields (nearly) neutral white and warmth 0 the most amber light.
//! Ambient then scales the shape color down to produce the background, which
//! models how much light spills onto the surface.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_MAX;

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS functional notation, e.g. `rgb(255,237,214)`.
    #[must_use]
    pub fn to_css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Apply `f` to each channel and round the result back into `0..=255`.
    #[must_use]
    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            r: to_channel(f(f64::from(self.r))),
            g: to_channel(f(f64::from(self.g))),
            b: to_channel(f(f64::from(self.b))),
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

/// One of the three RGB slider channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Rgb {
    /// Return a copy with `channel` replaced by `value`.
    #[must_use]
    pub fn with_channel(self, channel: Channel, value: u8) -> Self {
        match channel {
            Channel::Red => Self { r: value, ..self },
            Channel::Green => Self { g: value, ..self },
            Channel::Blue => Self { b: value, ..self },
        }
    }
}

/// Colors derived from the current lighting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Palette {
    /// Fill color of every shape.
    pub shape: Rgb,
    /// Canvas background color.
    pub background: Rgb,
}

/// Compute the shape and background colors.
///
/// `warmth` and `ambient` are levels in `0..=100`; larger values are treated as
/// 100. Output channels are clamped to `0..=255`.
#[must_use]
pub fn compute_colors(base: Rgb, warmth: u8, ambient: u8) -> Palette {
    let warmth = f64::from(warmth.min(LEVEL_MAX));
    let ambient = f64::from(ambient.min(LEVEL_MAX));

    let shape = Rgb {
        r: base.r,
        g: to_channel(f64::from(base.g) * (0.93 + warmth * 0.0007)),
        b: to_channel(f64::from(base.b) * (0.84 + warmth * 0.0016)),
    };
    let background = shape.map(|c| c * (ambient / 100.0));

    Palette { shape, background }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
