//! Shape interaction and canvas state engine for a light-panel tool.
//!
//! The user places circles and squares that act as light sources, drags and
//! resizes them, and tunes warmth, ambient spill and base color from sliders.
//! This crate owns the state behind that surface: the shape registry, the
//! selection overlays, the pointer/keyboard gesture state machine, and the color
//! pipeline. It does not draw anything. Every handler returns a list of
//! [`engine::Action`]s that the host applies to whatever renders the scene.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | [`controller::CanvasController`]: global controls and the host entry point |
//! | [`engine`] | [`engine::EngineCore`]: gesture state machine and shape operations |
//! | [`doc`] | Shape types and the [`doc::ShapeRegistry`] |
//! | [`overlay`] | Bounding-box overlays and the single selection |
//! | [`hit`] | Hit-testing against shapes and overlay affordances |
//! | [`input`] | Pointer normalization, keys, and gesture state |
//! | [`color`] | Warmth/ambient color computation |
//! | [`coalesce`] | Trailing-edge coalescing of slider bursts |
//! | [`settings`] | Global lighting settings and control clamping |
//! | [`persist`] | Snapshot format and key-value stores |
//! | [`script`] | JSON command scripts replayed by the `lightpad` binary |
//! | [`config`] | Environment-driven engine configuration |
//! | [`geom`] | Points, sizes and rectangles |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants |

pub mod coalesce;
pub mod color;
pub mod config;
pub mod consts;
pub mod controller;
pub mod doc;
pub mod engine;
pub mod error;
pub mod geom;
pub mod hit;
pub mod input;
pub mod overlay;
pub mod persist;
pub mod script;
pub mod settings;
