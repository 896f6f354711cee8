//! Error types.
//!
//! Nothing here is fatal to the engine. Callers absorb these at the nearest
//! boundary: capacity errors are shown to the user, persistence errors fall
//! back to defaults, and out-of-range control values are clamped before they
//! ever become errors.

use crate::doc::ShapeId;

/// Errors from shape and selection operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// The registry already holds the maximum number of shapes.
    #[error("shape limit reached (max {limit} shapes)")]
    CapacityExceeded { limit: usize },
    /// No live shape has this id.
    #[error("unknown shape {0}")]
    UnknownShape(ShapeId),
    /// The canvas is locked; shapes are not interactive.
    #[error("canvas is locked")]
    Locked,
    /// A geometry update carried a non-finite coordinate or size.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Errors from reading or writing a key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Keys name files, so path separators and dot-only names are refused.
    #[error("invalid store key `{0}`")]
    InvalidKey(String),
}

/// Errors from encoding or decoding a persisted snapshot.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid length value `{0}`")]
    InvalidLength(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from loading or replaying a command script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("cannot read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed script: {0}")]
    Json(#[from] serde_json::Error),
    /// A step addressed a shape index past the end of the canvas.
    #[error("no shape at index {index}")]
    NoShapeAt { index: usize },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}
