//! Snapshot format and key-value stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! The whole canvas is saved as one JSON record under [`STATE_KEY`]. Shape
//! lengths are written as CSS pixel strings (`"120px"`) so a browser host can
//! apply them directly; bare numbers are accepted when reading. Loading is
//! best effort: a missing or malformed record yields the default canvas.
//!
//! [`STATE_KEY`]: crate::consts::STATE_KEY

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::Rgb;
use crate::consts::LEVEL_MAX;
use crate::doc::{Shape, ShapeKind};
use crate::error::{PersistError, StoreError};
use crate::geom::Rect;

// =============================================================================
// Snapshot
// =============================================================================

/// Everything needed to rebuild the canvas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub shapes: Vec<ShapeRecord>,
    #[serde(default)]
    pub settings: SettingsRecord,
}

impl Snapshot {
    /// Encode as JSON.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Json` if encoding fails.
    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Json` for malformed input, including lengths that
    /// are neither numbers nor `"<n>px"` strings.
    pub fn from_json(raw: &str) -> Result<Self, PersistError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Decode a stored record, falling back to the default canvas when it is
    /// missing or malformed.
    #[must_use]
    pub fn load_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            debug!("no saved state; using defaults");
            return Self::default();
        };
        match Self::from_json(raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "saved state unreadable; using defaults");
                Self::default()
            }
        }
    }
}

/// One saved shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub position: Position,
    pub size: Dimensions,
}

impl ShapeRecord {
    #[must_use]
    pub fn from_shape(shape: &Shape) -> Self {
        let r = shape.rect;
        Self {
            kind: shape.kind,
            position: Position { left: Length(r.x), top: Length(r.y) },
            size: Dimensions { width: Length(r.width), height: Length(r.height) },
        }
    }

    /// Bounding box in canvas pixels.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.left.0, self.position.top.0, self.size.width.0, self.size.height.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: Length,
    pub top: Length,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: Length,
    pub height: Length,
}

/// Saved lighting settings. Missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsRecord {
    pub ambient: u8,
    pub warmth: u8,
    pub glow: u8,
    pub base_color: Rgb,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self { ambient: 0, warmth: LEVEL_MAX, glow: 0, base_color: Rgb::WHITE }
    }
}

// =============================================================================
// Length
// =============================================================================

/// A pixel length, written as `"<n>px"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLength", into = "String")]
pub struct Length(pub f64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLength {
    Number(f64),
    Text(String),
}

impl Length {
    /// Parse `"120px"`, `"120"` or `" 12.5px "`.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::InvalidLength` for anything else, including
    /// non-finite values.
    pub fn parse(raw: &str) -> Result<Self, PersistError> {
        let trimmed = raw.trim();
        let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
        match number.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Self(v)),
            _ => Err(PersistError::InvalidLength(raw.to_owned())),
        }
    }
}

impl TryFrom<RawLength> for Length {
    type Error = PersistError;

    fn try_from(raw: RawLength) -> Result<Self, Self::Error> {
        match raw {
            RawLength::Number(v) if v.is_finite() => Ok(Self(v)),
            RawLength::Number(v) => Err(PersistError::InvalidLength(v.to_string())),
            RawLength::Text(s) => Self::parse(&s),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

impl From<Length> for String {
    fn from(len: Length) -> Self {
        len.to_string()
    }
}

// =============================================================================
// Stores
// =============================================================================

/// String key-value storage for snapshots.
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Store backed by a directory, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.chars().all(|c| c == '.')
            && !key.contains(['/', '\\'])
            && !key.contains('\0');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Readers never see a partially written record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "state written");
        Ok(())
    }
}
