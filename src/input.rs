//! Input model: normalized pointer events, keys, modifiers, and the gesture
//! state machine's states.
//!
//! Mouse and touch arrive in different shapes. `PointerNormalizer` folds both
//! into a single `PointerEvent {pos, phase}` at the input boundary so the
//! engine never branches on input modality. Only the primary touch contact is
//! read; additional fingers are ignored.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::doc::ShapeId;
use crate::geom::{Point, Rect};

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// A keyboard key, parsed from the browser's key name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Delete,
    Backspace,
    Escape,
    /// Any key the engine does not act on.
    Other(String),
}

impl Key {
    /// Parse a key name as reported by `KeyboardEvent.key` (e.g. `"ArrowUp"`).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "Enter" => Self::Enter,
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Escape" => Self::Escape,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Unit direction for arrow keys, `None` for anything else.
    #[must_use]
    pub fn arrow_direction(&self) -> Option<(f64, f64)> {
        match self {
            Self::ArrowUp => Some((0.0, -1.0)),
            Self::ArrowDown => Some((0.0, 1.0)),
            Self::ArrowLeft => Some((-1.0, 0.0)),
            Self::ArrowRight => Some((1.0, 0.0)),
            _ => None,
        }
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

/// Phase of a normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Start,
    Move,
    End,
    /// The gesture was interrupted (touch cancel, lost pointer capture).
    Cancel,
}

/// A pointer event after mouse/touch unification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position in surface-local pixels.
    pub pos: Point,
    pub phase: PointerPhase,
}

impl PointerEvent {
    #[must_use]
    pub fn new(x: f64, y: f64, phase: PointerPhase) -> Self {
        Self { pos: Point::new(x, y), phase }
    }
}

/// Mouse event kinds the host forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MousePhase {
    Down,
    Move,
    Up,
}

/// Touch event kinds the host forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A raw input event as the host receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointer {
    Mouse { phase: MousePhase, pos: Point },
    /// `contacts` are the touch points reported with the event, primary first.
    /// For `End`/`Cancel` these are the changed touches and may be empty.
    Touch { phase: TouchPhase, contacts: Vec<Point> },
    /// The element lost pointer capture mid-gesture.
    CaptureLost,
}

/// Folds mouse and touch input into `PointerEvent`s.
///
/// Remembers the last position so events that carry no coordinates (a touch
/// end with no changed touches, a lost capture) still produce a position.
#[derive(Debug, Default)]
pub struct PointerNormalizer {
    last: Point,
}

impl PointerNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one raw event. Returns `None` for events that cannot drive
    /// the state machine (a touch start without contacts, non-finite
    /// coordinates).
    pub fn normalize(&mut self, raw: &RawPointer) -> Option<PointerEvent> {
        let (phase, pos) = match raw {
            RawPointer::Mouse { phase, pos } => {
                let phase = match phase {
                    MousePhase::Down => PointerPhase::Start,
                    MousePhase::Move => PointerPhase::Move,
                    MousePhase::Up => PointerPhase::End,
                };
                (phase, Some(*pos))
            }
            RawPointer::Touch { phase, contacts } => {
                let phase = match phase {
                    TouchPhase::Start => PointerPhase::Start,
                    TouchPhase::Move => PointerPhase::Move,
                    TouchPhase::End => PointerPhase::End,
                    TouchPhase::Cancel => PointerPhase::Cancel,
                };
                (phase, contacts.first().copied())
            }
            RawPointer::CaptureLost => (PointerPhase::Cancel, None),
        };

        let pos = match (pos, phase) {
            (Some(p), _) if p.is_finite() => p,
            (_, PointerPhase::End | PointerPhase::Cancel) => self.last,
            _ => return None,
        };
        self.last = pos;
        Some(PointerEvent { pos, phase })
    }
}

/// Gesture state between pointer-down and pointer-up.
///
/// Active variants keep the pointer and geometry captured at gesture start, so
/// every move is computed from the start rather than accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A shape body is being dragged.
    Dragging {
        id: ShapeId,
        start_pointer: Point,
        start_rect: Rect,
    },
    /// A shape is being resized from its handle.
    Resizing {
        id: ShapeId,
        start_pointer: Point,
        start_rect: Rect,
    },
}

impl InputState {
    /// The shape the active gesture operates on.
    #[must_use]
    pub fn active_shape(&self) -> Option<ShapeId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
