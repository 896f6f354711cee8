use uuid::Uuid;

use super::*;

// =============================================================
// Key
// =============================================================

#[test]
fn key_from_name_maps_known_keys() {
    assert_eq!(Key::from_name("ArrowUp"), Key::ArrowUp);
    assert_eq!(Key::from_name("Enter"), Key::Enter);
    assert_eq!(Key::from_name("Backspace"), Key::Backspace);
    assert_eq!(Key::from_name("q"), Key::Other("q".into()));
}

#[test]
fn arrow_direction_only_for_arrows() {
    assert_eq!(Key::ArrowLeft.arrow_direction(), Some((-1.0, 0.0)));
    assert_eq!(Key::ArrowDown.arrow_direction(), Some((0.0, 1.0)));
    assert_eq!(Key::Enter.arrow_direction(), None);
}

#[test]
fn key_deserializes_from_name() {
    let key: Key = serde_json::from_str("\"Delete\"").unwrap();
    assert_eq!(key, Key::Delete);
}

#[test]
fn modifiers_default_all_false() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

// =============================================================
// PointerNormalizer
// =============================================================

#[test]
fn mouse_phases_map_to_pointer_phases() {
    let mut n = PointerNormalizer::new();
    let down = n.normalize(&RawPointer::Mouse { phase: MousePhase::Down, pos: Point::new(1.0, 2.0) });
    assert_eq!(down, Some(PointerEvent::new(1.0, 2.0, PointerPhase::Start)));
    let mv = n.normalize(&RawPointer::Mouse { phase: MousePhase::Move, pos: Point::new(3.0, 4.0) });
    assert_eq!(mv, Some(PointerEvent::new(3.0, 4.0, PointerPhase::Move)));
    let up = n.normalize(&RawPointer::Mouse { phase: MousePhase::Up, pos: Point::new(3.0, 4.0) });
    assert_eq!(up.map(|e| e.phase), Some(PointerPhase::End));
}

#[test]
fn touch_reads_only_primary_contact() {
    let mut n = PointerNormalizer::new();
    let ev = n.normalize(&RawPointer::Touch {
        phase: TouchPhase::Start,
        contacts: vec![Point::new(10.0, 20.0), Point::new(300.0, 400.0)],
    });
    assert_eq!(ev, Some(PointerEvent::new(10.0, 20.0, PointerPhase::Start)));
}

#[test]
fn touch_end_without_contacts_uses_last_position() {
    let mut n = PointerNormalizer::new();
    n.normalize(&RawPointer::Touch { phase: TouchPhase::Move, contacts: vec![Point::new(7.0, 8.0)] });
    let ev = n.normalize(&RawPointer::Touch { phase: TouchPhase::End, contacts: vec![] });
    assert_eq!(ev, Some(PointerEvent::new(7.0, 8.0, PointerPhase::End)));
}

#[test]
fn touch_start_without_contacts_is_dropped() {
    let mut n = PointerNormalizer::new();
    assert!(n.normalize(&RawPointer::Touch { phase: TouchPhase::Start, contacts: vec![] }).is_none());
}

#[test]
fn capture_lost_becomes_cancel() {
    let mut n = PointerNormalizer::new();
    n.normalize(&RawPointer::Mouse { phase: MousePhase::Move, pos: Point::new(5.0, 6.0) });
    let ev = n.normalize(&RawPointer::CaptureLost);
    assert_eq!(ev, Some(PointerEvent::new(5.0, 6.0, PointerPhase::Cancel)));
}

#[test]
fn non_finite_move_is_dropped() {
    let mut n = PointerNormalizer::new();
    let ev = n.normalize(&RawPointer::Mouse { phase: MousePhase::Move, pos: Point::new(f64::NAN, 0.0) });
    assert!(ev.is_none());
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(InputState::default().is_idle());
    assert_eq!(InputState::default().active_shape(), None);
}

#[test]
fn active_shape_reports_gesture_target() {
    let id = Uuid::new_v4();
    let state = InputState::Resizing { id, start_pointer: Point::default(), start_rect: Rect::default() };
    assert_eq!(state.active_shape(), Some(id));
    assert!(!state.is_idle());
}
