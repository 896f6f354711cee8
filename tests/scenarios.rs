//! End-to-end scenarios through the public controller API.
#![allow(clippy::float_cmp)]

use std::time::{Duration, Instant};

use lightpad::color::Rgb;
use lightpad::controller::CanvasController;
use lightpad::doc::{ShapeId, ShapeKind};
use lightpad::engine::Action;
use lightpad::error::CanvasError;
use lightpad::geom::{Point, Rect};
use lightpad::input::{PointerEvent, PointerPhase, RawPointer, TouchPhase};
use lightpad::persist::{FileStore, KeyValueStore, MemoryStore};

fn controller() -> CanvasController {
    let mut c = CanvasController::default();
    c.set_viewport(1200.0, 900.0);
    c
}

fn create(c: &mut CanvasController, kind: ShapeKind) -> ShapeId {
    match c.create_shape(kind).unwrap().first() {
        Some(Action::ShapeCreated { id, .. }) => *id,
        other => panic!("expected ShapeCreated, got {other:?}"),
    }
}

fn resize_by(c: &mut CanvasController, id: ShapeId, dx: f64, dy: f64) -> Rect {
    c.select(&id).unwrap();
    let handle = c.core().overlay(&id).unwrap().handle_rect().center();
    c.on_pointer(PointerEvent::new(handle.x, handle.y, PointerPhase::Start));
    c.on_pointer(PointerEvent::new(handle.x + dx, handle.y + dy, PointerPhase::Move));
    c.on_pointer(PointerEvent::new(handle.x + dx, handle.y + dy, PointerPhase::End));
    c.core().shape(&id).unwrap().rect
}

#[test]
fn warm_white_fills_the_surface_at_full_ambient() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Circle);
    c.set_base_color(Rgb::WHITE);
    c.set_warmth(0);
    c.set_ambient(100);
    c.flush();

    let palette = c.core().palette();
    assert_eq!(palette.shape, Rgb::new(255, 237, 214));
    assert_eq!(palette.background, palette.shape);
    assert_eq!(c.core().shape(&id).unwrap().color, palette.shape);
}

#[test]
fn fifty_first_shape_is_refused() {
    let mut c = controller();
    for _ in 0..50 {
        create(&mut c, ShapeKind::Square);
    }
    assert_eq!(c.create_shape(ShapeKind::Circle), Err(CanvasError::CapacityExceeded { limit: 50 }));
    assert_eq!(c.core().shape_count(), 50);
}

#[test]
fn saved_canvas_reloads_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = FileStore::new(tmp.path());

    let mut c = controller();
    create(&mut c, ShapeKind::Circle);
    let square = create(&mut c, ShapeKind::Square);
    c.set_geometry(&square, Rect::new(12.0, 34.0, 160.0, 90.0)).unwrap();
    c.set_ambient(50);
    c.set_warmth(80);
    c.set_glow(0);
    c.flush();
    c.save(&mut store).unwrap();

    let mut reloaded = controller();
    reloaded.load(&store);
    let before: Vec<(ShapeKind, Rect)> = c.core().shapes().iter().map(|s| (s.kind, s.rect)).collect();
    let after: Vec<(ShapeKind, Rect)> = reloaded.core().shapes().iter().map(|s| (s.kind, s.rect)).collect();
    assert_eq!(after, before);
    let s = reloaded.core().settings();
    assert_eq!((s.ambient, s.warmth, s.glow), (50, 80, 0));
}

#[test]
fn square_and_circle_resize_differently() {
    let mut c = controller();
    let square = create(&mut c, ShapeKind::Square);
    let circle = create(&mut c, ShapeKind::Circle);
    c.set_geometry(&square, Rect::new(0.0, 0.0, 150.0, 150.0)).unwrap();
    c.set_geometry(&circle, Rect::new(600.0, 400.0, 150.0, 150.0)).unwrap();

    let r = resize_by(&mut c, square, 30.0, 10.0);
    assert_eq!((r.width, r.height), (180.0, 160.0));
    let r = resize_by(&mut c, circle, 30.0, 10.0);
    assert_eq!((r.width, r.height), (180.0, 180.0));
}

#[test]
fn full_surface_round_trip_restores_ambient() {
    let mut c = controller();
    c.set_ambient(42);
    c.toggle_full_surface();
    assert_eq!(c.core().settings().ambient, 100);
    c.toggle_full_surface();
    assert_eq!(c.core().settings().ambient, 42);
}

#[test]
fn locked_canvas_ignores_gestures() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Square);
    let rect = c.core().shape(&id).unwrap().rect;
    let center = rect.center();
    c.set_locked(true);

    assert_eq!(c.select(&id), Err(CanvasError::Locked));
    c.on_pointer(PointerEvent::new(center.x, center.y, PointerPhase::Start));
    c.on_pointer(PointerEvent::new(center.x + 80.0, center.y, PointerPhase::Move));
    c.on_pointer(PointerEvent::new(center.x + 80.0, center.y, PointerPhase::End));

    assert_eq!(c.core().shape(&id).unwrap().rect, rect);
    assert!(c.core().selection().is_none());
    assert!(c.core().overlays().visible().is_none());
}

#[test]
fn slider_drag_recomputes_once_per_window() {
    let mut c = controller();
    create(&mut c, ShapeKind::Circle);
    let start = Instant::now();
    for i in 0..12 {
        c.set_warmth_at(i * 8, start + Duration::from_millis(u64::try_from(i).unwrap()));
    }
    assert_eq!(c.recompute_count(), 0);
    c.tick_at(start + Duration::from_millis(16));
    assert_eq!(c.recompute_count(), 1);
}

#[test]
fn corrupted_state_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set("lightpad.state", "{\"shapes\": 7}").unwrap();
    let mut c = controller();
    c.load(&store);
    assert_eq!(c.core().shape_count(), 0);
    assert_eq!(c.core().settings().warmth, 100);
}

#[test]
fn second_finger_is_ignored() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Square);
    let rect = c.core().shape(&id).unwrap().rect;
    let inside = rect.center();

    c.on_raw_pointer(&RawPointer::Touch {
        phase: TouchPhase::Start,
        contacts: vec![inside, Point::new(5.0, 5.0)],
    });
    c.on_raw_pointer(&RawPointer::Touch {
        phase: TouchPhase::Move,
        contacts: vec![Point::new(inside.x + 10.0, inside.y), Point::new(900.0, 900.0)],
    });
    c.on_raw_pointer(&RawPointer::Touch { phase: TouchPhase::End, contacts: Vec::new() });

    assert_eq!(c.core().shape(&id).unwrap().rect, rect.translated(10.0, 0.0));
}

#[test]
fn deleting_selected_shape_clears_its_overlay() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Circle);
    c.select(&id).unwrap();
    c.remove_shape(&id).unwrap();
    assert!(c.core().selection().is_none());
    assert!(c.core().overlay(&id).is_none());
    assert!(c.core().overlays().is_empty());
}
