#![allow(clippy::float_cmp)]

use std::time::Duration;

use super::*;
use crate::color::compute_colors;
use crate::persist::MemoryStore;

// =============================================================
// Helpers
// =============================================================

fn controller() -> CanvasController {
    let mut c = CanvasController::default();
    c.set_viewport(1000.0, 800.0);
    c
}

fn create(c: &mut CanvasController, kind: ShapeKind) -> ShapeId {
    match c.create_shape(kind).unwrap().first() {
        Some(Action::ShapeCreated { id, .. }) => *id,
        other => panic!("expected ShapeCreated, got {other:?}"),
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn recolored(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::ShapesRecolored { .. }))
}

// =============================================================
// Slider coalescing
// =============================================================

#[test]
fn slider_value_is_stored_immediately() {
    let mut c = controller();
    let start = Instant::now();
    let actions = c.set_warmth_at(40, start);
    assert!(actions.is_empty());
    assert_eq!(c.core().settings().warmth, 40);
    assert!(c.has_pending_update());
    assert_eq!(c.next_deadline(), Some(start + ms(16)));
}

#[test]
fn burst_inside_window_recomputes_once() {
    let mut c = controller();
    create(&mut c, ShapeKind::Square);
    let start = Instant::now();
    for (i, v) in (0..=100).step_by(10).enumerate() {
        let at = start + ms(u64::try_from(i).unwrap());
        assert!(c.set_warmth_at(v, at).is_empty());
    }
    assert!(c.tick_at(start + ms(15)).is_empty());
    assert_eq!(c.recompute_count(), 0);

    let actions = c.tick_at(start + ms(16));
    assert!(recolored(&actions));
    assert_eq!(c.recompute_count(), 1);
    assert!(c.tick_at(start + ms(100)).is_empty());
    assert_eq!(c.recompute_count(), 1);
}

#[test]
fn change_after_window_flushes_without_tick() {
    let mut c = controller();
    let start = Instant::now();
    c.set_ambient_at(10, start);
    let actions = c.set_ambient_at(20, start + ms(20));
    assert!(recolored(&actions));
    assert_eq!(c.recompute_count(), 1);
    assert_eq!(c.core().palette().background, compute_colors(Rgb::WHITE, 100, 20).background);
}

#[test]
fn recompute_applies_to_every_shape_and_background() {
    let mut c = controller();
    let a = create(&mut c, ShapeKind::Square);
    let b = create(&mut c, ShapeKind::Circle);
    c.set_warmth(0);
    c.set_ambient(100);
    let actions = c.flush();
    let expected = compute_colors(Rgb::WHITE, 0, 100);
    assert_eq!(expected.shape, Rgb::new(255, 237, 214));
    assert!(actions.contains(&Action::BackgroundChanged { color: expected.shape }));
    assert_eq!(c.core().shape(&a).unwrap().color, expected.shape);
    assert_eq!(c.core().shape(&b).unwrap().color, expected.shape);
}

#[test]
fn flush_without_pending_is_silent() {
    let mut c = controller();
    assert!(c.flush().is_empty());
    assert_eq!(c.recompute_count(), 0);
}

#[test]
fn out_of_range_values_are_clamped() {
    let mut c = controller();
    c.set_warmth(250);
    c.set_ambient(-4);
    assert_eq!(c.core().settings().warmth, 100);
    assert_eq!(c.core().settings().ambient, 0);
    c.set_channel(Channel::Green, 999);
    c.set_channel(Channel::Blue, -1);
    assert_eq!(c.core().settings().base_color, Rgb::new(255, 255, 0));
}

#[test]
fn channel_and_reset_base_color() {
    let mut c = controller();
    c.set_channel(Channel::Red, 10);
    c.set_base_color(Rgb::new(1, 2, 3));
    c.set_channel(Channel::Green, 200);
    assert_eq!(c.core().settings().base_color, Rgb::new(1, 200, 3));
    c.reset_base_color();
    assert_eq!(c.core().settings().base_color, Rgb::WHITE);
}

// =============================================================
// Glow
// =============================================================

#[test]
fn glow_disabled_without_shapes() {
    let mut c = controller();
    assert!(!c.glow_enabled());
    assert!(c.set_glow(40).is_empty());
    assert_eq!(c.core().settings().glow, 0);

    create(&mut c, ShapeKind::Circle);
    assert!(c.glow_enabled());
    assert_eq!(c.set_glow(140), vec![Action::GlowChanged { glow: 100 }, Action::RenderNeeded]);
}

// =============================================================
// Lock
// =============================================================

#[test]
fn lock_recomputes_immediately() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Square);
    c.select(&id).unwrap();
    c.set_warmth(10);
    let actions = c.set_locked(true);
    assert!(actions.contains(&Action::LockChanged { locked: true }));
    assert!(recolored(&actions));
    assert!(!c.has_pending_update());
    assert!(c.core().selection().is_none());
    assert!(c.set_locked(true).is_empty());
}

#[test]
fn lock_without_pending_change_skips_recompute() {
    let mut c = controller();
    create(&mut c, ShapeKind::Square);
    let before = c.recompute_count();
    let actions = c.set_locked(true);
    assert_eq!(actions, vec![Action::LockChanged { locked: true }, Action::RenderNeeded]);
    assert!(!recolored(&actions));
    assert_eq!(c.recompute_count(), before);
    c.set_locked(false);
    assert_eq!(c.recompute_count(), before);
}

// =============================================================
// Full-surface illumination
// =============================================================

#[test]
fn full_surface_pins_and_restores_ambient() {
    let mut c = controller();
    c.set_ambient(37);
    let actions = c.toggle_full_surface();
    assert_eq!(actions.first(), Some(&Action::FullSurfaceChanged { on: true, ambient: 100 }));
    assert!(recolored(&actions));
    assert_eq!(c.core().palette().background, c.core().palette().shape);

    let actions = c.toggle_full_surface();
    assert_eq!(actions.first(), Some(&Action::FullSurfaceChanged { on: false, ambient: 37 }));
    assert_eq!(c.core().settings().ambient, 37);
}

#[test]
fn ambient_slider_ignored_during_full_surface() {
    let mut c = controller();
    c.set_ambient(20);
    c.toggle_full_surface();
    assert!(c.set_ambient(5).is_empty());
    assert_eq!(c.core().settings().ambient, 100);
    c.toggle_full_surface();
    assert_eq!(c.core().settings().ambient, 20);
}

#[test]
fn full_surface_keeps_shapes_by_default() {
    let mut c = controller();
    create(&mut c, ShapeKind::Square);
    c.toggle_full_surface();
    assert_eq!(c.core().shape_count(), 1);
}

#[test]
fn full_surface_can_clear_shapes() {
    let config = EngineConfig { full_surface_clears_shapes: true, ..EngineConfig::default() };
    let mut c = CanvasController::new(config);
    create(&mut c, ShapeKind::Square);
    create(&mut c, ShapeKind::Circle);
    let actions = c.toggle_full_surface();
    assert_eq!(actions.iter().filter(|a| matches!(a, Action::ShapeDeleted { .. })).count(), 2);
    assert_eq!(c.core().shape_count(), 0);
    c.toggle_full_surface();
    assert_eq!(c.core().shape_count(), 0);
}

// =============================================================
// Clicks
// =============================================================

#[test]
fn background_click_deselects() {
    let mut c = controller();
    let id = create(&mut c, ShapeKind::Square);
    c.select(&id).unwrap();
    assert_eq!(c.click_on_empty_canvas(), vec![Action::SelectionChanged { id: None }]);
    assert!(c.core().selection().is_none());
}

// =============================================================
// Persistence
// =============================================================

#[test]
fn save_then_load_restores_canvas() {
    let mut c = controller();
    let a = create(&mut c, ShapeKind::Circle);
    let b = create(&mut c, ShapeKind::Square);
    c.set_geometry(&b, Rect::new(30.0, 40.0, 120.0, 90.0)).unwrap();
    c.set_ambient(50);
    c.set_warmth(80);
    c.flush();

    let mut store = MemoryStore::new();
    c.save(&mut store).unwrap();

    let mut restored = controller();
    restored.load(&store);
    let shapes = restored.core().shapes();
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].kind, ShapeKind::Circle);
    assert_eq!(shapes[0].rect, c.core().shape(&a).unwrap().rect);
    assert_eq!(shapes[1].rect, Rect::new(30.0, 40.0, 120.0, 90.0));
    assert_eq!(restored.core().settings().ambient, 50);
    assert_eq!(restored.core().settings().warmth, 80);
    assert_eq!(restored.core().palette(), compute_colors(Rgb::WHITE, 80, 50));
    assert_eq!(restored.snapshot(), c.snapshot());
}

#[test]
fn snapshot_saves_chosen_ambient_during_full_surface() {
    let mut c = controller();
    c.set_ambient(30);
    c.toggle_full_surface();
    assert_eq!(c.snapshot().settings.ambient, 30);
}

#[test]
fn load_malformed_record_uses_defaults() {
    let mut c = controller();
    create(&mut c, ShapeKind::Square);
    c.set_warmth(10);
    let mut store = MemoryStore::new();
    store.set(STATE_KEY, "{\"shapes\": [oops").unwrap();

    c.load(&store);
    assert_eq!(c.core().shape_count(), 0);
    assert_eq!(c.core().settings().warmth, 100);
    assert!(!c.has_pending_update());
}

#[test]
fn load_empty_store_uses_defaults() {
    let mut c = controller();
    let actions = c.load(&MemoryStore::new());
    assert!(recolored(&actions));
    assert_eq!(c.core().settings().ambient, 0);
}

#[test]
fn restore_clamps_out_of_range_levels() {
    let mut c = controller();
    let snapshot = Snapshot {
        shapes: Vec::new(),
        settings: SettingsRecord { ambient: 200, warmth: 150, glow: 255, base_color: Rgb::BLACK },
    };
    c.restore(&snapshot);
    let s = c.core().settings();
    assert_eq!((s.ambient, s.warmth, s.glow), (100, 100, 100));
    assert_eq!(s.base_color, Rgb::BLACK);
}

#[test]
fn restore_floors_undersized_shapes() {
    let mut c = controller();
    let raw = r#"{"shapes":[{"type":"square","position":{"left":"0px","top":"0px"},"size":{"width":"5px","height":"300px"}}]}"#;
    c.restore(&Snapshot::from_json(raw).unwrap());
    let rect = c.core().shapes()[0].rect;
    assert_eq!((rect.width, rect.height), (50.0, 300.0));
}

#[test]
fn restore_switches_full_surface_off_with_action() {
    let mut c = controller();
    c.set_ambient(30);
    c.toggle_full_surface();
    let snapshot = Snapshot {
        shapes: Vec::new(),
        settings: SettingsRecord { ambient: 40, warmth: 90, glow: 50, base_color: Rgb::WHITE },
    };
    let actions = c.restore(&snapshot);
    assert_eq!(actions.first(), Some(&Action::FullSurfaceChanged { on: false, ambient: 40 }));
    assert!(!c.core().settings().full_surface);

    let actions = c.restore(&snapshot);
    assert!(!actions.iter().any(|a| matches!(a, Action::FullSurfaceChanged { .. })));
}

#[test]
fn nan_offset_cycle_still_saves_and_reloads_every_shape() {
    let config = EngineConfig { offset_cycle: f64::NAN, ..EngineConfig::default() };
    let mut c = CanvasController::new(config);
    c.set_viewport(1000.0, 800.0);
    create(&mut c, ShapeKind::Square);
    create(&mut c, ShapeKind::Square);
    let mut store = MemoryStore::new();
    c.save(&mut store).unwrap();
    assert!(!store.get(STATE_KEY).unwrap().unwrap().contains("NaN"));

    let mut reloaded = controller();
    reloaded.load(&store);
    assert_eq!(reloaded.core().shape_count(), 2);
}
