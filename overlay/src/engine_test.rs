#![allow(clippy::float_cmp)]

use super::*;
use crate::artwork::{ArtworkTier, SceneNode};
use crate::records::{SheetColumns, parse_status_sheet};

// =============================================================
// Helpers
// =============================================================

const SHEET: &str = "StandID,Status,Size,Price\nA,Available,120,R 10\nB,Pending,,R 20\n";

fn scene() -> Scene {
    Scene {
        view_box: Some([0.0, 0.0, 1000.0, 1000.0]),
        nodes: vec![SceneNode::group(vec![SceneNode::image(100.0, 100.0, 50.0, 50.0)]).with_id("plan")],
    }
}

fn polygons() -> Vec<RawPolygon> {
    vec![
        RawPolygon { id: "A".into(), points: "0,0 4,0 4,4 0,4".into() },
        RawPolygon { id: "B".into(), points: "6,6 10,6 10,10 6,10".into() },
        RawPolygon { id: "stand-C".into(), points: "0,6 4,6 4,10".into() },
    ]
}

fn statuses() -> StatusMap {
    parse_status_sheet(SHEET, &SheetColumns::default()).unwrap()
}

fn loaded() -> OverlayCore {
    let mut core = OverlayCore::default();
    let s = scene();
    core.load(&s, &s, &polygons(), &statuses());
    core
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn shape(id: &str) -> PointerTarget {
    PointerTarget::Shape(id.to_string())
}

/// Press and release on a shape with the given travel.
fn click_with_travel(core: &mut OverlayCore, id: &str, pointer_id: PointerId, travel: f64) -> Vec<Action> {
    let mut actions = core.on_pointer_down(shape(id), pointer_id, Button::Primary, pt(200.0, 200.0));
    actions.extend(core.on_pointer_up(pointer_id, pt(200.0 + travel, 200.0)));
    actions
}

fn click(core: &mut OverlayCore, id: &str) -> Vec<Action> {
    click_with_travel(core, id, 1, 0.0)
}

fn has_action<F>(actions: &[Action], pred: F) -> bool
where
    F: Fn(&Action) -> bool,
{
    actions.iter().any(pred)
}

fn has_lock_change(actions: &[Action]) -> bool {
    has_action(actions, |a| matches!(a, Action::SetActive(_)))
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_core_is_empty_and_idle() {
    let core = OverlayCore::default();
    assert!(core.shapes().is_empty());
    assert!(core.locked_id().is_none());
    assert_eq!(core.input(), &InputState::Idle);
    assert_eq!(core.alignment(), Alignment::Unmappable);
    assert!(core.view_box().is_none());
    assert_eq!(core.viewport().state(), ViewportState::default());
}

#[test]
fn config_zoom_limits_reach_viewport() {
    let mut config = OverlayConfig::default();
    config.zoom.max_scale = 2.0;
    let core = OverlayCore::new(config);
    assert_eq!(core.viewport().limits().max, 2.0);
}

// =============================================================
// load
// =============================================================

#[test]
fn load_fits_polygons_onto_artwork() {
    let core = loaded();
    assert_eq!(core.artwork().unwrap().tier, ArtworkTier::LargestImage);
    assert_eq!(core.view_box(), Some(BoundingBox::from_rect(100.0, 100.0, 50.0, 50.0)));

    let a = core.shape("A").unwrap();
    assert_eq!(a.points, vec![pt(100.0, 100.0), pt(120.0, 100.0), pt(120.0, 120.0), pt(100.0, 120.0)]);
    let b = core.shape("B").unwrap();
    assert_eq!(b.points[2], pt(150.0, 150.0));
}

#[test]
fn load_resolves_status_and_colour() {
    let core = loaded();
    let a = core.shape("A").unwrap();
    assert_eq!(a.status, StatusKey::Available);
    assert_eq!(a.fill, "#2ecc71");
    let b = core.shape("B").unwrap();
    assert_eq!(b.status, StatusKey::Reserved);
    assert_eq!(b.fill, "#f4b400");
}

#[test]
fn load_without_status_rows_renders_unknown() {
    let mut core = OverlayCore::default();
    let s = scene();
    core.load(&s, &s, &polygons(), &StatusMap::new());
    assert_eq!(core.shapes().len(), 3);
    assert!(core.shapes().iter().all(|sh| sh.status == StatusKey::Unknown && sh.fill == "#9ea3a8"));
}

#[test]
fn load_without_polygons_leaves_layer_empty() {
    let mut core = OverlayCore::default();
    let s = scene();
    core.load(&s, &s, &[], &statuses());
    assert!(core.shapes().is_empty());
    assert!(core.view_box().is_some());
}

#[test]
fn load_with_degenerate_polygons_passes_points_through() {
    let mut core = OverlayCore::default();
    let s = scene();
    let polys = vec![RawPolygon { id: "dot".into(), points: "3,4 3,4".into() }];
    core.load(&s, &s, &polys, &StatusMap::new());
    assert_eq!(core.alignment(), Alignment::Unmappable);
    assert_eq!(core.shape("dot").unwrap().points, vec![pt(3.0, 4.0), pt(3.0, 4.0)]);
}

#[test]
fn load_applies_fine_tune_from_config() {
    let mut config = OverlayConfig::default();
    config.fine_tune.dx = 10.0;
    config.fine_tune.dy = -5.0;
    let mut core = OverlayCore::new(config);
    let s = scene();
    core.load(&s, &s, &polygons(), &statuses());
    assert_eq!(core.shape("A").unwrap().points[0], pt(110.0, 95.0));
}

#[test]
fn reload_replaces_shapes_and_drops_lock() {
    let mut core = loaded();
    click(&mut core, "A");
    assert_eq!(core.locked_id(), Some("A"));
    let s = scene();
    let actions = core.load(&s, &s, &polygons()[1..], &statuses());
    assert_eq!(actions, vec![Action::ClearDetails, Action::SetActive(None)]);
    assert_eq!(core.shapes().len(), 2);
    assert!(core.shape("A").is_none());
    assert!(core.locked_id().is_none());
}

#[test]
fn reload_clears_hover_panel() {
    let mut core = loaded();
    core.on_pointer_enter("A");
    let s = scene();
    assert_eq!(core.load(&s, &s, &polygons(), &statuses()), vec![Action::ClearDetails]);
    assert_eq!(core.display("A"), ShapeDisplay::Idle);
}

#[test]
fn reload_of_idle_core_emits_nothing() {
    let mut core = loaded();
    let s = scene();
    assert!(core.load(&s, &s, &polygons(), &statuses()).is_empty());
}

#[test]
fn reload_mid_pan_keeps_gesture() {
    let mut core = loaded();
    core.on_pointer_down(PointerTarget::Canvas, 3, Button::Primary, pt(10.0, 10.0));
    let s = scene();
    assert!(core.load(&s, &s, &polygons(), &statuses()).is_empty());
    assert!(matches!(core.input(), InputState::Panning { pointer_id: 3, .. }));

    let moved = core.on_pointer_move(3, pt(20.0, 10.0));
    assert_eq!(moved.len(), 1);
    let up = core.on_pointer_up(3, pt(20.0, 10.0));
    assert_eq!(up, vec![Action::ReleasePointer { target: PointerTarget::Canvas, pointer_id: 3 }, Action::SetGrabbing(false)]);
}

#[test]
fn reload_mid_shape_press_releases_capture() {
    let mut core = loaded();
    core.on_pointer_down(shape("A"), 5, Button::Primary, pt(0.0, 0.0));
    let s = scene();
    let actions = core.load(&s, &s, &polygons(), &statuses());
    assert_eq!(actions, vec![Action::ReleasePointer { target: shape("A"), pointer_id: 5 }]);
    assert_eq!(core.input(), &InputState::Idle);
    assert!(core.on_pointer_up(5, pt(0.0, 0.0)).is_empty());
    assert!(core.locked_id().is_none());
}

// =============================================================
// Click vs drag
// =============================================================

#[test]
fn shape_press_captures_pointer_first() {
    let mut core = loaded();
    let actions = core.on_pointer_down(shape("A"), 7, Button::Primary, pt(1.0, 1.0));
    assert_eq!(actions, vec![Action::CapturePointer { target: shape("A"), pointer_id: 7 }]);
    assert!(matches!(core.input(), InputState::PressingShape { shape_id, .. } if shape_id == "A"));
}

#[test]
fn click_within_tolerance_locks() {
    let mut core = loaded();
    let actions = click_with_travel(&mut core, "A", 1, 6.0);
    assert_eq!(&actions[..2], &[
        Action::CapturePointer { target: shape("A"), pointer_id: 1 },
        Action::ReleasePointer { target: shape("A"), pointer_id: 1 },
    ]);
    assert!(has_action(&actions, |a| matches!(a, Action::ShowDetails(d) if d.locked && d.label == "A")));
    assert!(has_action(&actions, |a| *a == Action::SetActive(Some("A".into()))));
    assert_eq!(core.locked_id(), Some("A"));
    assert_eq!(core.input(), &InputState::Idle);
}

#[test]
fn travel_beyond_tolerance_is_a_drag() {
    let mut core = loaded();
    let actions = click_with_travel(&mut core, "A", 1, 6.5);
    assert_eq!(actions, vec![
        Action::CapturePointer { target: shape("A"), pointer_id: 1 },
        Action::ReleasePointer { target: shape("A"), pointer_id: 1 },
    ]);
    assert!(core.locked_id().is_none());
}

#[test]
fn drag_on_locked_shape_keeps_lock() {
    let mut core = loaded();
    click(&mut core, "A");
    click_with_travel(&mut core, "A", 1, 40.0);
    assert_eq!(core.locked_id(), Some("A"));
}

#[test]
fn custom_click_tolerance_is_used() {
    let mut config = OverlayConfig::default();
    config.click_tolerance_px = 1.0;
    let mut core = OverlayCore::new(config);
    let s = scene();
    core.load(&s, &s, &polygons(), &statuses());
    click_with_travel(&mut core, "A", 1, 2.0);
    assert!(core.locked_id().is_none());
}

#[test]
fn second_click_unlocks() {
    let mut core = loaded();
    click(&mut core, "A");
    let actions = click(&mut core, "A");
    assert!(has_action(&actions, |a| *a == Action::ClearDetails));
    assert!(has_action(&actions, |a| *a == Action::SetActive(None)));
    assert!(core.locked_id().is_none());
    assert_eq!(core.display("A"), ShapeDisplay::Idle);
}

#[test]
fn clicking_b_after_a_moves_lock() {
    let mut core = loaded();
    click(&mut core, "A");
    click(&mut core, "B");
    assert_eq!(core.locked_id(), Some("B"));
    assert_eq!(core.display("A"), ShapeDisplay::Idle);
    assert_eq!(core.display("B"), ShapeDisplay::LockedHovered);
}

#[test]
fn duplicate_pointer_up_toggles_once() {
    let mut core = loaded();
    click(&mut core, "A");
    let again = core.on_pointer_up(1, pt(200.0, 200.0));
    assert!(again.is_empty());
    assert_eq!(core.locked_id(), Some("A"));
}

#[test]
fn pointer_up_from_other_pointer_is_ignored() {
    let mut core = loaded();
    core.on_pointer_down(shape("A"), 1, Button::Primary, pt(0.0, 0.0));
    assert!(core.on_pointer_up(2, pt(0.0, 0.0)).is_empty());
    assert!(matches!(core.input(), InputState::PressingShape { .. }));
    assert!(!core.on_pointer_up(1, pt(0.0, 0.0)).is_empty());
    assert_eq!(core.locked_id(), Some("A"));
}

#[test]
fn cancel_during_shape_press_produces_no_click() {
    let mut core = loaded();
    core.on_pointer_down(shape("A"), 3, Button::Primary, pt(0.0, 0.0));
    let actions = core.on_pointer_cancel(3);
    assert_eq!(actions, vec![Action::ReleasePointer { target: shape("A"), pointer_id: 3 }]);
    assert!(core.on_pointer_up(3, pt(0.0, 0.0)).is_empty());
    assert!(core.locked_id().is_none());
}

#[test]
fn press_on_unknown_shape_is_ignored() {
    let mut core = loaded();
    assert!(core.on_pointer_down(shape("Z"), 1, Button::Primary, pt(0.0, 0.0)).is_empty());
    assert_eq!(core.input(), &InputState::Idle);
}

// =============================================================
// Pan arbitration
// =============================================================

#[test]
fn canvas_drag_pans_viewport() {
    let mut core = loaded();
    let down = core.on_pointer_down(PointerTarget::Canvas, 4, Button::Primary, pt(10.0, 10.0));
    assert_eq!(down, vec![Action::CapturePointer { target: PointerTarget::Canvas, pointer_id: 4 }, Action::SetGrabbing(true)]);

    core.on_pointer_move(4, pt(25.0, 5.0));
    let moved = core.on_pointer_move(4, pt(30.0, 0.0));
    let state = core.viewport().state();
    assert_eq!((state.translate_x, state.translate_y), (20.0, -10.0));
    assert_eq!(moved, vec![Action::ViewportChanged(state)]);

    let up = core.on_pointer_up(4, pt(30.0, 0.0));
    assert_eq!(up, vec![Action::ReleasePointer { target: PointerTarget::Canvas, pointer_id: 4 }, Action::SetGrabbing(false)]);
    assert_eq!(core.input(), &InputState::Idle);
}

#[test]
fn canvas_pan_requires_primary_button() {
    let mut core = loaded();
    assert!(core.on_pointer_down(PointerTarget::Canvas, 1, Button::Secondary, pt(0.0, 0.0)).is_empty());
    assert!(core.on_pointer_move(1, pt(50.0, 50.0)).is_empty());
    assert_eq!(core.viewport().state(), ViewportState::default());
}

#[test]
fn shape_press_never_starts_pan() {
    let mut core = loaded();
    core.on_pointer_down(shape("A"), 1, Button::Primary, pt(0.0, 0.0));
    assert!(core.on_pointer_move(1, pt(80.0, 80.0)).is_empty());
    assert_eq!(core.viewport().state(), ViewportState::default());
    core.on_pointer_up(1, pt(80.0, 80.0));
    assert!(core.locked_id().is_none());
}

#[test]
fn shape_press_ignored_while_other_pointer_pans() {
    let mut core = loaded();
    core.on_pointer_down(PointerTarget::Canvas, 1, Button::Primary, pt(0.0, 0.0));
    assert!(core.on_pointer_down(shape("A"), 2, Button::Primary, pt(0.0, 0.0)).is_empty());
    assert!(matches!(core.input(), InputState::Panning { .. }));
}

#[test]
fn pan_moves_from_other_pointer_are_ignored() {
    let mut core = loaded();
    core.on_pointer_down(PointerTarget::Canvas, 1, Button::Primary, pt(0.0, 0.0));
    assert!(core.on_pointer_move(2, pt(40.0, 40.0)).is_empty());
    assert_eq!(core.viewport().state(), ViewportState::default());
}

#[test]
fn cancel_ends_pan() {
    let mut core = loaded();
    core.on_pointer_down(PointerTarget::Canvas, 1, Button::Primary, pt(0.0, 0.0));
    let actions = core.on_pointer_cancel(1);
    assert!(has_action(&actions, |a| *a == Action::SetGrabbing(false)));
    assert_eq!(core.input(), &InputState::Idle);
}

#[test]
fn drag_started_on_canvas_never_locks() {
    let mut core = loaded();
    core.on_pointer_down(PointerTarget::Canvas, 1, Button::Primary, pt(0.0, 0.0));
    let actions = core.on_pointer_up(1, pt(0.0, 0.0));
    assert!(!has_lock_change(&actions));
    assert!(core.locked_id().is_none());
}

// =============================================================
// Hover
// =============================================================

#[test]
fn hover_shows_unlocked_details() {
    let mut core = loaded();
    let actions = core.on_pointer_enter("A");
    let Some(Action::ShowDetails(d)) = actions.first() else {
        panic!("expected details, got {actions:?}");
    };
    assert_eq!(d.label, "A");
    assert_eq!(d.status, StatusKey::Available);
    assert_eq!(d.raw_status, "Available");
    assert!(!d.locked);
    assert_eq!(core.display("A"), ShapeDisplay::Hovered);
    assert_eq!(core.on_pointer_leave("A"), vec![Action::ClearDetails]);
}

#[test]
fn hover_on_other_shape_suppressed_while_locked() {
    let mut core = loaded();
    click(&mut core, "A");
    assert!(core.on_pointer_enter("B").is_empty());
    assert!(core.on_pointer_leave("B").is_empty());
    assert_eq!(core.display("B"), ShapeDisplay::Idle);
}

#[test]
fn hover_events_for_unknown_shapes_are_ignored() {
    let mut core = loaded();
    assert!(core.on_pointer_enter("nope").is_empty());
    assert!(core.on_pointer_leave("nope").is_empty());
}

// =============================================================
// Escape
// =============================================================

#[test]
fn escape_unlocks_regardless_of_pointer() {
    let mut core = loaded();
    click(&mut core, "A");
    core.on_pointer_enter("A");
    let actions = core.on_key_down(&Key("Escape".into()));
    assert_eq!(actions, vec![Action::ClearDetails, Action::SetActive(None)]);
    assert!(core.locked_id().is_none());
    assert_eq!(core.display("A"), ShapeDisplay::Idle);
}

#[test]
fn other_keys_do_nothing() {
    let mut core = loaded();
    click(&mut core, "A");
    assert!(core.on_key_down(&Key("Delete".into())).is_empty());
    assert_eq!(core.locked_id(), Some("A"));
}

// =============================================================
// Details
// =============================================================

#[test]
fn details_decorate_size_and_keep_attribute_order() {
    let core = loaded();
    let d = core.details("A", true);
    assert_eq!(d.attributes, vec![("Size".to_string(), "120 m²".to_string()), ("Price".to_string(), "R 10".to_string())]);
    assert!(d.locked);
}

#[test]
fn details_leave_empty_size_alone() {
    let core = loaded();
    assert_eq!(core.details("B", false).attributes[0], ("Size".to_string(), String::new()));
}

#[test]
fn details_use_stripped_prefix_record_or_fallbacks() {
    let mut statuses = statuses();
    statuses.insert(StatusRecord { id: "C".into(), status: StatusKey::Unknown, raw_status: String::new(), attributes: Vec::new() });
    let mut core = OverlayCore::default();
    let s = scene();
    core.load(&s, &s, &polygons(), &statuses);

    let d = core.details("stand-C", false);
    assert_eq!(d.label, "C");
    assert_eq!(d.raw_status, "unknown");
}

#[test]
fn details_without_record_use_shape_id() {
    let mut core = OverlayCore::default();
    let s = scene();
    core.load(&s, &s, &polygons(), &StatusMap::new());
    let d = core.details("B", false);
    assert_eq!(d.label, "B");
    assert_eq!(d.status, StatusKey::Unknown);
    assert_eq!(d.raw_status, "unknown");
    assert!(d.attributes.is_empty());
}

// =============================================================
// Wheel / zoom buttons
// =============================================================

#[test]
fn wheel_zoom_is_anchored_at_pointer() {
    let mut core = loaded();
    core.set_screen_ctm(ScreenMatrix::scale_translate(0.8, 30.0, 0.0));
    let pointer = pt(300.0, 220.0);
    let before = core.viewport().screen_to_scene(pointer);
    let actions = core.on_wheel(pointer, -120.0);
    assert_eq!(actions.len(), 1);
    let after = core.viewport().screen_to_scene(pointer);
    assert!((after.x - before.x).abs() < 1e-9 && (after.y - before.y).abs() < 1e-9);
}

#[test]
fn wheel_at_limit_reports_nothing() {
    let mut core = loaded();
    core.on_wheel(pt(0.0, 0.0), -1e6);
    assert!(core.on_wheel(pt(0.0, 0.0), -100.0).is_empty());
}

#[test]
fn unvalidated_zoom_limits_do_not_panic() {
    let mut config = OverlayConfig::default();
    config.zoom.min_scale = 4.0;
    config.zoom.max_scale = 1.0;
    let mut core = OverlayCore::new(config);
    assert_eq!(core.on_wheel(pt(0.0, 0.0), -200.0).len(), 1);

    let mut config = OverlayConfig::default();
    config.zoom.min_scale = 2.0;
    config.zoom.max_scale = 3.0;
    let mut core = OverlayCore::new(config);
    assert_eq!(core.viewport().state().scale, 2.0);
    let reset = core.zoom_reset();
    assert_eq!(reset, vec![Action::ViewportChanged(ViewportState { scale: 2.0, translate_x: 0.0, translate_y: 0.0 })]);
}

#[test]
fn zoom_buttons_step_and_reset() {
    let mut core = loaded();
    let rect = BoundingBox::from_rect(0.0, 0.0, 800.0, 600.0);
    core.zoom_in(&rect);
    assert!((core.viewport().state().scale - 0.25_f64.exp()).abs() < 1e-12);
    core.zoom_out(&rect);
    assert!((core.viewport().state().scale - 1.0).abs() < 1e-12);
    core.zoom_in(&rect);
    let actions = core.zoom_reset();
    assert_eq!(actions, vec![Action::ViewportChanged(ViewportState::default())]);
}
