//! Integration tests: pointer gestures through the controller into history.

use gd_core::{Color, Coord, FeatureId, Geometry, LayerId, Map, PointProperties, StyleProperties};
use gd_editor::{
    EditorConfig, EditorController, KeyEvent, Modifiers, PointerEvent, Task, ToolInteraction,
    ToolKind,
};
use pretty_assertions::assert_eq;

const KEY: &str = "map-editing";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor_with(tool: ToolKind) -> EditorController {
    init_logging();
    let mut editor = EditorController::new(Map::with_vector_layer("Drawings"), EditorConfig::default());
    editor.select_tool(tool);
    editor
}

fn click(editor: &mut EditorController, x: f64, y: f64) {
    editor.handle_pointer(&PointerEvent::down(x, y));
    editor.handle_pointer(&PointerEvent::up(x, y));
}

fn point(x: f64, y: f64) -> Geometry {
    Geometry::Point(Coord::new(x, y))
}

fn only_id(editor: &EditorController) -> FeatureId {
    let collection = editor.map().active_collection().unwrap();
    assert_eq!(collection.len(), 1);
    collection.iter().next().unwrap().id
}

/// Geometry, style and membership of every vector layer, ignoring
/// transient selection flags.
fn content(map: &Map) -> Vec<(LayerId, Vec<(FeatureId, Geometry, StyleProperties)>)> {
    map.layers
        .iter()
        .filter_map(|layer| {
            let features = layer.features()?;
            Some((
                layer.id,
                features
                    .iter()
                    .map(|f| (f.id, f.geometry.clone(), f.style.clone()))
                    .collect(),
            ))
        })
        .collect()
}

// ─── Point tool scenario ────────────────────────────────────────────────

#[test]
fn click_creates_then_drag_updates_same_feature() {
    let mut editor = editor_with(ToolKind::Point);

    click(&mut editor, 2.0, 2.0);
    let id = only_id(&editor);
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(2.0, 2.0));
    assert!(matches!(
        editor.history().peek_undo(KEY),
        Some(Task::AddFeatures { .. })
    ));

    editor.handle_pointer(&PointerEvent::down(2.0, 2.0));
    editor.handle_pointer(&PointerEvent::drag(3.5, 4.0));
    editor.handle_pointer(&PointerEvent::drag(5.0, 5.0));
    editor.handle_pointer(&PointerEvent::up(5.0, 5.0));

    assert_eq!(only_id(&editor), id);
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(5.0, 5.0));
    assert_eq!(editor.history().undo_len(KEY), 2);
    match editor.history().peek_undo(KEY) {
        Some(Task::UpdateGeometries(changes)) => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].feature, id);
            assert_eq!(changes[0].before, point(2.0, 2.0));
            assert_eq!(changes[0].after, point(5.0, 5.0));
        }
        other => panic!("expected UpdateGeometries, got {other:?}"),
    }

    editor.undo();
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(2.0, 2.0));
    editor.redo();
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(5.0, 5.0));
}

#[test]
fn dragging_new_point_commits_release_position() {
    let mut editor = editor_with(ToolKind::Point);
    editor.handle_pointer(&PointerEvent::down(2.0, 2.0));
    editor.handle_pointer(&PointerEvent::drag(5.0, 5.0));
    editor.handle_pointer(&PointerEvent::up(5.0, 5.0));

    let id = only_id(&editor);
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(5.0, 5.0));
    assert_eq!(editor.history().undo_len(KEY), 1);
}

#[test]
fn shift_held_at_release_still_finishes_gesture() {
    let mut editor = editor_with(ToolKind::Point);
    editor.handle_pointer(&PointerEvent::down(2.0, 2.0));
    editor.handle_pointer(&PointerEvent::drag(3.0, 3.0));
    editor.handle_pointer(&PointerEvent::up(3.0, 3.0).with_modifiers(Modifiers::SHIFT));

    assert!(!editor.tool().is_active());
    assert!(editor.overlay_features().is_empty());
    assert!(editor.can_undo());
    let first = only_id(&editor);
    assert_eq!(editor.map().feature(first).unwrap().geometry, point(3.0, 3.0));

    click(&mut editor, 50.0, 50.0);
    let geometries: Vec<_> = editor
        .map()
        .active_collection()
        .unwrap()
        .iter()
        .map(|f| f.geometry.clone())
        .collect();
    assert_eq!(geometries, vec![point(3.0, 3.0), point(50.0, 50.0)]);
    assert_eq!(editor.history().undo_len(KEY), 2);
}

#[test]
fn style_padding_widens_hit_area() {
    let mut editor = editor_with(ToolKind::Point);
    editor.set_current_style(StyleProperties {
        point: Some(PointProperties {
            icon: None,
            size: 30.0,
            color: Color::BLACK,
        }),
        ..Default::default()
    });
    click(&mut editor, 0.0, 0.0);

    // 15 px padding + 5 px tolerance: a press 18 units away still grabs it.
    editor.handle_pointer(&PointerEvent::down(18.0, 18.0));
    editor.handle_pointer(&PointerEvent::up(18.0, 18.0));
    assert_eq!(editor.map().active_collection().unwrap().len(), 1);
}

// ─── History through the controller ─────────────────────────────────────

#[test]
fn new_edit_after_undo_drops_redo() {
    let mut editor = editor_with(ToolKind::Point);
    click(&mut editor, 2.0, 2.0);
    editor.undo();
    assert!(editor.can_redo());

    click(&mut editor, 40.0, 40.0);
    assert!(!editor.can_redo());
    assert_eq!(editor.redo(), None);
    assert_eq!(editor.map().active_collection().unwrap().len(), 1);
}

#[test]
fn round_trip_law_holds_for_every_edit_kind() {
    let mut editor = editor_with(ToolKind::Polygon);
    for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
        click(&mut editor, x, y);
    }
    editor.handle_key(&KeyEvent::new("Enter"));
    let after_create = content(editor.map());
    editor.undo();
    editor.redo();
    assert_eq!(content(editor.map()), after_create);

    let red = StyleProperties {
        z_index: Some(3),
        ..Default::default()
    };
    editor.apply_style_to_selection(&red).unwrap();
    let after_style = content(editor.map());
    editor.undo();
    editor.redo();
    assert_eq!(content(editor.map()), after_style);

    editor.add_layer("Sketch");
    let after_layer = content(editor.map());
    editor.undo();
    editor.redo();
    assert_eq!(content(editor.map()), after_layer);
}

#[test]
fn removing_active_layer_and_undoing_restores_activation() {
    let mut editor = editor_with(ToolKind::Point);
    let first = editor.map().active_layer_id().unwrap();
    let second = editor.add_layer("Second");
    editor.add_raster_layer("Tiles", "https://tiles.example/{z}/{x}/{y}.png");
    editor.set_active_layer(first).unwrap();

    editor.remove_layer(first).unwrap();
    assert!(!editor.map().contains_layer(first));
    assert_eq!(editor.map().active_layer_id(), Some(second));

    editor.undo();
    assert_eq!(editor.map().active_layer_id(), Some(first));
    assert_eq!(editor.map().layers[0].id, first);
    assert_eq!(editor.map().layers.iter().filter(|l| l.active).count(), 1);

    editor.redo();
    assert_eq!(editor.map().active_layer_id(), Some(second));
}

#[test]
fn delete_then_undo_restores_membership() {
    let mut editor = editor_with(ToolKind::Point);
    click(&mut editor, 2.0, 2.0);
    let id = only_id(&editor);

    assert_eq!(editor.delete_selection().unwrap(), 1);
    assert!(editor.map().feature(id).is_none());
    editor.undo();
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(2.0, 2.0));
}

#[test]
fn configured_depth_bounds_history() {
    init_logging();
    let config = EditorConfig::from_json(r#"{ "history_depth": 2 }"#).unwrap();
    let mut editor = EditorController::new(Map::with_vector_layer("Drawings"), config);
    editor.select_tool(ToolKind::Point);
    for i in 0..4 {
        click(&mut editor, f64::from(i) * 50.0, 0.0);
    }
    assert_eq!(editor.history().undo_len(KEY), 2);
    assert!(editor.undo().is_some());
    assert!(editor.undo().is_some());
    assert_eq!(editor.undo(), None);
    assert_eq!(editor.map().active_collection().unwrap().len(), 2);
}

// ─── Cancellation ───────────────────────────────────────────────────────

#[test]
fn escape_aborts_sketch_then_clears_selection() {
    let mut editor = editor_with(ToolKind::LineString);
    click(&mut editor, 0.0, 0.0);
    click(&mut editor, 50.0, 0.0);
    click(&mut editor, 50.0, 0.0);
    let line = only_id(&editor);
    assert!(editor.map().feature(line).unwrap().selected);

    click(&mut editor, 200.0, 200.0);
    assert!(!editor.overlay_features().is_empty());

    let escape = KeyEvent::new("Escape");
    assert!(!editor.handle_key(&escape));
    assert!(editor.overlay_features().is_empty());
    assert!(editor.map().feature(line).unwrap().selected);

    assert!(!editor.handle_key(&escape));
    assert!(!editor.map().feature(line).unwrap().selected);
    assert_eq!(editor.history().undo_len(KEY), 1);
}

#[test]
fn tool_switch_mid_drag_rolls_back() {
    let mut editor = editor_with(ToolKind::Selection);
    editor.select_tool(ToolKind::Point);
    click(&mut editor, 10.0, 10.0);
    let id = only_id(&editor);
    editor.select_tool(ToolKind::Selection);

    editor.handle_pointer(&PointerEvent::down(10.0, 10.0));
    editor.handle_pointer(&PointerEvent::drag(60.0, 60.0));
    assert!(editor.map().feature(id).is_none());
    assert_eq!(editor.overlay_features().len(), 1);

    editor.select_tool(ToolKind::Rectangle);
    assert!(editor.overlay_features().is_empty());
    assert_eq!(editor.map().feature(id).unwrap().geometry, point(10.0, 10.0));
    assert_eq!(editor.history().undo_len(KEY), 1);
}

#[test]
fn selection_tool_move_is_one_task() {
    let mut editor = editor_with(ToolKind::Point);
    click(&mut editor, 10.0, 10.0);
    click(&mut editor, 80.0, 80.0);
    editor.select_tool(ToolKind::Selection);

    // Select both, then drag one of them.
    editor.handle_pointer(&PointerEvent::down(10.0, 10.0));
    editor.handle_pointer(&PointerEvent::up(10.0, 10.0));
    let shift_click = PointerEvent::down(80.0, 80.0).with_modifiers(Modifiers::SHIFT);
    editor.handle_pointer(&shift_click);
    editor.handle_pointer(&PointerEvent::up(80.0, 80.0));

    editor.handle_pointer(&PointerEvent::down(80.0, 80.0));
    editor.handle_pointer(&PointerEvent::drag(90.0, 85.0));
    editor.handle_pointer(&PointerEvent::up(90.0, 85.0));

    match editor.history().peek_undo(KEY) {
        Some(Task::UpdateGeometries(changes)) => assert_eq!(changes.len(), 2),
        other => panic!("expected UpdateGeometries, got {other:?}"),
    }
    editor.undo();
    let geometries: Vec<_> = editor
        .map()
        .active_collection()
        .unwrap()
        .iter()
        .map(|f| f.geometry.clone())
        .collect();
    assert!(geometries.contains(&point(10.0, 10.0)));
    assert!(geometries.contains(&point(80.0, 80.0)));
}
