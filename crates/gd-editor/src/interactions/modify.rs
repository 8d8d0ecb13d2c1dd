//! Vertex editing of selected features.
//!
//! Pressing near a vertex of a selected feature grabs it; pressing near one
//! of its edges inserts a vertex there and grabs the new one. The grabbed
//! vertex follows the pointer (snapped) until release.

use super::snap::snap_coordinate;
use super::{InteractionContext, Overlay};
use crate::events::{Emitter, LifecycleEvent};
use crate::input::{PointerEvent, PointerKind};
use gd_core::{Coord, Feature, GeometryKind, VertexRef};

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Dragging { vertex: VertexRef },
}

#[derive(Debug)]
pub struct ModifyInteraction {
    target: GeometryKind,
    state: State,
    overlay: Overlay,
}

impl ModifyInteraction {
    pub fn new(target: GeometryKind) -> Self {
        Self {
            target,
            state: State::Idle,
            overlay: Overlay::new(),
        }
    }

    pub fn is_modifying(&self) -> bool {
        self.state != State::Idle
    }

    pub fn handle_pointer(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        emitter: &mut Emitter,
        event: &PointerEvent,
    ) -> bool {
        match (self.state, event.kind) {
            (State::Idle, PointerKind::Down) if event.is_plain_primary_down() => {
                self.grab(ctx, emitter, event.coordinate)
            }
            (State::Dragging { vertex }, PointerKind::Drag) => {
                let to = snap_coordinate(ctx, event.coordinate);
                self.move_grabbed(vertex, to);
                false
            }
            (State::Dragging { vertex }, PointerKind::Up) => {
                let to = snap_coordinate(ctx, event.coordinate);
                self.move_grabbed(vertex, to);
                self.state = State::Idle;
                if let Some(committed) = self.overlay.commit(ctx.map) {
                    emitter.emit(LifecycleEvent::GeometryUpdated {
                        layer: committed.layer,
                        features: committed.modified,
                    });
                }
                false
            }
            _ => true,
        }
    }

    fn move_grabbed(&mut self, vertex: VertexRef, to: Coord) {
        if let Some(feature) = self.overlay.modified_mut().next() {
            feature.geometry.move_vertex(vertex, to);
        }
    }

    fn grab(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter, cursor: Coord) -> bool {
        if !self.overlay.is_empty() {
            self.overlay.rollback(ctx.map);
        }
        let Some((layer, collection)) = ctx.active() else {
            return true;
        };
        let tolerance = ctx.hit_tolerance();
        let target = self.target;
        let grabbed = collection
            .iter()
            .rev()
            .filter(|f| f.selected && f.geometry.kind().base() == target)
            .find_map(|f| {
                if let Some((vertex, _)) = gd_render::nearest_vertex(&f.geometry, cursor, tolerance) {
                    return Some((f.id, vertex, None));
                }
                gd_render::nearest_edge(&f.geometry, cursor, tolerance)
                    .map(|(vertex, at)| (f.id, vertex, Some(at)))
            });
        let Some((id, vertex, insert_at)) = grabbed else {
            return true;
        };

        let Some(snapshot) = self.overlay.park_existing(ctx.map, layer, id) else {
            return true;
        };
        emitter.emit(LifecycleEvent::GeometryBeingUpdated {
            layer,
            features: vec![snapshot],
        });
        if let Some(at) = insert_at {
            if let Some(feature) = self.overlay.modified_mut().next() {
                feature.geometry.insert_vertex(vertex, at);
            }
        }
        self.state = State::Dragging { vertex };
        false
    }

    pub fn abort(&mut self, ctx: &mut InteractionContext<'_>) {
        self.overlay.rollback(ctx.map);
        self.state = State::Idle;
    }

    pub fn parked(&self) -> impl Iterator<Item = &Feature> {
        self.overlay.features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::Modifiers;
    use gd_core::{FeatureId, Geometry, Map};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn selected_line(map: &mut Map) -> FeatureId {
        let mut feature = Feature::new(Geometry::LineString(vec![
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
        ]));
        feature.selected = true;
        let id = feature.id;
        map.active_collection_mut().unwrap().insert(feature);
        id
    }

    fn gesture(
        modify: &mut ModifyInteraction,
        map: &mut Map,
        emitter: &mut Emitter,
        steps: &[PointerEvent],
    ) {
        let config = EditorConfig::default();
        let mut ctx = InteractionContext::new(map, &config);
        for event in steps {
            modify.handle_pointer(&mut ctx, emitter, event);
        }
    }

    #[test]
    fn drags_existing_vertex() {
        let mut map = Map::with_vector_layer("Drawings");
        let id = selected_line(&mut map);
        let mut modify = ModifyInteraction::new(GeometryKind::LineString);
        let mut emitter = Emitter::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        emitter.subscribe(move |e: &LifecycleEvent| sink.borrow_mut().push(e.name()));

        gesture(
            &mut modify,
            &mut map,
            &mut emitter,
            &[
                PointerEvent::down(99.0, 1.0),
                PointerEvent::drag(100.0, 40.0),
                PointerEvent::up(100.0, 50.0),
            ],
        );

        assert_eq!(*events.borrow(), vec!["GeometryBeingUpdated", "GeometryUpdated"]);
        assert_eq!(
            map.feature(id).unwrap().geometry,
            Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(100.0, 50.0)])
        );
    }

    #[test]
    fn press_on_edge_inserts_vertex() {
        let mut map = Map::with_vector_layer("Drawings");
        let id = selected_line(&mut map);
        let mut modify = ModifyInteraction::new(GeometryKind::LineString);
        let mut emitter = Emitter::new();

        gesture(
            &mut modify,
            &mut map,
            &mut emitter,
            &[PointerEvent::down(50.0, 2.0), PointerEvent::up(50.0, 30.0)],
        );

        assert_eq!(
            map.feature(id).unwrap().geometry,
            Geometry::LineString(vec![
                Coord::new(0.0, 0.0),
                Coord::new(50.0, 30.0),
                Coord::new(100.0, 0.0),
            ])
        );
    }

    #[test]
    fn release_with_shift_commits_and_keeps_stacking_order() {
        let mut map = Map::with_vector_layer("Drawings");
        let id = selected_line(&mut map);
        let above = Feature::new(Geometry::Point(Coord::new(500.0, 500.0)));
        let above_id = above.id;
        map.active_collection_mut().unwrap().insert(above);
        let mut modify = ModifyInteraction::new(GeometryKind::LineString);
        let mut emitter = Emitter::new();

        gesture(
            &mut modify,
            &mut map,
            &mut emitter,
            &[
                PointerEvent::down(100.0, 0.0),
                PointerEvent::up(100.0, 20.0).with_modifiers(Modifiers::SHIFT),
            ],
        );

        assert!(!modify.is_modifying());
        assert_eq!(modify.parked().count(), 0);
        let order: Vec<_> = map.active_collection().unwrap().iter().map(|f| f.id).collect();
        assert_eq!(order, vec![id, above_id]);
        assert_eq!(
            map.feature(id).unwrap().geometry,
            Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(100.0, 20.0)])
        );
    }

    #[test]
    fn unselected_features_are_left_alone() {
        let mut map = Map::with_vector_layer("Drawings");
        let id = selected_line(&mut map);
        map.feature_mut(id).unwrap().selected = false;
        let mut modify = ModifyInteraction::new(GeometryKind::LineString);
        let mut emitter = Emitter::new();
        let config = EditorConfig::default();
        let mut ctx = InteractionContext::new(&mut map, &config);

        assert!(modify.handle_pointer(&mut ctx, &mut emitter, &PointerEvent::down(100.0, 0.0)));
        assert!(!modify.is_modifying());
    }

    #[test]
    fn abort_restores_geometry() {
        let mut map = Map::with_vector_layer("Drawings");
        selected_line(&mut map);
        let before = map.clone();
        let mut modify = ModifyInteraction::new(GeometryKind::LineString);
        let mut emitter = Emitter::new();
        gesture(
            &mut modify,
            &mut map,
            &mut emitter,
            &[PointerEvent::down(50.0, 0.0), PointerEvent::drag(50.0, 70.0)],
        );
        assert_eq!(modify.parked().count(), 1);

        let config = EditorConfig::default();
        modify.abort(&mut InteractionContext::new(&mut map, &config));
        assert_eq!(map, before);
    }
}
