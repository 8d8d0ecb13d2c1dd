//! Click-to-place interaction used by the point and text tools.
//!
//! A plain primary press on an existing point picks it up for a move;
//! anywhere else it drops a new point. Dragging moves whatever was picked
//! up or dropped, by relative delta. Release commits.

use super::{InteractionContext, Overlay, ToolInteraction, ToolKind};
use crate::events::{Emitter, LifecycleEvent};
use crate::input::{KeyEvent, PointerEvent, PointerKind};
use gd_core::{Coord, Feature, Geometry};

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    /// Gesture in progress; `last` is the previous pointer coordinate.
    Active { last: Coord },
}

#[derive(Debug)]
pub struct PlacementInteraction {
    kind: ToolKind,
    state: State,
    overlay: Overlay,
    emitter: Emitter,
}

impl PlacementInteraction {
    pub fn new(kind: ToolKind) -> Self {
        debug_assert!(matches!(kind, ToolKind::Point | ToolKind::Text));
        Self {
            kind,
            state: State::Idle,
            overlay: Overlay::new(),
            emitter: Emitter::new(),
        }
    }

    fn begin(&mut self, ctx: &mut InteractionContext<'_>, cursor: Coord) -> bool {
        if !self.overlay.is_empty() {
            log::debug!("placement: discarding leftover overlay");
            self.overlay.rollback(ctx.map);
        }
        let Some((layer, collection)) = ctx.active() else {
            log::debug!("placement: no active vector layer");
            return true;
        };

        let kind = self.kind;
        let hit = gd_render::find(
            cursor,
            collection,
            |f| kind.accepts(f),
            ctx.config.hit_tolerance_px,
            ctx.map.resolution,
        )
        .map(|f| f.id);

        let event = match hit {
            Some(id) => self
                .overlay
                .park_existing(ctx.map, layer, id)
                .map(|snapshot| LifecycleEvent::GeometryBeingUpdated {
                    layer,
                    features: vec![snapshot],
                }),
            None => self
                .overlay
                .park_new(layer, Feature::new(Geometry::Point(cursor)))
                .map(|snapshot| LifecycleEvent::FeatureBeingCreated {
                    layer,
                    features: vec![snapshot],
                }),
        };
        let Some(event) = event else {
            return true;
        };
        self.state = State::Active { last: cursor };
        self.emitter.emit(event);
        false
    }

    fn finish(&mut self, ctx: &mut InteractionContext<'_>) {
        self.state = State::Idle;
        let Some(committed) = self.overlay.commit(ctx.map) else {
            return;
        };
        if !committed.modified.is_empty() {
            self.emitter.emit(LifecycleEvent::GeometryUpdated {
                layer: committed.layer,
                features: committed.modified,
            });
        }
        if !committed.created.is_empty() {
            self.emitter.emit(LifecycleEvent::FeatureCreated {
                layer: committed.layer,
                features: committed.created,
            });
        }
    }
}

impl ToolInteraction for PlacementInteraction {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool {
        let cursor = event.coordinate;
        match (self.state, event.kind) {
            (State::Idle, PointerKind::Down) if event.is_plain_primary_down() => {
                self.begin(ctx, cursor)
            }
            (State::Active { last }, PointerKind::Drag) => {
                self.overlay.translate(cursor.x - last.x, cursor.y - last.y);
                self.state = State::Active { last: cursor };
                false
            }
            (State::Active { .. }, PointerKind::Up) => {
                self.finish(ctx);
                false
            }
            _ => true,
        }
    }

    fn handle_key(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        if event.is_escape() && self.is_active() {
            self.overlay.rollback(ctx.map);
            self.state = State::Idle;
            return false;
        }
        true
    }

    fn dispose(&mut self, ctx: &mut InteractionContext<'_>) {
        self.overlay.rollback(ctx.map);
        self.state = State::Idle;
        self.emitter.clear();
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    fn overlay_features(&self) -> Vec<&Feature> {
        self.overlay.features().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::input::Modifiers;
    use gd_core::Map;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(tool: &mut PlacementInteraction) -> Rc<RefCell<Vec<LifecycleEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tool.emitter_mut().subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    fn names(events: &Rc<RefCell<Vec<LifecycleEvent>>>) -> Vec<&'static str> {
        events.borrow().iter().map(LifecycleEvent::name).collect()
    }

    #[test]
    fn click_creates_point() {
        let mut map = Map::with_vector_layer("Drawings");
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        assert!(!tool.handle_pointer(&mut ctx, &PointerEvent::down(2.0, 2.0)));
        assert!(tool.is_active());
        assert_eq!(ctx.map.active_collection().unwrap().len(), 0);
        assert!(!tool.handle_pointer(&mut ctx, &PointerEvent::up(2.0, 2.0)));

        assert_eq!(names(&events), vec!["FeatureBeingCreated", "FeatureCreated"]);
        let collection = map.active_collection().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(
            collection.iter().next().unwrap().geometry,
            Geometry::Point(Coord::new(2.0, 2.0))
        );
    }

    #[test]
    fn dragging_a_new_point_commits_release_position() {
        let mut map = Map::with_vector_layer("Drawings");
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        tool.handle_pointer(&mut ctx, &PointerEvent::down(2.0, 2.0));
        tool.handle_pointer(&mut ctx, &PointerEvent::drag(3.0, 4.0));
        tool.handle_pointer(&mut ctx, &PointerEvent::drag(5.0, 5.0));
        tool.handle_pointer(&mut ctx, &PointerEvent::up(5.0, 5.0));

        let events = events.borrow();
        let created: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::FeatureCreated { features, .. } => Some(features.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0][0].geometry, Geometry::Point(Coord::new(5.0, 5.0)));
    }

    #[test]
    fn press_on_existing_point_modifies_it() {
        let mut map = Map::with_vector_layer("Drawings");
        let existing = Feature::new(Geometry::Point(Coord::new(2.0, 2.0)));
        let id = existing.id;
        map.active_collection_mut().unwrap().insert(existing);
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        tool.handle_pointer(&mut ctx, &PointerEvent::down(2.0, 2.0));
        assert!(ctx.map.feature(id).is_none());
        tool.handle_pointer(&mut ctx, &PointerEvent::drag(5.0, 5.0));
        tool.handle_pointer(&mut ctx, &PointerEvent::up(5.0, 5.0));

        assert_eq!(names(&events), vec!["GeometryBeingUpdated", "GeometryUpdated"]);
        match &events.borrow()[0] {
            LifecycleEvent::GeometryBeingUpdated { features, .. } => {
                assert_eq!(features[0].geometry, Geometry::Point(Coord::new(2.0, 2.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(map.feature(id).unwrap().geometry, Geometry::Point(Coord::new(5.0, 5.0)));
        assert_eq!(map.active_collection().unwrap().len(), 1);
    }

    #[test]
    fn shift_press_does_not_start_a_gesture() {
        let mut map = Map::with_vector_layer("Drawings");
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        let down = PointerEvent::down(2.0, 2.0).with_modifiers(Modifiers::SHIFT);
        assert!(tool.handle_pointer(&mut ctx, &down));
        assert!(!tool.is_active());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn release_with_shift_still_commits() {
        let mut map = Map::with_vector_layer("Drawings");
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        tool.handle_pointer(&mut ctx, &PointerEvent::down(2.0, 2.0));
        let shifted = |e: PointerEvent| e.with_modifiers(Modifiers::SHIFT);
        assert!(!tool.handle_pointer(&mut ctx, &shifted(PointerEvent::drag(3.0, 3.0))));
        assert!(!tool.handle_pointer(&mut ctx, &shifted(PointerEvent::up(3.0, 3.0))));

        assert!(!tool.is_active());
        assert!(tool.overlay_features().is_empty());
        assert_eq!(names(&events), vec!["FeatureBeingCreated", "FeatureCreated"]);
        let geometries: Vec<_> = map.active_collection().unwrap().iter().map(|f| f.geometry.clone()).collect();
        assert_eq!(geometries, vec![Geometry::Point(Coord::new(3.0, 3.0))]);
    }

    #[test]
    fn events_outside_a_gesture_propagate() {
        let mut map = Map::with_vector_layer("Drawings");
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let mut ctx = InteractionContext::new(&mut map, &config);
        assert!(tool.handle_pointer(&mut ctx, &PointerEvent::drag(1.0, 1.0)));
        assert!(tool.handle_pointer(&mut ctx, &PointerEvent::up(1.0, 1.0)));
        assert!(tool.handle_pointer(&mut ctx, &PointerEvent::hover(1.0, 1.0)));
    }

    #[test]
    fn dispose_mid_gesture_restores_map_silently() {
        let mut map = Map::with_vector_layer("Drawings");
        map.active_collection_mut()
            .unwrap()
            .insert(Feature::new(Geometry::Point(Coord::new(2.0, 2.0))));
        let before = map.clone();
        let config = EditorConfig::default();
        let mut tool = PlacementInteraction::new(ToolKind::Point);
        let events = record(&mut tool);
        let mut ctx = InteractionContext::new(&mut map, &config);

        tool.handle_pointer(&mut ctx, &PointerEvent::down(2.0, 2.0));
        tool.handle_pointer(&mut ctx, &PointerEvent::drag(8.0, 8.0));
        events.borrow_mut().clear();
        tool.dispose(&mut ctx);

        assert!(events.borrow().is_empty());
        assert!(tool.overlay_features().is_empty());
        assert_eq!(tool.emitter_mut().listener_count(), 0);
        assert_eq!(map, before);
    }
}
