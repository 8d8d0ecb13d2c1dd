//! The selection tool.
//!
//! - click a feature: select it (previous selection cleared first)
//! - shift-click a feature: toggle it
//! - drag a selected feature: move the whole selection
//! - drag from empty space: box select (shift adds to the selection)
//! - Escape: cancel a move in progress, else clear the selection

use super::select::select_only;
use super::{InteractionContext, Overlay, ToolInteraction, ToolKind};
use crate::events::{Emitter, LifecycleEvent};
use crate::input::{KeyEvent, PointerButton, PointerEvent, PointerKind};
use gd_core::{Coord, Extent, Feature, FeatureIds};
use smallvec::smallvec;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    /// Pressed on a selected feature. The selection is parked on the first
    /// drag, so a plain click never produces a geometry update.
    Pressed { last: Coord, moving: bool },
    Boxing {
        start: Coord,
        current: Coord,
        additive: bool,
    },
}

#[derive(Debug)]
pub struct SelectionInteraction {
    state: State,
    overlay: Overlay,
    emitter: Emitter,
}

impl Default for SelectionInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionInteraction {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            overlay: Overlay::new(),
            emitter: Emitter::new(),
        }
    }

    /// The rubber-band rectangle while box selecting.
    pub fn selection_box(&self) -> Option<Extent> {
        match self.state {
            State::Boxing { start, current, .. } => Some(Extent::from_corners(start, current)),
            _ => None,
        }
    }

    fn press(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool {
        if !self.overlay.is_empty() {
            self.overlay.rollback(ctx.map);
        }
        let Some((_, collection)) = ctx.active() else {
            return true;
        };
        let cursor = event.coordinate;
        let hit = gd_render::find(
            cursor,
            collection,
            |_| true,
            ctx.config.hit_tolerance_px,
            ctx.map.resolution,
        )
        .map(|f| (f.id, f.selected));
        let shift = event.modifiers.precision();

        match hit {
            Some((id, was_selected)) if shift => {
                if let Some(feature) = ctx.map.active_collection_mut().and_then(|c| c.get_mut(id)) {
                    feature.selected = !was_selected;
                }
                let (selected, deselected): (FeatureIds, FeatureIds) = if was_selected {
                    (smallvec![], smallvec![id])
                } else {
                    (smallvec![id], smallvec![])
                };
                self.emitter.emit(LifecycleEvent::SelectionChanged {
                    selected,
                    deselected,
                });
            }
            Some((id, was_selected)) => {
                if !was_selected {
                    select_only(ctx, &mut self.emitter, Some(id));
                }
                self.state = State::Pressed {
                    last: cursor,
                    moving: false,
                };
            }
            None => {
                if !shift {
                    select_only(ctx, &mut self.emitter, None);
                }
                self.state = State::Boxing {
                    start: cursor,
                    current: cursor,
                    additive: shift,
                };
            }
        }
        false
    }

    fn park_selection(&mut self, ctx: &mut InteractionContext<'_>) {
        let Some((layer, collection)) = ctx.active() else {
            return;
        };
        let ids = collection.selected_ids();
        let snapshots: Vec<Feature> = ids
            .into_iter()
            .filter_map(|id| self.overlay.park_existing(ctx.map, layer, id))
            .collect();
        if !snapshots.is_empty() {
            self.emitter.emit(LifecycleEvent::GeometryBeingUpdated {
                layer,
                features: snapshots,
            });
        }
    }

    fn select_box(&mut self, ctx: &mut InteractionContext<'_>, extent: Extent, additive: bool) {
        let Some(collection) = ctx.map.active_collection_mut() else {
            return;
        };
        let before = collection.selected_ids();
        if !additive {
            collection.deselect_all();
        }
        for id in gd_render::find_in_extent(&extent, collection) {
            if let Some(feature) = collection.get_mut(id) {
                feature.selected = true;
            }
        }
        let after = collection.selected_ids();
        let selected: FeatureIds = after.iter().copied().filter(|id| !before.contains(id)).collect();
        let deselected: FeatureIds = before.iter().copied().filter(|id| !after.contains(id)).collect();
        if !selected.is_empty() || !deselected.is_empty() {
            self.emitter.emit(LifecycleEvent::SelectionChanged {
                selected,
                deselected,
            });
        }
    }
}

impl ToolInteraction for SelectionInteraction {
    fn kind(&self) -> ToolKind {
        ToolKind::Selection
    }

    fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool {
        let cursor = event.coordinate;
        match (self.state, event.kind) {
            (State::Idle, PointerKind::Down) if event.button == PointerButton::Primary => {
                self.press(ctx, event)
            }
            (State::Pressed { last, moving }, PointerKind::Drag) => {
                if !moving {
                    self.park_selection(ctx);
                }
                self.overlay.translate(cursor.x - last.x, cursor.y - last.y);
                self.state = State::Pressed {
                    last: cursor,
                    moving: true,
                };
                false
            }
            (State::Pressed { moving, .. }, PointerKind::Up) => {
                self.state = State::Idle;
                if moving {
                    if let Some(committed) = self.overlay.commit(ctx.map) {
                        self.emitter.emit(LifecycleEvent::GeometryUpdated {
                            layer: committed.layer,
                            features: committed.modified,
                        });
                    }
                }
                false
            }
            (State::Boxing { start, additive, .. }, PointerKind::Drag) => {
                self.state = State::Boxing {
                    start,
                    current: cursor,
                    additive,
                };
                false
            }
            (State::Boxing { start, additive, .. }, PointerKind::Up) => {
                self.state = State::Idle;
                if start != cursor {
                    self.select_box(ctx, Extent::from_corners(start, cursor), additive);
                }
                false
            }
            _ => true,
        }
    }

    fn handle_key(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        if !event.is_escape() {
            return true;
        }
        if self.is_active() {
            self.overlay.rollback(ctx.map);
            self.state = State::Idle;
            return false;
        }
        !select_only(ctx, &mut self.emitter, None)
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
        self.state != State::Idle
    }

    fn overlay_features(&self) -> Vec<&Feature> {
        self.overlay.features().collect()
    }
}
