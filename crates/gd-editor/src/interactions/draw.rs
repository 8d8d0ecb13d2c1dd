//! Drawing new geometries.
//!
//! Lines and polygons are sketched vertex by vertex: each press adds a
//! vertex, hovering moves a rubber-band vertex, and pressing on the last
//! vertex (or the first one, for polygons) or hitting Enter finishes.
//! Circles and rectangles are a single press-drag-release.

use super::snap::snap_coordinate;
use super::{InteractionContext, Overlay, ToolKind};
use crate::events::{Emitter, LifecycleEvent};
use crate::input::{PointerEvent, PointerKind};
use gd_core::{Coord, Feature, Geometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    LineString,
    Polygon,
    Circle,
    Rectangle,
}

impl DrawMode {
    pub fn tool_kind(self) -> ToolKind {
        match self {
            Self::LineString => ToolKind::LineString,
            Self::Polygon => ToolKind::Polygon,
            Self::Circle => ToolKind::Circle,
            Self::Rectangle => ToolKind::Rectangle,
        }
    }

    fn is_sketched(self) -> bool {
        matches!(self, Self::LineString | Self::Polygon)
    }

    fn min_vertices(self) -> usize {
        match self {
            Self::Polygon => 3,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Sketching { vertices: Vec<Coord> },
    Dragging { start: Coord },
}

#[derive(Debug)]
pub struct DrawInteraction {
    mode: DrawMode,
    state: State,
    overlay: Overlay,
}

impl DrawInteraction {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            state: State::Idle,
            overlay: Overlay::new(),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        self.state != State::Idle
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    fn sketch(&self, vertices: &[Coord], rubber: Option<Coord>) -> Geometry {
        let mut coords = vertices.to_vec();
        coords.extend(rubber);
        match self.mode {
            DrawMode::Polygon => Geometry::Polygon(vec![coords]),
            _ => Geometry::LineString(coords),
        }
    }

    fn shape(&self, ctx: &InteractionContext<'_>, start: Coord, end: Coord) -> Geometry {
        match self.mode {
            DrawMode::Circle => {
                let radius = (end.x - start.x).hypot(end.y - start.y);
                Geometry::circle(start, radius, ctx.config.circle_segments)
            }
            _ => Geometry::rectangle(start, end),
        }
    }

    fn set_provisional(&mut self, geometry: Geometry) {
        if let Some(feature) = self.overlay.created_mut().first_mut() {
            feature.geometry = geometry;
        }
    }

    pub fn handle_pointer(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        emitter: &mut Emitter,
        event: &PointerEvent,
    ) -> bool {
        let cursor = snap_coordinate(ctx, event.coordinate);
        match (&self.state, event.kind) {
            (State::Idle, PointerKind::Down) if event.is_plain_primary_down() => {
                self.start(ctx, emitter, cursor)
            }
            (State::Sketching { .. }, PointerKind::Down) if event.is_plain_primary_down() => {
                self.add_vertex(ctx, emitter, cursor);
                false
            }
            (State::Sketching { vertices }, PointerKind::Move | PointerKind::Drag) => {
                let geometry = self.sketch(vertices, Some(cursor));
                self.set_provisional(geometry);
                // Hover keeps flowing so the snap indicator can follow.
                event.kind == PointerKind::Move
            }
            (State::Sketching { .. }, PointerKind::Up) => false,
            (State::Dragging { start }, PointerKind::Drag) => {
                let geometry = self.shape(ctx, *start, cursor);
                self.set_provisional(geometry);
                false
            }
            (State::Dragging { start }, PointerKind::Up) => {
                let start = *start;
                self.finish_drag(ctx, emitter, start, cursor);
                false
            }
            _ => true,
        }
    }

    fn start(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter, cursor: Coord) -> bool {
        if !self.overlay.is_empty() {
            self.overlay.rollback(ctx.map);
        }
        let Some(layer) = ctx.map.active_layer_id().filter(|l| ctx.map.collection(*l).is_some()) else {
            log::debug!("draw: no active vector layer");
            return true;
        };
        let geometry = if self.mode.is_sketched() {
            self.sketch(&[cursor], Some(cursor))
        } else {
            self.shape(ctx, cursor, cursor)
        };
        let Some(snapshot) = self.overlay.park_new(layer, Feature::new(geometry)) else {
            return true;
        };
        self.state = if self.mode.is_sketched() {
            State::Sketching {
                vertices: vec![cursor],
            }
        } else {
            State::Dragging { start: cursor }
        };
        emitter.emit(LifecycleEvent::FeatureBeingCreated {
            layer,
            features: vec![snapshot],
        });
        false
    }

    fn add_vertex(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter, cursor: Coord) {
        let State::Sketching { vertices } = &mut self.state else {
            return;
        };
        let tolerance = ctx.hit_tolerance();
        let near = |c: Option<&Coord>| c.is_some_and(|c| gd_render::within_axis_tolerance(cursor, *c, tolerance));

        let closes_ring = self.mode == DrawMode::Polygon
            && vertices.len() >= self.mode.min_vertices()
            && near(vertices.first());
        if near(vertices.last()) || closes_ring {
            self.finish(ctx, emitter);
            return;
        }
        vertices.push(cursor);
        let vertices = vertices.clone();
        let geometry = self.sketch(&vertices, Some(cursor));
        self.set_provisional(geometry);
    }

    /// Commit the sketch. Too few vertices discards it instead.
    /// Returns `false` if nothing was being sketched.
    pub fn finish(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter) -> bool {
        let State::Sketching { vertices } = std::mem::replace(&mut self.state, State::Idle) else {
            return false;
        };
        if vertices.len() < self.mode.min_vertices() {
            log::debug!("draw: {} vertex sketch discarded", vertices.len());
            self.overlay.rollback(ctx.map);
            return true;
        }
        let geometry = self.sketch(&vertices, None);
        self.set_provisional(geometry);
        self.commit(ctx, emitter);
        true
    }

    fn finish_drag(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter, start: Coord, end: Coord) {
        self.state = State::Idle;
        let degenerate = match self.mode {
            DrawMode::Rectangle => start.x == end.x || start.y == end.y,
            _ => start == end,
        };
        if degenerate {
            log::debug!("draw: degenerate shape discarded");
            self.overlay.rollback(ctx.map);
            return;
        }
        let geometry = self.shape(ctx, start, end);
        self.set_provisional(geometry);
        self.commit(ctx, emitter);
    }

    fn commit(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter) {
        if let Some(committed) = self.overlay.commit(ctx.map) {
            emitter.emit(LifecycleEvent::FeatureCreated {
                layer: committed.layer,
                features: committed.created,
            });
        }
    }

    /// Drop the in-progress feature. Returns `false` if nothing was drawn.
    pub fn abort(&mut self, ctx: &mut InteractionContext<'_>) -> bool {
        let was_drawing = self.is_drawing();
        self.overlay.rollback(ctx.map);
        self.state = State::Idle;
        was_drawing
    }
}
