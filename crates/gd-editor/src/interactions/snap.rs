//! Vertex snapping.

use super::InteractionContext;
use crate::input::PointerEvent;
use gd_core::Coord;

/// Snap `cursor` onto the nearest vertex of the active layer, or return it
/// unchanged. Parked features are out of the collection, so an edited
/// feature never snaps onto itself.
pub(crate) fn snap_coordinate(ctx: &InteractionContext<'_>, cursor: Coord) -> Coord {
    if ctx.config.snap_tolerance_px <= 0.0 {
        return cursor;
    }
    ctx.active()
        .and_then(|(_, collection)| {
            gd_render::snap_to_vertex(
                cursor,
                collection,
                ctx.config.snap_tolerance_px,
                ctx.map.resolution,
                None,
            )
        })
        .unwrap_or(cursor)
}

/// Tracks the vertex the pointer would snap to, for a hover indicator.
/// Never consumes an event.
#[derive(Debug, Default)]
pub struct SnapInteraction {
    indicator: Option<Coord>,
}

impl SnapInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator(&self) -> Option<Coord> {
        self.indicator
    }

    pub fn handle_pointer(&mut self, ctx: &InteractionContext<'_>, event: &PointerEvent) -> bool {
        let snapped = snap_coordinate(ctx, event.coordinate);
        self.indicator = (snapped != event.coordinate).then_some(snapped);
        true
    }

    pub fn clear(&mut self) {
        self.indicator = None;
    }
}
