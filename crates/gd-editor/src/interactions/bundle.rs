//! Modify, draw, snap and select working together on the active layer.
//!
//! Members see each pointer event in a fixed order: modify → draw → snap →
//! select. The first member that consumes the event stops it. While a
//! sketch is in progress modify stands aside, so presses keep adding
//! vertices even on top of a selected feature.

use super::{
    DrawInteraction, DrawMode, InteractionContext, ModifyInteraction, SelectInteraction,
    SnapInteraction, ToolInteraction, ToolKind,
};
use crate::events::Emitter;
use crate::input::{KeyEvent, PointerEvent};
use gd_core::{Coord, Feature, GeometryKind};

#[derive(Debug)]
pub struct InteractionBundle {
    modify: ModifyInteraction,
    draw: DrawInteraction,
    snap: SnapInteraction,
    select: SelectInteraction,
    emitter: Emitter,
}

impl InteractionBundle {
    pub fn new(mode: DrawMode) -> Self {
        let target = mode
            .tool_kind()
            .target()
            .unwrap_or(GeometryKind::Polygon);
        Self {
            modify: ModifyInteraction::new(target),
            draw: DrawInteraction::new(mode),
            snap: SnapInteraction::new(),
            select: SelectInteraction::new(target),
            emitter: Emitter::new(),
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.draw.mode()
    }

    pub fn snap_indicator(&self) -> Option<Coord> {
        self.snap.indicator()
    }
}

impl ToolInteraction for InteractionBundle {
    fn kind(&self) -> ToolKind {
        self.draw.mode().tool_kind()
    }

    fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool {
        (self.draw.is_drawing() || self.modify.handle_pointer(ctx, &mut self.emitter, event))
            && self.draw.handle_pointer(ctx, &mut self.emitter, event)
            && self.snap.handle_pointer(ctx, event)
            && self.select.handle_pointer(ctx, &mut self.emitter, event)
    }

    /// Escape aborts a sketch if there is one, else cancels a vertex drag,
    /// else clears the selection. One of those per press.
    fn handle_key(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        if event.is_escape() {
            if self.draw.abort(ctx) {
                return false;
            }
            if self.modify.is_modifying() {
                self.modify.abort(ctx);
                return false;
            }
            return !self.select.clear(ctx, &mut self.emitter);
        }
        if event.is_enter() {
            return !self.draw.finish(ctx, &mut self.emitter);
        }
        true
    }

    fn dispose(&mut self, ctx: &mut InteractionContext<'_>) {
        self.modify.abort(ctx);
        self.draw.abort(ctx);
        self.snap.clear();
        self.emitter.clear();
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }

    fn is_active(&self) -> bool {
        self.draw.is_drawing() || self.modify.is_modifying()
    }

    fn overlay_features(&self) -> Vec<&Feature> {
        self.draw
            .overlay()
            .features()
            .chain(self.modify.parked())
            .collect()
    }
}
