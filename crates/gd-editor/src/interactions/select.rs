//! Selection member of an interaction bundle.
//!
//! Drawing tools own plain clicks, so inside a bundle selection is driven
//! by the precision modifier: a shift-click picks the feature under the
//! cursor, or clears the selection when nothing is there.

use super::InteractionContext;
use crate::events::{Emitter, LifecycleEvent};
use crate::input::{PointerButton, PointerEvent, PointerKind};
use gd_core::{FeatureIds, GeometryKind};

#[derive(Debug)]
pub struct SelectInteraction {
    target: GeometryKind,
}

impl SelectInteraction {
    pub fn new(target: GeometryKind) -> Self {
        Self { target }
    }

    pub fn handle_pointer(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        emitter: &mut Emitter,
        event: &PointerEvent,
    ) -> bool {
        let shift_click = event.kind == PointerKind::Down
            && event.button == PointerButton::Primary
            && event.modifiers.precision();
        if !shift_click {
            return true;
        }
        let Some((_, collection)) = ctx.active() else {
            return true;
        };
        let target = self.target;
        let hit = gd_render::find(
            event.coordinate,
            collection,
            |f| f.geometry.kind().base() == target,
            ctx.config.hit_tolerance_px,
            ctx.map.resolution,
        )
        .map(|f| f.id);
        select_only(ctx, emitter, hit);
        false
    }

    /// Clear the selection. Returns `false` if nothing was selected.
    pub fn clear(&mut self, ctx: &mut InteractionContext<'_>, emitter: &mut Emitter) -> bool {
        select_only(ctx, emitter, None)
    }
}

/// Make `id` the only selected feature of the active layer (or clear the
/// selection). Previous flags are cleared before the new one is set.
/// Emits `SelectionChanged` and returns `true` when anything changed.
pub(crate) fn select_only(
    ctx: &mut InteractionContext<'_>,
    emitter: &mut Emitter,
    id: Option<gd_core::FeatureId>,
) -> bool {
    let Some(collection) = ctx.map.active_collection_mut() else {
        return false;
    };
    let mut deselected = collection.deselect_all();
    let mut selected = FeatureIds::new();
    if let Some(feature) = id.and_then(|id| collection.get_mut(id)) {
        feature.selected = true;
        match deselected.iter().position(|d| *d == feature.id) {
            Some(i) => {
                deselected.remove(i);
            }
            None => selected.push(feature.id),
        }
    }
    if selected.is_empty() && deselected.is_empty() {
        return false;
    }
    emitter.emit(LifecycleEvent::SelectionChanged {
        selected,
        deselected,
    });
    true
}
