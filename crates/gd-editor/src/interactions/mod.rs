//! Tool interactions: pointer-driven state machines that create, select
//! and modify features.
//!
//! Each interaction mutates the map directly and announces what it did
//! through its own [`Emitter`]. A controller listens to those lifecycle
//! events and turns them into history tasks.
//!
//! Pointer handlers return `true` to let the event propagate and `false`
//! when they consumed it.

mod bundle;
mod draw;
mod modify;
mod overlay;
mod placement;
mod select;
mod selection;
mod snap;

pub use bundle::InteractionBundle;
pub use draw::{DrawInteraction, DrawMode};
pub use modify::ModifyInteraction;
pub use overlay::{Committed, Overlay};
pub use placement::PlacementInteraction;
pub use select::SelectInteraction;
pub use selection::SelectionInteraction;
pub use snap::SnapInteraction;

use crate::config::EditorConfig;
use crate::events::Emitter;
use crate::input::{KeyEvent, PointerEvent};
use gd_core::{Feature, FeatureCollection, GeometryKind, LayerId, Map};

/// What an interaction may touch while handling one event.
pub struct InteractionContext<'a> {
    pub map: &'a mut Map,
    pub config: &'a EditorConfig,
}

impl<'a> InteractionContext<'a> {
    pub fn new(map: &'a mut Map, config: &'a EditorConfig) -> Self {
        Self { map, config }
    }

    /// Hit tolerance in map units, without any style padding.
    pub fn hit_tolerance(&self) -> f64 {
        self.config.hit_tolerance_px * self.map.resolution
    }

    /// The active layer and its collection, if a vector layer is active.
    pub fn active(&self) -> Option<(LayerId, &FeatureCollection)> {
        let layer = self.map.active_layer_id()?;
        Some((layer, self.map.collection(layer)?))
    }
}

/// Tool identifier used to pick an interaction from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Selection,
    Point,
    Text,
    LineString,
    Polygon,
    Circle,
    Rectangle,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        Self::Selection,
        Self::Point,
        Self::Text,
        Self::LineString,
        Self::Polygon,
        Self::Circle,
        Self::Rectangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Point => "point",
            Self::Text => "text",
            Self::LineString => "line",
            Self::Polygon => "polygon",
            Self::Circle => "circle",
            Self::Rectangle => "rectangle",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == id)
    }

    /// Geometry kind the tool creates and edits. `None` for selection,
    /// which works on anything.
    pub fn target(self) -> Option<GeometryKind> {
        match self {
            Self::Selection => None,
            Self::Point | Self::Text => Some(GeometryKind::Point),
            Self::LineString => Some(GeometryKind::LineString),
            Self::Polygon | Self::Circle | Self::Rectangle => Some(GeometryKind::Polygon),
        }
    }

    /// Does `feature` belong to this tool?
    pub fn accepts(self, feature: &Feature) -> bool {
        self.target()
            .is_none_or(|kind| feature.geometry.kind().base() == kind)
    }
}

/// Capability shared by every tool interaction.
pub trait ToolInteraction {
    fn kind(&self) -> ToolKind;

    /// Handle a pointer event. Returns `true` to propagate.
    fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool;

    /// Handle a key event. Returns `true` to propagate.
    fn handle_key(&mut self, _ctx: &mut InteractionContext<'_>, _event: &KeyEvent) -> bool {
        true
    }

    /// Abort any gesture without emitting events, put parked features back
    /// as they were and drop every listener.
    fn dispose(&mut self, ctx: &mut InteractionContext<'_>);

    fn emitter_mut(&mut self) -> &mut Emitter;

    /// Is a gesture in progress?
    fn is_active(&self) -> bool;

    /// Features currently parked by the interaction, for rendering.
    fn overlay_features(&self) -> Vec<&Feature>;
}

// ─── Tool registry ───────────────────────────────────────────────────────

/// The closed set of tool interactions, selected by [`ToolKind`].
#[derive(Debug)]
pub enum ToolBox {
    Placement(PlacementInteraction),
    Selection(SelectionInteraction),
    Bundle(InteractionBundle),
}

impl ToolBox {
    pub fn for_kind(kind: ToolKind) -> Self {
        log::debug!("tool: {}", kind.as_str());
        match kind {
            ToolKind::Selection => Self::Selection(SelectionInteraction::new()),
            ToolKind::Point | ToolKind::Text => Self::Placement(PlacementInteraction::new(kind)),
            ToolKind::LineString => Self::Bundle(InteractionBundle::new(DrawMode::LineString)),
            ToolKind::Polygon => Self::Bundle(InteractionBundle::new(DrawMode::Polygon)),
            ToolKind::Circle => Self::Bundle(InteractionBundle::new(DrawMode::Circle)),
            ToolKind::Rectangle => Self::Bundle(InteractionBundle::new(DrawMode::Rectangle)),
        }
    }

    fn inner(&self) -> &dyn ToolInteraction {
        match self {
            Self::Placement(t) => t,
            Self::Selection(t) => t,
            Self::Bundle(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ToolInteraction {
        match self {
            Self::Placement(t) => t,
            Self::Selection(t) => t,
            Self::Bundle(t) => t,
        }
    }
}

impl ToolInteraction for ToolBox {
    fn kind(&self) -> ToolKind {
        self.inner().kind()
    }

    fn handle_pointer(&mut self, ctx: &mut InteractionContext<'_>, event: &PointerEvent) -> bool {
        log::trace!("{:?} {:?} at {:?}", self.kind(), event.kind, event.coordinate);
        self.inner_mut().handle_pointer(ctx, event)
    }

    fn handle_key(&mut self, ctx: &mut InteractionContext<'_>, event: &KeyEvent) -> bool {
        self.inner_mut().handle_key(ctx, event)
    }

    fn dispose(&mut self, ctx: &mut InteractionContext<'_>) {
        self.inner_mut().dispose(ctx);
    }

    fn emitter_mut(&mut self) -> &mut Emitter {
        self.inner_mut().emitter_mut()
    }

    fn is_active(&self) -> bool {
        self.inner().is_active()
    }

    fn overlay_features(&self) -> Vec<&Feature> {
        self.inner().overlay_features()
    }
}
