//! Lifecycle events emitted by tool interactions, and the listener list
//! each interaction owns.
//!
//! Events carry *cloned* snapshots, never references into the live
//! collection, so a listener can keep them (e.g. as undo state) while the
//! live features keep changing.

use gd_core::{Feature, FeatureIds, LayerId};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// New features were parked in a creation overlay.
    FeatureBeingCreated { layer: LayerId, features: Vec<Feature> },
    /// Creation overlay committed: features are now in `layer`.
    FeatureCreated { layer: LayerId, features: Vec<Feature> },
    /// Existing features were parked in a modification overlay.
    /// Snapshots hold the geometry *before* the edit.
    GeometryBeingUpdated { layer: LayerId, features: Vec<Feature> },
    /// Modification overlay committed. Snapshots hold the geometry *after*.
    GeometryUpdated { layer: LayerId, features: Vec<Feature> },
    SelectionChanged {
        selected: FeatureIds,
        deselected: FeatureIds,
    },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FeatureBeingCreated { .. } => "FeatureBeingCreated",
            Self::FeatureCreated { .. } => "FeatureCreated",
            Self::GeometryBeingUpdated { .. } => "GeometryBeingUpdated",
            Self::GeometryUpdated { .. } => "GeometryUpdated",
            Self::SelectionChanged { .. } => "SelectionChanged",
        }
    }
}

/// Handle returned by [`Emitter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&LifecycleEvent)>;

/// Synchronous listener list. Listeners run in subscription order, inside
/// the call that emits.
#[derive(Default)]
pub struct Emitter {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&LifecycleEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: LifecycleEvent) {
        log::trace!("emit {}", event.name());
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Drop every listener. Called when the owning interaction is disposed.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
