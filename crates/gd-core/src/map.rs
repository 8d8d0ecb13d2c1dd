//! Layers and the map that orders them.
//!
//! Exactly one vector layer is *active* at a time: it is the layer drawing
//! tools write into. Raster layers can never be active.

use crate::feature::{Feature, FeatureCollection};
use crate::id::{FeatureId, LayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Vector(FeatureCollection),
    /// Tiled or image background. The source is opaque to the editing core.
    Raster { source: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub active: bool,
    pub kind: LayerKind,
}

impl Layer {
    pub fn vector(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::generate(),
            name: name.into(),
            active: false,
            kind: LayerKind::Vector(FeatureCollection::new()),
        }
    }

    pub fn raster(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: LayerId::generate(),
            name: name.into(),
            active: false,
            kind: LayerKind::Raster {
                source: source.into(),
            },
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.kind, LayerKind::Vector(_))
    }

    pub fn features(&self) -> Option<&FeatureCollection> {
        match &self.kind {
            LayerKind::Vector(c) => Some(c),
            LayerKind::Raster { .. } => None,
        }
    }

    pub fn features_mut(&mut self) -> Option<&mut FeatureCollection> {
        match &mut self.kind {
            LayerKind::Vector(c) => Some(c),
            LayerKind::Raster { .. } => None,
        }
    }
}

/// The ordered layer stack (bottom first) plus the current view resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub layers: Vec<Layer>,
    /// Map units per pixel, used to convert pixel tolerances.
    pub resolution: f64,
}

impl Default for Map {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            resolution: 1.0,
        }
    }
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with one active, empty vector layer.
    pub fn with_vector_layer(name: &str) -> Self {
        let mut map = Self::new();
        let id = map.add_layer(Layer::vector(name));
        map.set_active_layer(id);
        map
    }

    /// Push a layer on top. Returns its id.
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Insert at a given position (clamped to the stack length).
    pub fn insert_layer_at(&mut self, index: usize, layer: Layer) {
        let index = index.min(self.layers.len());
        self.layers.insert(index, layer);
    }

    /// Remove a layer, returning its former index and the layer itself.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<(usize, Layer)> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        Some((index, self.layers.remove(index)))
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.layer(id).is_some()
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.layers.iter().find(|l| l.active).map(|l| l.id)
    }

    /// Make `id` the single active layer. Raster or missing layers are
    /// rejected and leave the current activation untouched.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if !self.layer(id).is_some_and(Layer::is_vector) {
            return false;
        }
        for layer in &mut self.layers {
            layer.active = layer.id == id;
        }
        true
    }

    /// Activate the top-most vector layer. Used after the active layer has
    /// been removed. Returns the newly active layer, if any.
    pub fn activate_last_layer(&mut self) -> Option<LayerId> {
        let id = self.layers.iter().rev().find(|l| l.is_vector())?.id;
        self.set_active_layer(id);
        Some(id)
    }

    pub fn active_collection(&self) -> Option<&FeatureCollection> {
        self.layers.iter().find(|l| l.active)?.features()
    }

    pub fn active_collection_mut(&mut self) -> Option<&mut FeatureCollection> {
        self.layers.iter_mut().find(|l| l.active)?.features_mut()
    }

    pub fn collection(&self, layer: LayerId) -> Option<&FeatureCollection> {
        self.layer(layer)?.features()
    }

    pub fn collection_mut(&mut self, layer: LayerId) -> Option<&mut FeatureCollection> {
        self.layer_mut(layer)?.features_mut()
    }

    /// Look a feature up in any vector layer.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.layers
            .iter()
            .filter_map(Layer::features)
            .find_map(|c| c.get(id))
    }

    pub fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.layers
            .iter_mut()
            .filter_map(Layer::features_mut)
            .find_map(|c| c.get_mut(id))
    }

    /// The vector layer currently holding feature `id`.
    pub fn find_feature_layer(&self, id: FeatureId) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|l| l.features().is_some_and(|c| c.contains(id)))
            .map(|l| l.id)
    }
}
