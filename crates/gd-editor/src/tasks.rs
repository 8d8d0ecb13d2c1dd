//! Reversible edit commands.
//!
//! A task owns cloned snapshots of everything it needs: undo and redo
//! copy from those snapshots every time they run, so the live map can keep
//! mutating without ever reaching back into history.
//!
//! Targets that no longer exist (a feature deleted by a later project
//! load, a layer removed out of band) are logged and skipped. History is a
//! convenience; it must never take the editing session down.

use gd_core::{Feature, FeatureId, Geometry, Layer, LayerId, Map, StyleProperties};

/// One feature's geometry before and after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryChange {
    pub feature: FeatureId,
    pub before: Geometry,
    pub after: Geometry,
}

/// One feature's style before and after an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleChange {
    pub feature: FeatureId,
    pub before: StyleProperties,
    pub after: StyleProperties,
}

/// A layer snapshot and the stack position it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLayer {
    pub index: usize,
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    AddFeatures {
        layer: LayerId,
        features: Vec<Feature>,
    },
    RemoveFeatures {
        layer: LayerId,
        features: Vec<Feature>,
    },
    UpdateGeometries(Vec<GeometryChange>),
    UpdateStyle(Vec<StyleChange>),
    /// Layers added to the stack. A snapshot whose `active` flag is set is
    /// re-activated on redo.
    AddLayers(Vec<PlacedLayer>),
    /// Layers removed from the stack, with their activation at capture time.
    RemoveLayers(Vec<PlacedLayer>),
    /// Several tasks undone and redone as one step.
    Batch(Vec<Task>),
}

fn debug_assert_unique<T: PartialEq + std::fmt::Debug>(ids: impl Iterator<Item = T>) {
    if cfg!(debug_assertions) {
        let ids: Vec<T> = ids.collect();
        for (i, id) in ids.iter().enumerate() {
            debug_assert!(!ids[i + 1..].contains(id), "task references {id:?} twice");
        }
    }
}

impl Task {
    pub fn add_features(layer: LayerId, features: Vec<Feature>) -> Self {
        debug_assert_unique(features.iter().map(|f| f.id));
        Self::AddFeatures { layer, features }
    }

    pub fn remove_features(layer: LayerId, features: Vec<Feature>) -> Self {
        debug_assert_unique(features.iter().map(|f| f.id));
        Self::RemoveFeatures { layer, features }
    }

    pub fn update_geometries(changes: Vec<GeometryChange>) -> Self {
        debug_assert_unique(changes.iter().map(|c| c.feature));
        Self::UpdateGeometries(changes)
    }

    pub fn update_style(changes: Vec<StyleChange>) -> Self {
        debug_assert_unique(changes.iter().map(|c| c.feature));
        Self::UpdateStyle(changes)
    }

    /// Layers are sorted by index so replay inserts them bottom-up.
    pub fn add_layers(mut layers: Vec<PlacedLayer>) -> Self {
        layers.sort_by_key(|p| p.index);
        debug_assert_unique(layers.iter().map(|p| p.layer.id));
        Self::AddLayers(layers)
    }

    pub fn remove_layers(mut layers: Vec<PlacedLayer>) -> Self {
        layers.sort_by_key(|p| p.index);
        debug_assert_unique(layers.iter().map(|p| p.layer.id));
        Self::RemoveLayers(layers)
    }

    /// Short human-readable label, e.g. for an "Undo …" menu entry.
    pub fn label(&self) -> String {
        match self {
            Self::AddFeatures { features, .. } => format!("Add {} feature(s)", features.len()),
            Self::RemoveFeatures { features, .. } => {
                format!("Remove {} feature(s)", features.len())
            }
            Self::UpdateGeometries(changes) => format!("Edit {} geometry(ies)", changes.len()),
            Self::UpdateStyle(changes) => format!("Restyle {} feature(s)", changes.len()),
            Self::AddLayers(layers) => format!("Add {} layer(s)", layers.len()),
            Self::RemoveLayers(layers) => format!("Remove {} layer(s)", layers.len()),
            Self::Batch(tasks) => format!("{} edits", tasks.len()),
        }
    }

    pub fn redo(&self, map: &mut Map) {
        match self {
            Self::AddFeatures { layer, features } => insert_features(map, *layer, features),
            Self::RemoveFeatures { layer, features } => remove_features(map, *layer, features),
            Self::UpdateGeometries(changes) => {
                for c in changes {
                    set_geometry(map, c.feature, &c.after);
                }
            }
            Self::UpdateStyle(changes) => {
                for c in changes {
                    set_style(map, c.feature, &c.after);
                }
            }
            Self::AddLayers(layers) => insert_layers(map, layers),
            Self::RemoveLayers(layers) => remove_layers(map, layers),
            Self::Batch(tasks) => tasks.iter().for_each(|t| t.redo(map)),
        }
    }

    pub fn undo(&self, map: &mut Map) {
        match self {
            Self::AddFeatures { layer, features } => remove_features(map, *layer, features),
            Self::RemoveFeatures { layer, features } => insert_features(map, *layer, features),
            Self::UpdateGeometries(changes) => {
                for c in changes {
                    set_geometry(map, c.feature, &c.before);
                }
            }
            Self::UpdateStyle(changes) => {
                for c in changes {
                    set_style(map, c.feature, &c.before);
                }
            }
            Self::AddLayers(layers) => remove_layers(map, layers),
            Self::RemoveLayers(layers) => insert_layers(map, layers),
            Self::Batch(tasks) => tasks.iter().rev().for_each(|t| t.undo(map)),
        }
    }
}

fn insert_features(map: &mut Map, layer: LayerId, features: &[Feature]) {
    let Some(collection) = map.collection_mut(layer) else {
        log::warn!("history: layer {layer} no longer exists, skipping feature insert");
        return;
    };
    for f in features {
        collection.insert(f.clone());
    }
}

fn remove_features(map: &mut Map, layer: LayerId, features: &[Feature]) {
    let Some(collection) = map.collection_mut(layer) else {
        log::warn!("history: layer {layer} no longer exists, skipping feature removal");
        return;
    };
    for f in features {
        if collection.remove(f.id).is_none() {
            log::warn!("history: feature {} already gone from {layer}", f.id);
        }
    }
}

fn set_geometry(map: &mut Map, id: FeatureId, geometry: &Geometry) {
    match map.feature_mut(id) {
        Some(feature) => feature.geometry = geometry.clone(),
        None => log::warn!("history: feature {id} no longer exists, skipping geometry update"),
    }
}

fn set_style(map: &mut Map, id: FeatureId, style: &StyleProperties) {
    match map.feature_mut(id) {
        Some(feature) => feature.style = style.clone(),
        None => log::warn!("history: feature {id} no longer exists, skipping style update"),
    }
}

fn insert_layers(map: &mut Map, layers: &[PlacedLayer]) {
    for placed in layers {
        if map.contains_layer(placed.layer.id) {
            log::warn!("history: layer {} already present, skipping", placed.layer.id);
            continue;
        }
        let mut layer = placed.layer.clone();
        layer.active = false;
        map.insert_layer_at(placed.index, layer);
    }
    if let Some(active) = layers.iter().rev().find(|p| p.layer.active) {
        map.set_active_layer(active.layer.id);
    }
}

fn remove_layers(map: &mut Map, layers: &[PlacedLayer]) {
    let mut removed_active = false;
    // Top-down, so the remaining indices stay valid.
    for placed in layers.iter().rev() {
        match map.remove_layer(placed.layer.id) {
            Some((_, layer)) => removed_active |= layer.active,
            None => log::warn!("history: layer {} already removed", placed.layer.id),
        }
    }
    if removed_active {
        let next = map.activate_last_layer();
        log::debug!("active layer removed, activated {next:?}");
    }
}
