//! Transient holding area for features mid-gesture.
//!
//! A feature lives in exactly one place at a time: its layer's collection,
//! the creation side of an overlay, or the modification side. Parking an
//! existing feature takes it out of its collection; committing or rolling
//! back puts it back in the slot it came from, so stacking order survives
//! an edit.

use gd_core::{Feature, FeatureId, Geometry, LayerId, Map};

#[derive(Debug, Clone)]
struct Parked {
    feature: Feature,
    /// Geometry at park time, restored on rollback.
    original: Geometry,
    /// Collection slot at park time.
    index: usize,
}

/// Features handed back to their layer by [`Overlay::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub layer: LayerId,
    pub created: Vec<Feature>,
    pub modified: Vec<Feature>,
}

#[derive(Debug, Default)]
pub struct Overlay {
    layer: Option<LayerId>,
    created: Vec<Feature>,
    modified: Vec<Parked>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty()
    }

    /// An overlay serves one layer per gesture.
    fn bind(&mut self, layer: LayerId) -> bool {
        match self.layer {
            Some(bound) if bound != layer => {
                log::warn!("overlay bound to {bound}, refusing feature from {layer}");
                false
            }
            _ => {
                self.layer = Some(layer);
                true
            }
        }
    }

    /// Park a brand-new feature. Returns a snapshot of it.
    pub fn park_new(&mut self, layer: LayerId, feature: Feature) -> Option<Feature> {
        if !self.bind(layer) {
            return None;
        }
        let snapshot = feature.clone();
        self.created.push(feature);
        Some(snapshot)
    }

    /// Move an existing feature out of its collection. Returns a snapshot
    /// taken before any edit.
    pub fn park_existing(&mut self, map: &mut Map, layer: LayerId, id: FeatureId) -> Option<Feature> {
        if !self.bind(layer) {
            return None;
        }
        let (index, feature) = map.collection_mut(layer)?.remove_indexed(id)?;
        let snapshot = feature.clone();
        self.modified.push(Parked {
            original: feature.geometry.clone(),
            feature,
            index,
        });
        Some(snapshot)
    }

    /// Move every parked feature by a relative delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for feature in self.features_mut() {
            feature.geometry.translate(dx, dy);
        }
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.created
            .iter()
            .chain(self.modified.iter().map(|p| &p.feature))
    }

    pub fn features_mut(&mut self) -> impl Iterator<Item = &mut Feature> {
        self.created
            .iter_mut()
            .chain(self.modified.iter_mut().map(|p| &mut p.feature))
    }

    pub fn created_mut(&mut self) -> &mut [Feature] {
        &mut self.created
    }

    pub fn modified_mut(&mut self) -> impl Iterator<Item = &mut Feature> {
        self.modified.iter_mut().map(|p| &mut p.feature)
    }

    /// Put every parked feature into the layer as it is now.
    /// `None` when the overlay was empty or its layer has disappeared.
    pub fn commit(&mut self, map: &mut Map) -> Option<Committed> {
        let layer = self.layer.take()?;
        let created = std::mem::take(&mut self.created);
        let parked = std::mem::take(&mut self.modified);

        let Some(collection) = map.collection_mut(layer) else {
            log::warn!("overlay: layer {layer} vanished mid-gesture, dropping parked features");
            return None;
        };
        // Later parks saw the collection after earlier removals: undo them in reverse.
        for p in parked.iter().rev() {
            collection.insert_at(p.index, p.feature.clone());
        }
        for feature in &created {
            collection.insert(feature.clone());
        }
        let modified = parked.into_iter().map(|p| p.feature).collect();
        Some(Committed {
            layer,
            created,
            modified,
        })
    }

    /// Discard created features and return modified ones unchanged.
    pub fn rollback(&mut self, map: &mut Map) {
        let layer = self.layer.take();
        self.created.clear();
        let parked = std::mem::take(&mut self.modified);
        if parked.is_empty() {
            return;
        }
        let Some(collection) = layer.and_then(|l| map.collection_mut(l)) else {
            log::warn!("overlay: layer vanished, cannot restore {} feature(s)", parked.len());
            return;
        };
        for Parked {
            mut feature,
            original,
            index,
        } in parked.into_iter().rev()
        {
            feature.geometry = original;
            collection.insert_at(index, feature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gd_core::Coord;
    use pretty_assertions::assert_eq;

    fn setup() -> (Map, LayerId, FeatureId) {
        let mut map = Map::with_vector_layer("Drawings");
        let layer = map.active_layer_id().unwrap();
        let feature = Feature::new(Geometry::Point(Coord::new(1.0, 1.0)));
        let id = feature.id;
        map.collection_mut(layer).unwrap().insert(feature);
        (map, layer, id)
    }

    #[test]
    fn parked_feature_leaves_collection() {
        let (mut map, layer, id) = setup();
        let mut overlay = Overlay::new();
        overlay.park_existing(&mut map, layer, id).unwrap();
        assert!(map.feature(id).is_none());
        assert_eq!(overlay.features().count(), 1);
    }

    #[test]
    fn commit_returns_features_to_layer() {
        let (mut map, layer, id) = setup();
        let mut overlay = Overlay::new();
        overlay.park_existing(&mut map, layer, id);
        let new = Feature::new(Geometry::Point(Coord::new(0.0, 0.0)));
        overlay.park_new(layer, new.clone());
        overlay.translate(2.0, 3.0);

        let committed = overlay.commit(&mut map).unwrap();
        assert_eq!(committed.created.len(), 1);
        assert_eq!(committed.modified.len(), 1);
        assert!(overlay.is_empty());
        assert_eq!(map.feature(id).unwrap().geometry, Geometry::Point(Coord::new(3.0, 4.0)));
        assert_eq!(map.feature(new.id).unwrap().geometry, Geometry::Point(Coord::new(2.0, 3.0)));
    }

    #[test]
    fn rollback_restores_original_geometry_and_drops_new() {
        let (mut map, layer, id) = setup();
        let before = map.clone();
        let mut overlay = Overlay::new();
        overlay.park_existing(&mut map, layer, id);
        overlay.park_new(layer, Feature::new(Geometry::Point(Coord::new(0.0, 0.0))));
        overlay.translate(5.0, 5.0);

        overlay.rollback(&mut map);
        assert!(overlay.is_empty());
        assert_eq!(map, before);
    }

    #[test]
    fn commit_restores_stacking_order() {
        let (mut map, layer, first) = setup();
        let collection = map.collection_mut(layer).unwrap();
        let middle = Feature::new(Geometry::Point(Coord::new(2.0, 2.0)));
        let top = Feature::new(Geometry::Point(Coord::new(3.0, 3.0)));
        let order = vec![first, middle.id, top.id];
        collection.insert(middle);
        collection.insert(top);

        let mut overlay = Overlay::new();
        overlay.park_existing(&mut map, layer, first);
        overlay.park_existing(&mut map, layer, order[2]);
        overlay.translate(1.0, 0.0);
        overlay.commit(&mut map).unwrap();

        let ids: Vec<_> = map.collection(layer).unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn refuses_second_layer() {
        let (mut map, layer, _) = setup();
        let other = map.add_layer(gd_core::Layer::vector("Other"));
        let mut overlay = Overlay::new();
        assert!(overlay.park_new(layer, Feature::new(Geometry::Point(Coord::new(0.0, 0.0)))).is_some());
        assert!(overlay.park_new(other, Feature::new(Geometry::Point(Coord::new(0.0, 0.0)))).is_none());
        overlay.rollback(&mut map);
    }
}
