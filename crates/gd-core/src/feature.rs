//! Features and the collections that own them.

use crate::geometry::{Extent, Geometry};
use crate::id::FeatureId;
use crate::style::StyleProperties;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single editable geometry with its identity, selection flag and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub style: StyleProperties,
}

impl Feature {
    /// New unselected feature with a freshly generated id and empty style.
    pub fn new(geometry: Geometry) -> Self {
        Self::with_id(FeatureId::generate(), geometry)
    }

    pub fn with_id(id: FeatureId, geometry: Geometry) -> Self {
        Self {
            id,
            geometry,
            selected: false,
            style: StyleProperties::default(),
        }
    }

    #[must_use]
    pub fn styled(mut self, style: StyleProperties) -> Self {
        self.style = style;
        self
    }

    pub fn extent(&self) -> Option<Extent> {
        self.geometry.extent()
    }
}

/// IDs touched by a single edit. Most gestures touch one or two features.
pub type FeatureIds = SmallVec<[FeatureId; 4]>;

/// The features of one vector layer.
///
/// Iteration order is insertion order (oldest first). Ids are unique:
/// inserting a feature whose id is already present replaces it in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    fn position(&self, id: FeatureId) -> Option<usize> {
        self.features.iter().position(|f| f.id == id)
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.position(id).is_some()
    }

    /// Add a feature on top. Returns the previous feature with the same id,
    /// which keeps its slot instead.
    pub fn insert(&mut self, feature: Feature) -> Option<Feature> {
        match self.position(feature.id) {
            Some(i) => Some(std::mem::replace(&mut self.features[i], feature)),
            None => {
                self.features.push(feature);
                None
            }
        }
    }

    pub fn remove(&mut self, id: FeatureId) -> Option<Feature> {
        self.position(id).map(|i| self.features.remove(i))
    }

    /// Remove a feature and report the slot it occupied.
    pub fn remove_indexed(&mut self, id: FeatureId) -> Option<(usize, Feature)> {
        let i = self.position(id)?;
        Some((i, self.features.remove(i)))
    }

    /// Put a feature back at `index` (clamped). An existing feature with the
    /// same id is replaced in its own slot instead.
    pub fn insert_at(&mut self, index: usize, feature: Feature) {
        match self.position(feature.id) {
            Some(i) => self.features[i] = feature,
            None => self.features.insert(index.min(self.features.len()), feature),
        }
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.id == id)
    }

    /// Oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Feature> {
        self.features.iter_mut()
    }

    pub fn selected_ids(&self) -> FeatureIds {
        self.features
            .iter()
            .filter(|f| f.selected)
            .map(|f| f.id)
            .collect()
    }

    /// Clear every selection flag. Returns the ids that were selected.
    pub fn deselect_all(&mut self) -> FeatureIds {
        let mut cleared = FeatureIds::new();
        for f in self.features.iter_mut().filter(|f| f.selected) {
            f.selected = false;
            cleared.push(f.id);
        }
        cleared
    }

    pub fn clear(&mut self) {
        self.features.clear();
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        let mut collection = Self::new();
        for f in iter {
            collection.insert(f);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coord;

    fn point(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point(Coord::new(x, y)))
    }

    #[test]
    fn insert_keeps_ids_unique() {
        let mut collection = FeatureCollection::new();
        let a = point(1.0, 1.0);
        let mut moved = a.clone();
        moved.geometry.translate(1.0, 0.0);

        assert!(collection.insert(a.clone()).is_none());
        collection.insert(point(5.0, 5.0));
        let previous = collection.insert(moved.clone());

        assert_eq!(previous, Some(a.clone()));
        assert_eq!(collection.len(), 2);
        // Replacement keeps the original slot.
        assert_eq!(collection.iter().next().map(|f| f.id), Some(a.id));
        assert_eq!(collection.get(a.id), Some(&moved));
    }

    #[test]
    fn remove_returns_owned_feature() {
        let mut collection: FeatureCollection = [point(0.0, 0.0), point(1.0, 1.0)].into_iter().collect();
        let id = collection.iter().next().unwrap().id;
        let removed = collection.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!collection.contains(id));
        assert!(collection.remove(id).is_none());
    }

    #[test]
    fn indexed_removal_round_trips_slot() {
        let mut collection: FeatureCollection =
            [point(0.0, 0.0), point(1.0, 1.0), point(2.0, 2.0)].into_iter().collect();
        let order: Vec<_> = collection.iter().map(|f| f.id).collect();

        let (index, middle) = collection.remove_indexed(order[1]).unwrap();
        assert_eq!(index, 1);
        collection.insert_at(index, middle);
        assert_eq!(collection.iter().map(|f| f.id).collect::<Vec<_>>(), order);

        collection.insert_at(99, point(3.0, 3.0));
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn deselect_all_reports_cleared_ids() {
        let mut a = point(0.0, 0.0);
        a.selected = true;
        let b = point(1.0, 1.0);
        let a_id = a.id;
        let mut collection: FeatureCollection = [a, b].into_iter().collect();

        assert_eq!(collection.selected_ids().as_slice(), &[a_id]);
        assert_eq!(collection.deselect_all().as_slice(), &[a_id]);
        assert!(collection.selected_ids().is_empty());
    }
}
