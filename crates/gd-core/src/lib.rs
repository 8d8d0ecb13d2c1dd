pub mod feature;
pub mod geometry;
pub mod id;
pub mod map;
pub mod snapshot;
pub mod style;

pub use feature::{Feature, FeatureCollection, FeatureIds};
pub use geometry::{Coord, Extent, Geometry, GeometryKind, PathRef, VertexRef};
pub use id::{FeatureId, LayerId};
pub use map::{Layer, LayerKind, Map};
pub use snapshot::{SnapshotError, decode_features, encode_features};
pub use style::{
    Color, FillProperties, PointProperties, StrokeProperties, StyleProperties, TextProperties,
};
