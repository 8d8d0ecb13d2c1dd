pub mod cache;
pub mod hit;
pub mod style;

pub use cache::{
    CacheKey, GeometryCache, Rasterize, Resource, ResourceKind, ResourceStore, SvgRasterizer,
    cache_key,
};
pub use hit::{
    closest_point, contains, find, find_in_extent, nearest_edge, nearest_vertex, snap_to_vertex,
    within_axis_tolerance,
};
pub use style::{FillPrimitive, PointPrimitive, StrokePrimitive, StyleFactory, TextPrimitive, VisualStyle};
