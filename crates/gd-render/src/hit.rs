//! Hit testing: cursor → feature lookup.
//!
//! Two passes. First an exact pass walks the collection top-down (most
//! recently inserted first) and returns the first feature whose geometry
//! covers the cursor. If nothing covers it, the single closest feature is
//! picked and accepted only when its closest point lies within the
//! tolerance on *each axis independently* (a square, not a circle).
//!
//! Tolerances are given in pixels and converted with the map resolution
//! (map units per pixel).

use gd_core::{Coord, Extent, Feature, FeatureCollection, FeatureId, Geometry, VertexRef};
use kurbo::{BezPath, Line, ParamCurve, ParamCurveNearest, Point, Shape};

/// Distance below which a cursor counts as lying *on* a line.
const ON_LINE_EPSILON: f64 = 1e-9;

/// Accuracy passed to kurbo's nearest-point solver (exact for lines).
const NEAREST_ACCURACY: f64 = 1e-9;

fn to_point(c: Coord) -> Point {
    Point::new(c.x, c.y)
}

fn to_coord(p: Point) -> Coord {
    Coord::new(p.x, p.y)
}

/// Does `cursor` fall within `tolerance` of `target` on both axes?
pub fn within_axis_tolerance(cursor: Coord, target: Coord, tolerance: f64) -> bool {
    (cursor.x - target.x).abs() <= tolerance && (cursor.y - target.y).abs() <= tolerance
}

/// Find the feature under or nearest to `cursor`.
///
/// Exact hits win regardless of tolerance; among several exact hits the
/// topmost (most recently inserted) is returned. Near misses are accepted
/// when the closest point lies within
/// `(style padding + tolerance_px) × resolution` on each axis.
pub fn find<'a>(
    cursor: Coord,
    collection: &'a FeatureCollection,
    filter: impl Fn(&Feature) -> bool,
    tolerance_px: f64,
    resolution: f64,
) -> Option<&'a Feature> {
    if let Some(hit) = collection
        .iter()
        .rev()
        .find(|f| filter(f) && contains(&f.geometry, cursor))
    {
        return Some(hit);
    }

    let mut closest: Option<(&Feature, Coord, f64)> = None;
    for feature in collection.iter().rev() {
        let Some(point) = closest_point(&feature.geometry, cursor) else {
            continue;
        };
        let d2 = to_point(point).distance_squared(to_point(cursor));
        if closest.is_none_or(|(_, _, best)| d2 < best) {
            closest = Some((feature, point, d2));
        }
    }

    let (feature, point, _) = closest?;
    let tolerance = (feature.style.visual_padding_px() + tolerance_px) * resolution;
    if filter(feature) && within_axis_tolerance(cursor, point, tolerance) {
        Some(feature)
    } else {
        None
    }
}

/// Ids of all features whose extent intersects `extent`, bottom first.
pub fn find_in_extent(extent: &Extent, collection: &FeatureCollection) -> Vec<FeatureId> {
    collection
        .iter()
        .filter(|f| f.extent().is_some_and(|e| e.intersects(extent)))
        .map(|f| f.id)
        .collect()
}

/// Exact cover test: on a point, on a line, or inside a polygon (holes excluded).
pub fn contains(geometry: &Geometry, cursor: Coord) -> bool {
    match geometry {
        Geometry::Polygon(rings) => polygon_contains(rings, cursor),
        Geometry::MultiPolygon(polygons) => polygons.iter().any(|p| polygon_contains(p, cursor)),
        _ => closest_point(geometry, cursor).is_some_and(|p| {
            to_point(p).distance(to_point(cursor)) <= ON_LINE_EPSILON
        }),
    }
}

fn ring_path(ring: &[Coord]) -> BezPath {
    let mut path = BezPath::new();
    let mut coords = ring.iter();
    if let Some(first) = coords.next() {
        path.move_to(to_point(*first));
        for c in coords {
            path.line_to(to_point(*c));
        }
        path.close_path();
    }
    path
}

fn polygon_contains(rings: &[Vec<Coord>], cursor: Coord) -> bool {
    let Some((exterior, holes)) = rings.split_first() else {
        return false;
    };
    let point = to_point(cursor);
    let on_boundary = rings.iter().any(|ring| {
        closest_on_path(ring, true, cursor)
            .is_some_and(|p| to_point(p).distance(point) <= ON_LINE_EPSILON)
    });
    on_boundary
        || (ring_path(exterior).winding(point) != 0
            && holes.iter().all(|h| ring_path(h).winding(point) == 0))
}

fn closest_on_segment(a: Coord, b: Coord, cursor: Coord) -> Coord {
    let line = Line::new(to_point(a), to_point(b));
    let nearest = line.nearest(to_point(cursor), NEAREST_ACCURACY);
    to_coord(line.eval(nearest.t))
}

fn closest_on_path(coords: &[Coord], closed: bool, cursor: Coord) -> Option<Coord> {
    match coords {
        [] => None,
        [single] => Some(*single),
        _ => gd_core::PathRef { coords, closed }
            .segments()
            .map(|(a, b)| closest_on_segment(a, b, cursor))
            .min_by(|p, q| {
                let dp = to_point(*p).distance_squared(to_point(cursor));
                let dq = to_point(*q).distance_squared(to_point(cursor));
                dp.total_cmp(&dq)
            }),
    }
}

/// Closest point of the geometry's vertices and edges to `cursor`.
/// `None` only for a geometry without vertices.
pub fn closest_point(geometry: &Geometry, cursor: Coord) -> Option<Coord> {
    let target = to_point(cursor);
    geometry
        .paths()
        .iter()
        .filter_map(|p| closest_on_path(p.coords, p.closed, cursor))
        .min_by(|p, q| {
            to_point(*p)
                .distance_squared(target)
                .total_cmp(&to_point(*q).distance_squared(target))
        })
}

/// The vertex nearest to `cursor` within `tolerance` (map units, per axis).
pub fn nearest_vertex(geometry: &Geometry, cursor: Coord, tolerance: f64) -> Option<(VertexRef, Coord)> {
    let target = to_point(cursor);
    geometry
        .vertices()
        .into_iter()
        .filter(|(_, c)| within_axis_tolerance(cursor, *c, tolerance))
        .min_by(|(_, a), (_, b)| {
            to_point(*a)
                .distance_squared(target)
                .total_cmp(&to_point(*b).distance_squared(target))
        })
}

/// The edge point nearest to `cursor` within `tolerance`, as an insertion
/// address: inserting at the returned `VertexRef` splits that edge.
pub fn nearest_edge(geometry: &Geometry, cursor: Coord, tolerance: f64) -> Option<(VertexRef, Coord)> {
    let target = to_point(cursor);
    let mut best: Option<(VertexRef, Coord, f64)> = None;
    for (path, p) in geometry.paths().iter().enumerate() {
        for (i, (a, b)) in p.segments().enumerate() {
            let point = closest_on_segment(a, b, cursor);
            let d2 = to_point(point).distance_squared(target);
            if within_axis_tolerance(cursor, point, tolerance)
                && best.is_none_or(|(_, _, best_d2)| d2 < best_d2)
            {
                best = Some((VertexRef { path, index: i + 1 }, point, d2));
            }
        }
    }
    best.map(|(v, c, _)| (v, c))
}

/// Snap `cursor` onto the nearest existing vertex in `collection`.
///
/// `exclude` skips one feature, typically the one being edited, so a vertex
/// cannot snap onto itself.
pub fn snap_to_vertex(
    cursor: Coord,
    collection: &FeatureCollection,
    tolerance_px: f64,
    resolution: f64,
    exclude: Option<FeatureId>,
) -> Option<Coord> {
    let tolerance = tolerance_px * resolution;
    collection
        .iter()
        .filter(|f| Some(f.id) != exclude)
        .filter_map(|f| nearest_vertex(&f.geometry, cursor, tolerance).map(|(_, c)| c))
        .min_by(|a, b| {
            let target = to_point(cursor);
            to_point(*a)
                .distance_squared(target)
                .total_cmp(&to_point(*b).distance_squared(target))
        })
}
