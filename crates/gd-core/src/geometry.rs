//! Vector geometry value types.
//!
//! Geometries are plain values: the live copy in a collection and every
//! snapshot held by history are independent `Clone`s, never shared.
//!
//! Polygon rings are stored **open** (the closing vertex is implicit), so
//! vertex editing never has to keep a duplicated first/last coordinate
//! in sync.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// A position in map units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned bounding box in map units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Normalized extent spanning two corners.
    pub fn from_corners(a: Coord, b: Coord) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.min_x && c.x <= self.max_x && c.y >= self.min_y && c.y <= self.max_y
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    fn extend(&mut self, c: Coord) {
        self.min_x = self.min_x.min(c.x);
        self.min_y = self.min_y.min(c.y);
        self.max_x = self.max_x.max(c.x);
        self.max_y = self.max_y.max(c.y);
    }
}

/// Geometry type tag, used by tools to decide which features they may edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    MultiPoint,
    MultiLineString,
    MultiPolygon,
}

impl GeometryKind {
    /// The single-part kind (`MultiPolygon` → `Polygon`).
    pub fn base(self) -> Self {
        match self {
            Self::MultiPoint => Self::Point,
            Self::MultiLineString => Self::LineString,
            Self::MultiPolygon => Self::Polygon,
            other => other,
        }
    }
}

/// Address of a single vertex: which path (line or ring) and which index.
/// Paths are numbered in the order returned by [`Geometry::paths`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexRef {
    pub path: usize,
    pub index: usize,
}

/// A borrowed line or ring of a geometry.
#[derive(Debug, Clone, Copy)]
pub struct PathRef<'a> {
    pub coords: &'a [Coord],
    /// Rings close back onto their first vertex.
    pub closed: bool,
}

impl<'a> PathRef<'a> {
    fn open(coords: &'a [Coord]) -> Self {
        Self { coords, closed: false }
    }

    fn ring(coords: &'a [Coord]) -> Self {
        Self { coords, closed: true }
    }

    /// Consecutive vertex pairs, including the closing segment of a ring.
    pub fn segments(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        let n = self.coords.len();
        let count = match (self.closed, n) {
            (_, 0 | 1) => 0,
            (true, 2) => 1,
            (true, _) => n,
            (false, _) => n - 1,
        };
        (0..count).map(move |i| (self.coords[i], self.coords[(i + 1) % n]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::LineString(_) => GeometryKind::LineString,
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::MultiPoint(_) => GeometryKind::MultiPoint,
            Self::MultiLineString(_) => GeometryKind::MultiLineString,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Regular polygon approximating a circle.
    pub fn circle(center: Coord, radius: f64, segments: usize) -> Self {
        let segments = segments.max(3);
        let ring = (0..segments)
            .map(|i| {
                let angle = TAU * i as f64 / segments as f64;
                Coord::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        Self::Polygon(vec![ring])
    }

    /// Axis-aligned rectangle spanning two opposite corners.
    pub fn rectangle(a: Coord, b: Coord) -> Self {
        let e = Extent::from_corners(a, b);
        Self::Polygon(vec![vec![
            Coord::new(e.min_x, e.min_y),
            Coord::new(e.max_x, e.min_y),
            Coord::new(e.max_x, e.max_y),
            Coord::new(e.min_x, e.max_y),
        ]])
    }

    /// Every line and ring, in a stable order.
    pub fn paths(&self) -> Vec<PathRef<'_>> {
        match self {
            Self::Point(c) => vec![PathRef::open(std::slice::from_ref(c))],
            Self::LineString(line) => vec![PathRef::open(line)],
            Self::MultiPoint(points) => points
                .iter()
                .map(|p| PathRef::open(std::slice::from_ref(p)))
                .collect(),
            Self::MultiLineString(lines) => lines.iter().map(|l| PathRef::open(l)).collect(),
            Self::Polygon(rings) => rings.iter().map(|r| PathRef::ring(r)).collect(),
            Self::MultiPolygon(polygons) => polygons
                .iter()
                .flatten()
                .map(|r| PathRef::ring(r))
                .collect(),
        }
    }

    fn paths_mut(&mut self) -> Vec<&mut [Coord]> {
        match self {
            Self::Point(c) => vec![std::slice::from_mut(c)],
            Self::LineString(line) => vec![line.as_mut_slice()],
            Self::MultiPoint(points) => points.iter_mut().map(std::slice::from_mut).collect(),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter_mut().map(Vec::as_mut_slice).collect()
            }
            Self::MultiPolygon(polygons) => polygons
                .iter_mut()
                .flatten()
                .map(Vec::as_mut_slice)
                .collect(),
        }
    }

    /// All vertices, flattened.
    pub fn coords(&self) -> Vec<Coord> {
        self.paths()
            .iter()
            .flat_map(|p| p.coords.iter().copied())
            .collect()
    }

    /// Every vertex with its address.
    pub fn vertices(&self) -> Vec<(VertexRef, Coord)> {
        self.paths()
            .iter()
            .enumerate()
            .flat_map(|(path, p)| {
                p.coords
                    .iter()
                    .enumerate()
                    .map(move |(index, c)| (VertexRef { path, index }, *c))
            })
            .collect()
    }

    /// Bounding box, or `None` for a geometry without vertices.
    pub fn extent(&self) -> Option<Extent> {
        let coords = self.coords();
        let first = *coords.first()?;
        let mut extent = Extent::from_corners(first, first);
        for c in &coords[1..] {
            extent.extend(*c);
        }
        Some(extent)
    }

    /// Move every vertex by a relative delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for path in self.paths_mut() {
            for c in path.iter_mut() {
                *c = c.offset(dx, dy);
            }
        }
    }

    /// Replace one vertex. Returns `false` if the address does not exist.
    pub fn move_vertex(&mut self, vertex: VertexRef, to: Coord) -> bool {
        match self
            .paths_mut()
            .into_iter()
            .nth(vertex.path)
            .and_then(|p| p.get_mut(vertex.index))
        {
            Some(c) => {
                *c = to;
                true
            }
            None => false,
        }
    }

    /// Insert a vertex into a line or ring at `vertex.index`, shifting the
    /// rest. Point geometries cannot grow and return `false`.
    pub fn insert_vertex(&mut self, vertex: VertexRef, at: Coord) -> bool {
        let path: Option<&mut Vec<Coord>> = match self {
            Self::Point(_) | Self::MultiPoint(_) => None,
            Self::LineString(line) if vertex.path == 0 => Some(line),
            Self::LineString(_) => None,
            Self::MultiLineString(lines) | Self::Polygon(lines) => lines.get_mut(vertex.path),
            Self::MultiPolygon(polygons) => polygons.iter_mut().flatten().nth(vertex.path),
        };
        match path {
            Some(p) if vertex.index <= p.len() => {
                p.insert(vertex.index, at);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn translate_moves_every_vertex() {
        let mut g = Geometry::Polygon(vec![vec![
            Coord::new(0.0, 0.0),
            Coord::new(2.0, 0.0),
            Coord::new(2.0, 2.0),
        ]]);
        g.translate(1.0, -1.0);
        assert_eq!(
            g.coords(),
            vec![
                Coord::new(1.0, -1.0),
                Coord::new(3.0, -1.0),
                Coord::new(3.0, 1.0)
            ]
        );
    }

    #[test]
    fn ring_segments_include_closing_edge() {
        let g = Geometry::rectangle(Coord::new(0.0, 0.0), Coord::new(1.0, 1.0));
        let paths = g.paths();
        let segments: Vec<_> = paths[0].segments().collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[3], (Coord::new(0.0, 1.0), Coord::new(0.0, 0.0)));
    }

    #[test]
    fn line_segments_are_open() {
        let g = Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0)]);
        assert_eq!(g.paths()[0].segments().count(), 1);
        assert_eq!(Geometry::Point(Coord::new(1.0, 1.0)).paths()[0].segments().count(), 0);
    }

    #[test]
    fn rectangle_normalizes_corners() {
        let g = Geometry::rectangle(Coord::new(4.0, 5.0), Coord::new(1.0, 2.0));
        let e = g.extent().unwrap();
        assert_eq!((e.min_x, e.min_y, e.max_x, e.max_y), (1.0, 2.0, 4.0, 5.0));
    }

    #[test]
    fn circle_vertices_lie_on_radius() {
        let g = Geometry::circle(Coord::new(10.0, 10.0), 5.0, 16);
        let coords = g.coords();
        assert_eq!(coords.len(), 16);
        for c in coords {
            let r = ((c.x - 10.0).powi(2) + (c.y - 10.0).powi(2)).sqrt();
            assert!((r - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn move_and_insert_vertex() {
        let mut g = Geometry::LineString(vec![Coord::new(0.0, 0.0), Coord::new(4.0, 0.0)]);
        assert!(g.insert_vertex(VertexRef { path: 0, index: 1 }, Coord::new(2.0, 0.0)));
        assert!(g.move_vertex(VertexRef { path: 0, index: 1 }, Coord::new(2.0, 3.0)));
        assert_eq!(
            g.coords(),
            vec![Coord::new(0.0, 0.0), Coord::new(2.0, 3.0), Coord::new(4.0, 0.0)]
        );
        assert!(!g.move_vertex(VertexRef { path: 1, index: 0 }, Coord::default()));
        assert!(!Geometry::Point(Coord::default()).insert_vertex(VertexRef { path: 0, index: 0 }, Coord::default()));
    }

    #[test]
    fn multi_kinds_map_to_base() {
        assert_eq!(GeometryKind::MultiPolygon.base(), GeometryKind::Polygon);
        assert_eq!(GeometryKind::Point.base(), GeometryKind::Point);
    }

    #[test]
    fn clone_is_independent_of_original() {
        let original = Geometry::Point(Coord::new(2.0, 2.0));
        let mut live = original.clone();
        live.translate(3.0, 3.0);
        assert_eq!(original, Geometry::Point(Coord::new(2.0, 2.0)));
        assert_eq!(live, Geometry::Point(Coord::new(5.0, 5.0)));
    }
}
