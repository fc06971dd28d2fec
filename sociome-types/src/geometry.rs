//! Geometries carried by table records, built on `geo` primitives.

use geo::{BoundingRect, Contains, CoordsIter, MultiPolygon, Point, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Distance metric for spatial calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Spherical Earth, fast.
    Haversine,
    /// Ellipsoidal Earth (Karney 2013).
    #[default]
    Geodesic,
    /// Constant bearing line.
    Rhumb,
    /// Planar distance in coordinate units, for projected data only.
    Euclidean,
}

/// Geometry of a single record. Coordinates are (x = longitude, y = latitude).
///
/// # Examples
///
/// ```
/// use geo::polygon;
/// use sociome_types::Geometry;
///
/// let tract = Geometry::from(polygon![
///     (x: 0.0, y: 0.0),
///     (x: 1.0, y: 0.0),
///     (x: 1.0, y: 1.0),
///     (x: 0.0, y: 1.0),
/// ]);
/// assert!(tract.contains_point(&geo::Point::new(0.5, 0.5)));
/// assert!(!tract.contains_point(&geo::Point::new(1.5, 0.5)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point<f64>),
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

/// Exact-equality key over all coordinates of a geometry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    kind: u8,
    bits: Vec<u64>,
}

impl Geometry {
    /// Shorthand for a point geometry.
    #[inline]
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    #[inline]
    pub fn as_point(&self) -> Option<Point<f64>> {
        match self {
            Geometry::Point(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether `point` lies strictly inside this geometry. Points on a polygon
    /// boundary are not contained.
    pub fn contains_point(&self, point: &Point<f64>) -> bool {
        match self {
            Geometry::Point(p) => p.contains(point),
            Geometry::Polygon(poly) => poly.contains(point),
            Geometry::MultiPolygon(multi) => multi.contains(point),
        }
    }

    /// Bounding rectangle, `None` for empty polygons.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Geometry::Point(p) => Some(p.bounding_rect()),
            Geometry::Polygon(poly) => poly.bounding_rect(),
            Geometry::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }

    /// Key identifying this exact geometry, coordinate for coordinate.
    pub fn key(&self) -> GeometryKey {
        let kind = match self {
            Geometry::Point(_) => 0,
            Geometry::Polygon(_) => 1,
            Geometry::MultiPolygon(_) => 2,
        };
        let coords: Vec<geo::Coord<f64>> = match self {
            Geometry::Point(p) => vec![p.0],
            Geometry::Polygon(poly) => poly.coords_iter().collect(),
            Geometry::MultiPolygon(multi) => multi.coords_iter().collect(),
        };
        let bits = coords
            .into_iter()
            .flat_map(|c| [normalized_bits(c.x), normalized_bits(c.y)])
            .collect();
        GeometryKey { kind, bits }
    }
}

// -0.0 and 0.0 are the same location.
#[inline]
fn normalized_bits(v: f64) -> u64 {
    if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() }
}

impl From<Point<f64>> for Geometry {
    fn from(value: Point<f64>) -> Self {
        Geometry::Point(value)
    }
}

impl From<Polygon<f64>> for Geometry {
    fn from(value: Polygon<f64>) -> Self {
        Geometry::Polygon(value)
    }
}

impl From<MultiPolygon<f64>> for Geometry {
    fn from(value: MultiPolygon<f64>) -> Self {
        Geometry::MultiPolygon(value)
    }
}
