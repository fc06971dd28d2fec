//! Distances between lon/lat points.

use crate::config::METERS_PER_DEGREE;
use geo::{Distance, Euclidean, Geodesic, Haversine, Point, Rhumb};
use sociome_types::DistanceMetric;

/// Distance between two points in meters (coordinate units for
/// [`DistanceMetric::Euclidean`]).
///
/// # Examples
///
/// ```
/// use geo::Point;
/// use sociome::compute::distance::distance_between;
/// use sociome::DistanceMetric;
///
/// let loop_ = Point::new(-87.6298, 41.8781);
/// let hyde_park = Point::new(-87.5917, 41.7943);
/// let d = distance_between(&loop_, &hyde_park, DistanceMetric::Geodesic);
/// assert!(d > 9_000.0 && d < 10_500.0);
/// ```
pub fn distance_between(point1: &Point<f64>, point2: &Point<f64>, metric: DistanceMetric) -> f64 {
    match metric {
        DistanceMetric::Haversine => Haversine.distance(*point1, *point2),
        DistanceMetric::Geodesic => Geodesic.distance(*point1, *point2),
        DistanceMetric::Rhumb => Rhumb.distance(*point1, *point2),
        DistanceMetric::Euclidean => Euclidean.distance(*point1, *point2),
    }
}

/// Converts a radius in meters to coordinate degrees.
#[inline]
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Squared planar distance in coordinate units.
#[inline]
pub(crate) fn squared_norm(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
