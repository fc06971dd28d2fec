use super::SpatialFunction;
use crate::compute::distance::distance_between;
use crate::config::Config;
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::table::GeoTable;
use geo::Point;
use sociome_types::{DistanceMetric, Value};

/// Distance in meters from a point to the closest source point.
///
/// The closest point is found in coordinate space (k = 1 nearest neighbour);
/// the reported distance is measured on the Earth's surface with the chosen
/// [`DistanceMetric`]. An empty source yields `Null`.
///
/// # Examples
///
/// ```
/// use geo::Point;
/// use sociome::{GeoTable, Geometry, NearestDistance, SpatialFunction, Value};
///
/// let parks = GeoTable::from_geometries([Geometry::point(-87.62, 41.88)]);
/// let to_park = NearestDistance::new(&parks)?;
/// assert_eq!(to_park.query(&Point::new(-87.62, 41.88))?, Value::Float(0.0));
/// # Ok::<(), sociome::SociomeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NearestDistance {
    index: SpatialIndex,
    metric: DistanceMetric,
}

impl NearestDistance {
    pub fn new(source: &GeoTable) -> Result<Self> {
        Self::with_metric(source, DistanceMetric::default())
    }

    pub fn with_metric(source: &GeoTable, metric: DistanceMetric) -> Result<Self> {
        let index = SpatialIndex::new(source.coordinates()?);
        Ok(Self { index, metric })
    }

    pub fn from_config(source: &GeoTable, config: &Config) -> Result<Self> {
        Self::with_metric(source, config.distance_metric)
    }

    #[inline]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl SpatialFunction for NearestDistance {
    fn name(&self) -> &'static str {
        "NearestDistance"
    }

    fn query(&self, point: &Point<f64>) -> Result<Value> {
        let Some(nearest) = self.index.closest([point.x(), point.y()]) else {
            return Ok(Value::Null);
        };
        let [x, y] = self.index.coord(nearest.index);
        Ok(Value::Float(distance_between(
            point,
            &Point::new(x, y),
            self.metric,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sociome_types::Geometry;

    #[test]
    fn test_self_distance_is_zero() {
        let source = GeoTable::from_geometries([Geometry::point(-87.6, 41.8)]);
        let f = NearestDistance::new(&source).unwrap();
        let out = f.eval(&source).unwrap();
        assert_eq!(out.row(0).unwrap().get("metric"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn test_picks_closest_point() {
        let source = GeoTable::from_geometries([
            Geometry::point(0.0, 0.0),
            Geometry::point(0.0, 1.0),
            Geometry::point(1.0, 0.0),
        ]);
        let f = NearestDistance::with_metric(&source, DistanceMetric::Haversine).unwrap();
        let d = Point::new(0.001, 0.0);
        let expected = distance_between(&d, &Point::new(0.0, 0.0), DistanceMetric::Haversine);
        let got = f.query(&d).unwrap().as_f64().unwrap();
        assert!((got - expected).abs() < 1e-9);
        assert!(got > 100.0 && got < 120.0);
    }

    #[test]
    fn test_empty_source_is_null() {
        let f = NearestDistance::new(&GeoTable::new()).unwrap();
        assert_eq!(f.query(&Point::new(0.0, 0.0)).unwrap(), Value::Null);
    }
}
