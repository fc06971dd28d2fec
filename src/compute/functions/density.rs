use super::SpatialFunction;
use crate::compute::distance::meters_to_degrees;
use crate::compute::validation::validate_radius;
use crate::config::Config;
use crate::error::{Result, SociomeError};
use crate::index::SpatialIndex;
use crate::table::GeoTable;
use geo::Point;
use sociome_types::Value;

/// Number of source points within a fixed radius of a point.
///
/// The radius is given in meters and converted to a coordinate-space
/// bandwidth at 111139 meters per degree. The query point itself counts if it
/// is part of the source.
#[derive(Debug, Clone)]
pub struct Density {
    index: SpatialIndex,
    bandwidth: f64,
}

impl Density {
    pub fn new(source: &GeoTable, radius_m: f64) -> Result<Self> {
        validate_radius(radius_m)?;
        Ok(Self {
            index: SpatialIndex::new(source.coordinates()?),
            bandwidth: meters_to_degrees(radius_m),
        })
    }

    pub fn from_config(source: &GeoTable, config: &Config) -> Result<Self> {
        config.validate().map_err(SociomeError::InvalidInput)?;
        Ok(Self {
            index: SpatialIndex::new(source.coordinates()?),
            bandwidth: config.density_bandwidth(),
        })
    }

    /// Search radius in coordinate units.
    #[inline]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

impl SpatialFunction for Density {
    fn name(&self) -> &'static str {
        "Density"
    }

    fn query(&self, point: &Point<f64>) -> Result<Value> {
        let count = self
            .index
            .count_within_radius([point.x(), point.y()], self.bandwidth);
        Ok(Value::Int(count as i64))
    }
}
