use super::{SpatialFunction, metric_table};
use crate::error::{Result, SociomeError};
use crate::table::GeoTable;
use geo::Point;
use rustc_hash::FxHashMap;
use sociome_types::{GeometryKey, Value};

/// Copies a column between tables that share geometries.
///
/// `eval` joins each target row to the source row with exactly the same
/// geometry and carries `metric_col` over; rows without a twin get `Null`.
#[derive(Debug, Clone)]
pub struct IdentityCopy {
    lookup: FxHashMap<GeometryKey, Value>,
}

impl IdentityCopy {
    pub fn new(source: &GeoTable, metric_col: &str) -> Result<Self> {
        let values = source.column(metric_col)?;
        let mut lookup = FxHashMap::default();
        for (geometry, value) in source.geometries().zip(values) {
            lookup
                .entry(geometry.key())
                .or_insert_with(|| value.clone());
        }
        Ok(Self { lookup })
    }
}

impl SpatialFunction for IdentityCopy {
    fn name(&self) -> &'static str {
        "IdentityCopy"
    }

    fn query(&self, _point: &Point<f64>) -> Result<Value> {
        Err(SociomeError::NotPointwise(self.name()))
    }

    fn eval(&self, target: &GeoTable) -> Result<GeoTable> {
        let metrics = target
            .geometries()
            .map(|g| self.lookup.get(&g.key()).cloned().unwrap_or(Value::Null))
            .collect();
        metric_table(target, metrics)
    }
}
