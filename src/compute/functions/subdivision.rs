use super::{SpatialFunction, metric_table};
use crate::error::{Result, SociomeError};
use crate::table::{GeoTable, first_row_by_key};
use geo::Point;
use rustc_hash::FxHashMap;
use sociome_types::{JoinKey, Value};

/// Spreads a per-subdivision aggregate over every point of the subdivision.
///
/// `eval` left-joins the target's `subdivision` column against the source's
/// `subdivision_right` column (same name by default) and carries `agg` over
/// as the metric. The source should hold one row per subdivision; if a key
/// repeats, its first row is used.
#[derive(Debug, Clone)]
pub struct SubdivisionAggregate {
    subdivision: String,
    lookup: FxHashMap<JoinKey, Value>,
}

impl SubdivisionAggregate {
    pub fn new(
        source: &GeoTable,
        subdivision: &str,
        agg: &str,
        subdivision_right: Option<&str>,
    ) -> Result<Self> {
        let right = subdivision_right.unwrap_or(subdivision);
        let right_idx = source.column_index(right)?;
        let agg_idx = source.column_index(agg)?;

        let lookup = first_row_by_key(source, right_idx, right)
            .into_iter()
            .map(|(key, row)| (key, source.records()[row].values[agg_idx].clone()))
            .collect();

        Ok(Self {
            subdivision: subdivision.to_string(),
            lookup,
        })
    }
}

impl SpatialFunction for SubdivisionAggregate {
    fn name(&self) -> &'static str {
        "SubdivisionAggregate"
    }

    fn query(&self, _point: &Point<f64>) -> Result<Value> {
        Err(SociomeError::NotPointwise(self.name()))
    }

    fn eval(&self, target: &GeoTable) -> Result<GeoTable> {
        let metrics = target
            .column(&self.subdivision)?
            .into_iter()
            .map(|v| {
                v.join_key()
                    .and_then(|k| self.lookup.get(&k).cloned())
                    .unwrap_or(Value::Null)
            })
            .collect();
        metric_table(target, metrics)
    }
}
