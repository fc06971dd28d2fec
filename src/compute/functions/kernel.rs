use super::SpatialFunction;
use crate::compute::distance::squared_norm;
use crate::compute::validation::validate_kernel;
use crate::config::Config;
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::table::GeoTable;
use geo::Point;
use sociome_types::Value;

/// Gaussian-kernel interpolation of a source column.
///
/// `query(x)` sums `FX[i] * exp(-|x - X[i]|^2 / sigma2)` over the source points
/// within the cutoff `-ln(precision) * sigma2` (coordinate units, inclusive).
/// The sum is not divided by the total weight. With no source point inside the
/// cutoff the result is `Null`.
///
/// Source rows whose value is missing are left out of the snapshot entirely.
#[derive(Debug, Clone)]
pub struct KernelInterpolation {
    index: SpatialIndex,
    values: Vec<f64>,
    sigma2: f64,
    bandwidth: f64,
}

impl KernelInterpolation {
    pub fn new(source: &GeoTable, metric_col: &str, sigma2: f64, precision: f64) -> Result<Self> {
        validate_kernel(sigma2, precision)?;
        let values = source.numeric_column(metric_col)?;
        let coords = source.coordinates()?;

        let (coords, values): (Vec<[f64; 2]>, Vec<f64>) = coords
            .into_iter()
            .zip(values)
            .filter_map(|(c, v)| v.map(|v| (c, v)))
            .unzip();
        let skipped = source.len() - values.len();
        if skipped > 0 {
            log::warn!(
                "{} rows with missing {} left out of the interpolation",
                skipped,
                metric_col
            );
        }

        Ok(Self {
            index: SpatialIndex::new(coords),
            values,
            sigma2,
            bandwidth: (-precision.ln() * sigma2).max(0.0),
        })
    }

    pub fn from_config(source: &GeoTable, metric_col: &str, config: &Config) -> Result<Self> {
        Self::new(
            source,
            metric_col,
            config.kernel_sigma2,
            config.kernel_precision,
        )
    }

    /// Hard truncation radius in coordinate units.
    #[inline]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[inline]
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }
}

impl SpatialFunction for KernelInterpolation {
    fn name(&self) -> &'static str {
        "KernelInterpolation"
    }

    fn query(&self, point: &Point<f64>) -> Result<Value> {
        let x = [point.x(), point.y()];
        let window = self.index.within_radius(x, self.bandwidth);
        if window.is_empty() {
            return Ok(Value::Null);
        }

        let sum: f64 = window
            .into_iter()
            .map(|i| {
                let weight = (-squared_norm(x, self.index.coord(i)) / self.sigma2).exp();
                weight * self.values[i]
            })
            .sum();
        Ok(Value::Float(sum))
    }
}
