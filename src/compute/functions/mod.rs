//! Spatial functions: metrics defined at every lon/lat point.
//!
//! A spatial function is built from a snapshot of one [`GeoTable`] and
//! evaluated against another (or the same) table. Changing the source table
//! afterwards does not affect a function that was already built.
//!
//! | Function | `query(point)` |
//! |---|---|
//! | [`NearestDistance`] | meters to the closest source point |
//! | [`Density`] | number of source points within a radius |
//! | [`KernelInterpolation`] | unnormalized Gaussian-weighted sum of nearby values |
//! | [`SubdivisionAggregate`] | not pointwise, joins on a subdivision column |
//! | [`IdentityCopy`] | not pointwise, joins on identical geometry |
//!
//! Every `eval` returns a table row-aligned with its target and holding a
//! `metric` column, which is what [`GeoTable::attach_metric`] consumes.

mod density;
mod identity;
mod kernel;
mod nearest;
mod subdivision;

pub use density::Density;
pub use identity::IdentityCopy;
pub use kernel::KernelInterpolation;
pub use nearest::NearestDistance;
pub use subdivision::SubdivisionAggregate;

use crate::error::Result;
use crate::table::{GeoTable, METRIC_COLUMN};
use geo::Point;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use sociome_types::{Geometry, Value};

/// A metric that can be evaluated at points or over a whole table.
pub trait SpatialFunction: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Value of the metric at `point`.
    ///
    /// Join-based functions have no pointwise value and return
    /// [`SociomeError::NotPointwise`](crate::SociomeError::NotPointwise).
    fn query(&self, point: &Point<f64>) -> Result<Value>;

    /// Evaluates the metric for every row of `target`.
    ///
    /// The default queries each target point and returns `x`, `y` and
    /// `metric` columns with the point as geometry. Target rows must be
    /// points.
    fn eval(&self, target: &GeoTable) -> Result<GeoTable> {
        evaluate_pointwise(self, target)
    }
}

/// Queries `function` at every point of `target`, keeping row order.
pub fn evaluate_pointwise<F>(function: &F, target: &GeoTable) -> Result<GeoTable>
where
    F: SpatialFunction + ?Sized,
{
    let points = target.points()?;

    #[cfg(feature = "parallel")]
    let metrics: Vec<Value> = points
        .par_iter()
        .map(|p| function.query(p))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let metrics: Vec<Value> = points
        .iter()
        .map(|p| function.query(p))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("{} evaluated at {} points", function.name(), points.len());

    let mut out = GeoTable::with_columns(["x", "y", METRIC_COLUMN])?;
    for (point, metric) in points.into_iter().zip(metrics) {
        out.push_row(
            Geometry::Point(point),
            vec![point.x().into(), point.y().into(), metric],
        )?;
    }
    Ok(out)
}

/// Wraps join results as a `metric` table carrying the target geometries.
pub(crate) fn metric_table(target: &GeoTable, metrics: Vec<Value>) -> Result<GeoTable> {
    let mut out = GeoTable::with_columns([METRIC_COLUMN])?;
    for (geometry, metric) in target.geometries().zip(metrics) {
        out.push_row(geometry.clone(), vec![metric])?;
    }
    Ok(out)
}
