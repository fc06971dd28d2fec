//! Geospatial toolkit for sociome research: point tables, subdivision joins,
//! spatial metrics and regression.
//!
//! ```rust
//! use sociome::{Density, GeoTable, Geometry, NearestDistance, Value};
//!
//! let mut homes = GeoTable::with_columns(["id"])?;
//! homes.push_row(Geometry::point(-87.600, 41.790), vec![Value::Int(1)])?;
//! homes.push_row(Geometry::point(-87.601, 41.790), vec![Value::Int(2)])?;
//! homes.push_row(Geometry::point(-87.700, 41.900), vec![Value::Int(3)])?;
//!
//! let clinics = GeoTable::from_geometries([Geometry::point(-87.600, 41.795)]);
//! homes.attach_metric(&NearestDistance::new(&clinics)?, "clinic_m")?;
//!
//! let neighbours = Density::new(&homes, 500.0)?;
//! homes.attach_metric(&neighbours, "homes_500m")?;
//! assert_eq!(homes.row(0).unwrap().get("homes_500m"), Some(&Value::Int(2)));
//! assert_eq!(homes.row(2).unwrap().get("homes_500m"), Some(&Value::Int(1)));
//! # Ok::<(), sociome::SociomeError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod matching;
pub mod model;
pub mod table;

mod timing;

pub use compute::distance::distance_between;
pub use compute::functions::{
    Density, IdentityCopy, KernelInterpolation, NearestDistance, SpatialFunction,
    SubdivisionAggregate,
};
pub use config::{Config, ModelConfig};
pub use error::{Result, SociomeError};
pub use index::{Neighbor, RegionIndex, SpatialIndex};
pub use matching::{BlockingMatcher, GeometricMatcher, PairScorer};
pub use model::{FitStats, MeanBaseline, RegressionModel, Regressor, Ridge};
pub use table::{GeoTable, LOCATIONS_KEY, METRIC_COLUMN, Record, Row};

pub use sociome_types::{DistanceMetric, Geometry, GeometryKey, JoinKey, Value};

pub use geo::{Point, Polygon};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoTable, Geometry, Result, SociomeError, Value};

    pub use geo::{Point, Polygon};

    pub use crate::{
        Density, IdentityCopy, KernelInterpolation, NearestDistance, SpatialFunction,
        SubdivisionAggregate,
    };

    pub use crate::{Config, DistanceMetric, RegressionModel};

    pub use crate::loader::{Accessor, from_json_records};
}
