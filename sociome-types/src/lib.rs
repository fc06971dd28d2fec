//! # sociome-types
//!
//! Core attribute and geometry types for the sociome toolkit.
//!
//! - **Values**: [`Value`], the scalar stored in every table cell, and
//!   [`JoinKey`], its hashable view used by equality joins
//! - **Geometries**: [`Geometry`] over the `geo` crate's point and polygon
//!   primitives, plus [`GeometryKey`] for exact-equality joins
//! - **Distances**: [`DistanceMetric`] selecting how meters are measured
//!
//! All types are serializable with Serde.
//!
//! ## Examples
//!
//! ```rust
//! use sociome_types::{Geometry, Value};
//!
//! let home = Geometry::point(-87.6298, 41.8781);
//! assert_eq!(home.kind(), "Point");
//!
//! let tract = Value::from("17031010100");
//! assert_eq!(tract.as_text(), Some("17031010100"));
//! ```

pub mod geometry;
pub mod value;

pub use geometry::{DistanceMetric, Geometry, GeometryKey};
pub use value::{JoinKey, Value};
