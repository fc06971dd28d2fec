//! Compute layer: distances, coordinate validation, spatial metric functions
//! and GeoJSON conversion.
//!
//! Everything here works on frozen snapshots of [`GeoTable`](crate::GeoTable)
//! data and never mutates a table.

pub mod distance;
pub mod functions;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod validation;
