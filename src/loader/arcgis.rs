//! ArcGIS address point exports.
//!
//! Column names follow the national address database layout. Only the
//! projected columns are kept; the ZIP column becomes a subdivision.

use crate::compute::validation::validate_geographic_point;
use crate::error::Result;
use crate::table::{GeoTable, LOCATIONS_KEY};
use crate::timing::timed;
use geo::Point;
use sociome_types::{Geometry, Value};
use std::collections::HashMap;

pub const ADDRESS_LINE: &str = "ADDRDELIV";
pub const CITY: &str = "Post_Comm";
pub const STATE: &str = "State";
pub const ZIP: &str = "Post_Code";
pub const STREET_TYPE: &str = "LSt_Type";
pub const STREET_DIRECTION: &str = "LSt_PreDir";
pub const LATITUDE: &str = "Lat";
pub const LONGITUDE: &str = "Long";

/// Columns kept from an export, in output order.
pub const PROJECTION: [&str; 8] = [
    LATITUDE,
    LONGITUDE,
    ADDRESS_LINE,
    CITY,
    STATE,
    ZIP,
    STREET_TYPE,
    STREET_DIRECTION,
];

fn coordinate(record: &HashMap<String, Value>, column: &str) -> Option<f64> {
    match record.get(column)? {
        Value::Text(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// Builds an address table from parsed export rows (column name → value).
///
/// Rows whose `Lat`/`Long` are missing or outside the valid latitude and
/// longitude ranges are dropped. Projected columns absent from a row are
/// `Null`.
pub fn from_records(records: &[HashMap<String, Value>]) -> Result<GeoTable> {
    timed("arcgis::from_records", || -> Result<GeoTable> {
        let mut table = GeoTable::with_columns(PROJECTION)?;
        let mut dropped = 0usize;

        for record in records {
            let point = match (coordinate(record, LONGITUDE), coordinate(record, LATITUDE)) {
                (Some(lon), Some(lat)) => Point::new(lon, lat),
                _ => {
                    dropped += 1;
                    continue;
                }
            };
            if validate_geographic_point(&point).is_err() {
                dropped += 1;
                continue;
            }

            let mut values: Vec<Value> = PROJECTION
                .iter()
                .map(|c| record.get(*c).cloned().unwrap_or(Value::Null))
                .collect();
            values[0] = Value::Float(point.y());
            values[1] = Value::Float(point.x());
            table.push_row(Geometry::Point(point), values)?;
        }
        if dropped > 0 {
            log::warn!("Dropped {} address rows with invalid coordinates", dropped);
        }

        table.set_column(LOCATIONS_KEY, vec![Value::Int(1); table.len()])?;
        table.add_subdivision_name(ZIP)?;
        log::info!("Loaded {} address points", table.len());
        Ok(table)
    })
}
