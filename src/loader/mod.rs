//! Builds tables from in-memory records.
//!
//! Reading files or URLs is left to the caller; these loaders take the
//! already-parsed content. Every loader drops rows without usable
//! coordinates and adds a [`LOCATIONS_KEY`] column of 1.

pub mod arcgis;

use crate::error::{Result, SociomeError};
use crate::table::{GeoTable, LOCATIONS_KEY};
use crate::timing::timed;
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use sociome_types::{Geometry, Value};

/// Where a JSON record keeps its coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessor {
    /// Two top-level attributes holding longitude and latitude.
    ByAttribute { lon: String, lat: String },
    /// One attribute holding an object with `longitude` and `latitude`.
    ByLocationDict { key: String },
}

impl Accessor {
    pub fn by_attribute(lon: &str, lat: &str) -> Self {
        Self::ByAttribute {
            lon: lon.to_string(),
            lat: lat.to_string(),
        }
    }

    pub fn by_location_dict(key: &str) -> Self {
        Self::ByLocationDict {
            key: key.to_string(),
        }
    }

    /// Extracts the point of one record, `None` when either coordinate is
    /// absent or not a finite number.
    pub fn locate(&self, record: &Map<String, serde_json::Value>) -> Option<Point<f64>> {
        let (lon, lat) = match self {
            Accessor::ByAttribute { lon, lat } => (record.get(lon)?, record.get(lat)?),
            Accessor::ByLocationDict { key } => {
                let location = record.get(key)?.as_object()?;
                (location.get("longitude")?, location.get("latitude")?)
            }
        };
        Some(Point::new(json_number(lon)?, json_number(lat)?))
    }
}

/// Numbers and numeric strings; open data portals often quote coordinates.
fn json_number(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Scalar JSON becomes the matching [`Value`]; arrays and objects are kept
/// as their JSON text.
pub(crate) fn value_from_json(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        nested => Value::Text(nested.to_string()),
    }
}

/// Loads a JSON array of objects.
///
/// Columns are the union of the records' keys in order of first appearance.
///
/// ```
/// use sociome::loader::{Accessor, from_json_records};
///
/// let json = r#"[
///     {"name": "clinic", "location": {"longitude": "-87.6", "latitude": "41.8"}},
///     {"name": "unknown"}
/// ]"#;
/// let table = from_json_records(json, &Accessor::by_location_dict("location")).unwrap();
/// assert_eq!(table.len(), 1);
/// assert!(table.has_column("LOCATIONS"));
/// ```
pub fn from_json_records(json: &str, accessor: &Accessor) -> Result<GeoTable> {
    timed("from_json_records", || -> Result<GeoTable> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        let serde_json::Value::Array(items) = parsed else {
            return Err(SociomeError::InvalidInput(
                "Expected a JSON array of records".to_string(),
            ));
        };

        let mut records = Vec::with_capacity(items.len());
        for (row, item) in items.iter().enumerate() {
            let record = item.as_object().ok_or_else(|| {
                SociomeError::InvalidInput(format!("Record {} is not a JSON object", row))
            })?;
            records.push(record);
        }

        let mut columns: Vec<&String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.contains(&key) {
                    columns.push(key);
                }
            }
        }

        let mut table = GeoTable::with_columns(columns.iter().map(|c| c.as_str()))?;
        let mut dropped = 0usize;
        for record in &records {
            let Some(point) = accessor.locate(record) else {
                dropped += 1;
                continue;
            };
            let values = columns
                .iter()
                .map(|c| record.get(*c).map(value_from_json).unwrap_or(Value::Null))
                .collect();
            table.push_row(Geometry::Point(point), values)?;
        }
        if dropped > 0 {
            log::warn!("Dropped {} records without coordinates", dropped);
        }

        table.set_column(LOCATIONS_KEY, vec![Value::Int(1); table.len()])?;
        log::info!("Loaded {} records from JSON", table.len());
        Ok(table)
    })
}
