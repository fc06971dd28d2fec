//! GeoJSON conversion for tables.
//!
//! A table maps to a `FeatureCollection`: one feature per row, the row's
//! attributes as properties. Only `Point`, `Polygon` and `MultiPolygon`
//! geometries are supported.

use crate::error::{Result, SociomeError};
use crate::loader::value_from_json;
use crate::table::GeoTable;
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Map;
use sociome_types::{Geometry, Value};

type Ring = Vec<Vec<f64>>;

fn ring_to_positions(ring: &LineString<f64>) -> Ring {
    ring.coords().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_to_rings(polygon: &Polygon<f64>) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_to_positions)
        .collect()
}

fn geometry_to_geojson(geometry: &Geometry) -> geojson::Geometry {
    let value = match geometry {
        Geometry::Point(p) => geojson::Value::Point(vec![p.x(), p.y()]),
        Geometry::Polygon(p) => geojson::Value::Polygon(polygon_to_rings(p)),
        Geometry::MultiPolygon(mp) => {
            geojson::Value::MultiPolygon(mp.iter().map(polygon_to_rings).collect())
        }
    };
    geojson::Geometry::new(value)
}

fn position(coords: &[f64]) -> Result<Coord<f64>> {
    if coords.len() < 2 {
        return Err(SociomeError::InvalidInput(
            "Coordinate must have at least 2 values".to_string(),
        ));
    }
    Ok(Coord {
        x: coords[0],
        y: coords[1],
    })
}

fn rings_to_polygon(rings: &[Ring]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .map(|c| position(c))
            .collect::<Result<Vec<_>>>()
            .map(LineString::from)
    });
    let exterior = rings.next().ok_or_else(|| {
        SociomeError::InvalidInput("Polygon must have at least one ring".to_string())
    })??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn geometry_from_geojson(geometry: &geojson::Geometry) -> Result<Geometry> {
    match &geometry.value {
        geojson::Value::Point(coords) => Ok(Geometry::Point(Point::from(position(coords)?))),
        geojson::Value::Polygon(rings) => Ok(Geometry::Polygon(rings_to_polygon(rings)?)),
        geojson::Value::MultiPolygon(polygons) => {
            let polygons = polygons
                .iter()
                .map(|rings| rings_to_polygon(rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        _ => Err(SociomeError::InvalidInput(
            "Only Point, Polygon and MultiPolygon geometries are supported".to_string(),
        )),
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::from(*i),
        // NaN and infinities have no JSON form
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
    }
}

impl GeoTable {
    /// Serializes the table as a GeoJSON `FeatureCollection`.
    pub fn to_geojson(&self) -> Result<String> {
        let features: Vec<Feature> = self
            .iter()
            .map(|row| {
                let properties: Map<String, serde_json::Value> = self
                    .columns()
                    .iter()
                    .zip(row.values())
                    .map(|(name, value)| (name.clone(), value_to_json(value)))
                    .collect();
                Feature {
                    bbox: None,
                    geometry: Some(geometry_to_geojson(row.geometry())),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        let collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        };

        serde_json::to_string(&collection).map_err(|e| {
            SociomeError::Serialization(format!("Failed to serialize feature collection: {}", e))
        })
    }

    /// Parses a GeoJSON `FeatureCollection` (or a single `Feature`).
    ///
    /// The schema is the union of all property names in order of first
    /// appearance; features lacking a property get `Null` for it. Every
    /// feature must carry a geometry.
    pub fn from_geojson(geojson: &str) -> Result<GeoTable> {
        let parsed: GeoJson = geojson
            .parse()
            .map_err(|e| SociomeError::InvalidInput(format!("Failed to parse GeoJSON: {}", e)))?;

        let features = match parsed {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => {
                return Err(SociomeError::InvalidInput(
                    "Expected a Feature or FeatureCollection, got a bare geometry".to_string(),
                ));
            }
        };

        let mut columns: Vec<String> = Vec::new();
        for feature in &features {
            for key in feature.properties.iter().flat_map(|p| p.keys()) {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = GeoTable::with_columns(columns.iter().cloned())?;
        for (row, feature) in features.iter().enumerate() {
            let geometry = feature.geometry.as_ref().ok_or_else(|| {
                SociomeError::InvalidInput(format!("Feature {} has no geometry", row))
            })?;
            let values = columns
                .iter()
                .map(|name| {
                    feature
                        .property(name)
                        .map(value_from_json)
                        .unwrap_or(Value::Null)
                })
                .collect();
            table.push_row(geometry_from_geojson(geometry)?, values)?;
        }

        log::debug!("Parsed {} features from GeoJSON", table.len());
        Ok(table)
    }
}
