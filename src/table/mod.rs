//! Row-oriented table of attribute records with one geometry per record.
//!
//! A [`GeoTable`] is the container every other component reads from and
//! writes to: loaders produce one, subdivision joins and metric attachment
//! add columns to one, spatial functions snapshot one at construction.
//!
//! Tables are not internally synchronized. Mutating methods take `&mut self`,
//! so the borrow checker enforces the single-writer discipline.

mod join;

pub(crate) use join::first_row_by_key;

use crate::error::{Result, SociomeError};
use geo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use sociome_types::{Geometry, Value};

/// Column holding 1 for every loaded location, added by the loaders.
pub const LOCATIONS_KEY: &str = "LOCATIONS";

/// Column name carried by every spatial function evaluation result.
pub const METRIC_COLUMN: &str = "metric";

/// A geometry and one value per schema column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub geometry: Geometry,
    pub values: Vec<Value>,
}

/// Ordered records sharing a schema, plus the names of the columns produced
/// by subdivision joins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoTable")]
pub struct GeoTable {
    columns: Vec<String>,
    rows: Vec<Record>,
    subdivisions: Vec<String>,
}

/// Unchecked wire form of [`GeoTable`].
#[derive(Deserialize)]
struct RawGeoTable {
    columns: Vec<String>,
    rows: Vec<Record>,
    #[serde(default)]
    subdivisions: Vec<String>,
}

impl TryFrom<RawGeoTable> for GeoTable {
    type Error = SociomeError;

    fn try_from(raw: RawGeoTable) -> Result<Self> {
        let mut table = GeoTable::with_columns(raw.columns)?;
        for record in raw.rows {
            table.push_row(record.geometry, record.values)?;
        }
        for name in &raw.subdivisions {
            table.add_subdivision_name(name)?;
        }
        Ok(table)
    }
}

/// Borrowed view of one record with attribute access by name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a GeoTable,
    index: usize,
}

impl<'a> Row<'a> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn geometry(&self) -> &'a Geometry {
        &self.table.rows[self.index].geometry
    }

    /// Value of `column`, `None` if the table has no such column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let idx = self.table.position(column)?;
        Some(&self.table.rows[self.index].values[idx])
    }

    #[inline]
    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index].values
    }
}

impl GeoTable {
    /// Creates an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table with the given schema.
    pub fn with_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for name in columns {
            let name = name.into();
            if table.has_column(&name) {
                return Err(SociomeError::DuplicateColumn(name));
            }
            table.columns.push(name);
        }
        Ok(table)
    }

    /// Creates a table of bare geometries with no attribute columns.
    pub fn from_geometries<I>(geometries: I) -> Self
    where
        I: IntoIterator<Item = Geometry>,
    {
        Self {
            columns: Vec::new(),
            rows: geometries
                .into_iter()
                .map(|geometry| Record {
                    geometry,
                    values: Vec::new(),
                })
                .collect(),
            subdivisions: Vec::new(),
        }
    }

    /// Appends a record. `values` must follow the schema order.
    pub fn push_row(&mut self, geometry: Geometry, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(SociomeError::ShapeMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(Record { geometry, values });
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Names of the columns produced by subdivision joins, in join order.
    #[inline]
    pub fn subdivisions(&self) -> &[String] {
        &self.subdivisions
    }

    /// Registers an existing column as a subdivision.
    pub fn add_subdivision_name(&mut self, name: &str) -> Result<()> {
        self.column_index(name)?;
        if !self.subdivisions.iter().any(|s| s == name) {
            self.subdivisions.push(name.to_string());
        }
        Ok(())
    }

    #[inline]
    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| SociomeError::ColumnNotFound(name.to_string()))
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> + '_ {
        self.rows.iter().map(|r| &r.geometry)
    }

    /// All values of a column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| &r.values[idx]).collect())
    }

    /// Numeric view of a column: missing values become `None`, text values
    /// are an error.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| {
                let value = &r.values[idx];
                if value.is_text() {
                    return Err(SociomeError::NonNumeric {
                        column: name.to_string(),
                        row,
                    });
                }
                Ok(value.as_f64())
            })
            .collect()
    }

    /// Point geometries of every record. Fails on the first non-point row.
    pub fn points(&self) -> Result<Vec<Point<f64>>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| {
                r.geometry.as_point().ok_or(SociomeError::GeometryKind {
                    row,
                    expected: "Point",
                    found: r.geometry.kind(),
                })
            })
            .collect()
    }

    /// The N×2 coordinate matrix `[x, y]` of a point table.
    pub fn coordinates(&self) -> Result<Vec<[f64; 2]>> {
        Ok(self.points()?.into_iter().map(|p| [p.x(), p.y()]).collect())
    }

    /// A copy holding only the geometries.
    pub fn geometry_only(&self) -> GeoTable {
        Self::from_geometries(self.geometries().cloned())
    }

    /// Replaces the values of `name`, appending the column if it is new.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(SociomeError::ShapeMismatch {
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.position(name) {
            Some(idx) => {
                for (record, value) in self.rows.iter_mut().zip(values) {
                    record.values[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (record, value) in self.rows.iter_mut().zip(values) {
                    record.values.push(value);
                }
            }
        }
        Ok(())
    }

    /// Rows for which `predicate` holds, in their original order.
    pub fn filter<F>(&self, predicate: F) -> GeoTable
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|row| predicate(row))
            .map(|row| self.rows[row.index].clone())
            .collect();
        GeoTable {
            columns: self.columns.clone(),
            rows,
            subdivisions: self.subdivisions.clone(),
        }
    }

    /// Projection onto `columns`; geometry is always kept.
    pub fn select(&self, columns: &[&str]) -> Result<GeoTable> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;
        let mut out = GeoTable::with_columns(columns.iter().copied())?;
        out.rows = self
            .rows
            .iter()
            .map(|r| Record {
                geometry: r.geometry.clone(),
                values: indices.iter().map(|&i| r.values[i].clone()).collect(),
            })
            .collect();
        out.subdivisions = self
            .subdivisions
            .iter()
            .filter(|s| columns.contains(&s.as_str()))
            .cloned()
            .collect();
        Ok(out)
    }

    /// Seeded down-sampling keeping `round(len * fraction)` rows in their
    /// original relative order.
    pub fn sample(&self, fraction: f64, seed: u64) -> Result<GeoTable> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(SociomeError::InvalidInput(format!(
                "Sampling fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        let n = self.rows.len();
        let amount = ((n as f64) * fraction).round() as usize;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked = index::sample(&mut rng, n, amount.min(n)).into_vec();
        picked.sort_unstable();

        Ok(GeoTable {
            columns: self.columns.clone(),
            rows: picked.into_iter().map(|i| self.rows[i].clone()).collect(),
            subdivisions: self.subdivisions.clone(),
        })
    }
}
