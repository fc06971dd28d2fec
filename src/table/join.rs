//! Column-adding operations: subdivision joins, key merges and metric
//! attachment. All of them preserve the row count and order of `self`.

use super::{GeoTable, METRIC_COLUMN};
use crate::compute::functions::SpatialFunction;
use crate::error::{Result, SociomeError};
use crate::index::RegionIndex;
use crate::timing::timed;
use rustc_hash::FxHashMap;
use sociome_types::{JoinKey, Value};

impl GeoTable {
    /// Tags every point with the `key` of the `source` polygon containing it,
    /// stored as column `name` and registered as a subdivision.
    ///
    /// Points outside every polygon (and non-point rows) get `Null`. When a
    /// point falls inside several polygons the lowest source row wins and a
    /// warning is logged; overlapping subdivisions are a data problem the
    /// caller should fix upstream.
    pub fn with_subdivision(
        &mut self,
        source: &GeoTable,
        name: &str,
        key: &str,
    ) -> Result<&mut Self> {
        let key_idx = source.column_index(key)?;
        if self.has_column(name) {
            return Err(SociomeError::DuplicateColumn(name.to_string()));
        }

        let values = timed(&format!("with_subdivision({})", name), || {
            let regions = RegionIndex::new(source);
            let mut unmatched = 0usize;
            let mut ambiguous = 0usize;

            let values: Vec<Value> = self
                .rows
                .iter()
                .map(|record| {
                    let Some(point) = record.geometry.as_point() else {
                        unmatched += 1;
                        return Value::Null;
                    };
                    let hits = regions.containing(&point);
                    if hits.len() > 1 {
                        ambiguous += 1;
                    }
                    match hits.first() {
                        Some(&row) => source.rows[row].values[key_idx].clone(),
                        None => {
                            unmatched += 1;
                            Value::Null
                        }
                    }
                })
                .collect();

            if ambiguous > 0 {
                log::warn!(
                    "{} points fall inside more than one {} region; kept the first",
                    ambiguous,
                    name
                );
            }
            if unmatched > 0 {
                log::debug!("{} points matched no {} region", unmatched, name);
            }
            values
        });

        self.set_column(name, values)?;
        self.subdivisions.push(name.to_string());
        Ok(self)
    }

    /// Left join of `source` on `self[subdivision] == source[right_key]`,
    /// adding `(source column, new name)` pairs from `columns`.
    ///
    /// Unmatched rows get `Null`. If `right_key` repeats in `source` the first
    /// occurrence is used, so the row count of `self` never changes.
    pub fn merge_on_subdivision(
        &mut self,
        source: &GeoTable,
        subdivision: &str,
        right_key: &str,
        columns: &[(&str, &str)],
    ) -> Result<&mut Self> {
        let left_idx = self.column_index(subdivision)?;
        let right_idx = source.column_index(right_key)?;
        let carried = self.carried_columns(source, columns)?;

        let lookup = first_row_by_key(source, right_idx, right_key);

        let added = timed(&format!("merge_on_subdivision({})", subdivision), || {
            let mut added: Vec<Vec<Value>> = vec![Vec::with_capacity(self.len()); carried.len()];
            for record in &self.rows {
                let matched = record.values[left_idx]
                    .join_key()
                    .and_then(|k| lookup.get(&k).copied());
                for (slot, &src_idx) in added.iter_mut().zip(&carried) {
                    slot.push(match matched {
                        Some(row) => source.rows[row].values[src_idx].clone(),
                        None => Value::Null,
                    });
                }
            }
            added
        });

        for ((_, new_name), values) in columns.iter().zip(added) {
            self.set_column(new_name, values)?;
        }
        Ok(self)
    }

    /// Copies columns from `other` by position: row `i` of `other` lands on
    /// row `i` of `self`.
    ///
    /// No key is checked. The caller must guarantee both tables list the same
    /// geometries in the same order; only the row counts are verified, and a
    /// mismatch is rejected with [`SociomeError::ShapeMismatch`].
    pub fn merge_on_geometry(
        &mut self,
        other: &GeoTable,
        columns: &[(&str, &str)],
    ) -> Result<&mut Self> {
        if other.len() != self.len() {
            return Err(SociomeError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        let carried = self.carried_columns(other, columns)?;
        log::info!("Augmenting data with {} columns", carried.len());

        for ((_, new_name), src_idx) in columns.iter().zip(carried) {
            let values = other
                .rows
                .iter()
                .map(|r| r.values[src_idx].clone())
                .collect();
            self.set_column(new_name, values)?;
        }
        Ok(self)
    }

    /// Evaluates `function` over this table and stores its metric as `name`.
    ///
    /// Row `i` of the evaluation lands on row `i` of `self`. An existing
    /// column called `name` is overwritten.
    pub fn attach_metric(
        &mut self,
        function: &dyn SpatialFunction,
        name: &str,
    ) -> Result<&mut Self> {
        let evaluated = timed(&format!("attach_metric({})", name), || {
            function.eval(self)
        })?;
        if evaluated.len() != self.len() {
            return Err(SociomeError::ShapeMismatch {
                expected: self.len(),
                actual: evaluated.len(),
            });
        }
        let metric_idx = evaluated.column_index(METRIC_COLUMN)?;
        let values = evaluated
            .rows
            .into_iter()
            .map(|mut r| std::mem::take(&mut r.values[metric_idx]))
            .collect();
        self.set_column(name, values)?;
        Ok(self)
    }

    /// Resolves source column indices, refusing new names that already exist
    /// or repeat within `columns`.
    fn carried_columns(&self, source: &GeoTable, columns: &[(&str, &str)]) -> Result<Vec<usize>> {
        columns
            .iter()
            .enumerate()
            .map(|(i, (src, new_name))| {
                if self.has_column(new_name)
                    || columns[..i].iter().any(|(_, earlier)| earlier == new_name)
                {
                    return Err(SociomeError::DuplicateColumn(new_name.to_string()));
                }
                source.column_index(src)
            })
            .collect()
    }
}

/// Maps each join key of `table[idx]` to the first row holding it.
pub(crate) fn first_row_by_key(
    table: &GeoTable,
    idx: usize,
    column: &str,
) -> FxHashMap<JoinKey, usize> {
    let mut lookup = FxHashMap::default();
    let mut duplicates = 0usize;
    for (row, record) in table.rows.iter().enumerate() {
        if let Some(key) = record.values[idx].join_key() {
            if lookup.contains_key(&key) {
                duplicates += 1;
            } else {
                lookup.insert(key, row);
            }
        }
    }
    if duplicates > 0 {
        log::warn!(
            "{} duplicate keys in join column {}; using first occurrence",
            duplicates,
            column
        );
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use sociome_types::Geometry;

    fn tracts() -> GeoTable {
        let mut table = GeoTable::with_columns(["GEOID"]).unwrap();
        table
            .push_row(
                Geometry::from(polygon![
                    (x: 0.0, y: 0.0),
                    (x: 1.0, y: 0.0),
                    (x: 1.0, y: 1.0),
                    (x: 0.0, y: 1.0),
                ]),
                vec![Value::Int(101)],
            )
            .unwrap();
        table
            .push_row(
                Geometry::from(polygon![
                    (x: 1.0, y: 0.0),
                    (x: 2.0, y: 0.0),
                    (x: 2.0, y: 1.0),
                    (x: 1.0, y: 1.0),
                ]),
                vec![Value::Int(102)],
            )
            .unwrap();
        table
    }

    fn homes() -> GeoTable {
        GeoTable::from_geometries([
            Geometry::point(0.5, 0.5),
            Geometry::point(1.5, 0.5),
            Geometry::point(5.0, 5.0),
        ])
    }

    #[test]
    fn test_with_subdivision() {
        let mut table = homes();
        table.with_subdivision(&tracts(), "tract", "GEOID").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.subdivisions(), ["tract"]);
        let tract: Vec<_> = table.column("tract").unwrap().into_iter().cloned().collect();
        assert_eq!(tract, vec![Value::Int(101), Value::Int(102), Value::Null]);
    }

    #[test]
    fn test_with_subdivision_missing_key() {
        let mut table = homes();
        assert!(matches!(
            table.with_subdivision(&tracts(), "tract", "NOPE"),
            Err(SociomeError::ColumnNotFound(_))
        ));
    }

    #[test]
    fn test_merge_on_subdivision_left_join() {
        let mut table = homes();
        table.with_subdivision(&tracts(), "tract", "GEOID").unwrap();

        let mut income = GeoTable::with_columns(["geoid", "median_income"]).unwrap();
        income
            .push_row(Geometry::point(0.0, 0.0), vec![Value::Float(101.0), 52_000.0.into()])
            .unwrap();
        income
            .push_row(Geometry::point(0.0, 0.0), vec![Value::Int(101), 1.0.into()])
            .unwrap();

        table
            .merge_on_subdivision(&income, "tract", "geoid", &[("median_income", "income")])
            .unwrap();
        assert_eq!(table.len(), 3);
        let income: Vec<_> = table.column("income").unwrap().into_iter().cloned().collect();
        assert_eq!(income, vec![Value::Float(52_000.0), Value::Null, Value::Null]);
    }

    #[test]
    fn test_with_subdivision_overlap_keeps_lowest_row() {
        let mut nested = GeoTable::with_columns(["id"]).unwrap();
        nested
            .push_row(
                Geometry::from(polygon![
                    (x: 0.0, y: 0.0),
                    (x: 2.0, y: 0.0),
                    (x: 2.0, y: 2.0),
                    (x: 0.0, y: 2.0),
                ]),
                vec![Value::Int(2)],
            )
            .unwrap();
        nested
            .push_row(
                Geometry::from(polygon![
                    (x: 0.25, y: 0.25),
                    (x: 0.75, y: 0.25),
                    (x: 0.75, y: 0.75),
                    (x: 0.25, y: 0.75),
                ]),
                vec![Value::Int(1)],
            )
            .unwrap();

        let mut table = GeoTable::from_geometries([Geometry::point(0.5, 0.5)]);
        table.with_subdivision(&nested, "zone", "id").unwrap();
        assert_eq!(table.row(0).unwrap().get("zone"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_merge_rejects_repeated_target_name() {
        let mut table = homes();
        let mut other = GeoTable::with_columns(["a", "b"]).unwrap();
        for _ in 0..3 {
            other
                .push_row(Geometry::point(0.0, 0.0), vec![Value::Int(1), Value::Int(2)])
                .unwrap();
        }
        assert!(matches!(
            table.merge_on_geometry(&other, &[("a", "x"), ("b", "x")]),
            Err(SociomeError::DuplicateColumn(name)) if name == "x"
        ));
        assert!(table.columns().is_empty());

        table.with_subdivision(&tracts(), "tract", "GEOID").unwrap();
        let mut source = GeoTable::with_columns(["GEOID", "a", "b"]).unwrap();
        source
            .push_row(Geometry::point(0.0, 0.0), vec![Value::Int(101), 1.0.into(), 2.0.into()])
            .unwrap();
        assert!(matches!(
            table.merge_on_subdivision(&source, "tract", "GEOID", &[("a", "y"), ("b", "y")]),
            Err(SociomeError::DuplicateColumn(_))
        ));
        assert_eq!(table.columns(), ["tract"]);
    }

    #[test]
    fn test_merge_on_geometry_rejects_length_mismatch() {
        let mut table = homes();
        let mut other = GeoTable::with_columns(["x"]).unwrap();
        other.push_row(Geometry::point(0.0, 0.0), vec![1.0.into()]).unwrap();
        assert!(matches!(
            table.merge_on_geometry(&other, &[("x", "x")]),
            Err(SociomeError::ShapeMismatch {
                expected: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_merge_on_geometry_positional() {
        let mut table = homes();
        let mut other = GeoTable::with_columns(["score"]).unwrap();
        for i in 0..3 {
            other
                .push_row(Geometry::point(9.0, 9.0), vec![Value::Int(i)])
                .unwrap();
        }
        table.merge_on_geometry(&other, &[("score", "s")]).unwrap();
        assert_eq!(table.row(2).unwrap().get("s"), Some(&Value::Int(2)));
    }
}
