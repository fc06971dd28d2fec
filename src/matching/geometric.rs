use super::combine_pairs;
use crate::compute::validation::validate_radius;
use crate::config::Config;
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::table::GeoTable;
use crate::timing::timed;

/// Pairs each left point with its nearest right point when the two lie within
/// `distance_threshold` coordinate units of each other.
///
/// This is an inner join: left rows with no right point in range are dropped.
/// Equidistant right points resolve to the lowest right row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricMatcher {
    distance_threshold: f64,
}

impl GeometricMatcher {
    pub fn new(distance_threshold: f64) -> Self {
        Self { distance_threshold }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.match_distance_threshold)
    }

    #[inline]
    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    pub fn match_tables(&self, left: &GeoTable, right: &GeoTable) -> Result<GeoTable> {
        validate_radius(self.distance_threshold)?;
        let left_points = left.coordinates()?;
        let index = SpatialIndex::new(right.coordinates()?);

        let pairs: Vec<(usize, usize)> = timed("geometric match", || {
            left_points
                .iter()
                .enumerate()
                .filter_map(|(l, &p)| {
                    index
                        .closest(p)
                        .filter(|hit| hit.distance <= self.distance_threshold)
                        .map(|hit| (l, hit.index))
                })
                .collect()
        });
        log::info!(
            "Geometric match paired {} of {} rows",
            pairs.len(),
            left.len()
        );

        combine_pairs(left, right, &pairs)
    }
}

impl Default for GeometricMatcher {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sociome_types::{Geometry, Value};

    #[test]
    fn test_inner_nearest_join() {
        let mut left = GeoTable::with_columns(["name"]).unwrap();
        left.push_row(Geometry::point(-87.60, 41.79), vec!["clinic".into()]).unwrap();
        left.push_row(Geometry::point(-87.70, 41.90), vec!["school".into()]).unwrap();

        let mut right = GeoTable::with_columns(["name"]).unwrap();
        right.push_row(Geometry::point(-87.65, 41.85), vec!["far".into()]).unwrap();
        right.push_row(Geometry::point(-87.60001, 41.79001), vec!["near".into()]).unwrap();

        let out = GeometricMatcher::default().match_tables(&left, &right).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.columns(), ["name", "name_right"]);
        assert_eq!(out.row(0).unwrap().get("name"), Some(&Value::from("clinic")));
        assert_eq!(out.row(0).unwrap().get("name_right"), Some(&Value::from("near")));
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let table = GeoTable::from_geometries([Geometry::point(0.0, 0.0)]);
        assert!(GeometricMatcher::new(-1.0).match_tables(&table, &table).is_err());
    }
}
