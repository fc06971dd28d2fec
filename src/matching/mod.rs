//! Entity matching across two tables.
//!
//! [`GeometricMatcher`] pairs rows by location; [`BlockingMatcher`] pairs rows
//! that agree on exact keys and whose address text scores best under a
//! caller-supplied [`PairScorer`]. Both produce a table with the left
//! columns followed by the right columns, geometry taken from the left side.

mod address;
mod geometric;

pub use address::BlockingMatcher;
pub use geometric::GeometricMatcher;

use crate::error::Result;
use crate::table::GeoTable;

/// Suffix appended to right-side column names that collide with the left.
pub const RIGHT_SUFFIX: &str = "_right";

/// Similarity of two address strings; higher is better.
///
/// Any `Fn(&str, &str) -> f64` is a scorer.
pub trait PairScorer {
    fn score(&self, left: &str, right: &str) -> f64;
}

impl<F> PairScorer for F
where
    F: Fn(&str, &str) -> f64,
{
    fn score(&self, left: &str, right: &str) -> f64 {
        self(left, right)
    }
}

/// Concatenates `left[l]` and `right[r]` for every `(l, r)` pair.
pub(crate) fn combine_pairs(
    left: &GeoTable,
    right: &GeoTable,
    pairs: &[(usize, usize)],
) -> Result<GeoTable> {
    let right_names: Vec<String> = right
        .columns()
        .iter()
        .map(|c| {
            if left.has_column(c) {
                format!("{}{}", c, RIGHT_SUFFIX)
            } else {
                c.clone()
            }
        })
        .collect();

    let mut out = GeoTable::with_columns(left.columns().iter().chain(&right_names).cloned())?;
    for &(l, r) in pairs {
        let left_record = &left.records()[l];
        let values = left_record
            .values
            .iter()
            .chain(&right.records()[r].values)
            .cloned()
            .collect();
        out.push_row(left_record.geometry.clone(), values)?;
    }

    for name in left.subdivisions() {
        out.add_subdivision_name(name)?;
    }
    for name in right.subdivisions() {
        let idx = right.column_index(name)?;
        out.add_subdivision_name(&right_names[idx])?;
    }
    Ok(out)
}
