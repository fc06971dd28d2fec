use super::{PairScorer, combine_pairs};
use crate::error::{Result, SociomeError};
use crate::table::GeoTable;
use crate::timing::timed;
use rustc_hash::FxHashMap;
use sociome_types::{JoinKey, Value};
use std::fmt;

type Transform = Box<dyn Fn(&Value) -> Value + Send + Sync>;

struct ExactCondition {
    left: String,
    right: String,
    left_xform: Option<Transform>,
    right_xform: Option<Transform>,
}

impl ExactCondition {
    fn key(&self, value: &Value, left_side: bool) -> Option<JoinKey> {
        let xform = if left_side {
            &self.left_xform
        } else {
            &self.right_xform
        };
        match xform {
            Some(f) => f(value).join_key(),
            None => value.join_key(),
        }
    }
}

/// Blocking plus address-similarity matcher.
///
/// Rows are grouped into blocks by the exact conditions. Inside a block
/// every left row is paired with the right row whose address text scores
/// highest, ties going to the earlier right row. Address text is the
/// configured attributes joined by a space and lowercased. Rows with a
/// missing blocking value belong to no block.
///
/// ```
/// use sociome::matching::BlockingMatcher;
/// use sociome::{GeoTable, Geometry, SociomeError};
///
/// let table = GeoTable::from_geometries([Geometry::point(0.0, 0.0)]);
/// let scorer = |a: &str, b: &str| if a == b { 1.0 } else { 0.0 };
/// let result = BlockingMatcher::new().match_tables(&table, &table, &scorer);
/// assert!(matches!(result, Err(SociomeError::MatcherNotConfigured(_))));
/// ```
#[derive(Default)]
pub struct BlockingMatcher {
    conditions: Vec<ExactCondition>,
    address: Option<(Vec<String>, Vec<String>)>,
}

impl fmt::Debug for BlockingMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conditions: Vec<(&str, &str)> = self
            .conditions
            .iter()
            .map(|c| (c.left.as_str(), c.right.as_str()))
            .collect();
        f.debug_struct("BlockingMatcher")
            .field("conditions", &conditions)
            .field("address", &self.address)
            .finish()
    }
}

impl BlockingMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `left[left_attr] == right[right_attr]` for a pair.
    pub fn add_exact_condition(&mut self, left_attr: &str, right_attr: &str) -> &mut Self {
        self.conditions.push(ExactCondition {
            left: left_attr.to_string(),
            right: right_attr.to_string(),
            left_xform: None,
            right_xform: None,
        });
        self
    }

    /// Like [`add_exact_condition`](Self::add_exact_condition), comparing the
    /// transformed values instead.
    pub fn add_exact_condition_with<L, R>(
        &mut self,
        left_attr: &str,
        right_attr: &str,
        left_xform: L,
        right_xform: R,
    ) -> &mut Self
    where
        L: Fn(&Value) -> Value + Send + Sync + 'static,
        R: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.conditions.push(ExactCondition {
            left: left_attr.to_string(),
            right: right_attr.to_string(),
            left_xform: Some(Box::new(left_xform)),
            right_xform: Some(Box::new(right_xform)),
        });
        self
    }

    /// Sets the attributes forming the address text on each side.
    pub fn add_address_match(&mut self, left_attrs: &[&str], right_attrs: &[&str]) -> &mut Self {
        self.address = Some((
            left_attrs.iter().map(|s| s.to_string()).collect(),
            right_attrs.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    pub fn match_tables(
        &self,
        left: &GeoTable,
        right: &GeoTable,
        scorer: &dyn PairScorer,
    ) -> Result<GeoTable> {
        let (left_attrs, right_attrs) = self.address.as_ref().ok_or_else(|| {
            SociomeError::MatcherNotConfigured("no address match set".to_string())
        })?;

        let left_keys = self.block_keys(left, true)?;
        let right_keys = self.block_keys(right, false)?;
        let left_text = address_text(left, left_attrs)?;
        let right_text = address_text(right, right_attrs)?;

        let mut blocks: FxHashMap<Vec<JoinKey>, Vec<usize>> = FxHashMap::default();
        for (row, key) in right_keys.into_iter().enumerate() {
            if let Some(key) = key {
                blocks.entry(key).or_default().push(row);
            }
        }

        let pairs: Vec<(usize, usize)> = timed("address match", || {
            left_keys
                .iter()
                .enumerate()
                .filter_map(|(l, key)| {
                    let candidates = blocks.get(key.as_ref()?)?;
                    let mut best: Option<(usize, f64)> = None;
                    for &r in candidates {
                        let score = scorer.score(&left_text[l], &right_text[r]);
                        if best.is_none_or(|(_, s)| score > s) {
                            best = Some((r, score));
                        }
                    }
                    best.map(|(r, _)| (l, r))
                })
                .collect()
        });
        log::info!(
            "Address match paired {} of {} rows",
            pairs.len(),
            left.len()
        );

        combine_pairs(left, right, &pairs)
    }

    /// Block key of every row; `None` when a blocking value is missing.
    fn block_keys(&self, table: &GeoTable, left_side: bool) -> Result<Vec<Option<Vec<JoinKey>>>> {
        let indices = self
            .conditions
            .iter()
            .map(|c| table.column_index(if left_side { &c.left } else { &c.right }))
            .collect::<Result<Vec<_>>>()?;

        Ok(table
            .records()
            .iter()
            .map(|record| {
                self.conditions
                    .iter()
                    .zip(&indices)
                    .map(|(c, &idx)| c.key(&record.values[idx], left_side))
                    .collect::<Option<Vec<_>>>()
            })
            .collect())
    }
}

fn address_text(table: &GeoTable, attrs: &[String]) -> Result<Vec<String>> {
    let indices = attrs
        .iter()
        .map(|a| table.column_index(a))
        .collect::<Result<Vec<_>>>()?;
    Ok(table
        .records()
        .iter()
        .map(|record| {
            indices
                .iter()
                .map(|&i| record.values[i].to_string())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .collect())
}
