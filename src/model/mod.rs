//! Linear models relating a target column to explanatory columns.
//!
//! [`RegressionModel::fit`] cleans the columns (mean imputation of missing
//! values, optional standardization), fits its [`Regressor`] and returns a
//! table with the cleaned inputs plus prediction and residual columns. Fit
//! statistics are kept on the model until the next `fit`.

mod regressor;

pub use regressor::{MeanBaseline, Regressor, Ridge};

use crate::config::{Config, ModelConfig};
use crate::error::{Result, SociomeError};
use crate::table::GeoTable;
use crate::timing::timed;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use sociome_types::Value;
use std::cmp::Ordering;

/// Label of the whole-model row in [`FitStats::ic_table`].
pub const ALL_VARIABLES: &str = "All";

/// Statistics of the most recent fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitStats {
    pub mse: f64,
    pub r2: f64,
    /// Pearson correlation between target and prediction.
    pub ic: f64,
    pub intercept: f64,
    /// `(variable, coefficient)` sorted by |coefficient| descending. Empty
    /// when the regressor has no linear form.
    pub coefficients: Vec<(String, f64)>,
    /// `(variable, |corr(variable, target)|)` plus an [`ALL_VARIABLES`] row
    /// holding the model IC, sorted by magnitude descending.
    pub ic_table: Vec<(String, f64)>,
}

#[derive(Debug)]
pub struct RegressionModel {
    target: String,
    explanatory: Vec<String>,
    standardize: bool,
    regressor: Box<dyn Regressor>,
    stats: Option<FitStats>,
}

impl RegressionModel {
    /// Ridge model with the default settings (alpha 1, no standardization).
    pub fn new(target: &str, explanatory: &[&str]) -> Self {
        Self::with_model_config(target, explanatory, &ModelConfig::default())
    }

    pub fn from_config(target: &str, explanatory: &[&str], config: &Config) -> Self {
        Self::with_model_config(target, explanatory, &config.model)
    }

    fn with_model_config(target: &str, explanatory: &[&str], config: &ModelConfig) -> Self {
        Self {
            target: target.to_string(),
            explanatory: explanatory.iter().map(|s| s.to_string()).collect(),
            standardize: config.standardize,
            regressor: Box::new(Ridge::new(config.alpha)),
            stats: None,
        }
    }

    /// Replaces the estimator. Clears any previous fit statistics.
    pub fn with_regressor(mut self, regressor: Box<dyn Regressor>) -> Self {
        self.regressor = regressor;
        self.stats = None;
        self
    }

    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn explanatory(&self) -> &[String] {
        &self.explanatory
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    /// `None` until the first successful `fit`.
    pub fn stats(&self) -> Option<&FitStats> {
        self.stats.as_ref()
    }

    /// Fits the model on `table` and returns target, explanatory,
    /// `prediction_name` and `residual_name` columns with the table's
    /// geometries.
    ///
    /// The target and explanatory columns in the output hold the cleaned
    /// values the model saw, so `residual = target - prediction` holds
    /// exactly for every row.
    pub fn fit(
        &mut self,
        table: &GeoTable,
        prediction_name: &str,
        residual_name: &str,
    ) -> Result<GeoTable> {
        let label = format!("fit({})", self.target);
        timed(&label, || self.fit_table(table, prediction_name, residual_name))
    }

    fn fit_table(
        &mut self,
        table: &GeoTable,
        prediction_name: &str,
        residual_name: &str,
    ) -> Result<GeoTable> {
        self.stats = None;
        // validates the output schema before any work is done
        let mut out = GeoTable::with_columns(
            std::iter::once(self.target.as_str())
                .chain(self.explanatory.iter().map(String::as_str))
                .chain([prediction_name, residual_name]),
        )?;

        let mut y = clean_column(table, &self.target)?;
        let mut xs = self
            .explanatory
            .iter()
            .map(|name| clean_column(table, name))
            .collect::<Result<Vec<_>>>()?;
        if self.standardize {
            standardize(&mut y);
            xs.iter_mut().for_each(|x| standardize(x));
        }

        let n = y.len();
        let x = DMatrix::from_fn(n, xs.len(), |i, j| xs[j][i]);
        let y_vec = DVector::from_column_slice(&y);

        self.regressor.fit(&x, &y_vec)?;
        let prediction = self.regressor.predict(&x)?;
        if prediction.len() != n {
            return Err(SociomeError::ShapeMismatch {
                expected: n,
                actual: prediction.len(),
            });
        }
        let prediction: Vec<f64> = prediction.iter().copied().collect();

        let stats = self.compute_stats(&xs, &y, &prediction);
        log::info!(
            "Fit {} on {} rows: mse={:.4} r2={:.4} ic={:.4}",
            self.target,
            n,
            stats.mse,
            stats.r2,
            stats.ic
        );

        for (i, record) in table.records().iter().enumerate() {
            let mut values = Vec::with_capacity(xs.len() + 3);
            values.push(Value::Float(y[i]));
            values.extend(xs.iter().map(|x| Value::Float(x[i])));
            values.push(Value::Float(prediction[i]));
            values.push(Value::Float(y[i] - prediction[i]));
            out.push_row(record.geometry.clone(), values)?;
        }

        self.stats = Some(stats);
        Ok(out)
    }

    fn compute_stats(&self, xs: &[Vec<f64>], y: &[f64], prediction: &[f64]) -> FitStats {
        let ic = pearson(y, prediction);

        let mut coefficients: Vec<(String, f64)> = match self.regressor.coefficients() {
            Some(coef) => self.explanatory.iter().cloned().zip(coef.iter().copied()).collect(),
            None => Vec::new(),
        };
        coefficients.sort_by(|a, b| by_magnitude_desc(a.1, b.1));

        let mut ic_table: Vec<(String, f64)> = self
            .explanatory
            .iter()
            .zip(xs)
            .map(|(name, x)| (name.clone(), pearson(x, y).abs()))
            .collect();
        ic_table.push((ALL_VARIABLES.to_string(), ic));
        ic_table.sort_by(|a, b| by_magnitude_desc(a.1, b.1));

        FitStats {
            mse: mean_squared_error(y, prediction),
            r2: r2_score(y, prediction),
            ic,
            intercept: self.regressor.intercept(),
            coefficients,
            ic_table,
        }
    }
}

/// Numeric column with missing entries replaced by the column mean.
fn clean_column(table: &GeoTable, name: &str) -> Result<Vec<f64>> {
    let raw = table.numeric_column(name)?;
    let present: Vec<f64> = raw.iter().flatten().copied().collect();
    if present.is_empty() {
        return Err(SociomeError::EmptyColumn(name.to_string()));
    }
    let fill = mean(&present);
    let missing = raw.len() - present.len();
    if missing > 0 {
        log::debug!("Imputed {} missing values of {} with {}", missing, name, fill);
    }
    Ok(raw.into_iter().map(|v| v.unwrap_or(fill)).collect())
}

/// Scales to zero mean and unit population variance. Constant columns are
/// only centered.
fn standardize(values: &mut [f64]) {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    let scale = if var > 0.0 { var.sqrt() } else { 1.0 };
    for v in values.iter_mut() {
        *v = (*v - m) / scale;
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_squared_error(y: &[f64], prediction: &[f64]) -> f64 {
    let sse: f64 = y.iter().zip(prediction).map(|(a, b)| (a - b).powi(2)).sum();
    sse / y.len() as f64
}

/// Coefficient of determination. A constant target scores 1 when predicted
/// exactly and 0 otherwise.
fn r2_score(y: &[f64], prediction: &[f64]) -> f64 {
    let m = mean(y);
    let ss_res: f64 = y.iter().zip(prediction).map(|(a, b)| (a - b).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|a| (a - m).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Pearson correlation; NaN if either side has zero variance.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma).powi(2);
        vb += (y - mb).powi(2);
    }
    if va == 0.0 || vb == 0.0 {
        return f64::NAN;
    }
    cov / (va.sqrt() * vb.sqrt())
}

// NaN sorts last
fn by_magnitude_desc(a: f64, b: f64) -> Ordering {
    let key = |v: f64| if v.is_nan() { -1.0 } else { v.abs() };
    key(b).total_cmp(&key(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sociome_types::Geometry;

    fn linear_table(n: usize) -> GeoTable {
        let mut table = GeoTable::with_columns(["y", "x1", "x2"]).unwrap();
        for i in 0..n {
            let x1 = i as f64 / 10.0;
            let x2 = ((i * 7) % 13) as f64;
            let noise = (i as f64).sin() * 0.05;
            table
                .push_row(
                    Geometry::point(x1, 0.0),
                    vec![(2.0 * x1 + noise).into(), x1.into(), x2.into()],
                )
                .unwrap();
        }
        table
    }

    #[test]
    fn test_recovers_slope() {
        let mut model = RegressionModel::new("y", &["x1", "x2"]);
        let out = model.fit(&linear_table(200), "pred", "resid").unwrap();
        assert_eq!(out.columns(), ["y", "x1", "x2", "pred", "resid"]);
        assert_eq!(out.len(), 200);

        let stats = model.stats().unwrap();
        assert_eq!(stats.coefficients[0].0, "x1");
        assert!((stats.coefficients[0].1 - 2.0).abs() < 0.01);
        assert!(stats.coefficients[1].1.abs() < 0.01);
        assert!(stats.r2 > 0.99);
        assert!(stats.ic > 0.99);
        assert_eq!(stats.ic_table.len(), 3);
    }

    #[test]
    fn test_residual_identity() {
        let mut model = RegressionModel::new("y", &["x1"]);
        let out = model.fit(&linear_table(50), "pred", "resid").unwrap();
        for row in out.iter() {
            let y = row.get("y").unwrap().as_f64().unwrap();
            let pred = row.get("pred").unwrap().as_f64().unwrap();
            let resid = row.get("resid").unwrap().as_f64().unwrap();
            assert_eq!(resid, y - pred);
        }
    }

    #[test]
    fn test_missing_values_are_imputed() {
        let mut table = GeoTable::with_columns(["y", "x"]).unwrap();
        table.push_row(Geometry::point(0.0, 0.0), vec![1.0.into(), 1.0.into()]).unwrap();
        table.push_row(Geometry::point(0.0, 0.0), vec![Value::Null, 2.0.into()]).unwrap();
        table
            .push_row(Geometry::point(0.0, 0.0), vec![5.0.into(), Value::Float(f64::NAN)])
            .unwrap();

        let mut model = RegressionModel::new("y", &["x"]);
        let out = model.fit(&table, "p", "r").unwrap();
        assert_eq!(out.row(1).unwrap().get("y"), Some(&Value::Float(3.0)));
        assert_eq!(out.row(2).unwrap().get("x"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_standardized_target_is_centered() {
        let mut model = RegressionModel::new("y", &["x1"]).with_standardize(true);
        let out = model.fit(&linear_table(40), "p", "r").unwrap();
        let y: Vec<f64> = out.numeric_column("y").unwrap().into_iter().flatten().collect();
        assert!(mean(&y).abs() < 1e-9);
    }

    #[test]
    fn test_mean_baseline_has_no_coefficients() {
        let mut model =
            RegressionModel::new("y", &["x1"]).with_regressor(Box::new(MeanBaseline::new()));
        model.fit(&linear_table(30), "p", "r").unwrap();
        let stats = model.stats().unwrap();
        assert!(stats.coefficients.is_empty());
        assert!(stats.r2.abs() < 1e-12);
    }

    #[test]
    fn test_fit_errors() {
        let table = linear_table(5);
        let mut model = RegressionModel::new("nope", &["x1"]);
        assert!(matches!(
            model.fit(&table, "p", "r"),
            Err(SociomeError::ColumnNotFound(_))
        ));

        let mut model = RegressionModel::new("y", &["x1"]);
        assert!(matches!(
            model.fit(&table, "x1", "r"),
            Err(SociomeError::DuplicateColumn(_))
        ));

        let mut empty = GeoTable::with_columns(["y", "x"]).unwrap();
        empty.push_row(Geometry::point(0.0, 0.0), vec![Value::Null, 1.0.into()]).unwrap();
        let mut model = RegressionModel::new("y", &["x"]);
        assert!(matches!(
            model.fit(&empty, "p", "r"),
            Err(SociomeError::EmptyColumn(_))
        ));
        assert!(model.stats().is_none());
    }

    #[test]
    fn test_magnitude_ordering() {
        let mut v = vec![0.1, -3.0, f64::NAN, 2.0];
        v.sort_by(|a, b| by_magnitude_desc(*a, *b));
        assert_eq!(&v[..3], &[-3.0, 2.0, 0.1]);
        assert!(v[3].is_nan());
    }
}
