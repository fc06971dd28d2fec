//! Estimators behind [`RegressionModel`](super::RegressionModel).

use crate::error::{Result, SociomeError};
use nalgebra::{DMatrix, DVector};

/// A regression estimator fit on a dense design matrix.
///
/// Rows of `x` are observations, columns are explanatory variables. The
/// intercept is handled by the estimator, so `x` carries no constant column.
pub trait Regressor: Send + Sync + std::fmt::Debug {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()>;

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>>;

    /// One coefficient per explanatory column, or `None` for estimators
    /// without a linear form.
    fn coefficients(&self) -> Option<&[f64]>;

    fn intercept(&self) -> f64;
}

fn not_fitted(name: &str) -> SociomeError {
    SociomeError::InvalidInput(format!("{} must be fit before predict", name))
}

/// Solves `a * x = b` by QR, falling back to SVD for singular systems.
fn solve_symmetric(a: DMatrix<f64>, b: DVector<f64>) -> Result<DVector<f64>> {
    if let Some(solution) = a.clone().qr().solve(&b) {
        return Ok(solution);
    }
    log::debug!("QR solve failed, retrying with SVD");
    a.svd(true, true)
        .solve(&b, f64::EPSILON * 100.0)
        .map_err(|e| SociomeError::Solver(e.to_string()))
}

/// L2-penalized least squares with an unpenalized intercept.
///
/// Minimizes `||y - b0 - X b||^2 + alpha * ||b||^2` by centering `X` and `y`
/// and solving `(Xc'Xc + alpha I) b = Xc'yc`.
#[derive(Debug, Clone)]
pub struct Ridge {
    alpha: f64,
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl Ridge {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
        }
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for Ridge {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Regressor for Ridge {
    fn fit(&mut self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(SociomeError::InvalidInput(format!(
                "Ridge alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        let (n, p) = x.shape();
        if n == 0 {
            return Err(SociomeError::InvalidInput(
                "Cannot fit on zero observations".to_string(),
            ));
        }
        if y.len() != n {
            return Err(SociomeError::ShapeMismatch {
                expected: n,
                actual: y.len(),
            });
        }

        let y_mean = y.mean();
        if p == 0 {
            self.coefficients = Some(Vec::new());
            self.intercept = y_mean;
            return Ok(());
        }

        let x_mean = x.row_mean();
        let xc = DMatrix::from_fn(n, p, |i, j| x[(i, j)] - x_mean[j]);
        let yc = y.add_scalar(-y_mean);

        let xt = xc.transpose();
        let gram = &xt * &xc + DMatrix::<f64>::identity(p, p) * self.alpha;
        let rhs = &xt * &yc;
        let beta = solve_symmetric(gram, rhs)?;

        let offset: f64 = x_mean.iter().zip(beta.iter()).map(|(m, b)| m * b).sum();
        self.intercept = y_mean - offset;
        self.coefficients = Some(beta.as_slice().to_vec());
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        let coefficients = self.coefficients.as_ref().ok_or_else(|| not_fitted("Ridge"))?;
        if x.ncols() != coefficients.len() {
            return Err(SociomeError::ShapeMismatch {
                expected: coefficients.len(),
                actual: x.ncols(),
            });
        }
        let beta = DVector::from_column_slice(coefficients);
        Ok((x * beta).add_scalar(self.intercept))
    }

    fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// Predicts the training mean everywhere. Useful as a reference fit.
#[derive(Debug, Clone, Default)]
pub struct MeanBaseline {
    mean: Option<f64>,
}

impl MeanBaseline {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for MeanBaseline {
    fn fit(&mut self, _x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
        if y.is_empty() {
            return Err(SociomeError::InvalidInput(
                "Cannot fit on zero observations".to_string(),
            ));
        }
        self.mean = Some(y.mean());
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<DVector<f64>> {
        let mean = self.mean.ok_or_else(|| not_fitted("MeanBaseline"))?;
        Ok(DVector::from_element(x.nrows(), mean))
    }

    fn coefficients(&self) -> Option<&[f64]> {
        None
    }

    fn intercept(&self) -> f64 {
        self.mean.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ridge_zero_alpha_is_ols() {
        // y = 1 + 2a - b
        let x = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let y = DVector::from_vec(vec![1.0, 3.0, 0.0, 2.0]);
        let mut ridge = Ridge::new(0.0);
        ridge.fit(&x, &y).unwrap();
        let coef = ridge.coefficients().unwrap();
        assert!((coef[0] - 2.0).abs() < 1e-9);
        assert!((coef[1] + 1.0).abs() < 1e-9);
        assert!((ridge.intercept() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ridge_shrinks() {
        let x = DMatrix::from_column_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![0.0, 2.0, 4.0, 6.0]);
        let mut ridge = Ridge::new(5.0);
        ridge.fit(&x, &y).unwrap();
        // sum of squares of centered x is 5, so beta = 2 * 5 / (5 + 5)
        assert!((ridge.coefficients().unwrap()[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_before_fit() {
        let x = DMatrix::<f64>::zeros(2, 1);
        assert!(Ridge::default().predict(&x).is_err());
        assert!(MeanBaseline::new().predict(&x).is_err());
    }

    #[test]
    fn test_mean_baseline() {
        let x = DMatrix::<f64>::zeros(3, 2);
        let y = DVector::from_vec(vec![1.0, 2.0, 6.0]);
        let mut baseline = MeanBaseline::new();
        baseline.fit(&x, &y).unwrap();
        assert!(baseline.coefficients().is_none());
        assert_eq!(baseline.predict(&x).unwrap(), DVector::from_element(3, 3.0));
    }
}
