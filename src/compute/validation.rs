//! Validation for geographic coordinates and function parameters.

use crate::error::{Result, SociomeError};
use geo::Point;

/// Validates a 2D point has valid longitude and latitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use geo::Point;
/// use sociome::compute::validation::validate_geographic_point;
///
/// assert!(validate_geographic_point(&Point::new(-87.6298, 41.8781)).is_ok());
/// assert!(validate_geographic_point(&Point::new(200.0, 40.0)).is_err());
/// assert!(validate_geographic_point(&Point::new(-87.0, 95.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point<f64>) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(SociomeError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(SociomeError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            y
        )));
    }

    if !(-180.0..=180.0).contains(&x) {
        return Err(SociomeError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            x
        )));
    }

    if !(-90.0..=90.0).contains(&y) {
        return Err(SociomeError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a search radius. Zero is allowed and matches only coincident
/// points.
///
/// ```
/// use sociome::compute::validation::validate_radius;
///
/// assert!(validate_radius(1000.0).is_ok());
/// assert!(validate_radius(0.0).is_ok());
/// assert!(validate_radius(-1.0).is_err());
/// assert!(validate_radius(f64::INFINITY).is_err());
/// ```
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() {
        return Err(SociomeError::InvalidInput(format!(
            "Radius must be finite, got: {}",
            radius
        )));
    }

    if radius < 0.0 {
        return Err(SociomeError::InvalidInput(format!(
            "Radius must be non-negative, got: {}",
            radius
        )));
    }

    Ok(())
}

/// Validates Gaussian kernel parameters: `sigma2 > 0` and
/// `0 < precision <= 1`.
pub fn validate_kernel(sigma2: f64, precision: f64) -> Result<()> {
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(SociomeError::InvalidInput(format!(
            "Kernel sigma2 must be positive, got: {}",
            sigma2
        )));
    }

    if !(precision > 0.0 && precision <= 1.0) {
        return Err(SociomeError::InvalidInput(format!(
            "Kernel precision must be in (0, 1], got: {}",
            precision
        )));
    }

    Ok(())
}
