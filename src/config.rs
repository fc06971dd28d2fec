//! Toolkit settings shared by spatial functions, models and matchers.
//!
//! Every field has a default taken from the reference sociome pipeline, so an
//! empty JSON object is a valid configuration.

use serde::de::Error;
use sociome_types::DistanceMetric;

/// Meters spanned by one degree of latitude, used to turn metric radii into
/// coordinate-space bandwidths.
pub const METERS_PER_DEGREE: f64 = 111_139.0;

/// Toolkit configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Metric used by nearest-distance functions
    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Density search radius in meters
    #[serde(default = "Config::default_density_radius")]
    pub density_radius_m: f64,

    #[serde(default = "Config::default_meters_per_degree")]
    pub meters_per_degree: f64,

    /// Kernel width of the interpolation kernel (squared degrees)
    #[serde(default = "Config::default_kernel_sigma2")]
    pub kernel_sigma2: f64,

    /// Weight below which kernel contributions are truncated
    #[serde(default = "Config::default_kernel_precision")]
    pub kernel_precision: f64,

    #[serde(default)]
    pub model: ModelConfig,

    /// Geometric matching threshold in coordinate units
    #[serde(default = "Config::default_match_distance")]
    pub match_distance_threshold: f64,
}

/// Regression settings
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Ridge penalty
    #[serde(default = "ModelConfig::default_alpha")]
    pub alpha: f64,

    /// Scale explanatory and target columns to zero mean, unit variance
    #[serde(default)]
    pub standardize: bool,
}

impl ModelConfig {
    const fn default_alpha() -> f64 {
        1.0
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            alpha: Self::default_alpha(),
            standardize: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance_metric: DistanceMetric::default(),
            density_radius_m: Self::default_density_radius(),
            meters_per_degree: Self::default_meters_per_degree(),
            kernel_sigma2: Self::default_kernel_sigma2(),
            kernel_precision: Self::default_kernel_precision(),
            model: ModelConfig::default(),
            match_distance_threshold: Self::default_match_distance(),
        }
    }
}

impl Config {
    const fn default_density_radius() -> f64 {
        1000.0
    }

    const fn default_meters_per_degree() -> f64 {
        METERS_PER_DEGREE
    }

    const fn default_kernel_sigma2() -> f64 {
        8e-3
    }

    const fn default_kernel_precision() -> f64 {
        1e-6
    }

    const fn default_match_distance() -> f64 {
        1e-4
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    pub fn with_density_radius(mut self, radius_m: f64) -> Self {
        self.density_radius_m = radius_m;
        self
    }

    pub fn with_kernel(mut self, sigma2: f64, precision: f64) -> Self {
        self.kernel_sigma2 = sigma2;
        self.kernel_precision = precision;
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_match_distance_threshold(mut self, threshold: f64) -> Self {
        self.match_distance_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.density_radius_m.is_finite() && self.density_radius_m >= 0.0) {
            return Err("Density radius must be a non-negative number of meters".to_string());
        }

        if !(self.meters_per_degree.is_finite() && self.meters_per_degree > 0.0) {
            return Err("Meters per degree must be positive".to_string());
        }

        if !(self.kernel_sigma2.is_finite() && self.kernel_sigma2 > 0.0) {
            return Err("Kernel sigma2 must be positive".to_string());
        }

        if !(self.kernel_precision > 0.0 && self.kernel_precision <= 1.0) {
            return Err("Kernel precision must be in (0, 1]".to_string());
        }

        if !(self.model.alpha.is_finite() && self.model.alpha >= 0.0) {
            return Err("Ridge alpha must be non-negative".to_string());
        }

        if !(self.match_distance_threshold.is_finite() && self.match_distance_threshold >= 0.0) {
            return Err("Match distance threshold must be non-negative".to_string());
        }

        Ok(())
    }

    /// Density radius converted to coordinate units.
    #[inline]
    pub fn density_bandwidth(&self) -> f64 {
        self.density_radius_m / self.meters_per_degree
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
