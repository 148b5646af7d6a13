//! Analysis configuration.
//!
//! The thresholds below are the engine's established constants. They are
//! kept as named defaults and can be overridden per run through
//! [`AnalysisConfig`], either in code or from a TOML document.

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// |r| above which a correlation pair is reported as strong.
pub const STRONG_CORRELATION_THRESHOLD: f64 = 0.5;
/// A text column with fewer distinct values than this is categorical.
pub const CATEGORICAL_MAX_UNIQUE: usize = 20;
/// A numeric column with more distinct values than this is continuous.
pub const CONTINUOUS_MIN_UNIQUE: usize = 20;
/// Tukey fence multiplier for IQR outliers.
pub const IQR_MULTIPLIER: f64 = 1.5;
/// Entries per column in the summary report's value tables.
pub const TOP_VALUES_LIMIT: usize = 5;
/// Entries in a text profile's most-common table.
pub const MOST_COMMON_LIMIT: usize = 3;
/// Rows in the overview report's sample.
pub const SAMPLE_ROWS: usize = 10;

/// Per-run analysis settings.
///
/// ```
/// use u_report::config::AnalysisConfig;
///
/// let config = AnalysisConfig::from_toml_str("strong_correlation_threshold = 0.8").unwrap();
/// assert_eq!(config.strong_correlation_threshold, 0.8);
/// assert_eq!(config.sample_rows, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Default: 0.5.
    pub strong_correlation_threshold: f64,
    /// Default: 20.
    pub categorical_max_unique: usize,
    /// Default: 20.
    pub continuous_min_unique: usize,
    /// Default: 1.5.
    pub iqr_multiplier: f64,
    /// Default: 5.
    pub top_values_limit: usize,
    /// Default: 3.
    pub most_common_limit: usize,
    /// Default: 10.
    pub sample_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            strong_correlation_threshold: STRONG_CORRELATION_THRESHOLD,
            categorical_max_unique: CATEGORICAL_MAX_UNIQUE,
            continuous_min_unique: CONTINUOUS_MIN_UNIQUE,
            iqr_multiplier: IQR_MULTIPLIER,
            top_values_limit: TOP_VALUES_LIMIT,
            most_common_limit: MOST_COMMON_LIMIT,
            sample_rows: SAMPLE_ROWS,
        }
    }
}

impl AnalysisConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ReportError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the analyzers cannot honor.
    pub fn validate(&self) -> Result<(), ReportError> {
        if !(0.0..=1.0).contains(&self.strong_correlation_threshold) {
            return Err(ReportError::Config(format!(
                "strong_correlation_threshold must be within [0, 1], got {}",
                self.strong_correlation_threshold
            )));
        }
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ReportError::Config(format!(
                "iqr_multiplier must be a non-negative number, got {}",
                self.iqr_multiplier
            )));
        }
        Ok(())
    }
}
