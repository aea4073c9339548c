//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. A configuration is immutable
//! once built and is passed explicitly to every stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Method used to rescale numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMethod {
    /// Leave numeric columns as-is
    #[default]
    None,
    /// Subtract the mean and divide by the population standard deviation
    Standard,
    /// Rescale linearly so the minimum maps to 0 and the maximum to 1
    #[serde(alias = "min_max")]
    MinMax,
}

/// Method used to detect outlier rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Keep every row
    #[default]
    None,
    /// Flag values outside [Q1 - 1.5*IQR, Q3 + 1.5*IQR]
    #[serde(alias = "IQR")]
    Iqr,
    /// Flag values at least 3 population standard deviations from the mean
    #[serde(alias = "z_score")]
    ZScore,
}

impl FromStr for ScalingMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "minmax" | "min_max" => Ok(Self::MinMax),
            _ => Err(ConfigValidationError::UnknownMethod {
                field: "scaling_method".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for OutlierMethod {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "iqr" => Ok(Self::Iqr),
            "zscore" | "z_score" => Ok(Self::ZScore),
            _ => Err(ConfigValidationError::UnknownMethod {
                field: "outlier_method".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScalingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Standard => "standard",
            Self::MinMax => "minmax",
        };
        f.write_str(name)
    }
}

impl fmt::Display for OutlierMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Iqr => "iqr",
            Self::ZScore => "zscore",
        };
        f.write_str(name)
    }
}

/// Which columns the date normalizer should parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateColumns {
    /// Every column whose name contains "date" (case-insensitive)
    #[default]
    Auto,
    /// Exactly these columns (matched after lowercasing)
    Explicit(Vec<String>),
}

impl DateColumns {
    /// Build an explicit list, canonicalizing names to lowercase.
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Explicit(
            names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        )
    }

    /// Whether the columns were listed by the caller rather than detected.
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaning::config::{CleaningConfig, OutlierMethod, ScalingMethod};
///
/// let config = CleaningConfig::builder()
///     .missing_threshold(0.3)
///     .scaling_method(ScalingMethod::MinMax)
///     .outlier_method(OutlierMethod::Iqr)
///     .max_unique_for_encoding(10)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Columns with a missing fraction above this value are dropped (0.0 - 1.0).
    /// Default: 0.5
    pub missing_threshold: f64,

    /// How numeric columns are rescaled.
    /// Default: None
    pub scaling_method: ScalingMethod,

    /// How outlier rows are detected and removed.
    /// Default: None
    pub outlier_method: OutlierMethod,

    /// Whether low-cardinality text columns are one-hot encoded.
    /// Default: true
    pub encode_categoricals: bool,

    /// Columns parsed as dates.
    /// Default: Auto
    pub date_columns: DateColumns,

    /// Text columns with more distinct values than this are never encoded.
    /// Default: 10
    pub max_unique_for_encoding: usize,

    /// Whether exact duplicate rows are removed.
    /// Default: true
    pub remove_duplicates: bool,

    /// Whether text values are lowercased and trimmed.
    /// Default: true
    pub normalize_text: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            missing_threshold: 0.5,
            scaling_method: ScalingMethod::default(),
            outlier_method: OutlierMethod::default(),
            encode_categoricals: true,
            date_columns: DateColumns::default(),
            max_unique_for_encoding: 10,
            remove_duplicates: true,
            normalize_text: true,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields take their default values. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigValidationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigValidationError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: CleaningConfig =
            serde_json::from_str(&content).map_err(|e| ConfigValidationError::Load {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_threshold".to_string(),
                value: self.missing_threshold,
            });
        }

        if let DateColumns::Explicit(names) = &self.date_columns
            && let Some(blank) = names.iter().find(|name| name.trim().is_empty())
        {
            return Err(ConfigValidationError::InvalidDateColumn(blank.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Unknown {field} '{value}'")]
    UnknownMethod { field: String, value: String },

    #[error("Invalid date column name '{0}'")]
    InvalidDateColumn(String),

    #[error("Failed to load configuration from '{path}': {reason}")]
    Load { path: String, reason: String },
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    missing_threshold: Option<f64>,
    scaling_method: Option<ScalingMethod>,
    outlier_method: Option<OutlierMethod>,
    encode_categoricals: Option<bool>,
    date_columns: Option<DateColumns>,
    max_unique_for_encoding: Option<usize>,
    remove_duplicates: Option<bool>,
    normalize_text: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Start from an existing configuration, e.g. one loaded from disk.
    pub fn from_config(config: CleaningConfig) -> Self {
        Self {
            missing_threshold: Some(config.missing_threshold),
            scaling_method: Some(config.scaling_method),
            outlier_method: Some(config.outlier_method),
            encode_categoricals: Some(config.encode_categoricals),
            date_columns: Some(config.date_columns),
            max_unique_for_encoding: Some(config.max_unique_for_encoding),
            remove_duplicates: Some(config.remove_duplicates),
            normalize_text: Some(config.normalize_text),
        }
    }

    /// Set the threshold for dropping columns with missing values.
    ///
    /// Columns whose fraction of missing values is greater than this
    /// threshold are dropped from the dataset.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Set the scaling method for numeric columns.
    pub fn scaling_method(mut self, method: ScalingMethod) -> Self {
        self.scaling_method = Some(method);
        self
    }

    /// Set the outlier detection method.
    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outlier_method = Some(method);
        self
    }

    /// Enable or disable one-hot encoding of categorical columns.
    pub fn encode_categoricals(mut self, encode: bool) -> Self {
        self.encode_categoricals = Some(encode);
        self
    }

    /// Set which columns are parsed as dates.
    pub fn date_columns(mut self, columns: DateColumns) -> Self {
        self.date_columns = Some(columns);
        self
    }

    /// Set the maximum distinct-value count for a column to be encoded.
    pub fn max_unique_for_encoding(mut self, max_unique: usize) -> Self {
        self.max_unique_for_encoding = Some(max_unique);
        self
    }

    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Enable or disable text normalization.
    pub fn normalize_text(mut self, normalize: bool) -> Self {
        self.normalize_text = Some(normalize);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let defaults = CleaningConfig::default();
        let config = CleaningConfig {
            missing_threshold: self.missing_threshold.unwrap_or(defaults.missing_threshold),
            scaling_method: self.scaling_method.unwrap_or_default(),
            outlier_method: self.outlier_method.unwrap_or_default(),
            encode_categoricals: self
                .encode_categoricals
                .unwrap_or(defaults.encode_categoricals),
            date_columns: self.date_columns.unwrap_or_default(),
            max_unique_for_encoding: self
                .max_unique_for_encoding
                .unwrap_or(defaults.max_unique_for_encoding),
            remove_duplicates: self.remove_duplicates.unwrap_or(defaults.remove_duplicates),
            normalize_text: self.normalize_text.unwrap_or(defaults.normalize_text),
        };

        config.validate()?;
        Ok(config)
    }
}
