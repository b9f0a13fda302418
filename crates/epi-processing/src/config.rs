//! Configuration types for the dataset processing pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! The data root is always injected here rather than read from a
//! process-wide constant, so two pipelines can point at different trees.

use crate::regions::RegionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the processing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration with a
/// fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use epi_processing::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .data_root("./data")
///     .column_threshold(0.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding the `raw/` and `processed/` trees.
    /// Default: "./data"
    pub data_root: PathBuf,

    /// Minimum non-null fraction a column must reach to survive cleaning
    /// (0.0 - 1.0). Default: 0.5
    pub column_threshold: f64,

    /// Per-row non-null fraction used by the density region policy
    /// (0.0 - 1.0). Default: 0.5
    pub region_threshold: f64,

    /// Force one region policy for every dataset instead of picking by
    /// dataset kind. Default: None (symptom datasets get the density
    /// policy, daily series the zero-count policy)
    pub region_policy_override: Option<RegionPolicy>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("./data"),
            column_threshold: 0.5,
            region_threshold: 0.5,
            region_policy_override: None,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.column_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "column_threshold".to_string(),
                value: self.column_threshold,
            });
        }

        if !(0.0..=1.0).contains(&self.region_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "region_threshold".to_string(),
                value: self.region_threshold,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    data_root: Option<PathBuf>,
    column_threshold: Option<f64>,
    region_threshold: Option<f64>,
    region_policy_override: Option<RegionPolicy>,
}

impl PipelineConfigBuilder {
    /// Set the root directory holding `raw/` and `processed/` data.
    pub fn data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    /// Set the minimum non-null fraction for a column to survive cleaning.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn column_threshold(mut self, threshold: f64) -> Self {
        self.column_threshold = Some(threshold);
        self
    }

    /// Set the per-row non-null fraction used by the density region policy.
    pub fn region_threshold(mut self, threshold: f64) -> Self {
        self.region_threshold = Some(threshold);
        self
    }

    /// Force a single region policy for every dataset.
    ///
    /// Without this, the pipeline picks the policy from the dataset kind.
    pub fn region_policy(mut self, policy: RegionPolicy) -> Self {
        self.region_policy_override = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let config = PipelineConfig {
            data_root: self.data_root.unwrap_or_else(|| PathBuf::from("./data")),
            column_threshold: self.column_threshold.unwrap_or(0.5),
            region_threshold: self.region_threshold.unwrap_or(0.5),
            region_policy_override: self.region_policy_override,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_root, PathBuf::from("./data"));
        assert_eq!(config.column_threshold, 0.5);
        assert_eq!(config.region_threshold, 0.5);
        assert!(config.region_policy_override.is_none());
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config.column_threshold, 0.5);
        assert_eq!(config.region_threshold, 0.5);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .data_root("/tmp/epi")
            .column_threshold(0.3)
            .region_threshold(0.7)
            .region_policy(RegionPolicy::Density)
            .build()
            .unwrap();

        assert_eq!(config.data_root, PathBuf::from("/tmp/epi"));
        assert_eq!(config.column_threshold, 0.3);
        assert_eq!(config.region_threshold, 0.7);
        assert_eq!(config.region_policy_override, Some(RegionPolicy::Density));
    }

    #[test]
    fn test_validation_invalid_column_threshold() {
        let result = PipelineConfig::builder().column_threshold(1.5).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_validation_invalid_region_threshold() {
        let result = PipelineConfig::builder().region_threshold(-0.1).build();

        assert!(result.is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::builder()
            .region_policy(RegionPolicy::ZeroCount)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.column_threshold, deserialized.column_threshold);
        assert_eq!(
            config.region_policy_override,
            deserialized.region_policy_override
        );
    }
}
