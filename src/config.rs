//! Configuration for the record store and its spatial index.
//!
//! Re-exports the config value types from `geocache-types` for convenience.

use crate::compute::spatial::index::DEFAULT_CAPACITY;
use crate::compute::spatial::quadtree::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use crate::error::{GeoCacheError, Result};

pub use geocache_types::config::{GpsBounds, UpdatePolicy};

/// Store configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Region covered by the spatial index, in GPS degrees
    #[serde(default)]
    pub root: GpsBounds,

    /// Points a leaf holds before it subdivides
    #[serde(default = "Config::default_leaf_capacity")]
    pub leaf_capacity: usize,

    /// Deepest level a cell may reach (the root is level 1)
    #[serde(default = "Config::default_max_depth")]
    pub max_depth: u32,

    #[serde(default)]
    pub update_policy: UpdatePolicy,
}

impl Config {
    const fn default_leaf_capacity() -> usize {
        DEFAULT_CAPACITY
    }

    const fn default_max_depth() -> u32 {
        DEFAULT_MAX_DEPTH
    }

    pub fn with_root(mut self, root: GpsBounds) -> Self {
        self.root = root;
        self
    }

    pub fn with_leaf_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Leaf capacity must be greater than zero");
        self.leaf_capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        assert!(max_depth > 0, "Max depth must be greater than zero");

        if max_depth > MAX_DEPTH_LIMIT {
            log::warn!(
                "Max depth of {} is above the limit of {}; validation will reject it.",
                max_depth,
                MAX_DEPTH_LIMIT
            );
        }

        self.max_depth = max_depth;
        self
    }

    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.leaf_capacity == 0 {
            return Err(GeoCacheError::InvalidConfig(
                "Leaf capacity must be greater than zero".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(GeoCacheError::InvalidConfig(
                "Max depth must be greater than zero".to_string(),
            ));
        }

        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(GeoCacheError::InvalidConfig(format!(
                "Max depth must be at most {}, got: {}",
                MAX_DEPTH_LIMIT, self.max_depth
            )));
        }

        if !self.root.is_finite() {
            return Err(GeoCacheError::InvalidConfig(format!(
                "Root bounds must be finite, got: {:?}",
                self.root
            )));
        }

        if !self.root.is_ordered() {
            return Err(GeoCacheError::InvalidConfig(format!(
                "Root bounds must have min <= max on both axes, got: {:?}",
                self.root
            )));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: GpsBounds::default(),
            leaf_capacity: Self::default_leaf_capacity(),
            max_depth: Self::default_max_depth(),
            update_policy: UpdatePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.root, GpsBounds::globe());
        assert_eq!(config.leaf_capacity, 4);
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.update_policy, UpdatePolicy::Reindex);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default()
            .with_leaf_capacity(8)
            .with_max_depth(12)
            .with_update_policy(UpdatePolicy::PreserveStale);

        let json = config.to_json().unwrap();
        let deserialized = Config::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{ "leaf_capacity": 16 }"#).unwrap();
        assert_eq!(config.leaf_capacity, 16);
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.root, GpsBounds::globe());

        let config = Config::from_json(r#"{ "update_policy": "preserve_stale" }"#).unwrap();
        assert_eq!(config.update_policy, UpdatePolicy::PreserveStale);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        assert!(Config::from_json(r#"{ "capacity": 4 }"#).is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.leaf_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(GeoCacheError::InvalidConfig(_))
        ));

        let config = Config::default().with_root(GpsBounds::new(10.0, 0.0, -10.0, 5.0));
        assert!(config.validate().is_err());

        let config = Config::default().with_root(GpsBounds::new(f64::NAN, 0.0, 10.0, 5.0));
        assert!(config.validate().is_err());

        assert!(Config::from_json(r#"{ "max_depth": 0 }"#).is_err());
    }

    #[test]
    fn test_config_rejects_excessive_depth() {
        assert!(Config::default().with_max_depth(64).validate().is_ok());

        let config = Config::default().with_max_depth(65);
        assert!(matches!(
            config.validate(),
            Err(GeoCacheError::InvalidConfig(_))
        ));

        assert!(Config::from_json(r#"{ "max_depth": 200000 }"#).is_err());
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let config = Config::from_toml(
            r#"
            leaf_capacity = 6
            update_policy = "preserve_stale"

            [root]
            long_min = -125.0
            lat_min = 24.0
            long_max = -66.0
            lat_max = 50.0
            "#,
        )
        .unwrap();
        assert_eq!(config.leaf_capacity, 6);
        assert_eq!(config.root.long_min, -125.0);

        let encoded = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&encoded).unwrap(), config);
    }
}
