//! Store builder for flexible configuration
//!
//! This module provides a builder pattern for creating a `CacheStore`, either
//! with its own spatial index built from configuration or bound to an index the
//! caller already holds. An index serves one store at a time.

use crate::compute::spatial::SpatialIndex;
use crate::config::{Config, GpsBounds, UpdatePolicy};
use crate::db::CacheStore;
use crate::error::Result;
use std::sync::Arc;

/// Builder for a record store and its spatial index.
#[derive(Debug)]
pub struct StoreBuilder {
    config: Config,
    index: Option<Arc<SpatialIndex>>,
}

impl StoreBuilder {
    /// Create a new builder with the default whole-globe configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            index: None,
        }
    }

    /// Set the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Region covered by the spatial index, in GPS degrees.
    pub fn root_bounds(mut self, root: GpsBounds) -> Self {
        self.config = self.config.with_root(root);
        self
    }

    pub fn leaf_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_leaf_capacity(capacity);
        self
    }

    pub fn max_depth(mut self, max_depth: u32) -> Self {
        self.config = self.config.with_max_depth(max_depth);
        self
    }

    pub fn update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.config = self.config.with_update_policy(policy);
        self
    }

    /// Bind the store to an existing index. Spatial settings in the config are
    /// then ignored, and `build` fails if another store holds the index.
    pub fn index(mut self, index: Arc<SpatialIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the store.
    pub fn build(self) -> Result<CacheStore> {
        self.config.validate()?;
        match self.index {
            Some(index) => CacheStore::with_policy(index, self.config.update_policy),
            None => Ok(CacheStore::owning(
                SpatialIndex::from_config(&self.config)?,
                self.config.update_policy,
            )),
        }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoCacheError;

    #[test]
    fn test_builder_default() {
        let store = StoreBuilder::new().build().unwrap();
        assert_eq!(store.update_policy(), UpdatePolicy::Reindex);
        assert!(store.is_empty());
    }

    #[test]
    fn test_builder_regional_bounds() {
        let store = StoreBuilder::new()
            .root_bounds(GpsBounds::new(-125.0, 24.0, -66.0, 50.0))
            .leaf_capacity(2)
            .build()
            .unwrap();

        store.create("denver", 39.74, -104.99, ["city"]).unwrap();
        assert!(matches!(
            store.create("paris", 48.85, 2.35, ["city"]),
            Err(GeoCacheError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_builder_existing_index() {
        let index = Arc::new(SpatialIndex::global());
        let store = StoreBuilder::new()
            .index(Arc::clone(&index))
            .update_policy(UpdatePolicy::PreserveStale)
            .build()
            .unwrap();

        store.create("a", 1.0, 1.0, ["t"]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(store.update_policy(), UpdatePolicy::PreserveStale);

        // A second store over the same index would resolve ids against the
        // wrong records.
        let err = StoreBuilder::new()
            .index(Arc::clone(&index))
            .build()
            .unwrap_err();
        assert!(matches!(err, GeoCacheError::IndexInUse));
    }

    #[test]
    fn test_builder_rejects_excessive_depth() {
        let err = StoreBuilder::new()
            .leaf_capacity(1)
            .max_depth(200_000)
            .build()
            .unwrap_err();
        assert!(matches!(err, GeoCacheError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let mut config = Config::default();
        config.max_depth = 0;
        assert!(StoreBuilder::new().config(config).build().is_err());
    }
}
