//! Error types for the geocache store.

use std::fmt;
use thiserror::Error;

/// Key used for a lookup that came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(u64),
    Name(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "id={}", id),
            LookupKey::Name(name) => write!(f, "name={}", name),
        }
    }
}

#[derive(Debug, Error)]
pub enum GeoCacheError {
    /// No record for the given id or name. Caused by the request, not the store.
    #[error("cache not found; {0}")]
    NotFound(LookupKey),

    /// The spatial index returned an id the record store does not know about.
    #[error("store inconsistency: spatial index references unknown record id {id}")]
    InternalInconsistency { id: u64 },

    /// Subdividing further would exceed the configured maximum depth.
    #[error("quadtree depth limit reached; level={level}, max_depth={max_depth}")]
    StructuralLimit { level: u32, max_depth: u32 },

    /// The point lies outside the region covered by the spatial index.
    #[error("point outside indexed region; lat={lat}, long={long}")]
    OutOfBounds { lat: f64, long: f64 },

    /// The spatial index is already bound to another store.
    #[error("spatial index is already bound to a store")]
    IndexInUse,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("toml encode error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GeoCacheError {
    /// Whether the error points at a bad request rather than a damaged store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GeoCacheError::NotFound(_) | GeoCacheError::OutOfBounds { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GeoCacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_key() {
        let err = GeoCacheError::NotFound(LookupKey::Name("s1".to_string()));
        assert_eq!(err.to_string(), "cache not found; name=s1");

        let err = GeoCacheError::NotFound(LookupKey::Id(42));
        assert_eq!(err.to_string(), "cache not found; id=42");
    }

    #[test]
    fn test_client_vs_store_errors() {
        assert!(GeoCacheError::NotFound(LookupKey::Id(1)).is_client_error());
        assert!(!GeoCacheError::InternalInconsistency { id: 1 }.is_client_error());
        assert!(
            !GeoCacheError::StructuralLimit {
                level: 32,
                max_depth: 32
            }
            .is_client_error()
        );
    }
}
