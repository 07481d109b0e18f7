use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named, point-located record with free-form tags.
///
/// Values handed out by the store are owned copies; changing them has no effect
/// on the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCache {
    pub id: u64,
    pub name: String,
    pub lat: f64,
    pub long: f64,
    pub tags: BTreeSet<String>,
}

impl GeoCache {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Replacement fields for [`CacheStore::update`](crate::db::CacheStore::update).
///
/// Id and name are fixed at creation and cannot be changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheUpdate {
    pub lat: f64,
    pub long: f64,
    pub tags: BTreeSet<String>,
}

impl CacheUpdate {
    pub fn new<I, T>(lat: f64, long: f64, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            lat,
            long,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}
