//! Thread-safe spatial index over a [`QuadTree`].
//!
//! The index owns the tree root behind a single reader/writer lock, converts GPS
//! coordinates into absolute space, and knows nothing about records, names or
//! tags.

use super::quadtree::{DEFAULT_MAX_DEPTH, QuadTree};
use crate::config::Config;
use crate::error::{GeoCacheError, Result};
use crate::lock_order::IndexLockScope;
use geocache_types::point::{IndexedPoint, gps_to_absolute};
use geocache_types::quadrant::Quadrant;
use geocache_types::stats::IndexStats;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-leaf capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 4;

/// Owned copy of a leaf returned by [`SpatialIndex::region_lookup`].
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSnapshot {
    pub level: u32,
    pub quadrant: Quadrant,
    pub points: Vec<IndexedPoint>,
}

impl LeafSnapshot {
    pub fn ids(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.id).collect()
    }
}

/// Ids in the index are record ids of a single store, so at most one
/// [`CacheStore`](crate::CacheStore) may be bound to an index at a time.
pub struct SpatialIndex {
    tree: RwLock<QuadTree>,
    bound: AtomicBool,
}

impl SpatialIndex {
    /// Create an index over `root` (absolute space) with the given leaf capacity.
    pub fn new(root: Quadrant, capacity: usize) -> Self {
        Self::with_max_depth(root, capacity, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(root: Quadrant, capacity: usize, max_depth: u32) -> Self {
        Self {
            tree: RwLock::new(QuadTree::with_max_depth(root, capacity, max_depth)),
            bound: AtomicBool::new(false),
        }
    }

    /// Mark the index as owned by a store. Returns false if it already is.
    pub(crate) fn claim(&self) -> bool {
        self.bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn release(&self) {
        self.bound.store(false, Ordering::Release);
    }

    /// Whether a store currently owns this index.
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    /// Whole-globe index with the default capacity.
    pub fn global() -> Self {
        Self::new(
            Quadrant::from_gps(-180.0, -90.0, 180.0, 90.0),
            DEFAULT_CAPACITY,
        )
    }

    /// Build an index from the spatial part of a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_max_depth(
            config.root.to_quadrant(),
            config.leaf_capacity,
            config.max_depth,
        ))
    }

    /// Region covered by the index, in absolute space.
    pub fn root_quadrant(&self) -> Quadrant {
        let _scope = IndexLockScope::enter();
        *self.tree.read().quadrant()
    }

    /// Whether a GPS position falls inside the indexed region.
    pub fn covers(&self, lat: f64, long: f64) -> bool {
        let (x, y) = gps_to_absolute(long, lat);
        self.root_quadrant().contains(x, y)
    }

    /// Insert a point already in absolute space.
    ///
    /// `Ok(false)` means the point lies outside the root quadrant.
    pub fn insert(&self, point: IndexedPoint) -> Result<bool> {
        let _scope = IndexLockScope::enter();
        self.tree.write().insert(point)
    }

    /// Insert a GPS position under `id`.
    pub fn insert_gps(&self, lat: f64, long: f64, id: u64) -> Result<bool> {
        self.insert(IndexedPoint::from_gps(long, lat, id))
    }

    /// Like [`SpatialIndex::insert_gps`] but treats an out-of-region point as an error.
    pub fn try_insert_gps(&self, lat: f64, long: f64, id: u64) -> Result<()> {
        if self.insert_gps(lat, long, id)? {
            Ok(())
        } else {
            log::warn!("rejected id {} outside root at lat={} long={}", id, lat, long);
            Err(GeoCacheError::OutOfBounds { lat, long })
        }
    }

    /// Remove the entry for `id` stored at a GPS position.
    pub fn remove_gps(&self, lat: f64, long: f64, id: u64) -> bool {
        let _scope = IndexLockScope::enter();
        self.tree
            .write()
            .remove(&IndexedPoint::from_gps(long, lat, id))
    }

    /// Leaf whose region contains the absolute position `(x, y)`.
    pub fn region_lookup(&self, x: f64, y: f64) -> Option<LeafSnapshot> {
        let _scope = IndexLockScope::enter();
        let tree = self.tree.read();
        tree.region_lookup(x, y).map(|leaf| LeafSnapshot {
            level: leaf.level(),
            quadrant: *leaf.quadrant(),
            points: leaf.points().to_vec(),
        })
    }

    /// Ids of every point sharing the query position's leaf.
    ///
    /// `max_distance` and `limit` are accepted for interface stability and are
    /// not applied: the result is the whole leaf, unranked.
    pub fn find_nearest(&self, lat: f64, long: f64, max_distance: f64, limit: usize) -> Vec<u64> {
        let (x, y) = gps_to_absolute(long, lat);
        log::trace!(
            "find_nearest lat={} long={} max_distance={} limit={}",
            lat,
            long,
            max_distance,
            limit
        );
        self.region_lookup(x, y)
            .map(|leaf| leaf.ids())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        let _scope = IndexLockScope::enter();
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> IndexStats {
        let _scope = IndexLockScope::enter();
        self.tree.read().stats()
    }

    /// Run `f` against the tree under the shared lock.
    pub fn with_tree<R>(&self, f: impl FnOnce(&QuadTree) -> R) -> R {
        let _scope = IndexLockScope::enter();
        f(&*self.tree.read())
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::global()
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("bound", &self.is_bound())
            .field("stats", &self.stats())
            .finish()
    }
}
