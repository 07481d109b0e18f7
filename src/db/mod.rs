//! Record store for geocache.
//!
//! `CacheStore` owns every record in an id-keyed map and keeps two secondary
//! indices over it: a unique-name index and an inverted tag index, both storing
//! ids. Points derived from each record are fed into a bound [`SpatialIndex`].
//!
//! One reader/writer lock covers the three maps. The store lock is always taken
//! before the spatial index lock, never the other way round.

use crate::builder::StoreBuilder;
use crate::compute::spatial::SpatialIndex;
use crate::config::{Config, UpdatePolicy};
use crate::error::{GeoCacheError, LookupKey, Result};
use crate::lock_order;
use geocache_types::stats::StoreStats;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

mod record;
mod tag_index;

pub use record::{CacheUpdate, GeoCache};
use tag_index::TagIndex;

/// First id handed out by a fresh store.
const FIRST_ID: u64 = 1;

#[derive(Debug)]
struct StoreState {
    records: FxHashMap<u64, GeoCache>,
    by_name: FxHashMap<String, u64>,
    by_tag: TagIndex,
    next_id: u64,
}

impl StoreState {
    fn new() -> Self {
        Self {
            records: FxHashMap::default(),
            by_name: FxHashMap::default(),
            by_tag: TagIndex::new(),
            next_id: FIRST_ID,
        }
    }

    fn id_for_name(&self, name: &str) -> Result<u64> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| GeoCacheError::NotFound(LookupKey::Name(name.to_string())))
    }
}

/// In-memory record store with id, name, tag and spatial lookups.
///
/// Thread-safe; share it behind an `Arc`.
#[derive(Debug)]
pub struct CacheStore {
    state: RwLock<StoreState>,
    index: Arc<SpatialIndex>,
    update_policy: UpdatePolicy,
    ops_count: AtomicU64,
}

impl CacheStore {
    /// Bind a new, empty store to `index`.
    ///
    /// Fails with [`GeoCacheError::IndexInUse`] while another store holds the
    /// index. The binding is released when the store is dropped.
    pub fn new(index: Arc<SpatialIndex>) -> Result<Self> {
        Self::with_policy(index, UpdatePolicy::default())
    }

    pub fn with_policy(index: Arc<SpatialIndex>, update_policy: UpdatePolicy) -> Result<Self> {
        if !index.claim() {
            return Err(GeoCacheError::IndexInUse);
        }
        Ok(Self::bound_to(index, update_policy))
    }

    /// Store over a whole-globe index with default settings.
    pub fn memory() -> Self {
        Self::owning(SpatialIndex::global(), UpdatePolicy::default())
    }

    /// Store and spatial index built from `config`.
    pub fn with_config(config: Config) -> Result<Self> {
        let index = SpatialIndex::from_config(&config)?;
        Ok(Self::owning(index, config.update_policy))
    }

    /// Take ownership of an index nothing else can reach yet.
    pub(crate) fn owning(index: SpatialIndex, update_policy: UpdatePolicy) -> Self {
        let claimed = index.claim();
        debug_assert!(claimed, "fresh index already bound");
        Self::bound_to(Arc::new(index), update_policy)
    }

    fn bound_to(index: Arc<SpatialIndex>, update_policy: UpdatePolicy) -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
            index,
            update_policy,
            ops_count: AtomicU64::new(0),
        }
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        lock_order::assert_store_lock_allowed();
        self.state.read()
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        lock_order::assert_store_lock_allowed();
        self.state.write()
    }

    fn record_op(&self) {
        self.ops_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a record and return its id.
    ///
    /// The record becomes visible in every index at once, or not at all: a
    /// position the spatial index cannot hold fails with
    /// [`GeoCacheError::OutOfBounds`] or [`GeoCacheError::StructuralLimit`]
    /// and leaves the store untouched, including the id counter.
    ///
    /// Reusing a name points the name index at the new record; the previous
    /// record stays reachable by id, tag and position.
    pub fn create<I, T>(&self, name: impl Into<String>, lat: f64, long: f64, tags: I) -> Result<u64>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let name = name.into();
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();

        let mut state = self.write();
        let id = state.next_id;

        self.index.try_insert_gps(lat, long, id)?;

        let record = GeoCache {
            id,
            name: name.clone(),
            lat,
            long,
            tags,
        };
        state.by_tag.insert(id, &record.tags);
        if let Some(previous) = state.by_name.insert(name, id) {
            log::warn!(
                "name {:?} reassigned from record {} to record {}",
                record.name,
                previous,
                id
            );
        }
        state.records.insert(id, record);
        state.next_id += 1;
        drop(state);

        self.record_op();
        log::debug!("created record {} at lat={} long={}", id, lat, long);
        Ok(id)
    }

    pub fn get_by_id(&self, id: u64) -> Result<GeoCache> {
        self.record_op();
        self.read()
            .records
            .get(&id)
            .cloned()
            .ok_or(GeoCacheError::NotFound(LookupKey::Id(id)))
    }

    pub fn get_by_name(&self, name: &str) -> Result<GeoCache> {
        self.record_op();
        let state = self.read();
        let id = state.id_for_name(name)?;
        state
            .records
            .get(&id)
            .cloned()
            .ok_or(GeoCacheError::InternalInconsistency { id })
    }

    /// Records carrying any of `tags`, ordered by id, each listed once.
    ///
    /// Tags with no records contribute nothing.
    pub fn get_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<GeoCache>> {
        self.record_op();
        let state = self.read();
        state
            .by_tag
            .union(tags)
            .into_iter()
            .map(|id| {
                state
                    .records
                    .get(&id)
                    .cloned()
                    .ok_or(GeoCacheError::InternalInconsistency { id })
            })
            .collect()
    }

    /// Records sharing the query position's quadtree leaf.
    ///
    /// `max_distance` and `limit` are passed through to the spatial index, which
    /// does not apply them.
    pub fn find_nearest(
        &self,
        lat: f64,
        long: f64,
        max_distance: f64,
        limit: usize,
    ) -> Result<Vec<GeoCache>> {
        self.record_op();
        let state = self.read();
        let ids = self.index.find_nearest(lat, long, max_distance, limit);

        ids.into_iter()
            .map(|id| match state.records.get(&id) {
                Some(record) => Ok(record.clone()),
                None => {
                    log::error!(
                        "spatial index returned id {} with no matching record; lat={} long={}",
                        id,
                        lat,
                        long
                    );
                    Err(GeoCacheError::InternalInconsistency { id })
                }
            })
            .collect()
    }

    /// Replace the position and tags of the record called `name`.
    ///
    /// With [`UpdatePolicy::Reindex`] the tag index and spatial position follow
    /// the new values; if the new position is rejected the record is left as it
    /// was. With [`UpdatePolicy::PreserveStale`] only the record itself changes.
    pub fn update(&self, name: &str, update: CacheUpdate) -> Result<GeoCache> {
        let mut state = self.write();
        let id = state.id_for_name(name)?;
        let (old_lat, old_long, old_tags) = match state.records.get(&id) {
            Some(record) => (record.lat, record.long, record.tags.clone()),
            None => return Err(GeoCacheError::InternalInconsistency { id }),
        };

        if self.update_policy == UpdatePolicy::Reindex {
            self.move_point(id, (old_lat, old_long), (update.lat, update.long))?;
            state.by_tag.remove(id, &old_tags);
            state.by_tag.insert(id, &update.tags);
        }

        let Some(record) = state.records.get_mut(&id) else {
            return Err(GeoCacheError::InternalInconsistency { id });
        };
        record.lat = update.lat;
        record.long = update.long;
        record.tags = update.tags;
        let updated = record.clone();
        drop(state);

        self.record_op();
        log::debug!(
            "updated record {} ({:?}) with policy {:?}",
            id,
            name,
            self.update_policy
        );
        Ok(updated)
    }

    /// Re-home the spatial entry for `id`. On failure the old entry is restored.
    fn move_point(&self, id: u64, from: (f64, f64), to: (f64, f64)) -> Result<()> {
        let removed = self.index.remove_gps(from.0, from.1, id);
        if !removed {
            log::warn!("record {} had no spatial entry at {:?}", id, from);
        }

        if let Err(e) = self.index.try_insert_gps(to.0, to.1, id) {
            if removed {
                // The vacated leaf has room again, so this cannot split.
                let restored = self.index.insert_gps(from.0, from.1, id);
                debug_assert!(matches!(restored, Ok(true)));
            }
            return Err(e);
        }
        Ok(())
    }

    /// Accepted and ignored; records are never deleted.
    pub fn delete(&self, id: u64) -> Result<()> {
        log::debug!("delete({}) is a no-op", id);
        Ok(())
    }

    /// Accepted and ignored; records are never deleted.
    pub fn delete_all(&self) -> Result<()> {
        log::debug!("delete_all() is a no-op");
        Ok(())
    }

    /// Always empty; listing every record is not supported.
    pub fn get_all(&self) -> Result<Vec<GeoCache>> {
        Ok(Vec::new())
    }

    /// Number of records held in the id map.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.read();
        StoreStats {
            records: state.records.len(),
            names: state.by_name.len(),
            tags: state.by_tag.len(),
            operations_count: self.ops_count.load(Ordering::Relaxed),
            index: self.index.stats(),
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl Drop for CacheStore {
    fn drop(&mut self) {
        self.index.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get_round_trip() {
        let store = CacheStore::memory();
        let id = store
            .create("s1", 41.5, -70.25, ["ocean", "atlantic"])
            .unwrap();
        assert_eq!(id, 1);

        let by_id = store.get_by_id(id).unwrap();
        let by_name = store.get_by_name("s1").unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.name, "s1");
        assert_eq!(by_id.lat, 41.5);
        assert_eq!(by_id.long, -70.25);
        assert_eq!(
            by_id.tags,
            BTreeSet::from(["atlantic".to_string(), "ocean".to_string()])
        );
    }

    #[test]
    fn test_ids_increase_from_one() {
        let store = CacheStore::memory();
        let ids: Vec<u64> = (0..5)
            .map(|i| {
                store
                    .create(format!("c{}", i), i as f64, i as f64, Vec::<String>::new())
                    .unwrap()
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_not_found_carries_key() {
        let store = CacheStore::memory();
        assert!(matches!(
            store.get_by_id(7),
            Err(GeoCacheError::NotFound(LookupKey::Id(7)))
        ));
        match store.get_by_name("missing") {
            Err(GeoCacheError::NotFound(LookupKey::Name(name))) => assert_eq!(name, "missing"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            store.update("missing", CacheUpdate::new(0.0, 0.0, ["x"])),
            Err(GeoCacheError::NotFound(_))
        ));
    }

    #[test]
    fn test_returned_values_are_copies() {
        let store = CacheStore::memory();
        store.create("s1", 1.0, 2.0, ["a"]).unwrap();

        let mut copy = store.get_by_name("s1").unwrap();
        copy.lat = 50.0;
        copy.tags.insert("b".to_string());

        let fresh = store.get_by_name("s1").unwrap();
        assert_eq!(fresh.lat, 1.0);
        assert!(!fresh.has_tag("b"));
    }

    #[test]
    fn test_out_of_bounds_create_leaves_no_trace() {
        let store = CacheStore::memory();
        let err = store.create("bad", 91.0, 0.0, ["x"]).unwrap_err();
        assert!(matches!(err, GeoCacheError::OutOfBounds { .. }));
        assert!(store.is_empty());
        assert!(store.get_by_name("bad").is_err());
        assert!(store.get_by_tags(&["x"]).unwrap().is_empty());

        // The id was not consumed.
        assert_eq!(store.create("good", 1.0, 1.0, ["x"]).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_name_last_writer_wins() {
        let store = CacheStore::memory();
        let first = store.create("dup", 1.0, 1.0, ["a"]).unwrap();
        let second = store.create("dup", 2.0, 2.0, ["b"]).unwrap();

        assert_eq!(store.get_by_name("dup").unwrap().id, second);
        // The first record is still reachable through the other indices.
        assert_eq!(store.get_by_id(first).unwrap().lat, 1.0);
        assert_eq!(store.get_by_tags(&["a"]).unwrap()[0].id, first);
        let stats = store.stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.names, 1);
    }

    #[test]
    fn test_no_op_operations() {
        let store = CacheStore::memory();
        let id = store.create("keep", 1.0, 1.0, ["a"]).unwrap();

        store.delete(id).unwrap();
        store.delete_all().unwrap();
        assert!(store.get_all().unwrap().is_empty());
        assert_eq!(store.get_by_id(id).unwrap().name, "keep");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_index_binds_to_one_store() {
        let index = Arc::new(SpatialIndex::global());
        let first = CacheStore::new(Arc::clone(&index)).unwrap();
        assert!(index.is_bound());
        assert!(matches!(
            CacheStore::new(Arc::clone(&index)),
            Err(GeoCacheError::IndexInUse)
        ));

        drop(first);
        assert!(!index.is_bound());
        let second = CacheStore::new(Arc::clone(&index)).unwrap();
        assert!(second.is_empty());
    }

    #[test]
    fn test_stats_track_operations() {
        let store = CacheStore::memory();
        store.create("a", 1.0, 1.0, ["t1", "t2"]).unwrap();
        store.get_by_id(1).unwrap();
        let stats = store.stats();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.tags, 2);
        assert_eq!(stats.operations_count, 2);
        assert_eq!(stats.index.points, 1);
    }
}
