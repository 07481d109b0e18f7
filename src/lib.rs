//! In-memory geocache store with exact, tag-based and spatial lookups.
//!
//! ## Features
//! - **Record store**: records keyed by generated id, with a unique-name index and an
//!   inverted tag index
//! - **Spatial indexing**: arena-backed point quadtree over translated GPS coordinates
//! - **Leaf lookups**: `find_nearest` returns every record sharing the query's
//!   quadtree leaf (no distance ranking, no limit)
//! - **Thread-safe**: reader/writer locks with a fixed store-then-index order
//!
//! ```rust
//! use geocache::{CacheStore, CacheUpdate};
//!
//! let store = CacheStore::memory();
//! let id = store.create("s1", 41.5, -70.2, ["ocean", "atlantic"])?;
//! store.create("s2", 44.1, -103.2, ["river"])?;
//!
//! assert_eq!(store.get_by_id(id)?.name, "s1");
//! let tagged = store.get_by_tags(&["ocean", "anemometer"])?;
//! assert_eq!(tagged.len(), 1);
//!
//! let nearby = store.find_nearest(41.6, -70.3, 10.0, 5)?;
//! assert!(nearby.iter().any(|c| c.id == id));
//!
//! store.update("s1", CacheUpdate::new(41.7, -70.1, ["ocean"]))?;
//! # Ok::<(), geocache::GeoCacheError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
mod lock_order;

pub use builder::StoreBuilder;
pub use db::{CacheStore, CacheUpdate, GeoCache};
pub use error::{GeoCacheError, LookupKey, Result};

pub use compute::spatial::{LeafSnapshot, NodeRef, QuadTree, SpatialIndex};
pub use config::{Config, GpsBounds, UpdatePolicy};

pub use geo::{Point, Rect};
pub use geocache_types::point::{IndexedPoint, absolute_to_gps, gps_to_absolute};
pub use geocache_types::quadrant::{Direction, Quadrant};
pub use geocache_types::stats::{IndexStats, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{CacheStore, CacheUpdate, GeoCache, GeoCacheError, Result, StoreBuilder};

    pub use crate::{Config, GpsBounds, UpdatePolicy};

    pub use crate::{IndexedPoint, Quadrant, SpatialIndex};
}
