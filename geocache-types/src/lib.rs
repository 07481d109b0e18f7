//! # geocache-types
//!
//! Core spatial value types for the geocache record store.
//!
//! - **Quadrant**: inclusive axis-aligned region used as a quadtree cell
//! - **Point types**: `IndexedPoint` plus GPS to absolute coordinate translation
//! - **Config types**: `GpsBounds`, `UpdatePolicy`
//! - **Stats**: `IndexStats`, `StoreStats`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives.
//!
//! ## Examples
//!
//! ```rust
//! use geocache_types::point::IndexedPoint;
//! use geocache_types::quadrant::Quadrant;
//!
//! // The whole globe, expressed in GPS degrees
//! let globe = Quadrant::from_gps(-180.0, -90.0, 180.0, 90.0);
//!
//! let calgary = IndexedPoint::from_gps(-114.0624, 51.0465, 9);
//! assert!(globe.contains_point(&calgary));
//! ```

pub mod config;
pub mod point;
pub mod quadrant;
pub mod stats;
