//! Spatial partitioning and the thread-safe index built on it.

pub mod spatial;
