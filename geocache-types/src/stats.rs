use serde::{Deserialize, Serialize};

/// Shape of a spatial index at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of points stored across all leaves
    pub points: usize,
    /// Number of leaf cells
    pub leaves: usize,
    /// Number of subdivided cells
    pub internal_nodes: usize,
    /// Deepest level reached (the root is level 1)
    pub max_level: u32,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total cells in the tree.
    pub fn nodes(&self) -> usize {
        self.leaves + self.internal_nodes
    }
}

/// Record store statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Records held in the id map
    pub records: usize,
    /// Entries in the name index
    pub names: usize,
    /// Distinct tags in the inverted tag index
    pub tags: usize,
    /// Total number of operations performed
    pub operations_count: u64,
    /// Snapshot of the bound spatial index
    pub index: IndexStats,
}

impl StoreStats {
    pub fn new() -> Self {
        Self::default()
    }
}
