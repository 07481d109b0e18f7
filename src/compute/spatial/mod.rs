pub mod quadtree;
pub use quadtree::{NodeRef, QuadTree};

pub mod index;
pub use index::{LeafSnapshot, SpatialIndex};
