//! Arena-backed point quadtree.
//!
//! Every cell lives in one `Vec` and is addressed by index. A cell is either a
//! leaf holding up to `capacity` points or an internal cell holding the indices
//! of its four children. Subdivision appends four leaves to the arena and relinks
//! the parent; cells are never removed, so a failed subdivision is undone by
//! truncating the arena back to its previous length.
//!
//! Insertion and lookup use the same child trial order ([`Direction::ALL`]), so a
//! point sitting on a shared edge is always found in the cell it was placed in.

use crate::error::{GeoCacheError, Result};
use geocache_types::point::IndexedPoint;
use geocache_types::quadrant::{Direction, Quadrant};
use geocache_types::stats::IndexStats;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Index of the root cell.
const ROOT: usize = 0;

/// Level assigned to the root cell.
pub const ROOT_LEVEL: u32 = 1;

/// Default subdivision depth cap.
pub const DEFAULT_MAX_DEPTH: u32 = 32;

/// Hard ceiling on the depth cap. Past this, halving an f64 extent no longer
/// shrinks a cell, and redistribution recurses once per level.
pub const MAX_DEPTH_LIMIT: u32 = 64;

type LeafPoints = SmallVec<[IndexedPoint; 4]>;

#[derive(Debug, Clone)]
enum Cell {
    Leaf(LeafPoints),
    Internal([usize; 4]),
}

#[derive(Debug, Clone)]
struct TreeNode {
    level: u32,
    quadrant: Quadrant,
    cell: Cell,
}

impl TreeNode {
    fn leaf(level: u32, quadrant: Quadrant) -> Self {
        Self {
            level,
            quadrant,
            cell: Cell::Leaf(SmallVec::new()),
        }
    }
}

/// Read-only handle to one cell of a [`QuadTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a QuadTree,
    idx: usize,
}

impl<'a> NodeRef<'a> {
    fn node(&self) -> &'a TreeNode {
        &self.tree.nodes[self.idx]
    }

    pub fn level(&self) -> u32 {
        self.node().level
    }

    pub fn quadrant(&self) -> &'a Quadrant {
        &self.node().quadrant
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node().cell, Cell::Leaf(_))
    }

    pub fn is_subdivided(&self) -> bool {
        !self.is_leaf()
    }

    /// Points held by this cell; always empty for internal cells.
    pub fn points(&self) -> &'a [IndexedPoint] {
        match &self.node().cell {
            Cell::Leaf(points) => points.as_slice(),
            Cell::Internal(_) => &[],
        }
    }

    /// Ids of the points held by this cell.
    pub fn ids(&self) -> Vec<u64> {
        self.points().iter().map(|p| p.id).collect()
    }

    /// Child cell in `direction`, or `None` for a leaf.
    pub fn child(&self, direction: Direction) -> Option<NodeRef<'a>> {
        match self.node().cell {
            Cell::Internal(children) => Some(NodeRef {
                tree: self.tree,
                idx: children[direction.index()],
            }),
            Cell::Leaf(_) => None,
        }
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("level", &self.level())
            .field("quadrant", self.quadrant())
            .field("leaf", &self.is_leaf())
            .field("points", &self.points().len())
            .finish()
    }
}

/// Recursive four-way partition of a rectangular region.
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<TreeNode>,
    capacity: usize,
    max_depth: u32,
}

impl QuadTree {
    /// Create an empty tree covering `quadrant` (absolute space).
    ///
    /// A `capacity` of zero is raised to one so that every leaf can hold a point.
    pub fn new(quadrant: Quadrant, capacity: usize) -> Self {
        Self::with_max_depth(quadrant, capacity, DEFAULT_MAX_DEPTH)
    }

    /// Like [`QuadTree::new`] with an explicit depth cap, clamped to
    /// `ROOT_LEVEL..=MAX_DEPTH_LIMIT`.
    pub fn with_max_depth(quadrant: Quadrant, capacity: usize, max_depth: u32) -> Self {
        Self {
            nodes: vec![TreeNode::leaf(ROOT_LEVEL, quadrant)],
            capacity: capacity.max(1),
            max_depth: max_depth.clamp(ROOT_LEVEL, MAX_DEPTH_LIMIT),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            idx: ROOT,
        }
    }

    pub fn quadrant(&self) -> &Quadrant {
        &self.nodes[ROOT].quadrant
    }

    /// Insert a point.
    ///
    /// Returns `Ok(false)` when the point lies outside the root quadrant. Fails
    /// with [`GeoCacheError::StructuralLimit`] when placing the point would need a
    /// cell deeper than `max_depth`; the tree is left exactly as it was.
    pub fn insert(&mut self, point: IndexedPoint) -> Result<bool> {
        if !self.nodes[ROOT].quadrant.contains_point(&point) {
            return Ok(false);
        }

        let Some(leaf) = self.descend(ROOT, &point) else {
            return Ok(false);
        };

        if let Cell::Leaf(points) = &mut self.nodes[leaf].cell
            && points.len() < self.capacity
        {
            points.push(point);
            return Ok(true);
        }

        let checkpoint = self.nodes.len();
        let saved = self.nodes[leaf].cell.clone();
        if let Err(e) = self.subdivide(leaf, point) {
            self.nodes.truncate(checkpoint);
            self.nodes[leaf].cell = saved;
            log::warn!(
                "rejected point {} at ({}, {}): {}",
                point.id,
                point.x(),
                point.y(),
                e
            );
            return Err(e);
        }
        Ok(true)
    }

    /// Walk from `from` down to the leaf that should receive `point`, trying
    /// children in [`Direction::ALL`] order.
    fn descend(&self, from: usize, point: &IndexedPoint) -> Option<usize> {
        let mut idx = from;
        loop {
            match &self.nodes[idx].cell {
                Cell::Leaf(_) => return Some(idx),
                Cell::Internal(children) => {
                    idx = *children
                        .iter()
                        .find(|&&c| self.nodes[c].quadrant.contains_point(point))?;
                }
            }
        }
    }

    /// Place `point` somewhere below `from`, subdividing full leaves on the way.
    fn place(&mut self, from: usize, point: IndexedPoint) -> Result<bool> {
        let Some(leaf) = self.descend(from, &point) else {
            return Ok(false);
        };
        if let Cell::Leaf(points) = &mut self.nodes[leaf].cell
            && points.len() < self.capacity
        {
            points.push(point);
            return Ok(true);
        }
        self.subdivide(leaf, point).map(|()| true)
    }

    /// Split the full leaf at `idx` into four children and redistribute its
    /// points together with `incoming`.
    fn subdivide(&mut self, idx: usize, incoming: IndexedPoint) -> Result<()> {
        let level = self.nodes[idx].level;
        if level >= self.max_depth {
            return Err(GeoCacheError::StructuralLimit {
                level,
                max_depth: self.max_depth,
            });
        }

        let first = self.nodes.len();
        for quadrant in self.nodes[idx].quadrant.subdivide() {
            self.nodes.push(TreeNode::leaf(level + 1, quadrant));
        }
        let children = [first, first + 1, first + 2, first + 3];

        let points = match std::mem::replace(&mut self.nodes[idx].cell, Cell::Internal(children))
        {
            Cell::Leaf(points) => points,
            // insert and place only reach here through descend, which stops at leaves.
            Cell::Internal(_) => unreachable!("subdivide called on internal cell {}", idx),
        };

        log::debug!(
            "subdivided cell at level {} holding {} points",
            level,
            points.len()
        );

        for point in points.into_iter().chain(std::iter::once(incoming)) {
            let placed = self.place(idx, point)?;
            debug_assert!(placed, "children must cover their parent");
        }
        Ok(())
    }

    /// Breadth-first search for the leaf whose region contains `(x, y)`.
    ///
    /// The queue is owned by the call. Each step enqueues at most one child, one
    /// level deeper than its parent, so the search ends at a leaf or with an
    /// empty queue.
    pub fn region_lookup(&self, x: f64, y: f64) -> Option<NodeRef<'_>> {
        let mut queue = VecDeque::with_capacity(4);
        queue.push_back(ROOT);

        while let Some(idx) = queue.pop_front() {
            let node = &self.nodes[idx];
            match &node.cell {
                Cell::Internal(children) => {
                    if let Some(&child) = children
                        .iter()
                        .find(|&&c| self.nodes[c].quadrant.contains(x, y))
                    {
                        queue.push_back(child);
                    }
                }
                Cell::Leaf(_) => {
                    if node.quadrant.contains(x, y) {
                        return Some(NodeRef { tree: self, idx });
                    }
                }
            }
        }
        None
    }

    /// Remove the first point with `point.id` from the leaf covering `point`.
    ///
    /// Leaves are never merged back after a removal.
    pub fn remove(&mut self, point: &IndexedPoint) -> bool {
        let Some(leaf) = self.region_lookup(point.x(), point.y()).map(|n| n.idx) else {
            return false;
        };
        match &mut self.nodes[leaf].cell {
            Cell::Leaf(points) => match points.iter().position(|p| p.id == point.id) {
                Some(pos) => {
                    points.remove(pos);
                    true
                }
                None => false,
            },
            Cell::Internal(_) => false,
        }
    }

    /// All leaf cells, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len())
            .map(move |idx| NodeRef { tree: self, idx })
            .filter(|n| n.is_leaf())
    }

    /// Number of points stored.
    pub fn len(&self) -> usize {
        self.leaves().map(|n| n.points().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats::new();
        for node in &self.nodes {
            stats.max_level = stats.max_level.max(node.level);
            match &node.cell {
                Cell::Leaf(points) => {
                    stats.leaves += 1;
                    stats.points += points.len();
                }
                Cell::Internal(_) => stats.internal_nodes += 1,
            }
        }
        stats
    }
}
