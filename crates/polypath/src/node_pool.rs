//! Node pool and queue implementations for corridor search
//!
//! Search state lives here rather than on the zone's nodes, so a zone can be
//! searched from many threads at once: every search owns its own pool.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::zone::NodeId;

/// Node flags for search state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const OPEN: NodeFlags = NodeFlags(0x01);
    pub const CLOSED: NodeFlags = NodeFlags(0x02);

    pub fn contains(&self, flag: NodeFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn insert(&mut self, flag: NodeFlags) {
        self.0 |= flag.0;
    }

    pub fn remove(&mut self, flag: NodeFlags) {
        self.0 &= !flag.0;
    }
}

/// Per-search bookkeeping for one zone node
#[derive(Debug, Clone, Default)]
pub struct SearchNode {
    /// Cost from the start node to this node
    pub cost: f32,
    /// Cost plus heuristic estimate to the target
    pub total: f32,
    /// Node this one was reached from
    pub parent: Option<NodeId>,
    /// Node flags
    pub flags: NodeFlags,
}

/// Scratch storage indexed by [`NodeId`], reset at the start of every search
#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<SearchNode>,
}

impl NodePool {
    /// Creates an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool sized for a group of `node_count` nodes
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(node_count),
        }
    }

    /// Clears all state and sizes the pool for a group of `node_count` nodes
    pub fn reset(&mut self, node_count: usize) {
        self.nodes.clear();
        self.nodes.resize(node_count, SearchNode::default());
    }

    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SearchNode> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes the pool currently tracks
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Entry of the open list
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    total: f32,
    seq: u64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; equal totals pop in insertion order
        other
            .total
            .total_cmp(&self.total)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of nodes ordered by total cost, FIFO among equal totals
#[derive(Debug, Default)]
pub struct NodeQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl NodeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    pub fn push(&mut self, node: NodeId, total: f32) {
        self.heap.push(QueueEntry {
            total,
            seq: self.next_seq,
            node,
        });
        self.next_seq += 1;
    }

    /// Pops the node with the lowest total, returning it with that total
    pub fn pop(&mut self) -> Option<(NodeId, f32)> {
        self.heap.pop().map(|entry| (entry.node, entry.total))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
