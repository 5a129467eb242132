//! Cursors and in-order stepping over pooled nodes.

use crate::arena::NodePool;
use crate::node::NodeId;

/// Position in a tree: a payload node or the past-the-end header.
///
/// Cursors are plain copyable handles. A cursor is only meaningful for the
/// tree that produced it and only while the node it names stays live;
/// stepping and payload access go through the tree (`advance`, `retreat`,
/// `get`), which reports misuse instead of clamping it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) node: NodeId,
}

impl Cursor {
    pub(crate) fn new(node: NodeId) -> Self {
        Self { node }
    }
}

/// Leftmost node of the subtree rooted at `id`.
///
/// `id` must name a payload node: the header's left slot is bookkeeping,
/// not a child.
pub(crate) fn minimum<V, P: NodePool<V>>(pool: &P, mut id: NodeId) -> NodeId {
    while let Some(left) = pool.get(id).left {
        id = left;
    }
    id
}

/// Rightmost node of the subtree rooted at `id`; payload nodes only.
pub(crate) fn maximum<V, P: NodePool<V>>(pool: &P, mut id: NodeId) -> NodeId {
    while let Some(right) = pool.get(id).right {
        id = right;
    }
    id
}

/// Step from a payload node to its in-order successor.
///
/// Stepping from the last node lands on the header thanks to the header's
/// link wiring; the caller rejects stepping from the header itself.
pub(crate) fn successor<V, P: NodePool<V>>(pool: &P, mut id: NodeId) -> NodeId {
    if let Some(right) = pool.get(id).right {
        return minimum(pool, right);
    }
    let mut parent = pool.get(id).parent.expect("Linked node should have a parent");
    while pool.get(parent).right == Some(id) {
        id = parent;
        parent = pool.get(parent).parent.expect("Linked node should have a parent");
    }
    // When the root is the maximum, the climb above already ends on the
    // header with `parent` back at the root; stepping up again would
    // overshoot.
    if pool.get(id).right == Some(parent) {
        id
    } else {
        parent
    }
}

/// Step from a payload node to its in-order predecessor.
///
/// The caller handles the header (end steps onto the last node) and
/// rejects stepping from the first node.
pub(crate) fn predecessor<V, P: NodePool<V>>(pool: &P, mut id: NodeId) -> NodeId {
    if let Some(left) = pool.get(id).left {
        return maximum(pool, left);
    }
    let mut parent = pool.get(id).parent.expect("Linked node should have a parent");
    while pool.get(parent).left == Some(id) {
        id = parent;
        parent = pool.get(parent).parent.expect("Linked node should have a parent");
    }
    parent
}
