//! Node layout and the header (sentinel) convention for the red-black tree.

/// Node ID as index into the pool's slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub usize);

/// Node colour used for rebalancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Tree node addressed through `NodeId` handles.
///
/// One node per tree is the header: it never holds a payload, stays red
/// permanently, and reuses its link slots as bookkeeping (parent → root,
/// left → first node in key order, right → last). Every other node carries
/// `Some` payload and `Some` parent; the root's parent is the header.
pub struct Node<V> {
    /// Rebalancing flag; the header is permanently red.
    pub color: Color,
    /// Parent handle (the header for the root; the root for the header).
    pub parent: Option<NodeId>,
    /// Left child, or the first in-order node when this is the header.
    pub left: Option<NodeId>,
    /// Right child, or the last in-order node when this is the header.
    pub right: Option<NodeId>,
    /// Payload; `None` only in the header.
    pub value: Option<V>,
}

impl<V> Node<V> {
    /// Create a fresh unlinked red leaf holding `value`.
    pub fn red_leaf(value: V) -> Self {
        Self { color: Color::Red, parent: None, left: None, right: None, value: Some(value) }
    }

    /// Create an unlinked header node; the tree wires its slots after
    /// allocation, once the handle is known.
    pub fn header() -> Self {
        Self { color: Color::Red, parent: None, left: None, right: None, value: None }
    }
}
