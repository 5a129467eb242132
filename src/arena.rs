//! Node allocation: the pool trait consumed by the tree and the default
//! arena implementation backing it.

use log::trace;

use crate::error::AllocError;
use crate::node::{Node, NodeId};

/// Allocation service the tree draws nodes from.
///
/// A handle stays valid until the node is deallocated; a failed `allocate`
/// must leave the pool unchanged.
pub trait NodePool<V> {
    /// Allocate a slot for `node`, returning its handle.
    fn allocate(&mut self, node: Node<V>) -> Result<NodeId, AllocError>;

    /// Release a handle, returning the node that occupied it.
    /// Returns `None` if the handle is not live.
    fn deallocate(&mut self, id: NodeId) -> Option<Node<V>>;

    /// Get reference to a live node. Panics on a dead handle.
    fn get(&self, id: NodeId) -> &Node<V>;

    /// Get mutable reference to a live node. Panics on a dead handle.
    fn get_mut(&mut self, id: NodeId) -> &mut Node<V>;

    /// Non-panicking probe for a handle.
    fn lookup(&self, id: NodeId) -> Option<&Node<V>>;

    /// Number of live nodes.
    fn live(&self) -> usize;
}

/// Arena for allocating nodes contiguously in memory.
pub struct NodeArena<V> {
    /// All slots in a single Vec; `None` marks a deallocated slot.
    slots: Vec<Option<Node<V>>>,
    /// Free list for recycling deallocated slots.
    free_list: Vec<NodeId>,
}

impl<V> NodeArena<V> {
    /// Create a new empty arena.
    pub fn new() -> Self {
        Self { slots: Vec::new(), free_list: Vec::new() }
    }

    /// Allocate a single node; the arena grows on demand and never refuses.
    pub fn alloc(&mut self, node: Node<V>) -> NodeId {
        if let Some(id) = self.free_list.pop() {
            trace!("Recycling slot {}", id.0);
            self.slots[id.0] = Some(node);
            id
        } else {
            let id = NodeId(self.slots.len());
            trace!("Growing arena to {} slots", id.0 + 1);
            self.slots.push(Some(node));
            id
        }
    }
}

impl<V> NodePool<V> for NodeArena<V> {
    fn allocate(&mut self, node: Node<V>) -> Result<NodeId, AllocError> {
        Ok(self.alloc(node))
    }

    fn deallocate(&mut self, id: NodeId) -> Option<Node<V>> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free_list.push(id);
        Some(node)
    }

    fn get(&self, id: NodeId) -> &Node<V> {
        self.slots[id.0].as_ref().expect("Node should be live")
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.slots[id.0].as_mut().expect("Node should be live")
    }

    fn lookup(&self, id: NodeId) -> Option<&Node<V>> {
        self.slots.get(id.0)?.as_ref()
    }

    fn live(&self) -> usize {
        // Every dead slot sits on the free list
        self.slots.len() - self.free_list.len()
    }
}

impl<V> Default for NodeArena<V> {
    fn default() -> Self {
        Self::new()
    }
}
