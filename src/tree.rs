//! Red-black tree core: rotations, the insertion and deletion engines,
//! searches, cursor stepping and lifecycle.

use std::cmp::Ordering;
use std::marker::PhantomData;

use log::debug;

use crate::arena::{NodeArena, NodePool};
use crate::cursor::{self, Cursor};
use crate::error::TreeError;
use crate::node::{Color, Node, NodeId};
use crate::order::{Comparator, Identity, KeyOf, NaturalOrder};

/// Red-black tree keyed by a projection of its stored values.
///
/// `S` projects the comparison key out of a value (whole values for sets,
/// the first pair element for maps), `C` supplies the key order and `P` the
/// node storage. With the defaults this is an ordered set over `V`.
///
/// Positions are exposed as [`Cursor`] handles stepped through `advance`
/// and `retreat`; `end()` names the past-the-end position backed by the
/// tree's header node.
pub struct RbTree<V, S = Identity, C = NaturalOrder, P = NodeArena<V>>
where
    S: KeyOf<V>,
    C: Comparator<S::Key>,
    P: NodePool<V>,
{
    /// Node storage; owns every slot including the header.
    pool: P,
    /// Header handle: parent → root, left → first, right → last.
    header: NodeId,
    /// Number of payload nodes.
    len: usize,
    /// Three-way key order.
    cmp: C,
    _marker: PhantomData<(V, S)>,
}

impl<V: Ord> RbTree<V> {
    /// Create an empty set-like tree ordered by `V`'s natural order.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<V, S, C> RbTree<V, S, C, NodeArena<V>>
where
    S: KeyOf<V>,
    C: Comparator<S::Key>,
{
    /// Create an empty arena-backed tree with `cmp` deciding the key order.
    ///
    /// `cmp` must be a strict weak order over the projected keys; see
    /// [`Comparator`]. A fresh arena never refuses its first slot, so the
    /// header allocation here cannot fail.
    pub fn with_comparator(cmp: C) -> Self {
        let mut pool = NodeArena::new();
        let header = pool.alloc(Node::header());
        let mut tree = Self { pool, header, len: 0, cmp, _marker: PhantomData };
        tree.reset_header();
        tree
    }
}

impl<V, S, C, P> RbTree<V, S, C, P>
where
    S: KeyOf<V>,
    C: Comparator<S::Key>,
    P: NodePool<V>,
{
    /// Create an empty tree over a caller-supplied pool.
    ///
    /// The pool becomes the tree's private storage. The single header node
    /// is allocated here, so a refusing pool surfaces before any tree
    /// exists.
    pub fn with_parts(mut pool: P, cmp: C) -> Result<Self, TreeError> {
        let header = pool.allocate(Node::header())?;
        let mut tree = Self { pool, header, len: 0, cmp, _marker: PhantomData };
        tree.reset_header();
        Ok(tree)
    }

    /// Get the number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cursor at the first value in key order; equals `end` when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.leftmost())
    }

    /// Past-the-end cursor; never names a value.
    pub fn end(&self) -> Cursor {
        Cursor::new(self.header)
    }

    /// Payload under `cursor`; `None` at `end` or through a dead handle.
    pub fn get(&self, cursor: Cursor) -> Option<&V> {
        self.pool.lookup(cursor.node)?.value.as_ref()
    }

    // ========================================
    // CURSOR NAVIGATION
    // ========================================

    /// Step `cursor` to the next value in key order.
    ///
    /// Stepping from the last value yields `end`; stepping from `end` is
    /// an error.
    pub fn advance(&self, cursor: Cursor) -> Result<Cursor, TreeError> {
        if cursor.node == self.header {
            return Err(TreeError::InvalidCursor("advance past end"));
        }
        if self.pool.lookup(cursor.node).is_none() {
            return Err(TreeError::InvalidCursor("advance through a dead handle"));
        }
        Ok(Cursor::new(cursor::successor(&self.pool, cursor.node)))
    }

    /// Step `cursor` to the previous value in key order.
    ///
    /// Stepping from `end` yields the last value; stepping from the first
    /// value is an error.
    pub fn retreat(&self, cursor: Cursor) -> Result<Cursor, TreeError> {
        if cursor.node == self.header {
            let last = self.rightmost();
            if last == self.header {
                return Err(TreeError::InvalidCursor("retreat before begin"));
            }
            return Ok(Cursor::new(last));
        }
        if self.pool.lookup(cursor.node).is_none() {
            return Err(TreeError::InvalidCursor("retreat through a dead handle"));
        }
        if cursor.node == self.leftmost() {
            return Err(TreeError::InvalidCursor("retreat before begin"));
        }
        Ok(Cursor::new(cursor::predecessor(&self.pool, cursor.node)))
    }

    // ========================================
    // SEARCH
    // ========================================

    /// Cursor at a value whose key is equivalent to `key`, or `end`.
    pub fn find(&self, key: &S::Key) -> Cursor {
        let candidate = self.lower_bound_id(key);
        if candidate != self.header
            && self.cmp.compare(key, self.key_of(candidate)) != Ordering::Less
        {
            Cursor::new(candidate)
        } else {
            Cursor::new(self.header)
        }
    }

    /// First position whose key is not ordered before `key`; `end` if none.
    pub fn lower_bound(&self, key: &S::Key) -> Cursor {
        Cursor::new(self.lower_bound_id(key))
    }

    /// First position whose key is ordered after `key`; `end` if none.
    pub fn upper_bound(&self, key: &S::Key) -> Cursor {
        let mut best = self.header;
        let mut cur = self.root();
        while let Some(id) = cur {
            if self.cmp.compare(key, self.key_of(id)) == Ordering::Less {
                best = id;
                cur = self.node(id).left;
            } else {
                cur = self.node(id).right;
            }
        }
        Cursor::new(best)
    }

    /// Number of values with keys equivalent to `key`.
    pub fn count(&self, key: &S::Key) -> usize {
        let stop = self.upper_bound(key).node;
        let mut cur = self.lower_bound_id(key);
        let mut n = 0;
        while cur != stop {
            n += 1;
            cur = cursor::successor(&self.pool, cur);
        }
        n
    }

    fn lower_bound_id(&self, key: &S::Key) -> NodeId {
        let mut best = self.header;
        let mut cur = self.root();
        while let Some(id) = cur {
            if self.cmp.compare(self.key_of(id), key) == Ordering::Less {
                cur = self.node(id).right;
            } else {
                best = id;
                cur = self.node(id).left;
            }
        }
        best
    }

    // ========================================
    // INSERTION
    // ========================================

    /// Insert `value`, rejecting keys already present.
    ///
    /// Returns the new value's cursor and `true`, or the cursor of the
    /// equivalent existing value and `false`. On allocation failure the
    /// tree is unchanged.
    pub fn insert_unique(&mut self, value: V) -> Result<(Cursor, bool), TreeError> {
        let mut parent = self.header;
        let mut went_left = true;
        let mut cur = self.root();
        while let Some(id) = cur {
            parent = id;
            went_left = self.cmp.compare(S::key(&value), self.key_of(id)) == Ordering::Less;
            cur = if went_left { self.node(id).left } else { self.node(id).right };
        }
        // The only node that can hold an equal key is the in-order
        // predecessor of the attachment slot
        let candidate = if went_left {
            if parent == self.leftmost() {
                None
            } else {
                Some(cursor::predecessor(&self.pool, parent))
            }
        } else {
            Some(parent)
        };
        if let Some(prev) = candidate {
            if self.cmp.compare(self.key_of(prev), S::key(&value)) != Ordering::Less {
                return Ok((Cursor::new(prev), false));
            }
        }
        let id = self.attach(parent, went_left, value)?;
        Ok((Cursor::new(id), true))
    }

    /// Insert `value`, keeping any equal keys already present.
    ///
    /// Equal keys descend right, so duplicates sit after their earlier
    /// equivalents in traversal order. On allocation failure the tree is
    /// unchanged.
    pub fn insert_multi(&mut self, value: V) -> Result<Cursor, TreeError> {
        let mut parent = self.header;
        let mut went_left = true;
        let mut cur = self.root();
        while let Some(id) = cur {
            parent = id;
            went_left = self.cmp.compare(S::key(&value), self.key_of(id)) == Ordering::Less;
            cur = if went_left { self.node(id).left } else { self.node(id).right };
        }
        let id = self.attach(parent, went_left, value)?;
        Ok(Cursor::new(id))
    }

    /// Link a fresh red node under `parent` and rebalance.
    fn attach(&mut self, parent: NodeId, as_left: bool, value: V) -> Result<NodeId, TreeError> {
        let mut node = Node::red_leaf(value);
        node.parent = Some(parent);
        let id = self.pool.allocate(node)?;
        if parent == self.header {
            // First node: root, first and last all at once
            self.set_root(Some(id));
            self.node_mut(self.header).left = Some(id);
            self.node_mut(self.header).right = Some(id);
        } else if as_left {
            self.node_mut(parent).left = Some(id);
            if self.leftmost() == parent {
                self.node_mut(self.header).left = Some(id);
            }
        } else {
            self.node_mut(parent).right = Some(id);
            if self.rightmost() == parent {
                self.node_mut(self.header).right = Some(id);
            }
        }
        self.len += 1;
        self.insert_fixup(id);
        Ok(id)
    }

    /// Restore the invariants after attaching the red node `x`.
    fn insert_fixup(&mut self, mut x: NodeId) {
        loop {
            let Some(parent) = self.parent_of(x) else { break };
            if self.node(parent).color == Color::Black {
                break;
            }
            // A red parent is never the root, so a grandparent exists
            let grand = self.parent_of(parent).expect("Red parent should have a parent");
            if self.node(grand).left == Some(parent) {
                match self.node(grand).right {
                    Some(uncle) if self.node(uncle).color == Color::Red => {
                        // Red uncle: recolour and climb two levels
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(grand, Color::Red);
                        x = grand;
                    }
                    _ => {
                        if self.node(parent).right == Some(x) {
                            // Inner grandchild: rotate it outward first
                            x = parent;
                            self.rotate_left(x);
                        }
                        let parent = self.parent_of(x).expect("Rotated node should have a parent");
                        self.set_color(parent, Color::Black);
                        self.set_color(grand, Color::Red);
                        self.rotate_right(grand);
                    }
                }
            } else {
                match self.node(grand).left {
                    Some(uncle) if self.node(uncle).color == Color::Red => {
                        self.set_color(parent, Color::Black);
                        self.set_color(uncle, Color::Black);
                        self.set_color(grand, Color::Red);
                        x = grand;
                    }
                    _ => {
                        if self.node(parent).left == Some(x) {
                            x = parent;
                            self.rotate_right(x);
                        }
                        let parent = self.parent_of(x).expect("Rotated node should have a parent");
                        self.set_color(parent, Color::Black);
                        self.set_color(grand, Color::Red);
                        self.rotate_left(grand);
                    }
                }
            }
        }
        if let Some(root) = self.root() {
            self.set_color(root, Color::Black);
        }
    }

    // ========================================
    // DELETION
    // ========================================

    /// Remove the value under `cursor`, returning it.
    ///
    /// Erasure never allocates, so it cannot fail once the cursor checks
    /// out. Removing a value with two children moves the successor's
    /// payload into the cursor's node; cursors at the successor dangle.
    pub fn erase(&mut self, cursor: Cursor) -> Result<V, TreeError> {
        if cursor.node == self.header {
            return Err(TreeError::InvalidCursor("erase at end"));
        }
        match self.pool.lookup(cursor.node) {
            Some(node) if node.value.is_some() => {}
            _ => return Err(TreeError::InvalidCursor("erase through a dead handle")),
        }
        Ok(self.erase_at(cursor.node))
    }

    /// Remove every value with a key equivalent to `key`, returning how
    /// many were removed.
    pub fn erase_key(&mut self, key: &S::Key) -> usize {
        let mut removed = 0;
        loop {
            // Re-resolve each round: splicing moves payloads between
            // nodes, so a saved range of cursors could dangle
            let cur = self.lower_bound_id(key);
            if cur == self.header || self.cmp.compare(key, self.key_of(cur)) == Ordering::Less {
                break;
            }
            self.erase_at(cur);
            removed += 1;
        }
        removed
    }

    fn erase_at(&mut self, mut target: NodeId) -> V {
        if self.node(target).left.is_some() && self.node(target).right.is_some() {
            // Trade payloads with the in-order successor and splice that
            // node out instead; a subtree minimum has no left child
            let succ = cursor::successor(&self.pool, target);
            let own = self.node_mut(target).value.take();
            let other = self.node_mut(succ).value.take();
            self.node_mut(target).value = other;
            self.node_mut(succ).value = own;
            target = succ;
        }

        let child = self.node(target).left.or(self.node(target).right);
        let parent = self.node(target).parent.expect("Linked node should have a parent");
        let removed_color = self.node(target).color;

        // Splice `target` out
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
        if parent == self.header {
            self.set_root(child);
        } else if self.node(parent).left == Some(target) {
            self.node_mut(parent).left = child;
        } else {
            self.node_mut(parent).right = child;
        }

        // Keep the header's first/last slots fresh
        if self.leftmost() == target {
            let first = match child {
                Some(c) => cursor::minimum(&self.pool, c),
                None => parent, // the header itself when the tree just emptied
            };
            self.node_mut(self.header).left = Some(first);
        }
        if self.rightmost() == target {
            let last = match child {
                Some(c) => cursor::maximum(&self.pool, c),
                None => parent,
            };
            self.node_mut(self.header).right = Some(last);
        }

        if removed_color == Color::Black {
            self.erase_fixup(child, parent);
        }

        let node = self.pool.deallocate(target).expect("Erased node should be live");
        self.len -= 1;
        node.value.expect("Payload node should hold a value")
    }

    /// Restore black heights after splicing out a black node.
    ///
    /// `x` is the replacement slot (absent nodes count as black) and
    /// `parent` holds that slot.
    fn erase_fixup(&mut self, mut x: Option<NodeId>, mut parent: NodeId) {
        while x != self.root() && self.color_of(x) == Color::Black {
            if self.node(parent).left == x {
                let mut sib = self.node(parent).right.expect("Short side should have a sibling");
                if self.node(sib).color == Color::Red {
                    // Red sibling: rotate it above so a black one shows
                    self.set_color(sib, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_left(parent);
                    sib = self.node(parent).right.expect("Short side should have a sibling");
                }
                if self.color_of(self.node(sib).left) == Color::Black
                    && self.color_of(self.node(sib).right) == Color::Black
                {
                    // Both nephews black: push the deficit one level up
                    self.set_color(sib, Color::Red);
                    x = Some(parent);
                    parent = self.node(parent).parent.expect("Linked node should have a parent");
                } else {
                    if self.color_of(self.node(sib).right) == Color::Black {
                        // Red near nephew: rotate it onto the far side
                        if let Some(near) = self.node(sib).left {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sib, Color::Red);
                        self.rotate_right(sib);
                        sib = self.node(parent).right.expect("Short side should have a sibling");
                    }
                    // Red far nephew: one rotation settles the branch
                    let parent_color = self.node(parent).color;
                    self.set_color(sib, parent_color);
                    self.set_color(parent, Color::Black);
                    if let Some(far) = self.node(sib).right {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_left(parent);
                    break;
                }
            } else {
                // Mirror image: the short side is the right child
                let mut sib = self.node(parent).left.expect("Short side should have a sibling");
                if self.node(sib).color == Color::Red {
                    self.set_color(sib, Color::Black);
                    self.set_color(parent, Color::Red);
                    self.rotate_right(parent);
                    sib = self.node(parent).left.expect("Short side should have a sibling");
                }
                if self.color_of(self.node(sib).left) == Color::Black
                    && self.color_of(self.node(sib).right) == Color::Black
                {
                    self.set_color(sib, Color::Red);
                    x = Some(parent);
                    parent = self.node(parent).parent.expect("Linked node should have a parent");
                } else {
                    if self.color_of(self.node(sib).left) == Color::Black {
                        if let Some(near) = self.node(sib).right {
                            self.set_color(near, Color::Black);
                        }
                        self.set_color(sib, Color::Red);
                        self.rotate_left(sib);
                        sib = self.node(parent).left.expect("Short side should have a sibling");
                    }
                    let parent_color = self.node(parent).color;
                    self.set_color(sib, parent_color);
                    self.set_color(parent, Color::Black);
                    if let Some(far) = self.node(sib).left {
                        self.set_color(far, Color::Black);
                    }
                    self.rotate_right(parent);
                    break;
                }
            }
        }
        if let Some(x) = x {
            self.set_color(x, Color::Black);
        }
    }

    // ========================================
    // LIFECYCLE
    // ========================================

    /// Drop every value; the tree stays usable afterwards.
    pub fn clear(&mut self) {
        // Iterative teardown, no call-stack recursion on tree height
        let mut pending = Vec::new();
        if let Some(root) = self.root() {
            pending.push(root);
        }
        while let Some(id) = pending.pop() {
            let node = self.pool.deallocate(id).expect("Reachable node should be live");
            if let Some(left) = node.left {
                pending.push(left);
            }
            if let Some(right) = node.right {
                pending.push(right);
            }
        }
        self.len = 0;
        self.reset_header();
    }

    /// Replace this tree's contents with a structural copy of `source`.
    ///
    /// Shape and colours carry over unchanged, so no rebalancing runs, and
    /// the source may sit in a different pool type. On allocation failure
    /// every node copied so far is released and this tree is left empty.
    pub fn try_clone_from<Q>(&mut self, source: &RbTree<V, S, C, Q>) -> Result<(), TreeError>
    where
        V: Clone,
        Q: NodePool<V>,
    {
        self.clear();
        let Some(src_root) = source.root() else {
            return Ok(());
        };
        // Created handles, kept for rollback
        let mut created: Vec<NodeId> = Vec::new();
        // (source node, destination parent, attach as left child)
        let mut pending = vec![(src_root, self.header, true)];
        let result = loop {
            let Some((src, dst_parent, as_left)) = pending.pop() else {
                break Ok(());
            };
            let src_node = source.node(src);
            let node = Node {
                color: src_node.color,
                parent: Some(dst_parent),
                left: None,
                right: None,
                value: src_node.value.clone(),
            };
            match self.pool.allocate(node) {
                Ok(id) => {
                    created.push(id);
                    if dst_parent == self.header {
                        self.set_root(Some(id));
                    } else if as_left {
                        self.node_mut(dst_parent).left = Some(id);
                    } else {
                        self.node_mut(dst_parent).right = Some(id);
                    }
                    if let Some(left) = src_node.left {
                        pending.push((left, id, true));
                    }
                    if let Some(right) = src_node.right {
                        pending.push((right, id, false));
                    }
                }
                Err(err) => break Err(err),
            }
        };
        if let Err(err) = result {
            debug!("Rolling back {} copied nodes after a failed allocation", created.len());
            for id in created.drain(..) {
                self.pool.deallocate(id);
            }
            self.reset_header();
            return Err(err.into());
        }
        if let Some(root) = self.root() {
            let first = cursor::minimum(&self.pool, root);
            let last = cursor::maximum(&self.pool, root);
            self.node_mut(self.header).left = Some(first);
            self.node_mut(self.header).right = Some(last);
        }
        self.len = source.len;
        Ok(())
    }

    /// Build an independent copy of this tree in a fresh default pool.
    pub fn try_clone(&self) -> Result<Self, TreeError>
    where
        V: Clone,
        C: Clone,
        P: Default,
    {
        let mut copy = Self::with_parts(P::default(), self.cmp.clone())?;
        copy.try_clone_from(self)?;
        Ok(copy)
    }

    // ========================================
    // DIAGNOSTICS
    // ========================================

    /// Walk the whole tree and check the red-black invariants.
    ///
    /// Checks the root colour, red-red edges, black-height balance,
    /// in-order key ordering, the stored length and the header's
    /// first/last slots. Intended for tests and debugging; O(n).
    pub fn validate(&self) -> Result<(), TreeError> {
        let Some(root) = self.root() else {
            if self.len != 0 {
                return Err(TreeError::Corrupted(format!("no root but len {}", self.len)));
            }
            if self.leftmost() != self.header || self.rightmost() != self.header {
                return Err(TreeError::Corrupted("empty tree with linked extremes".into()));
            }
            return Ok(());
        };
        if self.node(root).color == Color::Red {
            return Err(TreeError::Corrupted("red root".into()));
        }
        if self.node(root).parent != Some(self.header) {
            return Err(TreeError::Corrupted("root not parented to the header".into()));
        }
        let mut population = 0;
        self.check_subtree(root, self.header, &mut population)?;
        if population != self.len {
            return Err(TreeError::Corrupted(format!(
                "len {} but {} nodes reachable",
                self.len, population
            )));
        }
        if self.leftmost() != cursor::minimum(&self.pool, root) {
            return Err(TreeError::Corrupted("stale first-node slot".into()));
        }
        if self.rightmost() != cursor::maximum(&self.pool, root) {
            return Err(TreeError::Corrupted("stale last-node slot".into()));
        }

        // In-order pass: key ordering and cursor-step agreement
        let mut steps = 0;
        let mut prev: Option<NodeId> = None;
        let mut cur = self.leftmost();
        while cur != self.header {
            if let Some(prev) = prev {
                if self.cmp.compare(self.key_of(cur), self.key_of(prev)) == Ordering::Less {
                    return Err(TreeError::Corrupted("in-order sequence decreases".into()));
                }
            }
            steps += 1;
            if steps > self.len {
                return Err(TreeError::Corrupted("in-order walk does not terminate".into()));
            }
            prev = Some(cur);
            cur = cursor::successor(&self.pool, cur);
        }
        if steps != self.len {
            return Err(TreeError::Corrupted(format!(
                "in-order walk visited {} of {} nodes",
                steps, self.len
            )));
        }
        Ok(())
    }

    /// Check one subtree, returning its black height.
    fn check_subtree(
        &self,
        id: NodeId,
        parent: NodeId,
        population: &mut usize,
    ) -> Result<usize, TreeError> {
        *population += 1;
        let node = self.node(id);
        if node.parent != Some(parent) {
            return Err(TreeError::Corrupted(format!("node {} has a stale parent link", id.0)));
        }
        if node.value.is_none() {
            return Err(TreeError::Corrupted(format!("node {} holds no value", id.0)));
        }
        let left_height = match node.left {
            Some(child) => {
                if node.color == Color::Red && self.node(child).color == Color::Red {
                    return Err(TreeError::Corrupted(format!(
                        "red node {} has a red left child",
                        id.0
                    )));
                }
                self.check_subtree(child, id, population)?
            }
            None => 0,
        };
        let right_height = match node.right {
            Some(child) => {
                if node.color == Color::Red && self.node(child).color == Color::Red {
                    return Err(TreeError::Corrupted(format!(
                        "red node {} has a red right child",
                        id.0
                    )));
                }
                self.check_subtree(child, id, population)?
            }
            None => 0,
        };
        if left_height != right_height {
            return Err(TreeError::Corrupted(format!("black height differs under node {}", id.0)));
        }
        Ok(left_height + usize::from(node.color == Color::Black))
    }

    // ========================================
    // ROTATIONS
    // ========================================

    /// Rotate left around `x`; `x` must have a right child.
    fn rotate_left(&mut self, x: NodeId) {
        let y = self.node(x).right.expect("Rotation pivot should have a right child");
        // y's left subtree moves under x
        let y_left = self.node(y).left;
        self.node_mut(x).right = y_left;
        if let Some(child) = y_left {
            self.node_mut(child).parent = Some(x);
        }
        // y replaces x under x's parent (or as root)
        let parent = self.node(x).parent.expect("Linked node should have a parent");
        self.node_mut(y).parent = Some(parent);
        if parent == self.header {
            self.set_root(Some(y));
        } else if self.node(parent).left == Some(x) {
            self.node_mut(parent).left = Some(y);
        } else {
            self.node_mut(parent).right = Some(y);
        }
        // x and y link to each other last; the updates above read the
        // pre-rotation links
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    /// Rotate right around `x`; `x` must have a left child.
    fn rotate_right(&mut self, x: NodeId) {
        let y = self.node(x).left.expect("Rotation pivot should have a left child");
        let y_right = self.node(y).right;
        self.node_mut(x).left = y_right;
        if let Some(child) = y_right {
            self.node_mut(child).parent = Some(x);
        }
        let parent = self.node(x).parent.expect("Linked node should have a parent");
        self.node_mut(y).parent = Some(parent);
        if parent == self.header {
            self.set_root(Some(y));
        } else if self.node(parent).right == Some(x) {
            self.node_mut(parent).right = Some(y);
        } else {
            self.node_mut(parent).left = Some(y);
        }
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
    }

    // ========================================
    // NODE HELPERS
    // ========================================

    fn node(&self, id: NodeId) -> &Node<V> {
        self.pool.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.pool.get_mut(id)
    }

    fn root(&self) -> Option<NodeId> {
        self.node(self.header).parent
    }

    fn set_root(&mut self, root: Option<NodeId>) {
        let header = self.header;
        self.node_mut(header).parent = root;
    }

    fn leftmost(&self) -> NodeId {
        self.node(self.header).left.expect("Header slots should be linked")
    }

    fn rightmost(&self) -> NodeId {
        self.node(self.header).right.expect("Header slots should be linked")
    }

    /// Parent handle with the header masked off: the root reports `None`.
    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        if parent == self.header {
            None
        } else {
            Some(parent)
        }
    }

    /// Colour of a slot, absent children reading as black.
    fn color_of(&self, id: Option<NodeId>) -> Color {
        match id {
            Some(id) => self.node(id).color,
            None => Color::Black,
        }
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    fn key_of(&self, id: NodeId) -> &S::Key {
        S::key(self.node(id).value.as_ref().expect("Payload node should hold a value"))
    }

    /// Point the empty-state header at itself.
    fn reset_header(&mut self) {
        let header = self.header;
        let node = self.pool.get_mut(header);
        node.parent = None;
        node.left = Some(header);
        node.right = Some(header);
    }
}

impl<V: Ord> Default for RbTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
