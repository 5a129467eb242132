//! Red-Black Tree Property Tests
//!
//! Drives the tree through arbitrary operation sequences and verifies:
//!
//! - Structural invariants hold after every mutation (`validate`)
//! - Contents agree with a `BTreeSet` model
//! - Unique insertion is idempotent and lookups round-trip
//! - `count` equals the walked lower/upper bound distance
//! - Cursor traversal never decreases and duplicates keep insertion order
//! - Deep-copy failure rolls the destination back to empty

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use proptest::prelude::*;
use rbtree::{
    AllocError, Comparator, Identity, KeyOf, NaturalOrder, Node, NodeArena, NodeId, NodePool,
    RbTree, SelectFirst, TreeError,
};

/// Tree operation for property testing
#[derive(Debug, Clone)]
enum TreeOp {
    Insert(u8),
    Erase(u8),
}

/// Generate random tree operations over a small key space so erasures
/// actually hit existing keys
fn arb_tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![any::<u8>().prop_map(TreeOp::Insert), any::<u8>().prop_map(TreeOp::Erase)]
}

/// Collect every value in traversal order through the cursor API.
fn in_order<V, S, C, P>(tree: &RbTree<V, S, C, P>) -> Vec<V>
where
    V: Clone,
    S: KeyOf<V>,
    C: Comparator<S::Key>,
    P: NodePool<V>,
{
    let mut out = Vec::new();
    let mut cur = tree.begin();
    while cur != tree.end() {
        out.push(tree.get(cur).unwrap().clone());
        cur = tree.advance(cur).unwrap();
    }
    out
}

/// Pool wrapper that refuses allocations once a budget runs out, counting
/// traffic through shared cells so tests can audit the pool afterwards.
struct FlakyPool<V> {
    inner: NodeArena<V>,
    budget: usize,
    allocated: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl<V> FlakyPool<V> {
    fn new(budget: usize) -> (Self, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let allocated = Rc::new(Cell::new(0));
        let released = Rc::new(Cell::new(0));
        let pool = Self {
            inner: NodeArena::new(),
            budget,
            allocated: Rc::clone(&allocated),
            released: Rc::clone(&released),
        };
        (pool, allocated, released)
    }
}

impl<V> NodePool<V> for FlakyPool<V> {
    fn allocate(&mut self, node: Node<V>) -> Result<NodeId, AllocError> {
        if self.budget == 0 {
            return Err(AllocError { live: self.inner.live() });
        }
        self.budget -= 1;
        let id = self.inner.allocate(node)?;
        self.allocated.set(self.allocated.get() + 1);
        Ok(id)
    }

    fn deallocate(&mut self, id: NodeId) -> Option<Node<V>> {
        let node = self.inner.deallocate(id)?;
        self.released.set(self.released.get() + 1);
        Some(node)
    }

    fn get(&self, id: NodeId) -> &Node<V> {
        self.inner.get(id)
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.inner.get_mut(id)
    }

    fn lookup(&self, id: NodeId) -> Option<&Node<V>> {
        self.inner.lookup(id)
    }

    fn live(&self) -> usize {
        self.inner.live()
    }
}

proptest! {
    /// Property: structural invariants survive arbitrary operation
    /// sequences, and the contents track a `BTreeSet` model.
    #[test]
    fn prop_invariants_hold_across_op_sequences(
        ops in prop::collection::vec(arb_tree_op(), 0..200)
    ) {
        let mut tree = RbTree::new();
        let mut model = BTreeSet::new();

        for op in &ops {
            match op {
                TreeOp::Insert(k) => {
                    let (_, inserted) = tree.insert_unique(*k).unwrap();
                    prop_assert_eq!(inserted, model.insert(*k));
                }
                TreeOp::Erase(k) => {
                    let removed = tree.erase_key(k);
                    prop_assert_eq!(removed == 1, model.remove(k));
                }
            }
            let check = tree.validate();
            prop_assert!(check.is_ok(), "invariant broken after {:?}: {:?}", op, check.err());
            prop_assert_eq!(tree.len(), model.len());
        }

        let expected: Vec<u8> = model.iter().copied().collect();
        prop_assert_eq!(in_order(&tree), expected);
    }

    /// Property: a lookup immediately after insertion yields the value.
    #[test]
    fn prop_find_after_insert_round_trips(
        keys in prop::collection::vec(any::<u16>(), 0..50)
    ) {
        let mut tree = RbTree::new();
        for k in &keys {
            tree.insert_unique(*k).unwrap();
        }
        for k in &keys {
            prop_assert_eq!(tree.get(tree.find(k)), Some(k));
        }
    }

    /// Property: re-inserting existing keys reports them and changes
    /// nothing.
    #[test]
    fn prop_second_unique_insert_is_rejected(
        keys in prop::collection::vec(any::<u8>(), 1..40)
    ) {
        let mut tree = RbTree::new();
        for k in &keys {
            tree.insert_unique(*k).unwrap();
        }
        let len_before = tree.len();

        for k in &keys {
            let (cur, inserted) = tree.insert_unique(*k).unwrap();
            prop_assert!(!inserted);
            prop_assert_eq!(tree.get(cur), Some(k));
        }
        prop_assert_eq!(tree.len(), len_before);
    }

    /// Property: `count` equals the cursor distance from `lower_bound` to
    /// `upper_bound`, for present and absent keys alike.
    #[test]
    fn prop_count_matches_cursor_distance(
        pairs in prop::collection::vec((0u8..16, any::<u32>()), 0..80),
        probe in 0u8..20
    ) {
        let mut tree = RbTree::<(u8, u32), SelectFirst>::with_comparator(NaturalOrder);
        for (k, d) in &pairs {
            tree.insert_multi((*k, *d)).unwrap();
        }

        let stop = tree.upper_bound(&probe);
        let mut cur = tree.lower_bound(&probe);
        let mut distance = 0;
        while cur != stop {
            distance += 1;
            cur = tree.advance(cur).unwrap();
        }

        let expected = pairs.iter().filter(|(k, _)| *k == probe).count();
        prop_assert_eq!(tree.count(&probe), distance);
        prop_assert_eq!(distance, expected);
    }

    /// Property: traversal order never decreases, and equal keys keep
    /// their insertion order.
    #[test]
    fn prop_cursor_walk_never_decreases(
        keys in prop::collection::vec(0u8..32, 0..100)
    ) {
        let mut tree = RbTree::<(u8, u32), SelectFirst>::with_comparator(NaturalOrder);
        for (i, k) in keys.iter().enumerate() {
            tree.insert_multi((*k, i as u32)).unwrap();
        }

        let values = in_order(&tree);
        for pair in values.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0);
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1, "duplicates out of insertion order");
            }
        }
    }

    /// Property: a failed deep copy leaves the destination empty with only
    /// its header live, and the failure is atomic from the pool's view.
    #[test]
    fn prop_clone_failure_rolls_back(n in 1usize..40, cut in 0usize..40) {
        prop_assume!(cut < n);

        let mut source = RbTree::new();
        for k in 0..n {
            source.insert_unique(k as u16).unwrap();
        }

        // Budget covers the header plus `cut` node copies, so the copy
        // fails part-way through
        let (pool, allocated, released) = FlakyPool::new(1 + cut);
        let mut dest: RbTree<u16, Identity, NaturalOrder, FlakyPool<u16>> =
            RbTree::with_parts(pool, NaturalOrder).unwrap();

        let result = dest.try_clone_from(&source);
        prop_assert!(matches!(result, Err(TreeError::Allocation(_))));
        prop_assert_eq!(dest.len(), 0);
        prop_assert!(dest.is_empty());
        prop_assert_eq!(dest.begin(), dest.end());
        prop_assert!(dest.validate().is_ok());
        // Only the header survives the rollback
        prop_assert_eq!(allocated.get() - released.get(), 1);

        // Later inserts fail cleanly too: the budget stays exhausted
        prop_assert!(matches!(dest.insert_unique(99), Err(TreeError::Allocation(_))));
        prop_assert_eq!(dest.len(), 0);
        prop_assert!(dest.validate().is_ok());
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    #[test]
    fn test_erase_all_shuffled_thousand() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        let mut keys: Vec<u32> = (1..=1000).collect();
        let mut tree = RbTree::new();

        keys.shuffle(&mut rng);
        for &k in &keys {
            tree.insert_unique(k).unwrap();
        }
        assert_eq!(tree.len(), 1000);
        assert!(tree.validate().is_ok());

        keys.shuffle(&mut rng);
        for (i, &k) in keys.iter().enumerate() {
            assert_eq!(tree.erase_key(&k), 1);
            // Full validation every 50 removals keeps the audit cheap
            if i % 50 == 0 {
                assert!(tree.validate().is_ok());
            }
        }
        assert!(tree.is_empty());
        assert_eq!(tree.begin(), tree.end());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_insert_failure_leaves_tree_intact() {
        // Header plus two nodes fit; the third insert hits the wall
        let (pool, _, _) = FlakyPool::new(3);
        let mut tree: RbTree<u16, Identity, NaturalOrder, FlakyPool<u16>> =
            RbTree::with_parts(pool, NaturalOrder).unwrap();

        tree.insert_unique(1).unwrap();
        tree.insert_unique(2).unwrap();
        assert!(matches!(tree.insert_unique(3), Err(TreeError::Allocation(_))));

        assert_eq!(tree.len(), 2);
        assert_eq!(in_order(&tree), vec![1, 2]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_header_allocation_failure_surfaces() {
        let (pool, _, _) = FlakyPool::new(0);
        let result: Result<RbTree<u8, Identity, NaturalOrder, FlakyPool<u8>>, _> =
            RbTree::with_parts(pool, NaturalOrder);
        assert!(matches!(result, Err(TreeError::Allocation(_))));
    }
}
