//! Arena-backed red-black tree with a sentinel header node.
//!
//! This crate provides:
//! - `RbTree`: an ordered container with unique- and duplicate-key insertion
//! - Bidirectional `Cursor` navigation with explicit `begin`/`end` positions
//! - Pluggable key projection (`Identity`, `SelectFirst`) and ordering
//! - A `NodePool` allocation seam with a contiguous arena as the default
//!
//! Nodes live in a pool and reference each other through `NodeId` handles;
//! one permanently red header node per tree doubles as the past-the-end
//! position and caches the root and both extremes, keeping `begin`, `end`
//! and the extreme lookups O(1).

mod arena;
mod cursor;
mod error;
mod node;
mod order;
mod tree;

pub use arena::{NodeArena, NodePool};
pub use cursor::Cursor;
pub use error::{AllocError, TreeError};
pub use node::{Color, Node, NodeId};
pub use order::{Comparator, Identity, KeyOf, NaturalOrder, SelectFirst};
pub use tree::RbTree;
