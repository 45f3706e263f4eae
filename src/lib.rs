//! Ordered key-value trees: a plain binary search tree and an AVL tree that
//! keeps every node's subtree heights within one of each other.
//!
//! Both trees store their nodes in an arena and hand out [`NodeId`] handles.
//! Shared lookups and traversal live on the [`SearchTree`] trait.
//!
//! ```
//! use balanced_bst::{AvlTree, SearchTree};
//!
//! let mut tree = AvlTree::new();
//! for k in 1..=7 {
//!     tree.insert(k, k * 10);
//! }
//! assert_eq!(tree.height(), 3);
//! assert_eq!(tree.get(&4), Some(&40));
//! assert!(tree.is_balanced());
//! ```

pub mod avl;
pub mod bst;
pub mod config;
pub mod error;
pub mod iter;
#[cfg(target_arch = "x86_64")]
pub mod jit;
pub mod node;
pub mod print;
pub mod raw;
pub mod search_tree;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use error::{InvariantError, JitError, TreeError};
pub use iter::Iter;
pub use node::{Node, NodeId};
pub use raw::RawTree;
pub use search_tree::SearchTree;
