use crate::raw::{Placement, RawTree};
use crate::search_tree::{SearchTree, impl_tree_traits};

/// Unbalanced binary search tree. Height follows insertion order.
pub struct BinarySearchTree<K, V> {
    raw: RawTree<K, V>,
}

impl<K: Ord, V> BinarySearchTree<K, V> {
    pub fn new() -> Self {
        BinarySearchTree { raw: RawTree::new() }
    }
}

impl<K: Ord, V> SearchTree<K, V> for BinarySearchTree<K, V> {
    fn raw(&self) -> &RawTree<K, V> {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawTree<K, V> {
        &mut self.raw
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.raw.insert_leaf(key, value) {
            Placement::Replaced(old) => Some(old),
            Placement::Created(_) => None,
        }
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.raw.find_node(key)?;
        Some(self.raw.detach(id).value)
    }
}

impl_tree_traits!(BinarySearchTree);
