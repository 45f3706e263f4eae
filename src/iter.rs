use std::iter::FusedIterator;

use crate::node::NodeId;
use crate::raw::RawTree;

/// Lazy in-order iterator over `(key, value)` pairs.
///
/// Walks the tree through successor steps, so it allocates nothing and can
/// start from any node handle.
pub struct Iter<'a, K, V> {
    tree: &'a RawTree<K, V>,
    current: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawTree<K, V>, start: Option<NodeId>, remaining: usize) -> Self {
        Iter {
            tree,
            current: start,
            remaining,
        }
    }

    /// Handle of the entry the next call to `next` yields, `None` at the end.
    pub fn position(&self) -> Option<NodeId> {
        self.current
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.tree.node(id);
        self.current = self.tree.successor(id);
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.current {
            None => (0, Some(0)),
            Some(_) => (1, Some(self.remaining)),
        }
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
