use log::debug;

use crate::error::TreeError;
use crate::iter::Iter;
use crate::node::NodeId;
use crate::raw::RawTree;

/// Operations shared by the plain and the balanced tree.
///
/// Implementors supply the mutation policy (`insert`, `remove`); lookups,
/// traversal and the shape diagnostics work on the shared [`RawTree`] core.
pub trait SearchTree<K: Ord, V> {
    fn raw(&self) -> &RawTree<K, V>;

    fn raw_mut(&mut self) -> &mut RawTree<K, V>;

    /// Inserts `key`, overwriting the value in place if it is already present.
    /// Returns the replaced value.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Removes `key` and returns its value. Absent keys leave the tree untouched.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Handle of the node holding `key`.
    fn find(&self, key: &K) -> Option<NodeId> {
        self.raw().find_node(key)
    }

    fn key<'a>(&'a self, id: NodeId) -> &'a K
    where
        K: 'a,
        V: 'a,
    {
        &self.raw().node(id).key
    }

    fn value<'a>(&'a self, id: NodeId) -> &'a V
    where
        K: 'a,
        V: 'a,
    {
        &self.raw().node(id).value
    }

    fn value_mut<'a>(&'a mut self, id: NodeId) -> &'a mut V
    where
        K: 'a,
        V: 'a,
    {
        &mut self.raw_mut().nodes[id].value
    }

    /// Smallest entry.
    fn first(&self) -> Option<NodeId> {
        self.raw().smallest()
    }

    /// Largest entry.
    fn last(&self) -> Option<NodeId> {
        self.raw().largest()
    }

    /// In-order successor of `id`.
    fn next(&self, id: NodeId) -> Option<NodeId> {
        self.raw().successor(id)
    }

    /// In-order predecessor of `id`.
    fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.raw().predecessor(id)
    }

    fn get<'a>(&'a self, key: &K) -> Option<&'a V>
    where
        K: 'a,
        V: 'a,
    {
        self.find(key).map(|id| self.value(id))
    }

    fn get_mut<'a>(&'a mut self, key: &K) -> Option<&'a mut V>
    where
        K: 'a,
        V: 'a,
    {
        let id = self.find(key)?;
        Some(self.value_mut(id))
    }

    /// Indexed access that reports an absent key as an error.
    fn try_get<'a>(&'a self, key: &K) -> Result<&'a V, TreeError>
    where
        K: 'a,
        V: 'a,
    {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    fn try_get_mut<'a>(&'a mut self, key: &K) -> Result<&'a mut V, TreeError>
    where
        K: 'a,
        V: 'a,
    {
        self.get_mut(key).ok_or(TreeError::KeyNotFound)
    }

    fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Entries in ascending key order.
    fn iter(&self) -> Iter<'_, K, V> {
        let raw = self.raw();
        Iter::new(raw, raw.smallest(), raw.len())
    }

    /// Entries in ascending key order, starting at `id`.
    fn iter_from(&self, id: NodeId) -> Iter<'_, K, V> {
        let raw = self.raw();
        Iter::new(raw, Some(id), raw.len())
    }

    fn keys<'a>(&'a self) -> impl Iterator<Item = &'a K>
    where
        K: 'a,
        V: 'a,
    {
        self.iter().map(|(k, _)| k)
    }

    fn len(&self) -> usize {
        self.raw().len()
    }

    fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize {
        self.raw().height()
    }

    /// Recomputes heights from the links and checks every node differs by at
    /// most one between its subtrees. Independent of stored balance factors.
    fn is_balanced(&self) -> bool {
        self.raw().is_balanced()
    }

    /// True when every root-to-leaf path has the same length.
    fn has_equal_paths(&self) -> bool {
        self.raw().has_equal_paths()
    }

    fn clear(&mut self) {
        let released = self.raw_mut().clear();
        debug!("cleared tree, released {released} nodes");
    }
}

/// Standard trait impls shared by both tree types.
macro_rules! impl_tree_traits {
    ($tree:ident) => {
        impl<K: Ord, V> Default for $tree<K, V> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<K: Ord, V> std::ops::Index<&K> for $tree<K, V> {
            type Output = V;

            /// Panics if `key` is absent; see `try_get` for the fallible form.
            fn index(&self, key: &K) -> &V {
                match self.get(key) {
                    Some(value) => value,
                    None => panic!("{}", $crate::error::TreeError::KeyNotFound),
                }
            }
        }

        impl<K: Ord, V> std::ops::IndexMut<&K> for $tree<K, V> {
            fn index_mut(&mut self, key: &K) -> &mut V {
                match self.get_mut(key) {
                    Some(value) => value,
                    None => panic!("{}", $crate::error::TreeError::KeyNotFound),
                }
            }
        }

        impl<K: Ord, V> Extend<(K, V)> for $tree<K, V> {
            fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
                for (key, value) in iter {
                    self.insert(key, value);
                }
            }
        }

        impl<K: Ord, V> FromIterator<(K, V)> for $tree<K, V> {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                let mut tree = Self::new();
                tree.extend(iter);
                tree
            }
        }

        impl<'a, K: Ord, V> IntoIterator for &'a $tree<K, V> {
            type Item = (&'a K, &'a V);
            type IntoIter = $crate::iter::Iter<'a, K, V>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        impl<K: Ord + std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for $tree<K, V> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_map().entries(self.iter()).finish()
            }
        }
    };
}

pub(crate) use impl_tree_traits;
