use log::trace;

use crate::error::InvariantError;
use crate::node::NodeId;
use crate::raw::{Placement, RawTree, Side};
use crate::search_tree::{SearchTree, impl_tree_traits};

/// Self-balancing AVL tree.
///
/// Each node stores `height(right) - height(left)` and that value is in
/// `{-1, 0, 1}` whenever no operation is in flight. Mutations retrace from the
/// changed spot toward the root, rotating where a node would reach ±2.
pub struct AvlTree<K, V> {
    raw: RawTree<K, V>,
}

impl<K: Ord, V> AvlTree<K, V> {
    pub fn new() -> Self {
        AvlTree { raw: RawTree::new() }
    }

    fn balance(&self, id: NodeId) -> i8 {
        self.raw.nodes[id].balance
    }

    fn set_balance(&mut self, id: NodeId, balance: i8) {
        self.raw.nodes[id].balance = balance;
    }

    fn is_left_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.raw.nodes[parent].left == Some(child)
    }

    // Walks up from a grown subtree: `node` is the child of `parent` whose
    // height just increased, and `parent` already carries its new balance.
    fn insert_fix(&mut self, mut parent: NodeId, mut node: NodeId) {
        while let Some(grand) = self.raw.nodes[parent].parent {
            let parent_is_left = self.is_left_child(grand, parent);
            let balance = self.balance(grand) + if parent_is_left { -1 } else { 1 };
            self.set_balance(grand, balance);
            match balance {
                0 => return,
                -1 | 1 => {
                    node = parent;
                    parent = grand;
                }
                _ => {
                    self.rotate_after_insert(grand, parent, node, parent_is_left);
                    return;
                }
            }
        }
    }

    fn rotate_after_insert(&mut self, grand: NodeId, parent: NodeId, node: NodeId, parent_is_left: bool) {
        let node_is_left = self.is_left_child(parent, node);
        trace!("insert rebalance at {grand:?}");
        if parent_is_left == node_is_left {
            if parent_is_left {
                self.raw.rotate_right(grand);
            } else {
                self.raw.rotate_left(grand);
            }
            self.set_balance(parent, 0);
            self.set_balance(grand, 0);
            return;
        }

        // Zig-zag: `node` ends up on top with `parent` and `grand` below it.
        let lean = self.balance(node);
        let (parent_balance, grand_balance) = if parent_is_left {
            self.raw.rotate_left(parent);
            self.raw.rotate_right(grand);
            match lean {
                -1 => (0, 1),
                0 => (0, 0),
                _ => (-1, 0),
            }
        } else {
            self.raw.rotate_right(parent);
            self.raw.rotate_left(grand);
            match lean {
                1 => (0, -1),
                0 => (0, 0),
                _ => (1, 0),
            }
        };
        self.set_balance(parent, parent_balance);
        self.set_balance(grand, grand_balance);
        self.set_balance(node, 0);
    }

    // `diff` is +1 when the left subtree of `node` just got shorter and -1
    // when the right one did.
    fn remove_fix(&mut self, node: NodeId, diff: i8) {
        let mut current = Some(node);
        let mut diff = diff;
        while let Some(node) = current {
            let parent = self.raw.nodes[node].parent;
            let next_diff = match parent {
                Some(p) if self.is_left_child(p, node) => 1,
                _ => -1,
            };
            let balance = self.balance(node);
            match balance + diff {
                -2 => {
                    if !self.rotate_after_remove(node, Side::Left) {
                        return;
                    }
                }
                2 => {
                    if !self.rotate_after_remove(node, Side::Right) {
                        return;
                    }
                }
                0 => self.set_balance(node, 0),
                leaning => {
                    // A balanced node only starts to lean; its height is unchanged.
                    self.set_balance(node, leaning);
                    return;
                }
            }
            current = parent;
            diff = next_diff;
        }
    }

    /// Rotates the subtree at `node`, which is two levels deeper on `heavy`.
    /// Returns whether the subtree got shorter, i.e. whether retracing continues.
    fn rotate_after_remove(&mut self, node: NodeId, heavy: Side) -> bool {
        trace!("remove rebalance at {node:?}");
        let (child, sign) = match heavy {
            Side::Left => (self.raw.nodes[node].left, -1),
            Side::Right => (self.raw.nodes[node].right, 1),
        };
        let Some(child) = child else {
            return false;
        };
        let child_balance = self.balance(child);

        // `sign` is the lean of the heavy side, so a child leaning the same way
        // (or not at all) takes a single rotation.
        if child_balance * sign >= 0 {
            match heavy {
                Side::Left => self.raw.rotate_right(node),
                Side::Right => self.raw.rotate_left(node),
            }
            if child_balance == 0 {
                self.set_balance(node, sign);
                self.set_balance(child, -sign);
                return false;
            }
            self.set_balance(node, 0);
            self.set_balance(child, 0);
            return true;
        }

        let middle = match heavy {
            Side::Left => self.raw.nodes[child].right,
            Side::Right => self.raw.nodes[child].left,
        };
        let Some(middle) = middle else {
            return false;
        };
        let lean = self.balance(middle);
        let (node_balance, child_balance) = match heavy {
            Side::Left => {
                self.raw.rotate_left(child);
                self.raw.rotate_right(node);
                match lean {
                    -1 => (1, 0),
                    1 => (0, -1),
                    _ => (0, 0),
                }
            }
            Side::Right => {
                self.raw.rotate_right(child);
                self.raw.rotate_left(node);
                match lean {
                    -1 => (0, 1),
                    1 => (-1, 0),
                    _ => (0, 0),
                }
            }
        };
        self.set_balance(node, node_balance);
        self.set_balance(child, child_balance);
        self.set_balance(middle, 0);
        true
    }

    /// Verifies the stored balance factors against heights recomputed from
    /// the links, along with parent-link consistency. Returns the first
    /// violation found.
    pub fn check_balance_factors(&self) -> Result<(), InvariantError> {
        self.raw.validate_links()?;
        let heights = self.raw.subtree_heights();
        let height = |id: Option<NodeId>| id.map_or(0i64, |i| heights[i.index()] as i64);
        for id in self.raw.post_order() {
            let node = &self.raw.nodes[id];
            let actual = height(node.right) - height(node.left);
            if actual.abs() > 1 {
                return Err(InvariantError::OutOfBalance { node: id, actual });
            }
            if i64::from(node.balance) != actual {
                return Err(InvariantError::StaleBalance {
                    node: id,
                    stored: node.balance,
                    actual,
                });
            }
        }
        Ok(())
    }
}

impl<K: Ord, V> SearchTree<K, V> for AvlTree<K, V> {
    fn raw(&self) -> &RawTree<K, V> {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut RawTree<K, V> {
        &mut self.raw
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        let node = match self.raw.insert_leaf(key, value) {
            Placement::Replaced(old) => return Some(old),
            Placement::Created(id) => id,
        };
        let Some(parent) = self.raw.nodes[node].parent else {
            return None;
        };

        // A leaning parent had its only child on the other side.
        if self.balance(parent) != 0 {
            self.set_balance(parent, 0);
            return None;
        }
        let lean = if self.is_left_child(parent, node) { -1 } else { 1 };
        self.set_balance(parent, lean);
        self.insert_fix(parent, node);
        None
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.raw.find_node(key)?;
        let detached = self.raw.detach(id);
        if let Some(parent) = detached.parent {
            let diff = match detached.side {
                Some(Side::Left) => 1,
                _ => -1,
            };
            self.remove_fix(parent, diff);
        }
        Some(detached.value)
    }
}

impl_tree_traits!(AvlTree);
