//! Link-level primitives shared by both tree kinds.
//!
//! Every structural mutation here (splice, swap, rotation) leaves the parent
//! back-references consistent with the child links before returning.

use std::cmp::Ordering;
use std::mem;

use log::trace;

use crate::error::InvariantError;
use crate::node::{Arena, Node, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Where a node hangs: the root slot or one side of a parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Link {
    Root,
    Child(NodeId, Side),
}

pub(crate) enum Placement<V> {
    Replaced(V),
    Created(NodeId),
}

/// Result of unlinking a node with at most one child.
pub(crate) struct Detached<V> {
    pub parent: Option<NodeId>,
    /// Side of `parent` the removed node occupied; `None` when it was the root.
    pub side: Option<Side>,
    pub value: V,
}

/// Arena plus root: the ordered tree without any balancing policy.
pub struct RawTree<K, V> {
    pub(crate) nodes: Arena<K, V>,
    pub(crate) root: Option<NodeId>,
}

impl<K, V> RawTree<K, V> {
    pub(crate) fn new() -> Self {
        RawTree {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Read-only access to a node. Panics on a stale handle.
    pub fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id]
    }

    pub fn try_node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    pub(crate) fn smallest(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    pub(crate) fn largest(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    /// In-order successor.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut current = id;
        let mut parent = self.nodes[id].parent;
        while let Some(p) = parent {
            if self.nodes[p].right != Some(current) {
                break;
            }
            current = p;
            parent = self.nodes[p].parent;
        }
        parent
    }

    fn link_of(&self, id: NodeId) -> Link {
        match self.nodes[id].parent {
            None => Link::Root,
            Some(p) if self.nodes[p].left == Some(id) => Link::Child(p, Side::Left),
            Some(p) => Link::Child(p, Side::Right),
        }
    }

    fn set_link(&mut self, link: Link, child: Option<NodeId>) {
        match link {
            Link::Root => self.root = child,
            Link::Child(p, Side::Left) => self.nodes[p].left = child,
            Link::Child(p, Side::Right) => self.nodes[p].right = child,
        }
    }

    fn set_parent(&mut self, child: Option<NodeId>, parent: Option<NodeId>) {
        if let Some(c) = child {
            self.nodes[c].parent = parent;
        }
    }

    /// Unlinks and releases a node with at most one child, lifting that child
    /// into the node's slot.
    pub(crate) fn splice_out(&mut self, id: NodeId) -> Detached<V> {
        let node = &self.nodes[id];
        debug_assert!(node.left.is_none() || node.right.is_none());
        let child = node.left.or(node.right);
        let parent = node.parent;
        let link = self.link_of(id);

        self.set_parent(child, parent);
        self.set_link(link, child);

        let (_, value) = self.nodes.release(id);
        let side = match link {
            Link::Root => None,
            Link::Child(_, side) => Some(side),
        };
        Detached {
            parent,
            side,
            value,
        }
    }

    /// Removes a node. A node with two children first trades places with its
    /// in-order predecessor so the unlink always sees at most one child.
    pub(crate) fn detach(&mut self, id: NodeId) -> Detached<V>
    where
        K: Ord,
    {
        let node = &self.nodes[id];
        if node.left.is_some() && node.right.is_some() {
            if let Some(pred) = self.predecessor(id) {
                self.swap_nodes(id, pred);
            }
        }
        self.splice_out(id)
    }

    /// Exchanges the tree positions of two nodes. Keys and values stay with
    /// their nodes; balance factors stay with the positions.
    pub(crate) fn swap_nodes(&mut self, a: NodeId, b: NodeId) {
        if a == b {
            return;
        }
        trace!("swap {a:?} <-> {b:?}");
        if self.nodes[b].parent == Some(a) {
            self.swap_with_child(a, b);
        } else if self.nodes[a].parent == Some(b) {
            self.swap_with_child(b, a);
        } else {
            self.swap_apart(a, b);
        }
        let balance_a = self.nodes[a].balance;
        self.nodes[a].balance = mem::replace(&mut self.nodes[b].balance, balance_a);
    }

    fn swap_apart(&mut self, a: NodeId, b: NodeId) {
        let link_a = self.link_of(a);
        let link_b = self.link_of(b);
        let (pa, la, ra) = self.links(a);
        let (pb, lb, rb) = self.links(b);

        // Siblings share a parent but always hang from different sides, so
        // the two writes below never clobber each other.
        self.set_link(link_a, Some(b));
        self.set_link(link_b, Some(a));

        let na = &mut self.nodes[a];
        na.parent = pb;
        na.left = lb;
        na.right = rb;
        let nb = &mut self.nodes[b];
        nb.parent = pa;
        nb.left = la;
        nb.right = ra;

        self.set_parent(la, Some(b));
        self.set_parent(ra, Some(b));
        self.set_parent(lb, Some(a));
        self.set_parent(rb, Some(a));
    }

    /// `lower` is a direct child of `upper`.
    fn swap_with_child(&mut self, upper: NodeId, lower: NodeId) {
        let link_upper = self.link_of(upper);
        let (parent, upper_left, upper_right) = self.links(upper);
        let (_, lower_left, lower_right) = self.links(lower);

        self.set_link(link_upper, Some(lower));
        self.nodes[lower].parent = parent;

        if upper_left == Some(lower) {
            self.nodes[lower].left = Some(upper);
            self.nodes[lower].right = upper_right;
            self.set_parent(upper_right, Some(lower));
        } else {
            self.nodes[lower].right = Some(upper);
            self.nodes[lower].left = upper_left;
            self.set_parent(upper_left, Some(lower));
        }

        let nu = &mut self.nodes[upper];
        nu.parent = Some(lower);
        nu.left = lower_left;
        nu.right = lower_right;
        self.set_parent(lower_left, Some(upper));
        self.set_parent(lower_right, Some(upper));
    }

    fn links(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>, Option<NodeId>) {
        let node = &self.nodes[id];
        (node.parent, node.left, node.right)
    }

    /// Promotes the left child of `id` into its place.
    pub(crate) fn rotate_right(&mut self, id: NodeId) {
        let Some(pivot) = self.nodes[id].left else {
            return;
        };
        trace!("rotate right at {id:?}");
        let link = self.link_of(id);
        let inner = self.nodes[pivot].right;

        self.nodes[id].left = inner;
        self.set_parent(inner, Some(id));

        self.nodes[pivot].parent = self.nodes[id].parent;
        self.set_link(link, Some(pivot));

        self.nodes[pivot].right = Some(id);
        self.nodes[id].parent = Some(pivot);
    }

    /// Promotes the right child of `id` into its place.
    pub(crate) fn rotate_left(&mut self, id: NodeId) {
        let Some(pivot) = self.nodes[id].right else {
            return;
        };
        trace!("rotate left at {id:?}");
        let link = self.link_of(id);
        let inner = self.nodes[pivot].left;

        self.nodes[id].right = inner;
        self.set_parent(inner, Some(id));

        self.nodes[pivot].parent = self.nodes[id].parent;
        self.set_link(link, Some(pivot));

        self.nodes[pivot].left = Some(id);
        self.nodes[id].parent = Some(pivot);
    }

    /// Nodes in post-order (children before parents). Iterative, so chains of
    /// any length are fine.
    pub(crate) fn post_order(&self) -> Vec<NodeId> {
        let mut pending: Vec<NodeId> = self.root.into_iter().collect();
        let mut out = Vec::with_capacity(self.len());
        while let Some(id) = pending.pop() {
            out.push(id);
            let node = &self.nodes[id];
            pending.extend(node.left);
            pending.extend(node.right);
        }
        out.reverse();
        out
    }

    /// Heights of every live node, computed bottom-up from the links alone.
    /// Indexed by handle; a leaf has height 1.
    pub(crate) fn subtree_heights(&self) -> Vec<u32> {
        let mut heights = vec![0u32; self.nodes.capacity()];
        for id in self.post_order() {
            let node = &self.nodes[id];
            let left = node.left.map_or(0, |l| heights[l.index()]);
            let right = node.right.map_or(0, |r| heights[r.index()]);
            heights[id.index()] = 1 + left.max(right);
        }
        heights
    }

    pub(crate) fn height(&self) -> usize {
        match self.root {
            Some(root) => self.subtree_heights()[root.index()] as usize,
            None => 0,
        }
    }

    /// True when no node's subtrees differ in height by more than one.
    pub(crate) fn is_balanced(&self) -> bool {
        let heights = self.subtree_heights();
        let height = |id: Option<NodeId>| id.map_or(0i64, |i| heights[i.index()] as i64);
        self.post_order().into_iter().all(|id| {
            let node = &self.nodes[id];
            (height(node.right) - height(node.left)).abs() <= 1
        })
    }

    /// True when every root-to-leaf path has the same length.
    pub(crate) fn has_equal_paths(&self) -> bool {
        // Depth of the leaves below each node, `None` once two leaves disagree.
        let mut depths: Vec<Option<u32>> = vec![None; self.nodes.capacity()];
        for id in self.post_order() {
            let node = &self.nodes[id];
            let below = match (node.left, node.right) {
                (None, None) => Some(0),
                (Some(c), None) | (None, Some(c)) => depths[c.index()],
                (Some(l), Some(r)) => match (depths[l.index()], depths[r.index()]) {
                    (Some(dl), Some(dr)) if dl == dr => Some(dl),
                    _ => None,
                },
            };
            if below.is_none() {
                return false;
            }
            depths[id.index()] = below.map(|d| d + 1);
        }
        true
    }

    /// Checks that each child points back at its parent and the root has none.
    pub(crate) fn validate_links(&self) -> Result<(), InvariantError> {
        if let Some(root) = self.root {
            if let Some(parent) = self.nodes[root].parent {
                return Err(InvariantError::RootHasParent { root, parent });
            }
        }
        for id in self.post_order() {
            let node = &self.nodes[id];
            for child in node.left.into_iter().chain(node.right) {
                let back = self.nodes[child].parent;
                if back != Some(id) {
                    return Err(InvariantError::BrokenParentLink {
                        parent: id,
                        child,
                        back,
                    });
                }
            }
        }
        Ok(())
    }

    /// Releases every node, children before parents.
    pub(crate) fn clear(&mut self) -> usize {
        let order = self.post_order();
        for &id in &order {
            self.nodes.release(id);
        }
        self.root = None;
        self.nodes.reset();
        order.len()
    }
}

impl<K: Ord, V> RawTree<K, V> {
    pub(crate) fn find_node(&self, key: &K) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Binary-search descent: overwrite in place on a hit, otherwise hang a
    /// fresh leaf where the search fell off the tree.
    pub(crate) fn insert_leaf(&mut self, key: K, value: V) -> Placement<V> {
        let Some(mut current) = self.root else {
            let id = self.nodes.alloc(key, value, None);
            self.root = Some(id);
            return Placement::Created(id);
        };
        loop {
            let node = &mut self.nodes[current];
            let (next, side) = match key.cmp(&node.key) {
                Ordering::Less => (node.left, Side::Left),
                Ordering::Greater => (node.right, Side::Right),
                Ordering::Equal => {
                    return Placement::Replaced(mem::replace(&mut node.value, value));
                }
            };
            match next {
                Some(next) => current = next,
                None => {
                    let id = self.nodes.alloc(key, value, Some(current));
                    self.set_link(Link::Child(current, side), Some(id));
                    return Placement::Created(id);
                }
            }
        }
    }

    /// In-order predecessor: the rightmost node of the left subtree, or else
    /// the nearest ancestor holding a smaller key.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.rightmost(left));
        }
        let key = &self.nodes[id].key;
        let mut ancestor = self.nodes[id].parent;
        while let Some(a) = ancestor {
            if self.nodes[a].key < *key {
                return Some(a);
            }
            ancestor = self.nodes[a].parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[i32]) -> RawTree<i32, i32> {
        let mut tree = RawTree::new();
        for &k in keys {
            tree.insert_leaf(k, k * 10);
        }
        tree
    }

    fn keys_in_order(tree: &RawTree<i32, i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut current = tree.smallest();
        while let Some(id) = current {
            out.push(tree.node(id).key);
            current = tree.successor(id);
        }
        out
    }

    fn id_of(tree: &RawTree<i32, i32>, key: i32) -> NodeId {
        tree.find_node(&key).unwrap()
    }

    #[test]
    fn insert_leaf_overwrites_existing_key() {
        let mut tree = build(&[5, 3, 8]);
        match tree.insert_leaf(3, 99) {
            Placement::Replaced(old) => assert_eq!(old, 30),
            Placement::Created(_) => panic!("duplicate key created a node"),
        }
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(id_of(&tree, 3)).value, 99);
    }

    #[test]
    fn predecessor_walks_left_subtree_then_ancestors() {
        //        50
        //      /    \
        //    30      70
        //   /  \    /
        //  20  40  60
        let tree = build(&[50, 30, 70, 20, 40, 60]);
        let pred = |k| tree.predecessor(id_of(&tree, k)).map(|id| tree.node(id).key);
        assert_eq!(pred(50), Some(40));
        assert_eq!(pred(30), Some(20));
        assert_eq!(pred(60), Some(50));
        assert_eq!(pred(40), Some(30));
        assert_eq!(pred(20), None);
    }

    #[test]
    fn successor_visits_keys_in_order() {
        let tree = build(&[50, 30, 70, 20, 40, 60, 80, 65]);
        assert_eq!(keys_in_order(&tree), vec![20, 30, 40, 50, 60, 65, 70, 80]);
        assert_eq!(tree.node(tree.largest().unwrap()).key, 80);
    }

    #[test]
    fn swap_of_distant_nodes_keeps_links_consistent() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80]);
        let a = id_of(&tree, 30);
        let b = id_of(&tree, 80);
        tree.swap_nodes(a, b);
        tree.validate_links().unwrap();
        assert_eq!(tree.node(a).parent(), Some(id_of(&tree, 70)));
        assert_eq!(tree.node(b).left().map(|l| tree.node(l).key), Some(20));
        // Handles keep naming their entries.
        assert_eq!(tree.node(a).key, 30);
        assert_eq!(tree.node(b).key, 80);
    }

    #[test]
    fn swap_of_parent_and_child_keeps_links_consistent() {
        let mut tree = build(&[50, 30, 70, 20, 40]);
        let upper = id_of(&tree, 30);
        let lower = id_of(&tree, 40);
        tree.swap_nodes(upper, lower);
        tree.validate_links().unwrap();
        assert_eq!(tree.node(upper).parent(), Some(lower));
        assert_eq!(tree.node(lower).right(), Some(upper));
        assert_eq!(tree.node(lower).left().map(|l| tree.node(l).key), Some(20));

        // Swapping back, with the arguments reversed, restores the tree.
        tree.swap_nodes(upper, lower);
        tree.validate_links().unwrap();
        assert_eq!(keys_in_order(&tree), vec![20, 30, 40, 50, 70]);
    }

    #[test]
    fn swap_with_root_updates_root() {
        let mut tree = build(&[50, 30, 70]);
        let root = id_of(&tree, 50);
        let left = id_of(&tree, 30);
        tree.swap_nodes(root, left);
        tree.validate_links().unwrap();
        assert_eq!(tree.root(), Some(left));
        assert_eq!(tree.node(left).left(), Some(root));
    }

    #[test]
    fn swap_of_siblings() {
        let mut tree = build(&[50, 30, 70]);
        let a = id_of(&tree, 30);
        let b = id_of(&tree, 70);
        tree.swap_nodes(a, b);
        tree.validate_links().unwrap();
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).left(), Some(b));
        assert_eq!(tree.node(root).right(), Some(a));
    }

    #[test]
    fn detach_two_child_node_uses_predecessor() {
        let mut tree = build(&[50, 30, 70, 20, 40, 60, 80]);
        let pred = id_of(&tree, 40);
        let detached = tree.detach(id_of(&tree, 50));
        assert_eq!(detached.value, 500);
        tree.validate_links().unwrap();
        assert_eq!(tree.root(), Some(pred));
        assert_eq!(keys_in_order(&tree), vec![20, 30, 40, 60, 70, 80]);
    }

    #[test]
    fn rotations_are_inverse() {
        let mut tree = build(&[50, 30, 70, 20, 40]);
        let root = id_of(&tree, 50);
        tree.rotate_right(root);
        tree.validate_links().unwrap();
        assert_eq!(tree.root(), Some(id_of(&tree, 30)));
        assert_eq!(tree.node(root).left().map(|l| tree.node(l).key), Some(40));

        tree.rotate_left(id_of(&tree, 30));
        tree.validate_links().unwrap();
        assert_eq!(tree.root(), Some(root));
        assert_eq!(keys_in_order(&tree), vec![20, 30, 40, 50, 70]);
    }

    #[test]
    fn height_and_shape_diagnostics() {
        let chain = build(&[1, 2, 3, 4]);
        assert_eq!(chain.height(), 4);
        assert!(!chain.is_balanced());
        assert!(chain.has_equal_paths());

        let full = build(&[2, 1, 3]);
        assert_eq!(full.height(), 2);
        assert!(full.is_balanced());
        assert!(full.has_equal_paths());

        let lopsided = build(&[2, 1, 3, 4]);
        assert!(lopsided.is_balanced());
        assert!(!lopsided.has_equal_paths());

        let empty: RawTree<i32, i32> = RawTree::new();
        assert_eq!(empty.height(), 0);
        assert!(empty.is_balanced());
        assert!(empty.has_equal_paths());
    }

    #[test]
    fn clear_releases_every_node() {
        let mut tree = build(&[5, 2, 8, 1, 3]);
        assert_eq!(tree.clear(), 5);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.smallest(), None);
    }

    #[test]
    fn link_check_reports_the_first_broken_link() {
        let mut tree = build(&[50, 30, 70]);
        tree.validate_links().unwrap();

        let root = id_of(&tree, 50);
        let left = id_of(&tree, 30);
        tree.nodes[left].parent = None;
        assert_eq!(
            tree.validate_links(),
            Err(InvariantError::BrokenParentLink {
                parent: root,
                child: left,
                back: None,
            })
        );

        tree.nodes[left].parent = Some(root);
        tree.nodes[root].parent = Some(left);
        assert_eq!(
            tree.validate_links(),
            Err(InvariantError::RootHasParent { root, parent: left })
        );
    }
}
