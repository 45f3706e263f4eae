use std::ops::{Index, IndexMut};

/// Stable handle to a node stored in a tree's arena.
///
/// A handle keeps naming the same entry across rotations and structural
/// swaps. It is invalidated when that entry is removed or the tree is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node shared by both tree kinds.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    /// `height(right) - height(left)`. Always 0 in an unbalanced tree.
    pub(crate) balance: i8,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Node {
            key,
            value,
            balance: 0,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn balance(&self) -> i8 {
        self.balance
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }
}

enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant { next_free: Option<NodeId> },
}

/// Slot storage for nodes with a free list of released slots.
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Option<NodeId>,
    len: usize,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of slots, occupied or not. Every live handle indexes below it.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn alloc(&mut self, key: K, value: V, parent: Option<NodeId>) -> NodeId {
        let node = Node::new(key, value, parent);
        self.len += 1;
        match self.free {
            Some(id) => {
                let slot = &mut self.slots[id.index()];
                if let Slot::Vacant { next_free } = *slot {
                    self.free = next_free;
                }
                *slot = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId(self.slots.len() as u32);
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Releases a node's slot and hands back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        let vacant = Slot::Vacant {
            next_free: self.free,
        };
        match std::mem::replace(&mut self.slots[id.index()], vacant) {
            Slot::Occupied(node) => {
                self.free = Some(id);
                self.len -= 1;
                (node.key, node.value)
            }
            Slot::Vacant { .. } => panic!("release of vacant node slot {}", id.0),
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("stale node handle {}", id.0),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("stale node handle {}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.alloc(1, "a", None);
        let b = arena.alloc(2, "b", Some(a));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[b].parent(), Some(a));

        assert_eq!(arena.release(a), (1, "a"));
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        let c = arena.alloc(3, "c", None);
        assert_eq!(c, a);
        assert_eq!(arena[c].key, 3);
        assert_eq!(arena[c].balance(), 0);
    }

    #[test]
    #[should_panic(expected = "stale node handle")]
    fn indexing_a_released_slot_panics() {
        let mut arena = Arena::new();
        let a = arena.alloc(1, (), None);
        arena.release(a);
        let _ = &arena[a];
    }
}
