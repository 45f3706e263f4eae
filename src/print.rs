//! Text rendering of tree shape for debugging.

use std::fmt::{Debug, Write};

use crate::node::NodeId;
use crate::raw::RawTree;
use crate::search_tree::SearchTree;

pub const DEFAULT_LEVELS: usize = 5;

/// Renders the top `levels` levels of `tree`, one node per line:
///
/// ```text
/// 4 = "d" [bf=0]
/// ├─ 2 = "b" [bf=0]
/// │  ├─ 1 = "a" [bf=0]
/// │  └─ 3 = "c" [bf=0]
/// └─ 6 = "f" [bf=1]
///    ├─ ∅
///    └─ 7 = "g" [bf=0]
/// ```
///
/// Subtrees below the cut-off are shown as `…`.
pub fn render<K, V, T>(tree: &T, levels: usize) -> String
where
    K: Ord + Debug,
    V: Debug,
    T: SearchTree<K, V>,
{
    let raw = tree.raw();
    let mut out = String::new();
    match raw.root() {
        None => out.push('∅'),
        Some(root) if levels > 0 => render_node(raw, root, "", levels - 1, &mut out),
        Some(_) => out.push('…'),
    }
    out
}

/// Prints [`render`] with the default depth to stdout.
pub fn print<K, V, T>(tree: &T)
where
    K: Ord + Debug,
    V: Debug,
    T: SearchTree<K, V>,
{
    println!("{}", render(tree, DEFAULT_LEVELS));
}

fn render_node<K: Debug, V: Debug>(
    raw: &RawTree<K, V>,
    id: NodeId,
    tab: &str,
    levels: usize,
    out: &mut String,
) {
    let node = raw.node(id);
    let _ = write!(out, "{:?} = {:?} [bf={}]", node.key, node.value, node.balance());

    let (left, right) = (node.left(), node.right());
    if left.is_none() && right.is_none() {
        return;
    }
    for (child, is_last) in [(left, false), (right, true)] {
        let branch = if is_last { "└─" } else { "├─" };
        let _ = write!(out, "\n{tab}{branch} ");
        match child {
            None => out.push('∅'),
            Some(_) if levels == 0 => out.push('…'),
            Some(child) => {
                let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
                render_node(raw, child, &child_tab, levels - 1, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AvlTree, BinarySearchTree};

    #[test]
    fn renders_branches_and_empty_children() {
        let tree: AvlTree<i32, char> = [(2, 'b'), (1, 'a'), (3, 'c'), (4, 'd')].into_iter().collect();
        let expected = "\
2 = 'b' [bf=1]
├─ 1 = 'a' [bf=0]
└─ 3 = 'c' [bf=1]
   ├─ ∅
   └─ 4 = 'd' [bf=0]";
        assert_eq!(render(&tree, DEFAULT_LEVELS), expected);
    }

    #[test]
    fn cuts_off_below_requested_depth() {
        let tree: BinarySearchTree<i32, ()> = (1..=4).map(|k| (k, ())).collect();
        let text = render(&tree, 2);
        assert_eq!(text.lines().count(), 5);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn empty_tree_renders_placeholder() {
        let tree: AvlTree<i32, i32> = AvlTree::new();
        assert_eq!(render(&tree, DEFAULT_LEVELS), "∅");
    }
}
