use balanced_bst::{AvlTree, BinarySearchTree, SearchTree, TreeError};
use rand::prelude::*;

fn root_key<T: SearchTree<i32, i32>>(tree: &T) -> Option<i32> {
    tree.raw().root().map(|id| *tree.key(id))
}

fn child_keys<T: SearchTree<i32, i32>>(tree: &T, key: i32) -> (Option<i32>, Option<i32>) {
    let node = tree.raw().node(tree.find(&key).unwrap());
    (
        node.left().map(|id| *tree.key(id)),
        node.right().map(|id| *tree.key(id)),
    )
}

#[test]
fn ascending_inserts_stay_three_levels_deep() {
    let mut avl = AvlTree::new();
    let mut bst = BinarySearchTree::new();
    for k in 1..=7 {
        avl.insert(k, k);
        bst.insert(k, k);
    }
    assert_eq!(avl.height(), 3);
    assert_eq!(root_key(&avl), Some(4));
    assert_eq!(bst.height(), 7);
}

#[test]
fn single_rotation_on_ascending_triple() {
    let avl: AvlTree<i32, i32> = [10, 20, 30].map(|k| (k, k)).into_iter().collect();
    assert_eq!(root_key(&avl), Some(20));
    assert_eq!(child_keys(&avl, 20), (Some(10), Some(30)));
    for k in [10, 20, 30] {
        assert_eq!(avl.raw().node(avl.find(&k).unwrap()).balance(), 0);
    }
}

#[test]
fn double_rotation_on_zig_zag_triple() {
    let avl: AvlTree<i32, i32> = [30, 10, 20].map(|k| (k, k)).into_iter().collect();
    assert_eq!(root_key(&avl), Some(20));
    assert_eq!(child_keys(&avl, 20), (Some(10), Some(30)));
    avl.check_balance_factors().unwrap();
}

#[test]
fn removing_smallest_keeps_balance() {
    let mut avl: AvlTree<i32, i32> = (1..=7).map(|k| (k, k)).collect();
    avl.remove(&1);
    assert!(avl.is_balanced());
    let keys: Vec<i32> = avl.keys().copied().collect();
    assert_eq!(keys, vec![2, 3, 4, 5, 6, 7]);
}

#[test]
fn repeated_insert_keeps_one_node_with_latest_value() {
    let mut avl = AvlTree::new();
    avl.insert("k", 1);
    avl.insert("k", 2);
    assert_eq!(avl.len(), 1);
    assert_eq!(avl[&"k"], 2);

    let mut bst = BinarySearchTree::new();
    bst.insert("k", 1);
    bst.insert("k", 2);
    assert_eq!(bst.len(), 1);
    assert_eq!(bst.try_get(&"k"), Ok(&2));
}

#[test]
fn indexed_access_on_absent_key_fails() {
    let avl: AvlTree<i32, &str> = [(1, "one")].into_iter().collect();
    assert_eq!(avl.try_get(&2), Err(TreeError::KeyNotFound));
    assert_eq!(avl.find(&2), None);
}

#[test]
fn random_workload_against_btreemap() {
    use std::collections::BTreeMap;

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut avl = AvlTree::new();
    let mut bst = BinarySearchTree::new();
    let mut model = BTreeMap::new();

    for step in 0..4_000 {
        let key: i32 = rng.random_range(0..300);
        if rng.random_bool(0.6) {
            assert_eq!(avl.insert(key, step), model.insert(key, step));
            bst.insert(key, step);
        } else {
            assert_eq!(avl.remove(&key), model.remove(&key));
            bst.remove(&key);
        }
        if step % 97 == 0 {
            avl.check_balance_factors().unwrap();
        }
    }

    avl.check_balance_factors().unwrap();
    let expected: Vec<(i32, i32)> = model.into_iter().collect();
    let from_avl: Vec<(i32, i32)> = avl.iter().map(|(k, v)| (*k, *v)).collect();
    let from_bst: Vec<(i32, i32)> = bst.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(from_avl, expected);
    assert_eq!(from_bst, expected);
}

#[test]
fn handles_follow_entries_through_rebalancing() {
    let mut avl = AvlTree::new();
    let mut handles = Vec::new();
    for k in 0..50 {
        avl.insert(k, k * 2);
        handles.push((k, avl.find(&k).unwrap()));
    }
    for k in (0..50).filter(|k| k % 3 == 0) {
        avl.remove(&k);
    }
    for (k, id) in handles.into_iter().filter(|(k, _)| k % 3 != 0) {
        assert_eq!(*avl.key(id), k);
        assert_eq!(*avl.value(id), k * 2);
    }
}

fn bump_all<'t, K, T>(tree: &'t mut T, keys: &[K]) -> Vec<&'t K>
where
    K: Ord + 't,
    T: SearchTree<K, u32>,
{
    for key in keys {
        if let Ok(count) = tree.try_get_mut(key) {
            *count += 1;
        }
        if let Some(count) = tree.get_mut(key) {
            *count += 1;
        }
    }
    tree.keys().collect()
}

#[test]
fn shared_lookups_work_with_borrowed_keys() {
    let words: Vec<String> = ["pear", "fig", "apple"].map(String::from).into();
    let mut avl: AvlTree<&str, u32> = words.iter().map(|w| (w.as_str(), 0)).collect();
    let mut bst: BinarySearchTree<&str, u32> = words.iter().map(|w| (w.as_str(), 0)).collect();

    assert_eq!(bump_all(&mut avl, &["fig", "kiwi"]), vec![&"apple", &"fig", &"pear"]);
    assert_eq!(bump_all(&mut bst, &["fig", "kiwi"]), vec![&"apple", &"fig", &"pear"]);

    let fig = avl.find(&"fig").unwrap();
    *avl.value_mut(fig) += 1;
    assert_eq!((*avl.key(fig), *avl.value(fig)), ("fig", 3));
    assert_eq!(avl.try_get(&"kiwi"), Err(TreeError::KeyNotFound));
    assert_eq!(bst.get(&"fig"), Some(&2));
    assert_eq!(bst.try_get(&"pear"), Ok(&0));
}
