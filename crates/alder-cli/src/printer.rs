//! Debug rendering of the tree and its leaf chain.
//!
//! All state is per call; the level-order walk uses a local queue.

use alder_index::{BTreeIndex, NodeId, NodeViewKind};
use std::collections::VecDeque;

/// Prints the tree in level order, one rank per line, nodes separated
/// by `|`. With `verbose` each node is prefixed with its arena id.
pub fn print_tree(tree: &BTreeIndex, verbose: bool) {
    let Some(root) = tree.root_id() else {
        println!("Empty tree");
        return;
    };

    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    queue.push_back((root, 0));
    let mut current_rank = 0;
    let mut line = String::new();

    while let Some((id, rank)) = queue.pop_front() {
        let Some(view) = tree.node_view(id) else {
            continue;
        };
        if rank != current_rank {
            println!("{}", line.trim_end());
            line.clear();
            current_rank = rank;
        }
        if verbose {
            line.push_str(&format!("({}) ", id));
        }
        for key in view.keys {
            line.push_str(&format!("{} ", key));
        }
        if let NodeViewKind::Internal { children } = view.kind {
            for &child in children {
                queue.push_back((child, rank + 1));
            }
        }
        line.push_str("| ");
    }
    println!("{}", line.trim_end());
}

/// Prints the bottom row of the tree by following the forward-leaf
/// chain, leaves separated by `|`.
pub fn print_leaves(tree: &BTreeIndex, verbose: bool) {
    let Some(mut id) = leftmost_leaf(tree) else {
        println!("Empty tree");
        return;
    };

    let mut line = String::new();
    loop {
        let Some(view) = tree.node_view(id) else {
            break;
        };
        if verbose {
            line.push_str(&format!("({}) ", id));
        }
        for key in view.keys {
            line.push_str(&format!("{} ", key));
        }
        match view.kind {
            NodeViewKind::Leaf {
                next_leaf: Some(next),
                ..
            } => {
                line.push_str("| ");
                id = next;
            }
            _ => break,
        }
    }
    println!("{}", line.trim_end());
}

/// Finds `key` and prints the result; with `show_path` the descent
/// from the root is printed first.
pub fn find_and_print(tree: &BTreeIndex, key: i32, show_path: bool) {
    if show_path {
        print_path(tree, key);
    }
    match tree.find(key) {
        Some(record) => println!("Key: {}  Record: {}", key, record),
        None => println!("Key: {}  Record: NULL", key),
    }
}

/// Prints every key/record pair in `[lo, hi]`.
pub fn find_and_print_range(tree: &BTreeIndex, lo: i32, hi: i32) {
    let hits = tree.range(lo, hi);
    if hits.is_empty() {
        println!("None found");
        return;
    }
    for (key, record) in hits {
        println!("Key: {}  Record: {}", key, record);
    }
}

fn leftmost_leaf(tree: &BTreeIndex) -> Option<NodeId> {
    let mut id = tree.root_id()?;
    loop {
        match tree.node_view(id)?.kind {
            NodeViewKind::Internal { children } => id = *children.first()?,
            NodeViewKind::Leaf { .. } => return Some(id),
        }
    }
}

fn joined_keys(keys: &[i32]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_path(tree: &BTreeIndex, key: i32) {
    let Some(mut id) = tree.root_id() else {
        println!("Empty tree");
        return;
    };
    loop {
        let Some(view) = tree.node_view(id) else {
            return;
        };
        match view.kind {
            NodeViewKind::Internal { children } => {
                let i = view.keys.partition_point(|&k| key >= k);
                println!("[{}] {} ->", joined_keys(view.keys), i);
                match children.get(i) {
                    Some(&child) => id = child,
                    None => return,
                }
            }
            NodeViewKind::Leaf { .. } => {
                println!("Leaf [{}] ->", joined_keys(view.keys));
                return;
            }
        }
    }
}
