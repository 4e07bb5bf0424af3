//! Arena-based B+Tree index keyed by `i32`.
//!
//! One structure serves as the whole engine: the handle owns the node
//! arena, the root id, the fan-out (`order`), and the optional release
//! hook for `Data` payloads. Every mutating path restores the B+Tree
//! invariants before returning: splits propagate upward through parent
//! ids, underfull nodes coalesce with or borrow from a sibling, and
//! the root collapses when it runs out of keys.

use crate::arena::NodeArena;
use crate::node::{InternalNode, LeafNode, Node, NodeId, NodeView, NodeViewKind};
use crate::record::Record;
use alder_common::{AlderError, Result, TreeConfig, DEFAULT_ORDER};
use tracing::{debug, trace};

/// Callback invoked on the payload of a `Data` record when the record
/// leaves the tree (delete or purge).
pub type ReleaseHook = Box<dyn FnMut(&[u8])>;

/// Split point for a node of `len` entries; the left side is never
/// smaller than the right.
fn cut(len: usize) -> usize {
    if len % 2 == 0 {
        len / 2
    } else {
        len / 2 + 1
    }
}

fn corrupted(context: &str) -> AlderError {
    AlderError::TreeCorrupted(context.to_string())
}

pub struct BTreeIndex {
    arena: NodeArena,
    root: Option<NodeId>,
    order: usize,
    release_hook: Option<ReleaseHook>,
}

impl Default for BTreeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BTreeIndex {
    /// Creates an empty tree with the default order.
    pub fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            order: DEFAULT_ORDER,
            release_hook: None,
        }
    }

    /// Creates an empty tree with the given order.
    pub fn with_order(order: usize) -> Result<Self> {
        let config = TreeConfig::with_order(order)?;
        let mut tree = Self::new();
        tree.order = config.order;
        Ok(tree)
    }

    /// Current order (fan-out). A node holds at most `order - 1` keys.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Reconfigures the order. Out-of-range values are rejected; a
    /// valid order is applied only while the tree is empty and is a
    /// no-op otherwise.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        let config = TreeConfig::with_order(order)?;
        if self.root.is_none() {
            self.order = config.order;
        }
        Ok(())
    }

    /// Installs the release hook invoked on `Data` payloads at the
    /// point a record leaves the tree.
    pub fn set_release_hook(&mut self, hook: impl FnMut(&[u8]) + 'static) {
        self.release_hook = Some(Box::new(hook));
    }

    /// Tree height in edges from the root to any leaf; 0 when empty.
    pub fn height(&self) -> usize {
        let mut current = match self.root {
            Some(id) => id,
            None => return 0,
        };
        let mut height = 0;
        while let Some(Node::Internal(node)) = self.arena.get(current) {
            current = match node.children.first() {
                Some(&child) => child,
                None => break,
            };
            height += 1;
        }
        height
    }

    /// Total number of records, summed over the forward-leaf chain.
    pub fn count(&self) -> usize {
        let mut leaf = self.leftmost_leaf();
        let mut total = 0;
        while let Some(id) = leaf {
            match self.arena.get(id).and_then(Node::as_leaf) {
                Some(node) => {
                    total += node.keys.len();
                    leaf = node.next_leaf;
                }
                None => break,
            }
        }
        total
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Descends from the root to the leaf that would hold `key`.
    fn find_leaf(&self, key: i32) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.arena.get(current)? {
                Node::Leaf(_) => return Some(current),
                Node::Internal(node) => {
                    // Equal keys live in the right subtree of their
                    // separator: advance while key >= keys[i].
                    let i = node.keys.partition_point(|&k| key >= k);
                    current = *node.children.get(i)?;
                }
            }
        }
    }

    /// Leftmost leaf of the tree, the head of the forward-leaf chain.
    fn leftmost_leaf(&self) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match self.arena.get(current)? {
                Node::Leaf(_) => return Some(current),
                Node::Internal(node) => current = *node.children.first()?,
            }
        }
    }

    /// Point lookup. Returns the record for `key`, or `None`.
    pub fn find(&self, key: i32) -> Option<&Record> {
        let leaf_id = self.find_leaf(key)?;
        let leaf = self.arena.get(leaf_id)?.as_leaf()?;
        let i = leaf.keys.binary_search(&key).ok()?;
        leaf.records.get(i)
    }

    /// Inclusive range scan over `[lo, hi]`, ascending. Empty when no
    /// key falls in the range.
    pub fn range(&self, lo: i32, hi: i32) -> Vec<(i32, &Record)> {
        let mut out = Vec::new();
        let Some(start) = self.find_leaf(lo) else {
            return out;
        };
        let mut leaf_id = Some(start);
        let mut first = true;
        while let Some(id) = leaf_id {
            let Some(leaf) = self.arena.get(id).and_then(Node::as_leaf) else {
                break;
            };
            let from = if first {
                first = false;
                leaf.keys.partition_point(|&k| k < lo)
            } else {
                0
            };
            for (key, record) in leaf.keys[from..].iter().zip(&leaf.records[from..]) {
                if *key > hi {
                    return out;
                }
                out.push((*key, record));
            }
            leaf_id = leaf.next_leaf;
        }
        out
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Inserts `record` under `key`, taking ownership of the record.
    ///
    /// If `key` is already present the tree is left untouched and the
    /// record is handed back as `Ok(Some(record))` — the caller keeps
    /// ownership of a rejected record.
    pub fn insert(&mut self, key: i32, record: Record) -> Result<Option<Record>> {
        if self.find(key).is_some() {
            trace!(key, "duplicate key rejected");
            return Ok(Some(record));
        }

        if self.root.is_none() {
            self.start_new_tree(key, record);
            return Ok(None);
        }

        let leaf_id = self
            .find_leaf(key)
            .ok_or_else(|| corrupted("leaf not found on insert"))?;
        let capacity = self.order - 1;
        let leaf = self.leaf_mut(leaf_id)?;
        if leaf.keys.len() < capacity {
            let pos = leaf.keys.partition_point(|&k| k < key);
            leaf.keys.insert(pos, key);
            leaf.records.insert(pos, record);
            return Ok(None);
        }

        self.insert_into_leaf_after_splitting(leaf_id, key, record)?;
        Ok(None)
    }

    /// First insertion: a single leaf becomes the root.
    fn start_new_tree(&mut self, key: i32, record: Record) {
        let mut node = Node::new_leaf(self.order, None);
        if let Node::Leaf(leaf) = &mut node {
            leaf.keys.push(key);
            leaf.records.push(record);
        }
        let root = self.arena.alloc(node);
        self.root = Some(root);
        debug!(key, root = %root, "started new tree");
    }

    /// Splits a full leaf around the insertion of `key` and promotes
    /// the new right leaf's first key to the parent.
    fn insert_into_leaf_after_splitting(
        &mut self,
        leaf_id: NodeId,
        key: i32,
        record: Record,
    ) -> Result<()> {
        let split = cut(self.order - 1);

        // Build the ordered overfull sequence in place, then carve off
        // the right half.
        let (right_keys, right_records, old_next, parent) = {
            let leaf = self.leaf_mut(leaf_id)?;
            let pos = leaf.keys.partition_point(|&k| k < key);
            leaf.keys.insert(pos, key);
            leaf.records.insert(pos, record);

            let right_keys = leaf.keys.split_off(split);
            let right_records = leaf.records.split_off(split);
            (right_keys, right_records, leaf.next_leaf, leaf.parent)
        };

        let promote = *right_keys
            .first()
            .ok_or_else(|| corrupted("empty right half after leaf split"))?;
        let new_id = self.arena.alloc(Node::Leaf(LeafNode {
            parent,
            keys: right_keys,
            records: right_records,
            next_leaf: old_next,
        }));

        // Splice the new leaf into the forward chain.
        self.leaf_mut(leaf_id)?.next_leaf = Some(new_id);

        debug!(left = %leaf_id, right = %new_id, promote, "split leaf");
        self.insert_into_parent(leaf_id, promote, new_id)
    }

    /// Inserts the separator `key` between `left` and `right` into
    /// `left`'s parent, splitting upward as needed.
    fn insert_into_parent(&mut self, left: NodeId, key: i32, right: NodeId) -> Result<()> {
        let parent_id = match self.node(left)?.parent() {
            None => return self.insert_into_new_root(left, key, right),
            Some(id) => id,
        };

        let left_index = {
            let parent = self.internal(parent_id)?;
            parent
                .children
                .iter()
                .position(|&c| c == left)
                .ok_or_else(|| corrupted("left sibling missing from parent"))?
        };

        if self.node(parent_id)?.num_keys() < self.order - 1 {
            let parent = self.internal_mut(parent_id)?;
            parent.keys.insert(left_index, key);
            parent.children.insert(left_index + 1, right);
            return Ok(());
        }

        self.insert_into_node_after_splitting(parent_id, left_index, key, right)
    }

    /// Splits a full internal node around the insertion of
    /// `(key, right)` and recurses with the promoted separator.
    fn insert_into_node_after_splitting(
        &mut self,
        old_id: NodeId,
        left_index: usize,
        key: i32,
        right: NodeId,
    ) -> Result<()> {
        let split = cut(self.order);

        let (k_prime, right_keys, right_children, parent) = {
            let node = self.internal_mut(old_id)?;
            node.keys.insert(left_index, key);
            node.children.insert(left_index + 1, right);

            // Left keeps split - 1 keys and split children; the key at
            // split - 1 is promoted, the rest move right.
            let mut right_keys = node.keys.split_off(split - 1);
            let k_prime = right_keys.remove(0);
            let right_children = node.children.split_off(split);
            (k_prime, right_keys, right_children, node.parent)
        };

        let moved = right_children.clone();
        let new_id = self.arena.alloc(Node::Internal(InternalNode {
            parent,
            keys: right_keys,
            children: right_children,
        }));
        for child in moved {
            self.node_mut(child)?.set_parent(Some(new_id));
        }

        debug!(left = %old_id, right = %new_id, k_prime, "split internal node");
        self.insert_into_parent(old_id, k_prime, new_id)
    }

    /// Grows the tree by one level: a fresh root above `left` and
    /// `right`.
    fn insert_into_new_root(&mut self, left: NodeId, key: i32, right: NodeId) -> Result<()> {
        let root = self.arena.alloc(Node::Internal(InternalNode {
            parent: None,
            keys: vec![key],
            children: vec![left, right],
        }));
        self.node_mut(left)?.set_parent(Some(root));
        self.node_mut(right)?.set_parent(Some(root));
        self.root = Some(root);
        debug!(root = %root, key, "tree grew a level");
        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Removes `key` and releases its record. Returns `Ok(false)` when
    /// the key is absent.
    pub fn delete(&mut self, key: i32) -> Result<bool> {
        let Some(leaf_id) = self.find_leaf(key) else {
            return Ok(false);
        };
        let index = {
            let leaf = self.leaf(leaf_id)?;
            match leaf.keys.binary_search(&key) {
                Ok(i) => i,
                Err(_) => return Ok(false),
            }
        };

        trace!(key, leaf = %leaf_id, "deleting key");
        let record = {
            let leaf = self.leaf_mut(leaf_id)?;
            leaf.keys.remove(index);
            leaf.records.remove(index)
        };
        self.repair_after_delete(leaf_id)?;
        self.release_record(record);
        Ok(true)
    }

    /// Restores the minimum-fill invariant for `node_id` after one
    /// entry was removed from it.
    fn repair_after_delete(&mut self, node_id: NodeId) -> Result<()> {
        if self.root == Some(node_id) {
            return self.adjust_root();
        }

        let (is_leaf, num_keys, parent_id) = {
            let node = self.node(node_id)?;
            (node.is_leaf(), node.num_keys(), node.parent())
        };
        let min_keys = if is_leaf {
            cut(self.order - 1)
        } else {
            cut(self.order) - 1
        };
        if num_keys >= min_keys {
            return Ok(());
        }

        let parent_id = parent_id.ok_or_else(|| corrupted("non-root node without parent"))?;

        // Prefer the left sibling; only the leftmost child borrows
        // from (or merges with) its right sibling.
        let (leftmost, neighbor_id, k_prime_index) = {
            let parent = self.internal(parent_id)?;
            let pos = parent
                .children
                .iter()
                .position(|&c| c == node_id)
                .ok_or_else(|| corrupted("node missing from parent"))?;
            if pos == 0 {
                let right = *parent
                    .children
                    .get(1)
                    .ok_or_else(|| corrupted("leftmost child has no sibling"))?;
                (true, right, 0)
            } else {
                (false, parent.children[pos - 1], pos - 1)
            }
        };

        let neighbor_keys = self.node(neighbor_id)?.num_keys();
        let capacity = if is_leaf { self.order } else { self.order - 1 };

        if neighbor_keys + num_keys < capacity {
            self.coalesce(node_id, neighbor_id, leftmost, k_prime_index, parent_id)
        } else {
            self.redistribute(node_id, neighbor_id, leftmost, k_prime_index, parent_id)
        }
    }

    /// Merges two siblings into the left one, removes the separator
    /// from the parent, and frees the right node.
    fn coalesce(
        &mut self,
        node_id: NodeId,
        neighbor_id: NodeId,
        leftmost: bool,
        k_prime_index: usize,
        parent_id: NodeId,
    ) -> Result<()> {
        // Keep the surviving node on the left.
        let (left_id, right_id) = if leftmost {
            (node_id, neighbor_id)
        } else {
            (neighbor_id, node_id)
        };

        let k_prime = {
            let parent = self.internal(parent_id)?;
            *parent
                .keys
                .get(k_prime_index)
                .ok_or_else(|| corrupted("separator index out of range"))?
        };

        debug!(left = %left_id, right = %right_id, k_prime, "coalescing nodes");

        let right = self
            .arena
            .free(right_id)
            .ok_or_else(|| corrupted("coalesce target missing from arena"))?;
        match right {
            Node::Internal(mut right) => {
                for &child in &right.children {
                    self.node_mut(child)?.set_parent(Some(left_id));
                }
                let left = self.internal_mut(left_id)?;
                left.keys.push(k_prime);
                left.keys.append(&mut right.keys);
                left.children.append(&mut right.children);
            }
            Node::Leaf(mut right) => {
                let left = self.leaf_mut(left_id)?;
                left.keys.append(&mut right.keys);
                left.records.append(&mut right.records);
                left.next_leaf = right.next_leaf;
            }
        }

        // Drop the separator and the dead child from the parent, then
        // repair it in turn.
        {
            let parent = self.internal_mut(parent_id)?;
            let child_index = parent
                .children
                .iter()
                .position(|&c| c == right_id)
                .ok_or_else(|| corrupted("freed child missing from parent"))?;
            if child_index == 0 {
                return Err(corrupted("freed child cannot be the leftmost pointer"));
            }
            parent.children.remove(child_index);
            parent.keys.remove(child_index - 1);
        }
        self.repair_after_delete(parent_id)
    }

    /// Borrows a single entry from `neighbor_id` into `node_id` and
    /// refreshes the separator in the parent.
    fn redistribute(
        &mut self,
        node_id: NodeId,
        neighbor_id: NodeId,
        leftmost: bool,
        k_prime_index: usize,
        parent_id: NodeId,
    ) -> Result<()> {
        let k_prime = {
            let parent = self.internal(parent_id)?;
            *parent
                .keys
                .get(k_prime_index)
                .ok_or_else(|| corrupted("separator index out of range"))?
        };

        let (new_separator, moved_child) = {
            let (node, neighbor) = self
                .arena
                .get_pair_mut(node_id, neighbor_id)
                .ok_or_else(|| corrupted("redistribute nodes missing from arena"))?;
            match (node, neighbor) {
                (Node::Internal(node), Node::Internal(neighbor)) if !leftmost => {
                    // Pull the neighbor's rightmost child under k_prime.
                    let child = neighbor
                        .children
                        .pop()
                        .ok_or_else(|| corrupted("left neighbor has no children"))?;
                    let key = neighbor
                        .keys
                        .pop()
                        .ok_or_else(|| corrupted("left neighbor has no keys"))?;
                    node.children.insert(0, child);
                    node.keys.insert(0, k_prime);
                    (key, Some(child))
                }
                (Node::Internal(node), Node::Internal(neighbor)) => {
                    // Leftmost child: pull the right neighbor's first
                    // child under k_prime.
                    let child = neighbor.children.remove(0);
                    let key = neighbor.keys.remove(0);
                    node.keys.push(k_prime);
                    node.children.push(child);
                    (key, Some(child))
                }
                (Node::Leaf(node), Node::Leaf(neighbor)) if !leftmost => {
                    let key = neighbor
                        .keys
                        .pop()
                        .ok_or_else(|| corrupted("left neighbor leaf is empty"))?;
                    let record = neighbor
                        .records
                        .pop()
                        .ok_or_else(|| corrupted("left neighbor leaf is empty"))?;
                    node.keys.insert(0, key);
                    node.records.insert(0, record);
                    (key, None)
                }
                (Node::Leaf(node), Node::Leaf(neighbor)) => {
                    let key = neighbor.keys.remove(0);
                    let record = neighbor.records.remove(0);
                    node.keys.push(key);
                    node.records.push(record);
                    let separator = *neighbor
                        .keys
                        .first()
                        .ok_or_else(|| corrupted("right neighbor leaf drained"))?;
                    (separator, None)
                }
                _ => return Err(corrupted("siblings of mixed kinds")),
            }
        };

        if let Some(child) = moved_child {
            self.node_mut(child)?.set_parent(Some(node_id));
        }
        {
            let parent = self.internal_mut(parent_id)?;
            let slot = parent
                .keys
                .get_mut(k_prime_index)
                .ok_or_else(|| corrupted("separator index out of range"))?;
            *slot = new_separator;
        }

        debug!(
            node = %node_id,
            neighbor = %neighbor_id,
            new_separator,
            "redistributed one entry"
        );
        Ok(())
    }

    /// Collapses the root after a deletion emptied it: promote the
    /// lone child, or drop the last leaf entirely.
    fn adjust_root(&mut self) -> Result<()> {
        let Some(root_id) = self.root else {
            return Ok(());
        };
        if self.node(root_id)?.num_keys() > 0 {
            return Ok(());
        }

        let old_root = self
            .arena
            .free(root_id)
            .ok_or_else(|| corrupted("root missing from arena"))?;
        match old_root {
            Node::Internal(node) => {
                let new_root = *node
                    .children
                    .first()
                    .ok_or_else(|| corrupted("empty root without child"))?;
                self.node_mut(new_root)?.set_parent(None);
                self.root = Some(new_root);
                debug!(root = %new_root, "root collapsed one level");
            }
            Node::Leaf(_) => {
                self.root = None;
                debug!("tree is now empty");
            }
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Releases every record and node; the tree becomes empty. The
    /// release hook fires for each `Data` record, same as on delete.
    pub fn purge(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        let mut released = 0usize;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match self.arena.free(id) {
                Some(Node::Internal(node)) => stack.extend(node.children),
                Some(Node::Leaf(mut leaf)) => {
                    for record in leaf.records.drain(..) {
                        self.release_record(record);
                        released += 1;
                    }
                }
                None => {}
            }
        }
        self.arena.clear();
        debug!(released, "purged tree");
    }

    /// Fires the release hook for `Data` payloads, then drops the
    /// record.
    fn release_record(&mut self, record: Record) {
        if let Record::Data(bytes) = &record {
            if let Some(hook) = self.release_hook.as_mut() {
                hook(bytes.as_ref());
            }
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Id of the root node, if the tree is non-empty.
    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Read-only view of a node, for inspection and rendering.
    pub fn node_view(&self, id: NodeId) -> Option<NodeView<'_>> {
        match self.arena.get(id)? {
            Node::Internal(node) => Some(NodeView {
                id,
                parent: node.parent,
                keys: &node.keys,
                kind: NodeViewKind::Internal {
                    children: &node.children,
                },
            }),
            Node::Leaf(leaf) => Some(NodeView {
                id,
                parent: leaf.parent,
                keys: &leaf.keys,
                kind: NodeViewKind::Leaf {
                    records: &leaf.records,
                    next_leaf: leaf.next_leaf,
                },
            }),
        }
    }

    // =========================================================================
    // Arena access helpers
    // =========================================================================

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.arena
            .get(id)
            .ok_or_else(|| corrupted("node missing from arena"))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.arena
            .get_mut(id)
            .ok_or_else(|| corrupted("node missing from arena"))
    }

    fn leaf(&self, id: NodeId) -> Result<&LeafNode> {
        self.node(id)?
            .as_leaf()
            .ok_or_else(|| corrupted("expected a leaf"))
    }

    fn leaf_mut(&mut self, id: NodeId) -> Result<&mut LeafNode> {
        self.node_mut(id)?
            .as_leaf_mut()
            .ok_or_else(|| corrupted("expected a leaf"))
    }

    fn internal(&self, id: NodeId) -> Result<&InternalNode> {
        self.node(id)?
            .as_internal()
            .ok_or_else(|| corrupted("expected an internal node"))
    }

    fn internal_mut(&mut self, id: NodeId) -> Result<&mut InternalNode> {
        self.node_mut(id)?
            .as_internal_mut()
            .ok_or_else(|| corrupted("expected an internal node"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn int_tree(order: usize, keys: &[i32]) -> BTreeIndex {
        let mut tree = BTreeIndex::with_order(order).unwrap();
        for &k in keys {
            assert!(tree.insert(k, Record::Int(k)).unwrap().is_none());
        }
        tree
    }

    fn all_keys(tree: &BTreeIndex) -> Vec<i32> {
        tree.range(i32::MIN, i32::MAX)
            .into_iter()
            .map(|(k, _)| k)
            .collect()
    }

    #[test]
    fn test_cut() {
        assert_eq!(cut(2), 1);
        assert_eq!(cut(3), 2);
        assert_eq!(cut(4), 2);
        assert_eq!(cut(5), 3);
        assert_eq!(cut(100), 50);
    }

    #[test]
    fn test_empty_tree() {
        let tree = BTreeIndex::new();
        assert!(tree.is_empty());
        assert_eq!(tree.order(), DEFAULT_ORDER);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.find(5), None);
        assert!(tree.range(0, 100).is_empty());
    }

    #[test]
    fn test_single_insert_find() {
        let tree = int_tree(4, &[17]);
        assert!(!tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.find(17), Some(&Record::Int(17)));
        assert_eq!(tree.find(18), None);
    }

    #[test]
    fn test_duplicate_insert_returns_record() {
        let mut tree = int_tree(4, &[50]);
        let rejected = tree.insert(50, Record::Int(999)).unwrap();
        assert_eq!(rejected, Some(Record::Int(999)));
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.find(50).unwrap().as_int(), Some(50));
    }

    #[test]
    fn test_monotone_insert_splits() {
        let tree = int_tree(4, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        assert_eq!(tree.count(), 10);
        assert_eq!(tree.height(), 2);
        for k in (10..=100).step_by(10) {
            assert_eq!(tree.find(k).unwrap().as_int(), Some(k));
        }
    }

    #[test]
    fn test_descending_insert() {
        let keys: Vec<i32> = (1..=50).rev().collect();
        let tree = int_tree(4, &keys);
        assert_eq!(tree.count(), 50);
        assert_eq!(all_keys(&tree), (1..=50).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_spanning_leaves() {
        let tree = int_tree(4, &[10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
        let hits: Vec<i32> = tree.range(25, 75).into_iter().map(|(k, _)| k).collect();
        assert_eq!(hits, vec![30, 40, 50, 60, 70]);
    }

    #[test]
    fn test_range_starting_past_leaf_end() {
        // With order 3 the leaves are small; a lower bound that lands
        // past the last key of its leaf must continue into the chain.
        let tree = int_tree(3, &[1, 2, 5, 6, 9, 10]);
        let hits: Vec<i32> = tree.range(3, 9).into_iter().map(|(k, _)| k).collect();
        assert_eq!(hits, vec![5, 6, 9]);
    }

    #[test]
    fn test_range_empty_and_reversed() {
        let tree = int_tree(4, &[10, 20, 30]);
        assert!(tree.range(11, 19).is_empty());
        assert!(tree.range(40, 50).is_empty());
        assert!(tree.range(30, 10).is_empty());
    }

    #[test]
    fn test_delete_simple() {
        let mut tree = int_tree(4, &[10, 20, 30]);
        assert!(tree.delete(20).unwrap());
        assert_eq!(tree.count(), 2);
        assert_eq!(tree.find(20), None);
        assert_eq!(all_keys(&tree), vec![10, 30]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let mut tree = int_tree(4, &[10, 20, 30]);
        assert!(!tree.delete(25).unwrap());
        assert_eq!(tree.count(), 3);

        let mut empty = BTreeIndex::new();
        assert!(!empty.delete(1).unwrap());
    }

    #[test]
    fn test_delete_redistributes_from_right_sibling() {
        // Leaves after the split: [10, 20] [30, 40, 50]. Deleting 10
        // leaves the leftmost leaf underfull and the right sibling at
        // capacity, so one entry moves left.
        let mut tree = int_tree(4, &[10, 20, 30, 40, 50]);
        assert!(tree.delete(10).unwrap());
        assert_eq!(tree.count(), 4);
        assert_eq!(all_keys(&tree), vec![20, 30, 40, 50]);
        for k in [20, 30, 40, 50] {
            assert_eq!(tree.find(k).unwrap().as_int(), Some(k));
        }
    }

    #[test]
    fn test_delete_redistributes_from_left_sibling() {
        // Leaves: [10, 15, 20] [30, 40]. Deleting 40 then 30 forces a
        // borrow from the full left neighbor.
        let mut tree = int_tree(4, &[10, 20, 30, 40, 50, 15]);
        assert!(tree.delete(50).unwrap());
        assert!(tree.delete(40).unwrap());
        assert_eq!(all_keys(&tree), vec![10, 15, 20, 30]);
    }

    #[test]
    fn test_delete_coalesces_leaves() {
        let mut tree = int_tree(4, &[10, 20, 30, 40, 50]);
        assert!(tree.delete(40).unwrap());
        assert!(tree.delete(50).unwrap());
        assert_eq!(all_keys(&tree), vec![10, 20, 30]);
        // The tree shrank back to a single leaf.
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn test_delete_all_empties_tree() {
        let keys = [-34, -546, 235, 13, -421, 234, 91, -6, 35, 9232, -164, 905];
        let mut tree = int_tree(4, &keys);
        assert_eq!(tree.count(), 12);

        let mut remaining = keys.len();
        for &k in &keys {
            assert!(tree.delete(k).unwrap(), "key {} should be present", k);
            remaining -= 1;
            assert_eq!(tree.count(), remaining);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.arena.len(), 0);
    }

    #[test]
    fn test_delete_all_order_three_deep_tree() {
        // Order 3 makes the tree tall quickly, exercising internal
        // coalesce and root collapse on the way back down.
        let keys: Vec<i32> = (0..64).collect();
        let mut tree = int_tree(3, &keys);
        assert!(tree.height() >= 3);

        for k in 0..64 {
            assert!(tree.delete(k).unwrap());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.arena.len(), 0);
    }

    #[test]
    fn test_insert_then_delete_restores_content() {
        let mut tree = int_tree(4, &[10, 20, 30, 40, 50, 60, 70]);
        let before = all_keys(&tree);
        assert!(tree.insert(35, Record::Int(35)).unwrap().is_none());
        assert!(tree.delete(35).unwrap());
        assert_eq!(all_keys(&tree), before);
    }

    #[test]
    fn test_set_order_rules() {
        let mut tree = BTreeIndex::new();
        assert!(tree.set_order(2).is_err());
        assert!(tree.set_order(101).is_err());

        tree.set_order(7).unwrap();
        assert_eq!(tree.order(), 7);

        tree.insert(1, Record::Int(1)).unwrap();
        // Non-empty: valid orders are silently ignored.
        tree.set_order(9).unwrap();
        assert_eq!(tree.order(), 7);

        tree.purge();
        tree.set_order(9).unwrap();
        assert_eq!(tree.order(), 9);
    }

    #[test]
    fn test_with_order_bounds() {
        assert!(BTreeIndex::with_order(3).is_ok());
        assert!(BTreeIndex::with_order(100).is_ok());
        assert!(matches!(
            BTreeIndex::with_order(2),
            Err(AlderError::InvalidOrder { .. })
        ));
        assert!(BTreeIndex::with_order(101).is_err());
    }

    #[test]
    fn test_purge() {
        let mut tree = int_tree(4, &(0..20).collect::<Vec<_>>());
        assert!(tree.count() > 0);
        tree.purge();
        assert!(tree.is_empty());
        assert_eq!(tree.count(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.arena.len(), 0);
        assert_eq!(tree.find(5), None);

        // The tree is usable again afterwards.
        tree.insert(1, Record::Int(1)).unwrap();
        assert_eq!(tree.count(), 1);
    }

    #[test]
    fn test_release_hook_fires_on_delete_and_purge() {
        let released = Rc::new(Cell::new(0usize));
        let mut tree = BTreeIndex::with_order(4).unwrap();
        let counter = Rc::clone(&released);
        tree.set_release_hook(move |payload| {
            assert!(!payload.is_empty());
            counter.set(counter.get() + 1);
        });

        for k in 0..6 {
            tree.insert(k, Record::data(vec![k as u8 + 1; 4])).unwrap();
        }
        // Int records never trigger the hook.
        tree.insert(100, Record::Int(100)).unwrap();

        tree.delete(0).unwrap();
        assert_eq!(released.get(), 1);
        tree.delete(100).unwrap();
        assert_eq!(released.get(), 1);

        tree.purge();
        assert_eq!(released.get(), 6);
    }

    #[test]
    fn test_node_view_matches_structure() {
        let tree = int_tree(4, &[10, 20, 30, 40, 50]);
        let root = tree.root_id().unwrap();
        let view = tree.node_view(root).unwrap();
        assert!(!view.is_leaf());
        assert_eq!(view.parent, None);

        let NodeViewKind::Internal { children } = view.kind else {
            panic!("root should be internal");
        };
        assert_eq!(children.len(), view.keys.len() + 1);
        for &child in children {
            let child_view = tree.node_view(child).unwrap();
            assert_eq!(child_view.parent, Some(root));
            assert!(child_view.is_leaf());
        }
    }

    #[test]
    fn test_mixed_sign_keys() {
        let keys = [768, -34, 214, -456, 712, 546, -214];
        let tree = int_tree(4, &keys);
        assert_eq!(tree.count(), 7);
        for &k in &keys {
            assert_eq!(tree.find(k).unwrap().as_int(), Some(k));
        }
        let mut sorted = keys.to_vec();
        sorted.sort_unstable();
        assert_eq!(all_keys(&tree), sorted);
    }
}
