//! Slab-style arena owning every node of a tree.
//!
//! Node ids map directly to slot indices. Freed slots go on a free
//! list and are reused by later allocations, so long insert/delete
//! workloads do not grow the slab without bound.

use crate::node::{Node, NodeId};

pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<NodeId>,
    live: usize,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Stores a node, returning its id. Reuses a freed slot if one is
    /// available.
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }
        let id = NodeId::new(self.slots.len());
        self.slots.push(Some(node));
        id
    }

    /// Removes a node from the arena, returning it by value. The slot
    /// becomes reusable.
    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.index())?.take()?;
        self.free.push(id);
        self.live -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index())?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    /// Mutable access to two distinct nodes at once.
    pub(crate) fn get_pair_mut(
        &mut self,
        a: NodeId,
        b: NodeId,
    ) -> Option<(&mut Node, &mut Node)> {
        let (ai, bi) = (a.index(), b.index());
        if ai == bi || ai >= self.slots.len() || bi >= self.slots.len() {
            return None;
        }
        if ai < bi {
            let (lo, hi) = self.slots.split_at_mut(bi);
            Some((lo[ai].as_mut()?, hi[0].as_mut()?))
        } else {
            let (lo, hi) = self.slots.split_at_mut(ai);
            let first = hi[0].as_mut()?;
            let second = lo[bi].as_mut()?;
            Some((first, second))
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Drops every node and resets the slab.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}
