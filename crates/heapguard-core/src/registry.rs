//! Registry of live guards.
//!
//! A doubly-linked list over node slots, appended on allocation and
//! unlinked in O(1) on release via the guard's back-link. The list
//! container carries both head and tail itself, so head removal needs no
//! special handling. Insertion order is preserved; the at-exit sweep
//! visits guards in the order they were allocated.
//!
//! The registry owns the node arena and the node pool; exhaustion of
//! either surfaces as a registry-node allocation failure from the
//! enclosing request.

use crate::arena::Arena;
use crate::error::{ArenaKind, GuardError};
use crate::pool::Pool;

/// One link in the live-guard list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegistryNode {
    /// Guard-record slot this node tracks.
    guard: u32,
    prev: Option<u32>,
    next: Option<u32>,
}

impl RegistryNode {
    fn vacant() -> Self {
        Self {
            guard: 0,
            prev: None,
            next: None,
        }
    }
}

/// Doubly-linked list of every live guard.
pub(crate) struct Registry {
    nodes: Arena<RegistryNode>,
    pool: Pool,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl Registry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            nodes: Arena::new(capacity),
            pool: Pool::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Links a node for `guard` at the tail. O(1).
    pub(crate) fn append(&mut self, guard: u32) -> Result<u32, GuardError> {
        let idx = match self.pool.try_pop() {
            Some(idx) => idx,
            None => self
                .nodes
                .take_with(RegistryNode::vacant)
                .ok_or(GuardError::ArenaExhausted(ArenaKind::Node))?,
        };
        {
            let node = self.nodes.slot_mut(idx);
            node.guard = guard;
            node.prev = self.tail;
            node.next = None;
        }
        match self.tail {
            Some(tail) => self.nodes.slot_mut(tail).next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        Ok(idx)
    }

    /// Unlinks `idx` and returns it to the node pool. O(1).
    pub(crate) fn remove(&mut self, idx: u32) {
        let (prev, next) = {
            let node = self.nodes.slot(idx);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes.slot_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes.slot_mut(n).prev = prev,
            None => self.tail = prev,
        }
        self.pool.push(idx);
        self.len -= 1;
    }

    /// Walks head-to-tail, yielding guard-record slots in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let idx = cursor?;
            let node = self.nodes.get(idx)?;
            cursor = node.next;
            Some(node.guard)
        })
    }

    /// Drops the node arena, the pool, and both list anchors.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.pool.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guards(registry: &Registry) -> Vec<u32> {
        registry.iter().collect()
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut registry = Registry::new(8);
        for guard in [10, 20, 30] {
            registry.append(guard).unwrap();
        }
        assert_eq!(guards(&registry), vec![10, 20, 30]);
        assert_eq!(registry.len, 3);
    }

    #[test]
    fn test_remove_middle_tail_and_head() {
        let mut registry = Registry::new(8);
        let a = registry.append(1).unwrap();
        let b = registry.append(2).unwrap();
        let c = registry.append(3).unwrap();

        registry.remove(b);
        assert_eq!(guards(&registry), vec![1, 3]);

        registry.remove(c); // tail
        assert_eq!(guards(&registry), vec![1]);

        registry.remove(a); // head, sole node
        assert_eq!(guards(&registry), Vec::<u32>::new());
        assert_eq!(registry.len, 0);
    }

    #[test]
    fn test_append_after_emptying_reinitialises() {
        let mut registry = Registry::new(4);
        let a = registry.append(1).unwrap();
        registry.remove(a);
        // The pooled node is reused for the fresh head.
        let b = registry.append(2).unwrap();
        assert_eq!(a, b);
        assert_eq!(guards(&registry), vec![2]);
    }

    #[test]
    fn test_node_arena_exhaustion() {
        let mut registry = Registry::new(1);
        registry.append(1).unwrap();
        assert_eq!(
            registry.append(2),
            Err(GuardError::ArenaExhausted(ArenaKind::Node))
        );
        assert_eq!(registry.pool.len(), 0);
    }

    #[test]
    fn test_nodes_recycle_lifo() {
        let mut registry = Registry::new(4);
        let a = registry.append(1).unwrap();
        let b = registry.append(2).unwrap();
        registry.remove(a);
        registry.remove(b);
        assert_eq!(registry.pool.len(), 2);
        // Most recently removed node comes back first.
        assert_eq!(registry.append(3).unwrap(), b);
        assert_eq!(registry.append(4).unwrap(), a);
    }
}
