//! Arena-backed pairing heap.
//!
//! # Layout
//!
//! Nodes live in a `Vec` of slots and reference each other by `u32` index.
//! Each node stores its first child, its next sibling, and `prev`, which is
//! the parent for a first child and the left sibling otherwise.  `prev` makes
//! it possible to cut an arbitrary node out of the tree in O(1), which is
//! what `change_priority` and `remove` need.
//!
//! # Handles
//!
//! A [`Handle`] is `(slot index, generation)`.  A slot's generation is bumped
//! every time its element leaves the heap (pop, remove, clear), so a handle
//! kept past that point no longer matches and any mutating use of it panics
//! instead of touching whatever element reuses the slot.
//!
//! # Complexity
//!
//! `push` and `peek` are O(1).  `pop`, `change_priority` and `remove` are
//! amortized O(log n): they re-meld the detached node's children with the
//! standard two-pass pairing (left-to-right pairs, then right-to-left fold).

use crate::{Comparator, MinOrder};

// ── Handle ────────────────────────────────────────────────────────────────────

/// Stable reference to an element while it stays in the heap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index:      u32,
    generation: u32,
}

impl Handle {
    /// Slot index, for diagnostics.
    #[inline]
    pub fn slot(self) -> usize {
        self.index as usize
    }
}

// ── Arena ─────────────────────────────────────────────────────────────────────

struct Node<T, K> {
    value:   T,
    key:     K,
    child:   Option<u32>,
    sibling: Option<u32>,
    prev:    Option<u32>,
}

struct Slot<T, K> {
    generation: u32,
    node:       Option<Node<T, K>>,
}

// ── PairingHeap ───────────────────────────────────────────────────────────────

/// Priority queue with O(log n) amortized key updates through [`Handle`]s.
///
/// `C` decides the pop order; the default [`MinOrder`] pops the smallest key.
pub struct PairingHeap<T, K, C = MinOrder> {
    slots: Vec<Slot<T, K>>,
    free:  Vec<u32>,
    root:  Option<u32>,
    len:   usize,
    cmp:   C,
}

impl<T, K, C: Comparator<K> + Default> PairingHeap<T, K, C> {
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, K, C: Comparator<K> + Default> Default for PairingHeap<T, K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K, C: Comparator<K>> PairingHeap<T, K, C> {
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            slots: Vec::new(),
            free:  Vec::new(),
            root:  None,
            len:   0,
            cmp,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// The element that `pop` would return.
    pub fn peek(&self) -> Option<&T> {
        self.root.map(|r| &self.node(r).value)
    }

    /// The key of the element that `pop` would return.
    pub fn top_priority(&self) -> Option<&K> {
        self.root.map(|r| &self.node(r).key)
    }

    /// `true` while `handle` refers to an element still in the heap.
    /// Never panics; use it to probe before calling the mutating methods.
    pub fn contains(&self, handle: Handle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.node.is_some())
    }

    /// The element behind `handle`, or `None` if the handle is stale.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        if self.contains(handle) {
            Some(&self.node(handle.index).value)
        } else {
            None
        }
    }

    /// Current key of the element behind `handle`.
    ///
    /// # Panics
    /// Panics if `handle` is stale.
    pub fn priority(&self, handle: Handle) -> &K {
        let idx = self.resolve(handle);
        &self.node(idx).key
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Insert `value` with priority `key`.
    pub fn push(&mut self, value: T, key: K) -> Handle {
        let node = Node { value, key, child: None, sibling: None, prev: None };
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                Handle { index, generation: slot.generation }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .unwrap_or_else(|_| panic!("pairing heap exceeded u32::MAX slots"));
                self.slots.push(Slot { generation: 0, node: Some(node) });
                Handle { index, generation: 0 }
            }
        };
        self.root = self.meld(self.root, Some(handle.index));
        self.len += 1;
        handle
    }

    /// Remove and return the best element.
    pub fn pop(&mut self) -> Option<T> {
        self.pop_with_priority().map(|(value, _)| value)
    }

    /// Remove and return the best element together with its key.
    pub fn pop_with_priority(&mut self) -> Option<(T, K)> {
        let root = self.root?;
        let children = self.take_children(root);
        self.root = self.combine(children);
        let node = self.release(root);
        Some((node.value, node.key))
    }

    /// Give the element behind `handle` a new key.  Works in both directions
    /// (improving or worsening the priority).  `handle` stays valid.
    ///
    /// # Panics
    /// Panics if `handle` is stale.
    pub fn change_priority(&mut self, handle: Handle, key: K) {
        let idx = self.resolve(handle);
        self.detach(idx);
        self.node_mut(idx).key = key;
        self.root = self.meld(self.root, Some(idx));
    }

    /// Remove the element behind `handle` and return it.
    ///
    /// # Panics
    /// Panics if `handle` is stale.
    pub fn remove(&mut self, handle: Handle) -> T {
        let idx = self.resolve(handle);
        self.detach(idx);
        self.release(idx).value
    }

    /// Drop every element.  All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(i as u32);
        }
        self.root = None;
        self.len = 0;
    }

    // ── Tree plumbing ─────────────────────────────────────────────────────

    fn resolve(&self, handle: Handle) -> u32 {
        if !self.contains(handle) {
            panic!("stale pairing heap handle {handle:?}");
        }
        handle.index
    }

    fn node(&self, idx: u32) -> &Node<T, K> {
        match &self.slots[idx as usize].node {
            Some(n) => n,
            None => unreachable!("pairing heap link points at empty slot {idx}"),
        }
    }

    fn node_mut(&mut self, idx: u32) -> &mut Node<T, K> {
        match &mut self.slots[idx as usize].node {
            Some(n) => n,
            None => unreachable!("pairing heap link points at empty slot {idx}"),
        }
    }

    /// Empty a slot, bump its generation, and return the node it held.
    fn release(&mut self, idx: u32) -> Node<T, K> {
        let slot = &mut self.slots[idx as usize];
        let node = match slot.node.take() {
            Some(n) => n,
            None => unreachable!("releasing empty slot {idx}"),
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(idx);
        self.len -= 1;
        node
    }

    /// Take `idx` out of the tree as a lone node: its children are re-melded
    /// into the remaining heap and `idx` ends with no links at all.
    fn detach(&mut self, idx: u32) {
        let children = self.take_children(idx);
        let subtree = self.combine(children);
        if self.root == Some(idx) {
            self.root = subtree;
        } else {
            self.cut(idx);
            self.root = self.meld(self.root, subtree);
        }
    }

    /// Unlink a non-root node from its parent's child list.
    fn cut(&mut self, idx: u32) {
        let (prev, sibling) = {
            let n = self.node(idx);
            (n.prev, n.sibling)
        };
        let Some(prev) = prev else {
            unreachable!("non-root heap node {idx} has no prev link");
        };
        if self.node(prev).child == Some(idx) {
            self.node_mut(prev).child = sibling;
        } else {
            self.node_mut(prev).sibling = sibling;
        }
        if let Some(s) = sibling {
            self.node_mut(s).prev = Some(prev);
        }
        let n = self.node_mut(idx);
        n.prev = None;
        n.sibling = None;
    }

    /// Detach the whole child list of `idx`, returning the children as
    /// independent roots in list order.
    fn take_children(&mut self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = self.node_mut(idx).child.take();
        while let Some(c) = cur {
            let n = self.node_mut(c);
            cur = n.sibling.take();
            n.prev = None;
            out.push(c);
        }
        out
    }

    /// Two-pass pairing of independent roots into one tree.
    fn combine(&mut self, roots: Vec<u32>) -> Option<u32> {
        let mut paired = Vec::with_capacity(roots.len().div_ceil(2));
        for pair in roots.chunks(2) {
            let merged = self.meld(Some(pair[0]), pair.get(1).copied());
            paired.push(merged);
        }
        let mut acc = paired.pop().flatten();
        while let Some(next) = paired.pop() {
            acc = self.meld(next, acc);
        }
        acc
    }

    /// Link two independent roots; the loser becomes the winner's first child.
    fn meld(&mut self, a: Option<u32>, b: Option<u32>) -> Option<u32> {
        let (a, b) = match (a, b) {
            (None, x) | (x, None) => return x,
            (Some(a), Some(b)) => (a, b),
        };
        let (top, sub) = if self.cmp.precedes(&self.node(b).key, &self.node(a).key) {
            (b, a)
        } else {
            (a, b)
        };
        let first = self.node(top).child;
        {
            let s = self.node_mut(sub);
            s.sibling = first;
            s.prev = Some(top);
        }
        if let Some(f) = first {
            self.node_mut(f).prev = Some(sub);
        }
        self.node_mut(top).child = Some(sub);
        Some(top)
    }
}
