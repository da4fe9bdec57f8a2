//! Per-node search state and the two storage strategies for it.
//!
//! The search engine never owns a concrete container.  It reaches its
//! `(g, rhs, handle)` triples through [`NodeStore`], so the same algorithm
//! runs over a bounded grid (every cell has a dense index, use
//! [`DenseStore`]) and over the zone graph (ids are sparse and never
//! reused, use [`SparseStore`]).

use std::hash::Hash;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use ai_core::{CellId, NodeId};
use ai_heap::Handle;

/// Search bookkeeping for one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SearchState {
    /// Converged cost to the goal.
    pub g:      f32,
    /// One-step lookahead over successors.
    pub rhs:    f32,
    /// Queue entry, while the node is locally inconsistent.
    pub handle: Option<Handle>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self { g: f32::INFINITY, rhs: f32::INFINITY, handle: None }
    }
}

/// Storage for [`SearchState`] keyed by node.
///
/// Nodes that were never touched read as `None` and count as unreachable.
pub trait NodeStore<N> {
    fn get(&self, node: N) -> Option<&SearchState>;

    /// State of `node`, created on first use.
    fn entry(&mut self, node: N) -> &mut SearchState;

    /// Forget every node.
    fn clear(&mut self);

    /// Number of nodes with state.  Dense stores count every slot up to the
    /// highest node touched.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── DenseStore ────────────────────────────────────────────────────────────────

/// Ids that address a contiguous `0..n` range.
pub trait DenseKey: Copy {
    fn dense_index(self) -> usize;
}

impl DenseKey for CellId {
    #[inline(always)]
    fn dense_index(self) -> usize {
        self.index()
    }
}

impl DenseKey for NodeId {
    #[inline(always)]
    fn dense_index(self) -> usize {
        self.index()
    }
}

/// `Vec`-backed store for densely indexed nodes.  Grows on demand, so a
/// capacity hint is an optimisation only.
#[derive(Clone, Debug)]
pub struct DenseStore<I> {
    states: Vec<SearchState>,
    _key:   PhantomData<I>,
}

impl<I> DenseStore<I> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { states: Vec::with_capacity(capacity), _key: PhantomData }
    }
}

impl<I> Default for DenseStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: DenseKey> NodeStore<I> for DenseStore<I> {
    #[inline]
    fn get(&self, node: I) -> Option<&SearchState> {
        self.states.get(node.dense_index())
    }

    fn entry(&mut self, node: I) -> &mut SearchState {
        let i = node.dense_index();
        if i >= self.states.len() {
            self.states.resize(i + 1, SearchState::default());
        }
        &mut self.states[i]
    }

    fn clear(&mut self) {
        // Keep the allocation; the next goal usually touches the same cells.
        self.states.clear();
    }

    fn len(&self) -> usize {
        self.states.len()
    }
}

// ── SparseStore ───────────────────────────────────────────────────────────────

/// Hash-map store for sparse or unbounded node domains.
#[derive(Clone, Debug)]
pub struct SparseStore<N> {
    states: FxHashMap<N, SearchState>,
}

impl<N> SparseStore<N> {
    pub fn new() -> Self {
        Self { states: FxHashMap::default() }
    }
}

impl<N> Default for SparseStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Copy + Eq + Hash> NodeStore<N> for SparseStore<N> {
    #[inline]
    fn get(&self, node: N) -> Option<&SearchState> {
        self.states.get(&node)
    }

    fn entry(&mut self, node: N) -> &mut SearchState {
        self.states.entry(node).or_default()
    }

    fn clear(&mut self) {
        self.states.clear();
    }

    fn len(&self) -> usize {
        self.states.len()
    }
}
