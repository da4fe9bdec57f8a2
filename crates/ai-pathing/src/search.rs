//! The incremental search engine (D*-Lite, backward from the endpoints).
//!
//! # Values
//!
//! - `g(n)`: converged cost from `n` to the nearest endpoint.
//! - `rhs(n)`: one-step lookahead, `min over successors s of c(n, s) + g(s)`,
//!   or `0` on a traversable endpoint.
//! - A node is *consistent* when `g == rhs` within `SearchConfig::tolerance`.
//!   Exactly the inconsistent nodes sit in the queue.
//!
//! # Keys
//!
//! `key(n) = (min(g, rhs) + h(start, n) + km, min(g, rhs))`.  When the start
//! moves, `km` grows by `h(old_start, new_start)` instead of re-keying the
//! whole queue; entries whose stored key went stale are re-keyed lazily when
//! popped.
//!
//! # Termination
//!
//! With a start, a pass stops once the best queued key no longer precedes
//! `key(start)` and the start is consistent: only the values the start's
//! path depends on are converged.  Without a start (or via
//! [`converge_all`](IncrementalSearch::converge_all)) the queue is drained
//! and every node reachable backwards from an endpoint is exact.
//!
//! # Edits
//!
//! The graph belongs to the caller and is borrowed per call.  After editing
//! it, the caller reports the change (`update_node`, `update_edge_cost`);
//! each call applies and re-converges before returning.

use std::mem;

use rustc_hash::{FxHashMap, FxHashSet};

use ai_core::{CellId, NodeId, SearchConfig};
use ai_heap::{Comparator, PairingHeap};
use ai_spatial::{Graph, LocalGrid, ZoneGraph};

use crate::{
    DenseStore, Destination, KeyOrder, NodeStore, PathingError, PathingResult, PriorityKey,
    SparseStore,
};

/// Search over a bounded local grid.
pub type GridSearch = IncrementalSearch<LocalGrid, DenseStore<CellId>>;

/// Search over the inter-zone connector graph.
pub type ZoneSearch = IncrementalSearch<ZoneGraph, SparseStore<NodeId>>;

/// D*-Lite generic over the graph and the node-state storage.
pub struct IncrementalSearch<G: Graph, S> {
    config:      SearchConfig,
    store:       S,
    queue:       PairingHeap<G::Node, PriorityKey, KeyOrder>,
    destination: Option<Box<dyn Destination<G::Node>>>,
    endpoints:   FxHashSet<G::Node>,
    overrides:   FxHashMap<(G::Node, G::Node), f32>,
    start:       Option<G::Node>,
    km:          f32,
    succ_buf:    Vec<(G::Node, f32)>,
    pred_buf:    Vec<G::Node>,
}

impl<G, S> IncrementalSearch<G, S>
where
    G: Graph,
    S: NodeStore<G::Node>,
{
    pub fn new(store: S, config: SearchConfig) -> PathingResult<Self> {
        config.validate()?;
        Ok(Self {
            queue: PairingHeap::with_comparator(KeyOrder::new(config.tolerance)),
            config,
            store,
            destination: None,
            endpoints: FxHashSet::default(),
            overrides: FxHashMap::default(),
            start: None,
            km: 0.0,
            succ_buf: Vec::new(),
            pred_buf: Vec::new(),
        })
    }

    // ── Goal / start ──────────────────────────────────────────────────────

    /// Head for `destination`.  Drops all search state and the queue (edge
    /// overrides and the start survive), seeds the endpoints and converges.
    pub fn set_goal<D>(&mut self, graph: &G, destination: D) -> usize
    where
        D: Destination<G::Node> + 'static,
    {
        let mut destination: Box<dyn Destination<G::Node>> = Box::new(destination);
        // A fresh goal starts from its current endpoints; older moves are moot.
        let _ = destination.take_diff();

        self.store.clear();
        self.queue.clear();
        self.km = 0.0;
        self.endpoints = destination.endpoints().iter().copied().collect();
        tracing::debug!(endpoints = self.endpoints.len(), start = ?self.start, "search goal set");
        self.destination = Some(destination);

        let seeds: Vec<G::Node> = self.endpoints.iter().copied().collect();
        for node in seeds {
            self.update_vertex(graph, node);
        }
        self.compute_shortest_path(graph)
    }

    /// Move a moving goal to `endpoints` and re-converge.  Only the
    /// endpoints that changed are touched; the rest of the search state is
    /// kept.
    pub fn move_goal(&mut self, graph: &G, endpoints: Vec<G::Node>) -> PathingResult<usize> {
        if endpoints.is_empty() {
            return Err(PathingError::NoEndpoints);
        }
        let moved = self.destination.as_mut().is_some_and(|d| d.relocate(endpoints));
        if !moved {
            return Err(PathingError::GoalNotMovable);
        }
        Ok(self.compute_shortest_path(graph))
    }

    /// Move the search origin to `node`.  Repeating the current start is a
    /// no-op.
    pub fn update_start(&mut self, graph: &G, node: G::Node) -> usize {
        if self.start == Some(node) {
            return 0;
        }
        if let Some(last) = self.start {
            self.km += self.heuristic(last, node);
        }
        self.start = Some(node);
        self.compute_shortest_path(graph)
    }

    /// Forget the start; the next pass converges everything again.
    pub fn clear_start(&mut self) {
        self.start = None;
    }

    // ── Edits ─────────────────────────────────────────────────────────────

    /// Override the cost of the directed edge `a → b`.  Only edges the graph
    /// already reports are affected.  `f32::INFINITY` cuts the edge.
    pub fn update_edge_cost(&mut self, graph: &G, a: G::Node, b: G::Node, cost: f32) -> PathingResult<usize> {
        if cost.is_nan() || cost < 0.0 {
            return Err(PathingError::InvalidCost(cost));
        }
        self.overrides.insert((a, b), cost);
        self.update_vertex(graph, a);
        Ok(self.compute_shortest_path(graph))
    }

    /// Drop an override set by [`update_edge_cost`](Self::update_edge_cost).
    pub fn clear_edge_override(&mut self, graph: &G, a: G::Node, b: G::Node) -> usize {
        if self.overrides.remove(&(a, b)).is_none() {
            return 0;
        }
        self.update_vertex(graph, a);
        self.compute_shortest_path(graph)
    }

    /// The graph changed around `node` (blocked, opened, re-costed, built or
    /// demolished).  Recomputes `node` and everything that may lead into it.
    pub fn update_node(&mut self, graph: &G, node: G::Node) -> usize {
        self.update_vertex(graph, node);
        self.update_predecessors(graph, node);
        self.compute_shortest_path(graph)
    }

    // ── Convergence ───────────────────────────────────────────────────────

    /// Reconcile pending destination moves, then converge.  Returns the
    /// number of node expansions.
    pub fn compute_shortest_path(&mut self, graph: &G) -> usize {
        self.run(graph, self.start.is_some())
    }

    /// Drain the queue regardless of the start, so that `score` is exact for
    /// every node.
    pub fn converge_all(&mut self, graph: &G) -> usize {
        self.run(graph, false)
    }

    fn run(&mut self, graph: &G, bounded: bool) -> usize {
        self.reconcile_destination(graph);

        let mut expansions = 0;
        while let Some(&top) = self.queue.top_priority() {
            if let Some(start) = self.start.filter(|_| bounded) {
                let start_key = self.key(start);
                if !self.queue.comparator().precedes(&top, &start_key) && self.is_consistent(start) {
                    break;
                }
            }

            let Some((node, old_key)) = self.queue.pop_with_priority() else {
                break;
            };
            self.store.entry(node).handle = None;

            let new_key = self.key(node);
            if self.queue.comparator().precedes(&old_key, &new_key) {
                let handle = self.queue.push(node, new_key);
                self.store.entry(node).handle = Some(handle);
                continue;
            }

            expansions += 1;
            let state = self.store.entry(node);
            if state.g > state.rhs {
                state.g = state.rhs;
                tracing::trace!(?node, g = state.g, "overconsistent node settled");
            } else {
                state.g = f32::INFINITY;
                tracing::trace!(?node, "underconsistent node raised");
                self.update_vertex(graph, node);
            }
            self.update_predecessors(graph, node);
        }

        if expansions > 0 {
            tracing::debug!(
                expansions,
                queued = self.queue.len(),
                reachable = self.is_goal_reachable(),
                "search converged"
            );
        }
        expansions
    }

    fn reconcile_destination(&mut self, graph: &G) {
        let Some(diff) = self.destination.as_mut().and_then(|d| d.take_diff()) else {
            return;
        };
        tracing::debug!(
            removed = diff.removed.len(),
            added = diff.added.len(),
            "destination moved"
        );
        for node in &diff.removed {
            self.endpoints.remove(node);
        }
        self.endpoints.extend(diff.added.iter().copied());
        for node in diff.removed.into_iter().chain(diff.added) {
            self.update_vertex(graph, node);
        }
    }

    /// Recompute `rhs(node)` and bring its queue entry in line.
    fn update_vertex(&mut self, graph: &G, node: G::Node) {
        let rhs = if self.endpoints.contains(&node) {
            if graph.is_traversable(node) { 0.0 } else { f32::INFINITY }
        } else {
            self.lookahead(graph, node)
        };

        let state = self.store.entry(node);
        state.rhs = rhs;
        let (g, handle) = (state.g, state.handle);

        if self.config.approx_eq(g, rhs) {
            if let Some(handle) = handle {
                self.queue.remove(handle);
                self.store.entry(node).handle = None;
            }
            return;
        }
        let key = self.key_from(node, g.min(rhs));
        match handle {
            Some(handle) => self.queue.change_priority(handle, key),
            None => {
                let handle = self.queue.push(node, key);
                self.store.entry(node).handle = Some(handle);
            }
        }
    }

    fn update_predecessors(&mut self, graph: &G, node: G::Node) {
        let mut preds = mem::take(&mut self.pred_buf);
        preds.clear();
        graph.predecessors(node, &mut preds);
        for &p in &preds {
            self.update_vertex(graph, p);
        }
        self.pred_buf = preds;
    }

    /// `min over successors s of c(node, s) + g(s)`.
    fn lookahead(&mut self, graph: &G, node: G::Node) -> f32 {
        let mut succ = mem::take(&mut self.succ_buf);
        self.successors(graph, node, &mut succ);
        let best = succ
            .iter()
            .map(|&(s, c)| c + self.score(s))
            .fold(f32::INFINITY, f32::min);
        self.succ_buf = succ;
        best
    }

    /// Graph successors with edge overrides applied.
    fn successors(&self, graph: &G, node: G::Node, out: &mut Vec<(G::Node, f32)>) {
        out.clear();
        graph.successors(node, out);
        if self.overrides.is_empty() {
            return;
        }
        for (next, cost) in out.iter_mut() {
            if let Some(&c) = self.overrides.get(&(node, *next)) {
                *cost = c;
            }
        }
    }

    fn heuristic(&self, from: G::Node, to: G::Node) -> f32 {
        self.destination.as_ref().map_or(0.0, |d| d.heuristic(from, to))
    }

    fn key(&self, node: G::Node) -> PriorityKey {
        let (g, rhs) = self.store.get(node).map_or((f32::INFINITY, f32::INFINITY), |s| (s.g, s.rhs));
        self.key_from(node, g.min(rhs))
    }

    fn key_from(&self, node: G::Node, best: f32) -> PriorityKey {
        let h = self.start.map_or(0.0, |start| self.heuristic(start, node));
        PriorityKey(best + h + self.km, best)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The successor of `from` minimising `edge cost + g(successor)`.  On a
    /// tie the first one in successor order wins.  `None` when no successor
    /// leads anywhere; check [`is_goal_reachable`](Self::is_goal_reachable)
    /// first.
    pub fn next_hop(&mut self, graph: &G, from: G::Node) -> Option<G::Node> {
        let mut succ = mem::take(&mut self.succ_buf);
        self.successors(graph, from, &mut succ);
        let mut best: Option<(G::Node, f32)> = None;
        for &(s, c) in &succ {
            let total = c + self.score(s);
            if total.is_finite() && best.is_none_or(|(_, b)| total < b) {
                best = Some((s, total));
            }
        }
        self.succ_buf = succ;
        best.map(|(s, _)| s)
    }

    /// `true` iff a start is set and its cost to the goal is finite.
    pub fn is_goal_reachable(&self) -> bool {
        self.start.is_some_and(|s| self.score(s).is_finite())
    }

    /// Converged cost from `node` to the goal; `INFINITY` if unknown or
    /// unreachable.
    #[inline]
    pub fn score(&self, node: G::Node) -> f32 {
        self.store.get(node).map_or(f32::INFINITY, |s| s.g)
    }

    pub fn rhs(&self, node: G::Node) -> f32 {
        self.store.get(node).map_or(f32::INFINITY, |s| s.rhs)
    }

    pub fn is_consistent(&self, node: G::Node) -> bool {
        self.store.get(node).is_none_or(|s| self.config.approx_eq(s.g, s.rhs))
    }

    /// Whether standing on `node` fulfils the current destination.
    pub fn is_complete(&self, node: G::Node) -> bool {
        self.destination.as_ref().is_some_and(|d| d.is_complete(node))
    }

    pub fn has_goal(&self) -> bool {
        self.destination.is_some()
    }

    pub fn start(&self) -> Option<G::Node> {
        self.start
    }

    /// Accumulated key adjustment `km`.
    pub fn adjustment(&self) -> f32 {
        self.km
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
