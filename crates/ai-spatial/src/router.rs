//! One-shot routing: turn a `(from, to)` query into a concrete waypoint list.
//!
//! # Pluggability
//!
//! The background [`MaterializerPool`][crate::MaterializerPool] calls routing
//! through the [`Router`] trait, so hosts can swap in a router that knows
//! more about their map.  Three implementations ship here: plain
//! [`DijkstraRouter`] for any graph, and A* routers with the admissible
//! metric of each node domain ([`GridRouter`], [`ZoneRouter`]).
//!
//! # Determinism
//!
//! Open-set ties on `f` are broken by insertion order, so identical graphs
//! and queries always yield identical routes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use ai_core::{CellId, NodeId};

use crate::{Graph, LocalGrid, ZoneGraph};

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered waypoint list from source to destination (both inclusive).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route<N> {
    pub nodes:      Vec<N>,
    pub total_cost: f32,
}

impl<N: Copy> Route<N> {
    /// `true` if source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The route as consecutive `(from, to)` edges.
    pub fn edges(&self) -> impl Iterator<Item = (N, N)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable one-shot routing engine.
///
/// Implementations must be `Send + Sync` so a pool can share one instance
/// across worker threads.
pub trait Router<G: Graph>: Send + Sync {
    /// Cheapest route from `from` to `to`, or `None` if none exists.
    fn route(&self, graph: &G, from: G::Node, to: G::Node) -> Option<Route<G::Node>>;
}

/// Dijkstra (A* with a zero heuristic).  Works on any graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl<G: Graph> Router<G> for DijkstraRouter {
    fn route(&self, graph: &G, from: G::Node, to: G::Node) -> Option<Route<G::Node>> {
        astar(graph, from, to, |_| 0.0)
    }
}

/// A* over a [`LocalGrid`] with the grid's octile/Manhattan metric.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridRouter;

impl Router<LocalGrid> for GridRouter {
    fn route(&self, graph: &LocalGrid, from: CellId, to: CellId) -> Option<Route<CellId>> {
        let metric = graph.metric();
        astar(graph, from, to, |n| metric.distance(n, to))
    }
}

/// A* over a [`ZoneGraph`] with straight-line distance.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoneRouter;

impl Router<ZoneGraph> for ZoneRouter {
    fn route(&self, graph: &ZoneGraph, from: NodeId, to: NodeId) -> Option<Route<NodeId>> {
        astar(graph, from, to, |n| graph.distance(n, to))
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry<N> {
    node:  N,
    f:     f32,
    order: u64,
}

impl<N> PartialEq for OpenEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for OpenEntry<N> {}

impl<N> PartialOrd for OpenEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for OpenEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smallest f, then earliest insertion, is "greatest".
        other.f.total_cmp(&self.f).then_with(|| other.order.cmp(&self.order))
    }
}

/// A* from `from` to `to`.  `h(n)` must never overestimate the remaining
/// cost from `n` to `to`.
pub fn astar<G, H>(graph: &G, from: G::Node, to: G::Node, h: H) -> Option<Route<G::Node>>
where
    G: Graph,
    H: Fn(G::Node) -> f32,
{
    if from == to {
        return graph.is_traversable(from).then(|| Route { nodes: vec![from], total_cost: 0.0 });
    }

    let mut g_score: FxHashMap<G::Node, f32> = FxHashMap::default();
    let mut came_from: FxHashMap<G::Node, G::Node> = FxHashMap::default();
    let mut open = BinaryHeap::new();
    let mut order = 0u64;
    let mut succ = Vec::new();

    g_score.insert(from, 0.0);
    open.push(OpenEntry { node: from, f: h(from), order });

    while let Some(OpenEntry { node, f, .. }) = open.pop() {
        let g = g_score.get(&node).copied().unwrap_or(f32::INFINITY);
        if node == to {
            return Some(reconstruct(&came_from, from, to, g));
        }
        // Skip stale entries left behind by a later improvement.
        if f > g + h(node) {
            continue;
        }

        succ.clear();
        graph.successors(node, &mut succ);
        for &(next, cost) in &succ {
            let tentative = g + cost;
            if !tentative.is_finite() {
                continue;
            }
            if tentative < g_score.get(&next).copied().unwrap_or(f32::INFINITY) {
                g_score.insert(next, tentative);
                came_from.insert(next, node);
                order += 1;
                open.push(OpenEntry { node: next, f: tentative + h(next), order });
            }
        }
    }

    None
}

fn reconstruct<N: Copy + Eq + std::hash::Hash>(
    came_from:  &FxHashMap<N, N>,
    from:       N,
    to:         N,
    total_cost: f32,
) -> Route<N> {
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        match came_from.get(&cur) {
            Some(&prev) => {
                nodes.push(prev);
                cur = prev;
            }
            None => break,
        }
    }
    nodes.reverse();
    Route { nodes, total_cost }
}
