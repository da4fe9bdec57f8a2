//! Goal descriptions consumed by the incremental search.
//!
//! A destination is a set of endpoint nodes plus an admissible distance
//! estimate between arbitrary node pairs.  The search is a backward search,
//! so it asks for `heuristic(start, node)`: the estimate has to hold for any
//! pair, not just "node to goal".
//!
//! Moving destinations report their changes as an [`EndpointDiff`] that the
//! search pulls with [`Destination::take_diff`] at the start of every
//! convergence pass.

use rustc_hash::FxHashMap;

use ai_core::{CellId, GridPos, NodeId, WorldPos, ZoneId};
use ai_spatial::{GridMetric, LocalGrid, ZoneGraph};

use crate::{PathingError, PathingResult};

/// Endpoints that left and joined a destination since the last pull.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndpointDiff<N> {
    pub removed: Vec<N>,
    pub added:   Vec<N>,
}

impl<N> Default for EndpointDiff<N> {
    fn default() -> Self {
        Self { removed: Vec::new(), added: Vec::new() }
    }
}

impl<N: Copy + PartialEq> EndpointDiff<N> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Fold a later change into this one.  A node added and then removed
    /// again (or the reverse) cancels out.
    pub fn merge(&mut self, later: EndpointDiff<N>) {
        for n in later.removed {
            match self.added.iter().position(|&a| a == n) {
                Some(i) => {
                    self.added.swap_remove(i);
                }
                None => self.removed.push(n),
            }
        }
        for n in later.added {
            match self.removed.iter().position(|&r| r == n) {
                Some(i) => {
                    self.removed.swap_remove(i);
                }
                None => self.added.push(n),
            }
        }
    }
}

/// What the search is heading for.
pub trait Destination<N: Copy + PartialEq> {
    fn endpoints(&self) -> &[N];

    /// Lower bound on the travel cost between `from` and `to`.  Must satisfy
    /// the triangle inequality.  The default (zero) turns the search into a
    /// plain incremental Dijkstra.
    fn heuristic(&self, _from: N, _to: N) -> f32 {
        0.0
    }

    /// Whether standing on `node` fulfils the destination.
    fn is_complete(&self, node: N) -> bool {
        self.endpoints().contains(&node)
    }

    /// Pending endpoint changes, cleared by the call.
    fn take_diff(&mut self) -> Option<EndpointDiff<N>> {
        None
    }

    /// Replace the endpoint set, recording the change for `take_diff`.
    /// Fixed destinations refuse and return `false`.
    fn relocate(&mut self, _endpoints: Vec<N>) -> bool {
        false
    }
}

// ── FixedDestination ──────────────────────────────────────────────────────────

/// A fixed endpoint set with no distance estimate.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedDestination<N> {
    endpoints: Vec<N>,
}

impl<N> FixedDestination<N> {
    pub fn new(endpoints: Vec<N>) -> Self {
        Self { endpoints }
    }
}

impl<N: Copy + PartialEq> Destination<N> for FixedDestination<N> {
    fn endpoints(&self) -> &[N] {
        &self.endpoints
    }
}

// ── GridDestination ───────────────────────────────────────────────────────────

/// One or more cells of a [`LocalGrid`], guided by the grid metric.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridDestination {
    metric:    GridMetric,
    endpoints: Vec<CellId>,
}

impl GridDestination {
    /// Target the given positions.  Out-of-bounds positions are errors.
    pub fn new(grid: &LocalGrid, targets: &[GridPos]) -> PathingResult<Self> {
        if targets.is_empty() {
            return Err(PathingError::NoEndpoints);
        }
        let endpoints = targets
            .iter()
            .map(|&p| grid.cell_at(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { metric: grid.metric(), endpoints })
    }

    pub fn cells(metric: GridMetric, endpoints: Vec<CellId>) -> Self {
        Self { metric, endpoints }
    }
}

impl Destination<CellId> for GridDestination {
    fn endpoints(&self) -> &[CellId] {
        &self.endpoints
    }

    fn heuristic(&self, from: CellId, to: CellId) -> f32 {
        self.metric.distance(from, to)
    }
}

// ── ZoneDestination ───────────────────────────────────────────────────────────

/// Connectors of the zone graph, guided by straight-line distance.
///
/// Connector positions are snapshotted at construction.  Connectors built
/// later have no position and estimate to zero, which is still admissible.
#[derive(Clone, Debug)]
pub struct ZoneDestination {
    endpoints: Vec<NodeId>,
    positions: FxHashMap<NodeId, WorldPos>,
}

impl ZoneDestination {
    /// Every connector that opens into `zone`.
    pub fn for_zone(graph: &ZoneGraph, zone: ZoneId) -> PathingResult<Self> {
        Self::connectors(graph, graph.connectors_in(zone).to_vec())
    }

    pub fn connectors(graph: &ZoneGraph, endpoints: Vec<NodeId>) -> PathingResult<Self> {
        if endpoints.is_empty() {
            return Err(PathingError::NoEndpoints);
        }
        let positions = graph.iter().map(|(id, c)| (id, c.pos)).collect();
        Ok(Self { endpoints, positions })
    }
}

impl Destination<NodeId> for ZoneDestination {
    fn endpoints(&self) -> &[NodeId] {
        &self.endpoints
    }

    fn heuristic(&self, from: NodeId, to: NodeId) -> f32 {
        match (self.positions.get(&from), self.positions.get(&to)) {
            (Some(a), Some(b)) => a.distance(*b),
            _ => 0.0,
        }
    }
}

// ── MovingDestination ─────────────────────────────────────────────────────────

/// An endpoint set that changes over time (a wandering target, a bed that
/// got claimed).  Every [`move_to`](Self::move_to) records a diff that the
/// search reconciles before its next pass.
pub struct MovingDestination<N, H = fn(N, N) -> f32> {
    endpoints: Vec<N>,
    pending:   Option<EndpointDiff<N>>,
    heuristic: H,
}

impl<N: Copy + PartialEq> MovingDestination<N> {
    /// A moving destination without a distance estimate.
    pub fn unguided(endpoints: Vec<N>) -> Self {
        Self::new(endpoints, |_, _| 0.0)
    }
}

impl<N, H> MovingDestination<N, H>
where
    N: Copy + PartialEq,
    H: Fn(N, N) -> f32,
{
    pub fn new(endpoints: Vec<N>, heuristic: H) -> Self {
        Self { endpoints, pending: None, heuristic }
    }

    /// Replace the endpoint set.
    pub fn move_to(&mut self, endpoints: Vec<N>) {
        let diff = EndpointDiff {
            removed: self.endpoints.iter().copied().filter(|n| !endpoints.contains(n)).collect(),
            added:   endpoints.iter().copied().filter(|n| !self.endpoints.contains(n)).collect(),
        };
        self.endpoints = endpoints;
        match &mut self.pending {
            Some(pending) => pending.merge(diff),
            None => self.pending = Some(diff),
        }
        if self.pending.as_ref().is_some_and(EndpointDiff::is_empty) {
            self.pending = None;
        }
    }

    pub fn has_pending_diff(&self) -> bool {
        self.pending.is_some()
    }
}

impl<N, H> Destination<N> for MovingDestination<N, H>
where
    N: Copy + PartialEq,
    H: Fn(N, N) -> f32,
{
    fn endpoints(&self) -> &[N] {
        &self.endpoints
    }

    fn heuristic(&self, from: N, to: N) -> f32 {
        (self.heuristic)(from, to)
    }

    fn take_diff(&mut self) -> Option<EndpointDiff<N>> {
        self.pending.take()
    }

    fn relocate(&mut self, endpoints: Vec<N>) -> bool {
        self.move_to(endpoints);
        true
    }
}
