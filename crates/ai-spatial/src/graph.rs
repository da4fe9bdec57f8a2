//! The `Graph` trait: what the searches need from a map collaborator.

use std::fmt::Debug;
use std::hash::Hash;

/// A directed, cost-weighted traversal graph owned by the caller.
///
/// Searches borrow the graph per call and never keep it, so the map stays
/// free to change between ticks.  After a change the caller reports it to
/// each live search (`update_node`, `update_edge_cost`).
///
/// Both enumeration methods **append** to `out`; callers clear the buffer
/// first.  This keeps the hot loops allocation-free.
pub trait Graph {
    type Node: Copy + Eq + Hash + Debug;

    /// Outgoing edges of `node` as `(neighbour, cost)`.  Costs are
    /// non-negative; `f32::INFINITY` is allowed and means "currently
    /// impassable".
    fn successors(&self, node: Self::Node, out: &mut Vec<(Self::Node, f32)>);

    /// Nodes that may have an edge into `node`.  A superset is fine; the
    /// incremental search only uses it to decide whose lookahead to
    /// recompute.
    fn predecessors(&self, node: Self::Node, out: &mut Vec<Self::Node>);

    /// Whether an agent may stand on `node` at all.
    fn is_traversable(&self, _node: Self::Node) -> bool {
        true
    }

    /// Cost of the direct edge `from → to`, if there is one.
    fn edge_cost(&self, from: Self::Node, to: Self::Node) -> Option<f32> {
        let mut buf = Vec::new();
        self.successors(from, &mut buf);
        buf.into_iter().find(|&(n, _)| n == to).map(|(_, c)| c)
    }
}
