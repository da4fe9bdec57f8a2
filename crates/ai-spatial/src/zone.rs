//! Sparse inter-zone connectivity graph: the dictionary node domain.
//!
//! Each node is a *connector* (doorway, bridge, stair) joining exactly two
//! zones.  Two connectors are linked when an agent can walk between them
//! inside a zone they share.  Connectors are created and demolished as the
//! player builds, so ids are never reused and all storage is hashed rather
//! than dense.
//!
//! Edge costs start as straight-line estimates and are replaced with
//! observed costs via [`ZoneGraph::record_traversal`] once an agent has
//! actually walked the connection.  Recorded costs are never allowed below
//! the straight-line distance, which keeps straight-line distance an
//! admissible heuristic for searches over this graph.

use rustc_hash::FxHashMap;

use ai_core::{NodeId, WorldPos, ZoneId};

use crate::{Graph, SpatialError, SpatialResult};

/// One zone connector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connector {
    pub pos:   WorldPos,
    pub zones: (ZoneId, ZoneId),
    /// Closed connectors (locked door, collapsed bridge) keep their edges but
    /// cannot be entered or left.
    pub open:  bool,
}

impl Connector {
    #[inline]
    pub fn joins(&self, zone: ZoneId) -> bool {
        self.zones.0 == zone || self.zones.1 == zone
    }
}

/// Directed connector graph with hashed storage.
#[derive(Clone, Debug, Default)]
pub struct ZoneGraph {
    connectors: FxHashMap<NodeId, Connector>,
    outgoing:   FxHashMap<NodeId, Vec<(NodeId, f32)>>,
    incoming:   FxHashMap<NodeId, Vec<NodeId>>,
    by_zone:    FxHashMap<ZoneId, Vec<NodeId>>,
    next_id:    u32,
}

impl ZoneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn connector(&self, id: NodeId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    /// Every connector, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Connector)> + '_ {
        self.connectors.iter().map(|(&id, c)| (id, c))
    }

    /// Connectors joining `zone`, in creation order.
    pub fn connectors_in(&self, zone: ZoneId) -> &[NodeId] {
        self.by_zone.get(&zone).map_or(&[], Vec::as_slice)
    }

    /// Straight-line distance between two connectors; `INFINITY` if either is
    /// unknown.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f32 {
        match (self.connectors.get(&a), self.connectors.get(&b)) {
            (Some(ca), Some(cb)) => ca.pos.distance(cb.pos),
            _ => f32::INFINITY,
        }
    }

    // ── Construction / demolition ─────────────────────────────────────────

    /// Add an (unlinked) connector between zones `a` and `b`.
    pub fn add_connector(&mut self, pos: WorldPos, a: ZoneId, b: ZoneId) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.connectors.insert(id, Connector { pos, zones: (a, b), open: true });
        self.by_zone.entry(a).or_default().push(id);
        if b != a {
            self.by_zone.entry(b).or_default().push(id);
        }
        id
    }

    /// Demolish a connector and every edge touching it.  Returns the nodes
    /// whose outgoing edges changed, which the caller forwards to live
    /// searches.
    pub fn remove_connector(&mut self, id: NodeId) -> SpatialResult<Vec<NodeId>> {
        let conn = self.connectors.remove(&id).ok_or(SpatialError::UnknownConnector(id))?;
        for zone in [conn.zones.0, conn.zones.1] {
            if let Some(list) = self.by_zone.get_mut(&zone) {
                list.retain(|&n| n != id);
            }
        }
        if let Some(out) = self.outgoing.remove(&id) {
            for (to, _) in out {
                if let Some(inc) = self.incoming.get_mut(&to) {
                    inc.retain(|&n| n != id);
                }
            }
        }
        let preds = self.incoming.remove(&id).unwrap_or_default();
        for &p in &preds {
            if let Some(out) = self.outgoing.get_mut(&p) {
                out.retain(|&(n, _)| n != id);
            }
        }
        Ok(preds)
    }

    /// Open or close a connector.
    pub fn set_open(&mut self, id: NodeId, open: bool) -> SpatialResult<()> {
        let conn = self.connectors.get_mut(&id).ok_or(SpatialError::UnknownConnector(id))?;
        conn.open = open;
        Ok(())
    }

    /// Add or replace the directed edge `from → to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId, cost: f32) -> SpatialResult<()> {
        if cost.is_nan() || cost < 0.0 {
            return Err(SpatialError::InvalidCost(cost));
        }
        for id in [from, to] {
            if !self.connectors.contains_key(&id) {
                return Err(SpatialError::UnknownConnector(id));
            }
        }
        let out = self.outgoing.entry(from).or_default();
        match out.iter_mut().find(|(n, _)| *n == to) {
            Some(edge) => edge.1 = cost,
            None => {
                out.push((to, cost));
                self.incoming.entry(to).or_default().push(from);
            }
        }
        Ok(())
    }

    /// Link every pair of connectors sharing `zone` in both directions with
    /// straight-line cost.  Existing edges keep their (possibly recorded)
    /// cost.  Returns the number of edges added.
    pub fn link_zone(&mut self, zone: ZoneId) -> usize {
        let members = self.connectors_in(zone).to_vec();
        let mut added = 0;
        for &a in &members {
            for &b in &members {
                if a == b || self.has_edge(a, b) {
                    continue;
                }
                let cost = self.distance(a, b);
                self.outgoing.entry(a).or_default().push((b, cost));
                self.incoming.entry(b).or_default().push(a);
                added += 1;
            }
        }
        added
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.outgoing
            .get(&from)
            .is_some_and(|out| out.iter().any(|&(n, _)| n == to))
    }

    /// Replace the cost of `from → to` with what an agent actually spent
    /// walking it.  Returns the stored cost, which is raised to the
    /// straight-line distance if `actual` undercuts it.
    pub fn record_traversal(&mut self, from: NodeId, to: NodeId, actual: f32) -> SpatialResult<f32> {
        if actual.is_nan() || actual < 0.0 {
            return Err(SpatialError::InvalidCost(actual));
        }
        let floor = self.distance(from, to);
        let edge = self
            .outgoing
            .get_mut(&from)
            .and_then(|out| out.iter_mut().find(|(n, _)| *n == to))
            .ok_or(SpatialError::NoEdge { from, to })?;
        edge.1 = actual.max(floor);
        Ok(edge.1)
    }
}

impl Graph for ZoneGraph {
    type Node = NodeId;

    fn successors(&self, node: NodeId, out: &mut Vec<(NodeId, f32)>) {
        if !self.is_traversable(node) {
            return;
        }
        if let Some(edges) = self.outgoing.get(&node) {
            out.extend(edges.iter().copied().filter(|&(n, _)| self.is_traversable(n)));
        }
    }

    fn predecessors(&self, node: NodeId, out: &mut Vec<NodeId>) {
        if let Some(inc) = self.incoming.get(&node) {
            out.extend_from_slice(inc);
        }
    }

    fn is_traversable(&self, node: NodeId) -> bool {
        self.connectors.get(&node).is_some_and(|c| c.open)
    }
}
