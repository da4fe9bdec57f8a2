//! Unit tests for ai-pathing.

use ai_core::{NodeId, SearchConfig, SimRng};
use ai_spatial::{astar, Graph};

use crate::{DenseStore, FixedDestination, IncrementalSearch};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Small adjacency-list graph over `NodeId(0..n)`.
#[derive(Clone, Debug, Default)]
struct TestGraph {
    out: Vec<Vec<(NodeId, f32)>>,
    inc: Vec<Vec<NodeId>>,
}

impl TestGraph {
    fn with_nodes(n: usize) -> Self {
        Self { out: vec![Vec::new(); n], inc: vec![Vec::new(); n] }
    }

    fn len(&self) -> usize {
        self.out.len()
    }

    fn edge(&mut self, a: u32, b: u32, cost: f32) {
        self.out[a as usize].push((NodeId(b), cost));
        self.inc[b as usize].push(NodeId(a));
    }

    fn both(&mut self, a: u32, b: u32, cost: f32) {
        self.edge(a, b, cost);
        self.edge(b, a, cost);
    }

    fn set_cost(&mut self, a: u32, b: u32, cost: f32) {
        for e in &mut self.out[a as usize] {
            if e.0 == NodeId(b) {
                e.1 = cost;
            }
        }
    }

    /// A–B–C–D–E with unit edges both ways.
    fn line() -> Self {
        let mut g = Self::with_nodes(5);
        for i in 0..4 {
            g.both(i, i + 1, 1.0);
        }
        g
    }

    /// `n` nodes, each with a few random out-edges of integer cost.
    fn random(rng: &mut SimRng, n: usize) -> Self {
        let mut g = Self::with_nodes(n);
        for a in 0..n as u32 {
            let degree = rng.gen_range(1..=4usize);
            for _ in 0..degree {
                let b = rng.gen_range(0..n as u32);
                if b != a && !g.out[a as usize].iter().any(|e| e.0 == NodeId(b)) {
                    let cost = rng.gen_range(1..=9u32) as f32;
                    g.edge(a, b, cost);
                }
            }
        }
        g
    }

    /// Reference distance from `from` to `goal`.
    fn oracle(&self, from: NodeId, goal: NodeId) -> f32 {
        astar(self, from, goal, |_| 0.0).map_or(f32::INFINITY, |r| r.total_cost)
    }
}

impl Graph for TestGraph {
    type Node = NodeId;

    fn successors(&self, node: NodeId, out: &mut Vec<(NodeId, f32)>) {
        out.extend(self.out[node.index()].iter().copied().filter(|e| e.1.is_finite()));
    }

    fn predecessors(&self, node: NodeId, out: &mut Vec<NodeId>) {
        out.extend_from_slice(&self.inc[node.index()]);
    }
}

type TestSearch = IncrementalSearch<TestGraph, DenseStore<NodeId>>;

/// Route `tracing` output through the test harness.  `RUST_LOG=trace` shows
/// every expansion.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn search() -> TestSearch {
    init_tracing();
    IncrementalSearch::new(DenseStore::new(), SearchConfig::default()).unwrap()
}

fn goal(nodes: &[u32]) -> FixedDestination<NodeId> {
    FixedDestination::new(nodes.iter().map(|&n| NodeId(n)).collect())
}

fn assert_close(actual: f32, expected: f32) {
    if expected.is_infinite() {
        assert!(actual.is_infinite(), "expected unreachable, got {actual}");
    } else {
        assert!((actual - expected).abs() < 1e-3, "expected {expected}, got {actual}");
    }
}

// ── Line scenarios ────────────────────────────────────────────────────────────

#[cfg(test)]
mod line {
    use super::*;

    const A: NodeId = NodeId(0);
    const B: NodeId = NodeId(1);
    const C: NodeId = NodeId(2);
    const D: NodeId = NodeId(3);
    const E: NodeId = NodeId(4);

    #[test]
    fn next_hop_walks_toward_goal() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, A);

        assert!(s.is_goal_reachable());
        assert_eq!(s.next_hop(&g, A), Some(B));
        assert_eq!(s.score(A), 4.0);
        assert!(s.is_complete(E));
        assert!(!s.is_complete(D));
    }

    #[test]
    fn cut_edge_makes_goal_unreachable() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, A);

        s.update_edge_cost(&g, C, D, f32::INFINITY).unwrap();
        assert!(!s.is_goal_reachable());
        assert!(s.score(A).is_infinite());
        assert_eq!(s.next_hop(&g, A), None);
    }

    #[test]
    fn clearing_the_override_restores_the_route() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, A);
        s.update_edge_cost(&g, C, D, f32::INFINITY).unwrap();

        s.clear_edge_override(&g, C, D);
        assert!(s.is_goal_reachable());
        assert_eq!(s.score(A), 4.0);
    }

    #[test]
    fn raised_edge_cost_propagates() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, A);
        s.update_edge_cost(&g, B, C, 5.0).unwrap();
        assert_eq!(s.score(A), 8.0);
    }

    #[test]
    fn negative_cost_is_rejected() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        assert!(s.update_edge_cost(&g, A, B, -1.0).is_err());
        assert!(s.update_edge_cost(&g, A, B, f32::NAN).is_err());
    }

    #[test]
    fn repeated_start_changes_nothing() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, C);

        let before: Vec<(f32, f32)> = (0..5).map(|i| (s.score(NodeId(i)), s.rhs(NodeId(i)))).collect();
        let km = s.adjustment();
        assert_eq!(s.update_start(&g, C), 0);
        let after: Vec<(f32, f32)> = (0..5).map(|i| (s.score(NodeId(i)), s.rhs(NodeId(i)))).collect();
        assert_eq!(before, after);
        assert_eq!(s.adjustment(), km);
    }

    #[test]
    fn no_goal_means_unreachable() {
        let g = TestGraph::line();
        let mut s = search();
        s.update_start(&g, A);
        assert!(!s.has_goal());
        assert!(!s.is_goal_reachable());
        assert!(s.score(A).is_infinite());
    }

    #[test]
    fn new_goal_resets_state() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[4]));
        s.update_start(&g, A);
        s.set_goal(&g, goal(&[1]));
        assert_eq!(s.score(A), 1.0);
        assert_eq!(s.next_hop(&g, A), Some(B));
        assert_eq!(s.adjustment(), 0.0);
    }

    #[test]
    fn nearest_of_several_endpoints_wins() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, goal(&[0, 4]));
        s.update_start(&g, B);
        assert_eq!(s.score(B), 1.0);
        assert_eq!(s.next_hop(&g, B), Some(A));
    }

    #[test]
    fn cleared_start_converges_every_node() {
        let g = TestGraph::line();
        let mut s = search();
        s.update_start(&g, D);
        s.set_goal(&g, goal(&[4]));

        s.clear_start();
        assert_eq!(s.start(), None);
        assert!(!s.is_goal_reachable());

        s.update_edge_cost(&g, B, C, 5.0).unwrap();
        assert_eq!(s.queue_len(), 0);
        for n in [A, B, C, D, E] {
            assert!(s.is_consistent(n));
        }
        assert_eq!(s.score(A), 8.0);
    }
}

// ── Algorithm properties ──────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use super::*;

    const SEEDS: u64 = 20;
    const NODES: usize = 30;

    #[test]
    fn full_sweep_leaves_every_node_consistent() {
        let mut rng = SimRng::new(11);
        for seed in 0..SEEDS {
            let g = TestGraph::random(&mut rng.child(seed), NODES);
            let mut s = search();
            s.set_goal(&g, goal(&[0]));
            assert_eq!(s.queue_len(), 0);
            for i in 0..g.len() as u32 {
                assert!(s.is_consistent(NodeId(i)), "seed {seed}: node {i} inconsistent");
            }
        }
    }

    #[test]
    fn scores_match_dijkstra() {
        let mut rng = SimRng::new(12);
        for seed in 0..SEEDS {
            let g = TestGraph::random(&mut rng.child(seed), NODES);
            let mut s = search();
            s.set_goal(&g, goal(&[0]));
            for i in 0..g.len() as u32 {
                assert_close(s.score(NodeId(i)), g.oracle(NodeId(i), NodeId(0)));
            }
        }
    }

    #[test]
    fn edge_edit_matches_fresh_search() {
        let mut rng = SimRng::new(13);
        for seed in 0..SEEDS {
            let mut case = rng.child(seed);
            let mut g = TestGraph::random(&mut case, NODES);
            let start = NodeId(case.gen_range(1..NODES as u32));

            let mut s = search();
            s.set_goal(&g, goal(&[0]));
            s.update_start(&g, start);

            // Edit one existing edge: raise, lower or cut it.
            let a = case.gen_range(0..NODES as u32);
            let Some(&(b, old)) = g.out[a as usize].first() else {
                continue;
            };
            let cost = match case.gen_range(0..3u32) {
                0 => old * 3.0,
                1 => 1.0,
                _ => f32::INFINITY,
            };
            g.set_cost(a, b.0, cost);
            s.update_edge_cost(&g, NodeId(a), b, cost).unwrap();

            assert_close(s.score(start), g.oracle(start, NodeId(0)));

            let mut fresh = search();
            fresh.set_goal(&g, goal(&[0]));
            s.converge_all(&g);
            for i in 0..g.len() as u32 {
                assert_close(s.score(NodeId(i)), fresh.score(NodeId(i)));
            }
        }
    }

    #[test]
    fn next_hop_minimises_edge_plus_score() {
        let mut rng = SimRng::new(14);
        for seed in 0..SEEDS {
            let g = TestGraph::random(&mut rng.child(seed), NODES);
            let mut s = search();
            s.set_goal(&g, goal(&[0]));
            for i in 1..g.len() as u32 {
                let from = NodeId(i);
                let best = g.out[i as usize]
                    .iter()
                    .map(|&(n, c)| c + s.score(n))
                    .fold(f32::INFINITY, f32::min);
                match s.next_hop(&g, from) {
                    Some(hop) => {
                        let c = g.edge_cost(from, hop).unwrap();
                        assert_close(c + s.score(hop), best);
                    }
                    None => assert!(best.is_infinite()),
                }
            }
        }
    }

    #[test]
    fn walking_the_next_hops_reaches_the_goal() {
        let mut rng = SimRng::new(15);
        for seed in 0..SEEDS {
            let g = TestGraph::random(&mut rng.child(seed), NODES);
            let mut s = search();
            s.set_goal(&g, goal(&[0]));
            let mut here = NodeId(NODES as u32 - 1);
            s.update_start(&g, here);
            if !s.is_goal_reachable() {
                continue;
            }
            let expected = s.score(here);
            let mut travelled = 0.0;
            for _ in 0..NODES {
                if s.is_complete(here) {
                    break;
                }
                let next = s.next_hop(&g, here).unwrap();
                travelled += g.edge_cost(here, next).unwrap();
                here = next;
                s.update_start(&g, here);
            }
            assert!(s.is_complete(here));
            assert_close(travelled, expected);
        }
    }
}

// ── Moving destinations ───────────────────────────────────────────────────────

#[cfg(test)]
mod moving {
    use super::*;
    use crate::{Destination, EndpointDiff, MovingDestination, PathingError};

    #[test]
    fn diff_merges_and_cancels() {
        let mut d = MovingDestination::unguided(vec![1u32, 2]);
        d.move_to(vec![2, 3]);
        d.move_to(vec![1, 2]);
        assert!(!d.has_pending_diff());

        d.move_to(vec![4]);
        let diff = d.take_diff().unwrap();
        let mut removed = diff.removed.clone();
        removed.sort();
        assert_eq!(removed, vec![1, 2]);
        assert_eq!(diff.added, vec![4]);
        assert!(d.take_diff().is_none());
    }

    #[test]
    fn explicit_merge() {
        let mut a = EndpointDiff { removed: vec![1], added: vec![2] };
        a.merge(EndpointDiff { removed: vec![2], added: vec![1] });
        assert!(a.is_empty());
    }

    #[test]
    fn moved_goal_is_reconciled_in_place() {
        let g = TestGraph::line();
        let mut s = search();
        s.set_goal(&g, MovingDestination::unguided(vec![NodeId(4)]));
        s.update_start(&g, NodeId(0));
        assert_eq!(s.score(NodeId(0)), 4.0);

        s.move_goal(&g, vec![NodeId(2)]).unwrap();
        assert_eq!(s.score(NodeId(0)), 2.0);
        assert_eq!(s.next_hop(&g, NodeId(0)), Some(NodeId(1)));
        assert!(s.is_complete(NodeId(2)));
        assert!(!s.is_complete(NodeId(4)));

        s.move_goal(&g, vec![NodeId(4)]).unwrap();
        assert_eq!(s.score(NodeId(0)), 4.0);
    }

    #[test]
    fn only_moving_goals_can_move() {
        let g = TestGraph::line();
        let mut s = search();
        assert!(matches!(s.move_goal(&g, vec![NodeId(1)]), Err(PathingError::GoalNotMovable)));

        s.set_goal(&g, goal(&[4]));
        assert!(matches!(s.move_goal(&g, vec![NodeId(1)]), Err(PathingError::GoalNotMovable)));

        s.set_goal(&g, MovingDestination::unguided(vec![NodeId(4)]));
        assert!(matches!(s.move_goal(&g, Vec::new()), Err(PathingError::NoEndpoints)));
    }

    #[test]
    fn moved_goal_matches_dijkstra() {
        const NODES: usize = 25;
        let mut rng = SimRng::new(16);
        for seed in 0..10 {
            let mut case = rng.child(seed);
            let g = TestGraph::random(&mut case, NODES);
            let mut s = search();
            s.set_goal(&g, MovingDestination::unguided(vec![NodeId(0)]));
            s.update_start(&g, NodeId(NODES as u32 - 1));

            let target = NodeId(case.gen_range(1..NODES as u32));
            s.move_goal(&g, vec![target]).unwrap();
            s.converge_all(&g);
            for i in 0..NODES as u32 {
                let expected = g.oracle(NodeId(i), target);
                assert_close(s.score(NodeId(i)), expected);
            }
        }
    }

    /// Shares its endpoint list with the test so it can move mid-search.
    struct Shared(std::rc::Rc<std::cell::RefCell<MovingDestination<NodeId>>>, Vec<NodeId>);

    impl Destination<NodeId> for Shared {
        fn endpoints(&self) -> &[NodeId] {
            &self.1
        }

        fn take_diff(&mut self) -> Option<EndpointDiff<NodeId>> {
            let mut inner = self.0.borrow_mut();
            let diff = inner.take_diff();
            self.1 = inner.endpoints().to_vec();
            diff
        }
    }

    #[test]
    fn endpoint_diff_is_reconciled_before_the_next_pass() {
        let g = TestGraph::line();
        let shared = std::rc::Rc::new(std::cell::RefCell::new(MovingDestination::unguided(vec![NodeId(4)])));
        let mut s = search();
        s.set_goal(&g, Shared(shared.clone(), vec![NodeId(4)]));
        s.update_start(&g, NodeId(0));
        assert_eq!(s.score(NodeId(0)), 4.0);

        shared.borrow_mut().move_to(vec![NodeId(2)]);
        s.compute_shortest_path(&g);
        assert_eq!(s.score(NodeId(0)), 2.0);
        assert_eq!(s.next_hop(&g, NodeId(0)), Some(NodeId(1)));
        assert!(s.is_complete(NodeId(2)));
        assert!(!s.is_complete(NodeId(4)));
    }
}

// ── Grid and zone instantiations ──────────────────────────────────────────────

#[cfg(test)]
mod domains {
    use ai_core::{GridPos, WorldPos, ZoneId};
    use ai_spatial::{Connectivity, LocalGrid, ZoneGraph};

    use super::assert_close;
    use crate::{
        DenseStore, GridDestination, GridSearch, PathingError, SparseStore, ZoneDestination,
        ZoneSearch,
    };
    use ai_core::SearchConfig;

    #[test]
    fn grid_search_replans_around_a_new_wall() {
        let mut grid = LocalGrid::new(ZoneId(0), 7, 5, Connectivity::Four).unwrap();
        let start = grid.cell_id(GridPos::new(0, 2)).unwrap();
        let dest = GridDestination::new(&grid, &[GridPos::new(6, 2)]).unwrap();

        let mut s = GridSearch::new(DenseStore::with_capacity(grid.len()), SearchConfig::default()).unwrap();
        s.set_goal(&grid, dest);
        s.update_start(&grid, start);
        assert_eq!(s.score(start), 6.0);

        for y in 0..4 {
            let cell = grid.set_traversable(GridPos::new(3, y), false).unwrap();
            s.update_node(&grid, cell);
        }
        // Only the bottom row stays open in column 3.
        assert_close(s.score(start), 10.0);
        let hop = s.next_hop(&grid, start).unwrap();
        assert_close(1.0 + s.score(hop), 10.0);

        let gap = grid.set_traversable(GridPos::new(3, 4), false).unwrap();
        s.update_node(&grid, gap);
        assert!(!s.is_goal_reachable());
    }

    #[test]
    fn grid_search_moves_along() {
        let grid = LocalGrid::new(ZoneId(0), 10, 10, Connectivity::Eight).unwrap();
        let dest = GridDestination::new(&grid, &[GridPos::new(9, 9)]).unwrap();
        let mut s = GridSearch::new(DenseStore::new(), SearchConfig::default()).unwrap();
        s.set_goal(&grid, dest);

        let mut here = grid.cell_id(GridPos::new(0, 0)).unwrap();
        s.update_start(&grid, here);
        let mut steps = 0;
        while !s.is_complete(here) {
            here = s.next_hop(&grid, here).unwrap();
            s.update_start(&grid, here);
            steps += 1;
            assert!(steps <= 9);
        }
        assert_eq!(steps, 9);
        assert!(s.adjustment() > 0.0);
    }

    #[test]
    fn out_of_bounds_grid_goal_is_an_error() {
        let grid = LocalGrid::new(ZoneId(0), 3, 3, Connectivity::Four).unwrap();
        assert!(matches!(
            GridDestination::new(&grid, &[GridPos::new(5, 5)]),
            Err(PathingError::Spatial(_))
        ));
        assert!(matches!(GridDestination::new(&grid, &[]), Err(PathingError::NoEndpoints)));
    }

    #[test]
    fn zone_search_reacts_to_recorded_costs() {
        let mut zones = ZoneGraph::new();
        // Two ways from zone 0 to zone 3: through zone 1 or zone 2.
        let door = zones.add_connector(WorldPos::new(0.0, 0.0), ZoneId(0), ZoneId(9));
        let north = zones.add_connector(WorldPos::new(5.0, 5.0), ZoneId(0), ZoneId(1));
        let south = zones.add_connector(WorldPos::new(5.0, -5.0), ZoneId(0), ZoneId(2));
        let exit_n = zones.add_connector(WorldPos::new(10.0, 1.0), ZoneId(1), ZoneId(3));
        let exit_s = zones.add_connector(WorldPos::new(10.0, -1.0), ZoneId(2), ZoneId(3));
        for z in 0..3 {
            zones.link_zone(ZoneId(z));
        }

        let dest = ZoneDestination::for_zone(&zones, ZoneId(3)).unwrap();
        let mut s = ZoneSearch::new(SparseStore::new(), SearchConfig::default()).unwrap();
        s.set_goal(&zones, dest);
        s.update_start(&zones, door);
        assert!(s.is_goal_reachable());
        let first = s.next_hop(&zones, door).unwrap();
        assert!(first == north || first == south);

        // The chosen corridor turns out to be slow.
        let (slow, other) = if first == north { (north, south) } else { (south, north) };
        zones.record_traversal(door, slow, 100.0).unwrap();
        s.update_node(&zones, door);
        assert_eq!(s.next_hop(&zones, door), Some(other));

        let expected = zones.distance(door, other) + zones.distance(other, if other == north { exit_n } else { exit_s });
        assert_close(s.score(door), expected);
    }

    #[test]
    fn demolished_connector_is_routed_around() {
        let mut zones = ZoneGraph::new();
        let a = zones.add_connector(WorldPos::new(0.0, 0.0), ZoneId(0), ZoneId(1));
        let b = zones.add_connector(WorldPos::new(3.0, 0.0), ZoneId(1), ZoneId(2));
        let c = zones.add_connector(WorldPos::new(6.0, 0.0), ZoneId(2), ZoneId(3));
        zones.link_zone(ZoneId(1));
        zones.link_zone(ZoneId(2));

        let mut s = ZoneSearch::new(SparseStore::new(), SearchConfig::default()).unwrap();
        s.set_goal(&zones, ZoneDestination::connectors(&zones, vec![c]).unwrap());
        s.update_start(&zones, a);
        assert_close(s.score(a), 6.0);

        for p in zones.remove_connector(b).unwrap() {
            s.update_node(&zones, p);
        }
        assert!(!s.is_goal_reachable());
    }
}

// ── Serialized goals ──────────────────────────────────────────────────────────

#[cfg(all(test, feature = "serde"))]
mod serde_goals {
    use ai_core::{CellId, NodeId};
    use ai_spatial::{Connectivity, GridMetric};

    use crate::{Destination, EndpointDiff, GridDestination};

    #[test]
    fn diff_round_trips() {
        let diff = EndpointDiff { removed: vec![NodeId(3)], added: vec![NodeId(5), NodeId(8)] };
        let json = serde_json::to_string(&diff).unwrap();
        assert_eq!(json, r#"{"removed":[3],"added":[5,8]}"#);
        assert_eq!(serde_json::from_str::<EndpointDiff<NodeId>>(&json).unwrap(), diff);
    }

    #[test]
    fn grid_goal_keeps_its_metric() {
        let metric = GridMetric { width: 4, connectivity: Connectivity::Four };
        let goal = GridDestination::cells(metric, vec![CellId(5)]);
        let back: GridDestination = serde_json::from_str(&serde_json::to_string(&goal).unwrap()).unwrap();
        assert_eq!(back.endpoints(), &[CellId(5)]);
        assert_eq!(back.heuristic(CellId(0), CellId(5)), 2.0);
    }
}
