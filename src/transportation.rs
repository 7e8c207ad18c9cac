//! S2 — transportation balancing (spec.md §4.2).
//!
//! Grounded on `original_source/src/routing/transportation.py`. The Python
//! solves the bipartite supply/demand problem with
//! `networkx.network_simplex`; `spec.md` §9 explicitly allows substituting a
//! "well-tested SSP (successive shortest paths) min-cost flow" instead, so
//! this module runs its own small min-cost-flow solver (Bellman–Ford-driven
//! successive shortest augmenting paths) over a super-source/super-sink
//! network built from the same supply/demand/distance data the Python
//! computes.

use std::collections::HashMap;

use indexmap::IndexMap;
use noisy_float::types::{r64, R64};

use crate::dijkstra::{self, ShortestPaths};
use crate::error::{EngineError, EngineResult};
use crate::graph::{EdgeData, MultiDiGraph};
use crate::NodeId;

pub struct TransportInfo {
    pub unreachable_supplies: Vec<NodeId>,
    pub transport_cost: f64,
}

/// Adds the cheapest set of deadhead edges to `k` so that every node whose
/// supply/demand participated in the solved flow becomes balanced, per
/// spec.md §4.2. Nodes already balanced, or whose supply/demand could not
/// be routed at all, are left as-is (S4 is the safety net).
pub fn make_balanced_h(k: &MultiDiGraph, f: &MultiDiGraph) -> EngineResult<(MultiDiGraph, TransportInfo)> {
    let imbalance = k.imbalance();
    let supplies: IndexMap<NodeId, i64> = imbalance
        .iter()
        .filter(|(_, imb)| imb.diff > 0)
        .map(|(n, imb)| (n.clone(), imb.diff))
        .collect();
    let demands: IndexMap<NodeId, i64> = imbalance
        .iter()
        .filter(|(_, imb)| imb.diff < 0)
        .map(|(n, imb)| (n.clone(), -imb.diff))
        .collect();

    if supplies.is_empty() && demands.is_empty() {
        return Ok((k.clone(), TransportInfo { unreachable_supplies: Vec::new(), transport_cost: 0.0 }));
    }

    // One all-pairs-from-each-supply Dijkstra run (spec.md §4.2 step 2).
    let paths: IndexMap<NodeId, ShortestPaths> =
        supplies.keys().map(|s| (s.clone(), dijkstra::single_source(f, s))).collect();

    let mut unreachable_supplies = Vec::new();
    let mut reachable_pairs: Vec<(NodeId, NodeId)> = Vec::new();
    for s in supplies.keys() {
        let sp = &paths[s];
        let any = demands.keys().any(|d| sp.dist.contains_key(d));
        if !any {
            unreachable_supplies.push(s.clone());
            continue;
        }
        for d in demands.keys() {
            if sp.dist.contains_key(d) {
                reachable_pairs.push((s.clone(), d.clone()));
            }
        }
    }

    let reachable_supplies: IndexMap<NodeId, i64> = supplies
        .iter()
        .filter(|(s, _)| !unreachable_supplies.contains(*s))
        .map(|(s, &a)| (s.clone(), a))
        .collect();

    let (flow, transport_cost) = solve_min_cost_flow(&reachable_supplies, &demands, &reachable_pairs, &paths);

    let mut h = k.clone();
    for ((s, d), amount) in flow {
        if amount <= 0 {
            continue;
        }
        let node_path = paths[&s].node_path_to(&d).expect("flow only moves along reachable pairs");
        for _ in 0..amount {
            for (a, b) in node_path.iter().zip(node_path.iter().skip(1)) {
                add_deadhead_step(&mut h, f, a, b);
            }
        }
    }
    ensure_node_coordinates(&mut h, f)?;

    Ok((h, TransportInfo { unreachable_supplies, transport_cost }))
}

/// Copies the min-cost `a -> b` edge of `F` into `h`, tagged as a deadhead
/// addition (spec.md §4.2 step 5). Returns the new edge's key so callers
/// can layer on further tags (e.g. `is_component_connector`).
pub(crate) fn add_deadhead_step(
    h: &mut MultiDiGraph,
    f: &MultiDiGraph,
    a: &NodeId,
    b: &NodeId,
) -> crate::graph::EdgeKey {
    let key = f.min_cost_edge_from_to(a, b).expect("path step must exist in F");
    let data = f.edge(&key).expect("looked-up edge exists").clone();
    h.ensure_node(a.clone(), f.node_coords(a).expect("F node has coordinates"));
    h.ensure_node(b.clone(), f.node_coords(b).expect("F node has coordinates"));
    h.add_edge(
        a.clone(),
        b.clone(),
        None,
        EdgeData { mode: crate::graph::EdgeMode::Deadhead, is_deadhead_added: true, ..data },
    )
}

/// Inherits `(x, y)` from `F` for any node that doesn't have it yet
/// (spec.md §4.4's coordinate rule, applied after every stage that adds
/// edges/nodes). Fatal — a topology error — if `F` doesn't have it either
/// (spec.md §7).
pub fn ensure_node_coordinates(h: &mut MultiDiGraph, f: &MultiDiGraph) -> EngineResult<()> {
    let missing: Vec<NodeId> = h.nodes().filter(|n| h.node_coords(*n).is_none()).cloned().collect();
    for n in missing {
        match f.node_coords(&n) {
            Some(c) => h.set_node_coords(n, c),
            None => return Err(EngineError::MissingCoordinates(n)),
        }
    }
    Ok(())
}

/// Min-cost flow over a super-source/super-sink bipartite network via
/// successive shortest augmenting paths (Bellman–Ford, since reverse
/// residual edges carry negative cost). Returns per-`(s, d)` flow amounts
/// and the total transport cost.
fn solve_min_cost_flow(
    supplies: &IndexMap<NodeId, i64>,
    demands: &IndexMap<NodeId, i64>,
    reachable_pairs: &[(NodeId, NodeId)],
    paths: &IndexMap<NodeId, ShortestPaths>,
) -> (HashMap<(NodeId, NodeId), i64>, f64) {
    let mut flow: HashMap<(NodeId, NodeId), i64> = HashMap::new();
    if reachable_pairs.is_empty() {
        return (flow, 0.0);
    }

    // Node numbering: 0 = super source, 1 = super sink, then supplies, then demands.
    let supply_ids: IndexMap<&NodeId, usize> = supplies.keys().enumerate().map(|(i, n)| (n, 2 + i)).collect();
    let demand_ids: IndexMap<&NodeId, usize> =
        demands.keys().enumerate().map(|(i, n)| (n, 2 + supply_ids.len() + i)).collect();
    let n_nodes = 2 + supply_ids.len() + demand_ids.len();
    const SS: usize = 0;
    const TT: usize = 1;

    let mut mcmf = MinCostFlow::new(n_nodes);
    for (&s, &amount) in &supply_ids {
        mcmf.add_edge(SS, amount, supplies[s], r64(0.0));
    }
    for (&d, &amount) in &demand_ids {
        mcmf.add_edge(amount, TT, demands[d], r64(0.0));
    }
    for (s, d) in reachable_pairs {
        let dist = paths[s].dist[d];
        mcmf.add_edge(supply_ids[s], demand_ids[d], i64::MAX / 4, r64(dist.raw().floor()));
    }

    let total_cost = mcmf.solve(SS, TT);

    for (&s, &su) in &supply_ids {
        for (&d, &du) in &demand_ids {
            let amount = mcmf.edge_flow(su, du);
            if amount > 0 {
                flow.insert((s.clone(), d.clone()), amount);
            }
        }
    }
    (flow, total_cost)
}

struct FlowEdge {
    to: usize,
    cap: i64,
    cost: R64,
    flow: i64,
}

/// Textbook successive-shortest-augmenting-path min-cost flow: each edge's
/// reverse is stored at the adjacent index (`i ^ 1`).
struct MinCostFlow {
    adj: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
}

impl MinCostFlow {
    fn new(n: usize) -> Self {
        Self { adj: vec![Vec::new(); n], edges: Vec::new() }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: R64) {
        let fwd = self.edges.len();
        self.edges.push(FlowEdge { to, cap, cost, flow: 0 });
        self.adj[from].push(fwd);
        let bwd = self.edges.len();
        self.edges.push(FlowEdge { to: from, cap: 0, cost: -cost, flow: 0 });
        self.adj[to].push(bwd);
    }

    /// Looks up the flow actually sent along the forward `from -> to` edge
    /// (there is at most one, by construction).
    fn edge_flow(&self, from: usize, to: usize) -> i64 {
        self.adj[from]
            .iter()
            .filter_map(|&i| if self.edges[i].to == to { Some(self.edges[i].flow) } else { None })
            .max()
            .unwrap_or(0)
    }

    fn solve(&mut self, source: usize, sink: usize) -> f64 {
        let n = self.adj.len();
        let mut total_cost = r64(0.0);
        loop {
            let mut dist = vec![r64(f64::INFINITY); n];
            let mut in_edge = vec![None; n];
            dist[source] = r64(0.0);
            // Bellman-Ford: residual graph can contain negative-cost
            // reverse edges, so Dijkstra alone isn't safe here.
            for _ in 0..n {
                let mut updated = false;
                for u in 0..n {
                    if dist[u].raw().is_infinite() {
                        continue;
                    }
                    for &ei in &self.adj[u] {
                        let e = &self.edges[ei];
                        if e.cap - e.flow <= 0 {
                            continue;
                        }
                        let nd = dist[u] + e.cost;
                        if nd < dist[e.to] {
                            dist[e.to] = nd;
                            in_edge[e.to] = Some(ei);
                            updated = true;
                        }
                    }
                }
                if !updated {
                    break;
                }
            }

            if in_edge[sink].is_none() {
                break;
            }

            let mut bottleneck = i64::MAX;
            let mut v = sink;
            while let Some(ei) = in_edge[v] {
                let e = &self.edges[ei];
                bottleneck = bottleneck.min(e.cap - e.flow);
                v = self.edges[ei ^ 1].to;
            }

            let mut v = sink;
            while let Some(ei) = in_edge[v] {
                self.edges[ei].flow += bottleneck;
                self.edges[ei ^ 1].flow -= bottleneck;
                v = self.edges[ei ^ 1].to;
            }

            total_cost += dist[sink] * r64(bottleneck as f64);
        }
        total_cost.raw()
    }
}
