//! The directed multigraph shared by `F`, `K`, `H` and `E` (spec.md §3).
//!
//! Shape is kept from the teacher (`brr.rs`'s `Graph = IndexMap<NodeId,
//! Vec<Rc<Edge>>>`): adjacency lists keyed by node, in insertion order so
//! iteration is deterministic. The teacher's model is undirected-flavored
//! (it folds in/out into one signed "combined degree" for its postman
//! heuristic); this one keeps separate `out`/`in` adjacency because the
//! specification's balance invariant is about directed in-degree vs.
//! out-degree, and edges are owned centrally (`edges: IndexMap<EdgeKey,
//! EdgeData>`) rather than behind `Rc`, since nothing here needs to mutate
//! an edge through two aliases at once.

use std::collections::HashSet;
use std::convert::TryFrom;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data;
use crate::numeric::{try_cost, N64};
use crate::subnetwork::normalize_highway;
use crate::NodeId;

/// `(u, v, k)` — `k` disambiguates parallel edges between the same ordered
/// pair. Loaded edges keep the discriminator from the source JSON (or the
/// next free slot if absent); every deadhead duplicate added afterwards
/// gets the next free `k` for that `(u, v)` pair (mirrors `brr.rs`'s
/// `Edge::dupe` incrementing `iidx`).
pub type EdgeKey = (NodeId, NodeId, u64);

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeMode {
    Sweep,
    Deadhead,
    DeadheadForce,
}

#[derive(Clone, Debug)]
pub struct EdgeData {
    pub length: N64,
    pub geometry: Option<Vec<(f64, f64)>>,
    pub highway: String,
    pub cost: N64,
    pub mode: EdgeMode,
    pub is_deadhead_added: bool,
    pub is_component_connector: bool,
    pub is_force_balance: bool,
    pub reversed_from_oneway: bool,
}

impl EdgeData {
    /// A plain `K`-sourced sweep edge: cost defaults to length, as spec.md
    /// §3 requires ("Derived edge attribute `cost`... Defaults to `length`
    /// when absent").
    pub fn sweep(length: N64, geometry: Option<Vec<(f64, f64)>>, highway: String) -> Self {
        Self {
            length,
            geometry,
            highway,
            cost: length,
            mode: EdgeMode::Sweep,
            is_deadhead_added: false,
            is_component_connector: false,
            is_force_balance: false,
            reversed_from_oneway: false,
        }
    }

    pub(crate) fn reversed_geometry(&self) -> Option<Vec<(f64, f64)>> {
        self.geometry.as_ref().map(|coords| {
            let mut c = coords.clone();
            c.reverse();
            c
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MultiDiGraph {
    nodes: IndexMap<NodeId, (f64, f64)>,
    out: IndexMap<NodeId, Vec<EdgeKey>>,
    inn: IndexMap<NodeId, Vec<EdgeKey>>,
    edges: IndexMap<EdgeKey, EdgeData>,
}

impl MultiDiGraph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn ensure_node(&mut self, id: NodeId, coords: (f64, f64)) {
        self.nodes.entry(id.clone()).or_insert(coords);
        self.out.entry(id.clone()).or_insert_with(Vec::new);
        self.inn.entry(id).or_insert_with(Vec::new);
    }

    pub fn node_coords(&self, id: &NodeId) -> Option<(f64, f64)> {
        self.nodes.get(id).copied()
    }

    pub fn set_node_coords(&mut self, id: NodeId, coords: (f64, f64)) {
        self.nodes.insert(id, coords);
    }

    /// Allocates the next free discriminator for a given `(u, v)` pair.
    fn next_key(&self, u: &NodeId, v: &NodeId) -> u64 {
        self.edges
            .keys()
            .filter(|(eu, ev, _)| eu == u && ev == v)
            .map(|(_, _, k)| *k)
            .max()
            .map_or(0, |k| k + 1)
    }

    /// Adds `u -> v` with the given data, allocating a key if `k` is `None`.
    /// Both endpoints must already have coordinates via `ensure_node`.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, k: Option<u64>, data: EdgeData) -> EdgeKey {
        let k = k.unwrap_or_else(|| self.next_key(&u, &v));
        let key: EdgeKey = (u.clone(), v.clone(), k);
        self.out.entry(u).or_insert_with(Vec::new).push(key.clone());
        self.inn.entry(v).or_insert_with(Vec::new).push(key.clone());
        self.edges.insert(key.clone(), data);
        key
    }

    /// Adds the reverse-traversal counterpart of `key` (same endpoints
    /// swapped, geometry reversed if present) — used by forced balancing
    /// (spec.md §4.4) when only the opposite direction exists in `F`.
    pub fn add_reversed_edge(&mut self, key: &EdgeKey, mode: EdgeMode) -> Option<EdgeKey> {
        let data = self.edges.get(key)?.clone();
        let (u, v, _) = key.clone();
        let reversed = EdgeData {
            geometry: data.reversed_geometry(),
            mode,
            reversed_from_oneway: true,
            is_force_balance: true,
            ..data
        };
        Some(self.add_edge(v, u, None, reversed))
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn edge_mut(&mut self, key: &EdgeKey) -> Option<&mut EdgeData> {
        self.edges.get_mut(key)
    }

    pub fn out_edges(&self, n: &NodeId) -> &[EdgeKey] {
        self.out.get(n).map_or(&[], |v| v.as_slice())
    }

    pub fn in_edges(&self, n: &NodeId) -> &[EdgeKey] {
        self.inn.get(n).map_or(&[], |v| v.as_slice())
    }

    pub fn out_degree(&self, n: &NodeId) -> usize {
        self.out_edges(n).len()
    }

    pub fn in_degree(&self, n: &NodeId) -> usize {
        self.in_edges(n).len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgeData)> {
        self.edges.iter()
    }

    pub fn has_edge_from_to(&self, u: &NodeId, v: &NodeId) -> bool {
        self.out_edges(u).iter().any(|(_, ev, _)| ev == v)
    }

    /// All edges directed `u -> v` (there may be several parallel ones).
    pub fn edges_from_to(&self, u: &NodeId, v: &NodeId) -> Vec<EdgeKey> {
        self.out_edges(u).iter().filter(|(_, ev, _)| ev == v).cloned().collect()
    }

    /// The minimum-`cost` edge among the (possibly several) parallel edges
    /// `u -> v`, breaking ties by first-encountered (spec.md §4.2's "tie
    /// broken arbitrarily but deterministically").
    pub fn min_cost_edge_from_to(&self, u: &NodeId, v: &NodeId) -> Option<EdgeKey> {
        self.edges_from_to(u, v).into_iter().min_by_key(|k| self.edges[k].cost)
    }

    /// Weak components: maximal sets of nodes mutually reachable when
    /// edges are considered undirected (spec.md GLOSSARY). Plain
    /// union-find, grounded in the shape of `petgraph`'s
    /// `utilities::union_find` (by-rank, path-compressing).
    pub fn weak_components(&self) -> Vec<Vec<NodeId>> {
        let index: IndexMap<&NodeId, usize> = self.nodes.keys().enumerate().map(|(i, n)| (n, i)).collect();
        let mut uf = UnionFind::new(index.len());
        for (u, v, _) in self.edges.keys() {
            uf.union(index[u], index[v]);
        }
        let mut groups: IndexMap<usize, Vec<NodeId>> = IndexMap::new();
        for (n, &i) in &index {
            groups.entry(uf.find(i)).or_insert_with(Vec::new).push((*n).clone());
        }
        groups.into_values().collect()
    }

    /// Per-node `(in_degree, out_degree, diff, type)` (spec.md §3).
    pub fn imbalance(&self) -> IndexMap<NodeId, Imbalance> {
        self.nodes
            .keys()
            .map(|n| (n.clone(), Imbalance::new(self.in_degree(n), self.out_degree(n))))
            .collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ImbalanceKind {
    Balanced,
    Supply,
    Demand,
}

#[derive(Clone, Copy, Debug)]
pub struct Imbalance {
    pub in_degree: usize,
    pub out_degree: usize,
    pub diff: i64,
    pub kind: ImbalanceKind,
}

impl Imbalance {
    fn new(in_degree: usize, out_degree: usize) -> Self {
        let diff = in_degree as i64 - out_degree as i64;
        let kind = match diff {
            0 => ImbalanceKind::Balanced,
            d if d > 0 => ImbalanceKind::Supply,
            _ => ImbalanceKind::Demand,
        };
        Self { in_degree, out_degree, diff, kind }
    }
}

impl TryFrom<&data::RoadGraph> for MultiDiGraph {
    type Error = String;

    fn try_from(rs: &data::RoadGraph) -> Result<Self, Self::Error> {
        let mut g = MultiDiGraph::empty();
        for n in &rs.nodes.nodes {
            g.ensure_node(n.id.clone(), n.coordinates);
        }
        for r in &rs.roads {
            if g.node_coords(&r.p1).is_none() || g.node_coords(&r.p2).is_none() {
                return Err(format!("road segment references unknown node ({} -> {})", r.p1, r.p2));
            }
            let length = try_cost(r.length).ok_or_else(|| format!("non-finite length on {} -> {}", r.p1, r.p2))?;
            let highway = normalize_highway(&r.highway).to_string();
            let data = EdgeData::sweep(length, r.geometry.clone(), highway);
            g.add_edge(r.p1.clone(), r.p2.clone(), r.discriminator, data);
        }
        Ok(g)
    }
}

/// Minimal by-rank, path-compressing union-find over `0..n` — same shape
/// as `petgraph`'s internal `UnionFind`, trimmed to what `weak_components`
/// needs.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect(), rank: vec![0; n] }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Every node reachable from `n` ignoring edge direction — used by
/// forced balancing's undirected fallback lookups (spec.md §4.4).
pub fn undirected_neighbors(g: &MultiDiGraph, n: &NodeId) -> HashSet<NodeId> {
    let mut s: HashSet<NodeId> = g.out_edges(n).iter().map(|(_, v, _)| v.clone()).collect();
    s.extend(g.in_edges(n).iter().map(|(u, _, _)| u.clone()));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HighwayValue, Node, RoadGraph, RoadGraphNodes, RoadSegment};
    use crate::numeric::n64;

    fn triangle() -> MultiDiGraph {
        let rg = RoadGraph {
            nodes: RoadGraphNodes {
                nodes: vec![
                    Node { id: "1".into(), coordinates: (0.0, 0.0) },
                    Node { id: "2".into(), coordinates: (1.0, 0.0) },
                    Node { id: "3".into(), coordinates: (1.0, 1.0) },
                ],
            },
            roads: vec![
                RoadSegment { p1: "1".into(), p2: "2".into(), discriminator: None, length: 100.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
                RoadSegment { p1: "2".into(), p2: "3".into(), discriminator: None, length: 100.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
                RoadSegment { p1: "3".into(), p2: "1".into(), discriminator: None, length: 100.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
            ],
        };
        MultiDiGraph::try_from(&rg).unwrap()
    }

    #[test]
    fn loads_and_balances_a_triangle() {
        let g = triangle();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        for n in g.nodes().cloned().collect::<Vec<_>>() {
            assert_eq!(g.in_degree(&n), 1);
            assert_eq!(g.out_degree(&n), 1);
        }
    }

    #[test]
    fn single_weak_component() {
        let g = triangle();
        assert_eq!(g.weak_components().len(), 1);
    }

    #[test]
    fn auto_discriminator_increments() {
        let mut g = MultiDiGraph::empty();
        g.ensure_node("a".into(), (0.0, 0.0));
        g.ensure_node("b".into(), (1.0, 0.0));
        let k1 = g.add_edge("a".into(), "b".into(), None, EdgeData::sweep(n64(10.0), None, "residential".into()));
        let k2 = g.add_edge("a".into(), "b".into(), None, EdgeData::sweep(n64(10.0), None, "residential".into()));
        assert_eq!(k1.2, 0);
        assert_eq!(k2.2, 1);
        assert_eq!(g.edges_from_to(&"a".into(), &"b".into()).len(), 2);
    }

    #[test]
    fn min_cost_edge_breaks_ties_deterministically() {
        let mut g = MultiDiGraph::empty();
        g.ensure_node("a".into(), (0.0, 0.0));
        g.ensure_node("b".into(), (1.0, 0.0));
        g.add_edge("a".into(), "b".into(), None, EdgeData::sweep(n64(10.0), None, "residential".into()));
        g.add_edge("a".into(), "b".into(), None, EdgeData::sweep(n64(5.0), None, "residential".into()));
        let picked = g.min_cost_edge_from_to(&"a".into(), &"b".into()).unwrap();
        assert_eq!(g.edge(&picked).unwrap().cost, n64(5.0));
    }
}
