//! Single-source shortest paths over `F`, weighted by `cost` (spec.md §4.2,
//! §4.3, §4.4 all shell out to this). Grounded on `brr.rs::pathfind`: a
//! `priority_queue::PriorityQueue` min-heap driven by pushing
//! `Reverse(distance)` so the max-heap crate behaves like a min-heap —
//! the teacher achieves the same effect by pushing `-d` on its (signed,
//! negatable) `f64s`; `N64` can't be negated, so `Reverse` is the idiomatic
//! substitute.

use std::cmp::Reverse;
use std::collections::HashSet;

use indexmap::IndexMap;
use priority_queue::PriorityQueue;

use crate::graph::{EdgeKey, MultiDiGraph};
use crate::numeric::{n64, N64};
use crate::NodeId;

/// Distances and predecessor edges from `source` to every reachable node.
pub struct ShortestPaths {
    pub dist: IndexMap<NodeId, N64>,
    prev: IndexMap<NodeId, EdgeKey>,
}

impl ShortestPaths {
    /// Reconstructs the edge path from `source` to `target`, or `None` if
    /// `target` was unreachable.
    pub fn path_to(&self, target: &NodeId) -> Option<Vec<EdgeKey>> {
        if !self.dist.contains_key(target) {
            return None;
        }
        let mut path = Vec::new();
        let mut v = target.clone();
        while let Some(edge) = self.prev.get(&v) {
            path.push(edge.clone());
            v = edge.0.clone();
        }
        path.reverse();
        Some(path)
    }

    /// Like [`path_to`](Self::path_to), but as the sequence of nodes
    /// visited rather than the edges taken — what S2/S3/S4 actually need
    /// to walk the path step by step.
    pub fn node_path_to(&self, target: &NodeId) -> Option<Vec<NodeId>> {
        let edges = self.path_to(target)?;
        if edges.is_empty() {
            return Some(vec![target.clone()]);
        }
        let mut nodes = vec![edges[0].0.clone()];
        nodes.extend(edges.iter().map(|e| e.1.clone()));
        Some(nodes)
    }
}

/// Dijkstra over `F`'s directed edges, weighted by `cost`.
pub fn single_source(g: &MultiDiGraph, source: &NodeId) -> ShortestPaths {
    single_source_with(g, source, |n| g.out_edges(n).iter().cloned())
}

/// Dijkstra over `F` treating every edge as traversable in either direction
/// (spec.md §4.4's fallback when no directed path exists between a supply
/// and a demand).
pub fn single_source_undirected(g: &MultiDiGraph, source: &NodeId) -> ShortestPaths {
    single_source_with(g, source, |n| {
        g.out_edges(n).iter().cloned().chain(g.in_edges(n).iter().map(|(u, v, k)| (v.clone(), u.clone(), *k)))
    })
}

fn single_source_with<I>(g: &MultiDiGraph, source: &NodeId, neighbors: impl Fn(&NodeId) -> I) -> ShortestPaths
where
    I: Iterator<Item = EdgeKey>,
{
    let mut dist: IndexMap<NodeId, N64> = IndexMap::new();
    let mut prev: IndexMap<NodeId, EdgeKey> = IndexMap::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut q: PriorityQueue<NodeId, Reverse<N64>> = PriorityQueue::new();

    dist.insert(source.clone(), n64(0.0));
    q.push(source.clone(), Reverse(n64(0.0)));

    while let Some((u, Reverse(du))) = q.pop() {
        if !visited.insert(u.clone()) {
            continue;
        }
        for edge @ (_, v, _) in neighbors(&u) {
            // `edge` may run u->v directly, or be a reversed (v,u) edge
            // surfaced by the undirected traversal above; in both cases
            // its "other end" relative to u is whichever endpoint isn't u.
            let other = if edge.0 == u { edge.1.clone() } else { edge.0.clone() };
            let w = g.edge(&edge).map(|d| d.cost).unwrap_or_else(|| n64(0.0));
            let nd = du + w;
            if dist.get(&other).map_or(true, |&d| nd < d) {
                dist.insert(other.clone(), nd);
                prev.insert(other.clone(), (u.clone(), other.clone(), edge.2));
                q.push(other, Reverse(nd));
            }
        }
    }

    ShortestPaths { dist, prev }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{HighwayValue, Node, RoadGraph, RoadGraphNodes, RoadSegment};
    use std::convert::TryFrom;

    fn path_graph() -> MultiDiGraph {
        let rg = RoadGraph {
            nodes: RoadGraphNodes {
                nodes: vec![
                    Node { id: "1".into(), coordinates: (0.0, 0.0) },
                    Node { id: "2".into(), coordinates: (1.0, 0.0) },
                    Node { id: "3".into(), coordinates: (2.0, 0.0) },
                ],
            },
            roads: vec![
                RoadSegment { p1: "1".into(), p2: "2".into(), discriminator: None, length: 5.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
                RoadSegment { p1: "2".into(), p2: "3".into(), discriminator: None, length: 7.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
            ],
        };
        MultiDiGraph::try_from(&rg).unwrap()
    }

    #[test]
    fn finds_shortest_directed_path() {
        let g = path_graph();
        let sp = single_source(&g, &"1".into());
        assert_eq!(sp.dist[&NodeId::from("3")].raw(), 12.0);
        let path = sp.path_to(&"3".into()).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].0, NodeId::from("1"));
        assert_eq!(path[1].1, NodeId::from("3"));
    }

    #[test]
    fn undirected_reaches_against_arrow_direction() {
        let g = path_graph();
        let sp = single_source_undirected(&g, &"3".into());
        assert!(sp.dist.contains_key(&NodeId::from("1")));
    }

    #[test]
    fn unreachable_target_is_absent() {
        let mut g = path_graph();
        g.ensure_node("island".into(), (9.0, 9.0));
        let sp = single_source(&g, &"1".into());
        assert!(sp.path_to(&"island".into()).is_none());
    }
}
