//! S1 — subnetwork extraction (spec.md §4.1).
//!
//! Grounded on `original_source/src/subnetwork/subnetwork.py::extract_K`:
//! filter `F`'s edges by normalized highway tag, then take the edge-induced
//! subgraph (node set is the union of the retained edges' endpoints, *not*
//! all of `F`'s nodes).

use std::collections::HashSet;

use crate::data::HighwayValue;
use crate::graph::MultiDiGraph;

/// Normalizes a `highway` tag: a list collapses to its first element,
/// otherwise the value is returned unchanged. Deterministic, total — ported
/// from `original_source/src/routing/utils.py::normalize_highway`.
pub fn normalize_highway(v: &HighwayValue) -> &str {
    match v {
        HighwayValue::Single(s) => s,
        HighwayValue::List(list) => list.first().map(|s| s.as_str()).unwrap_or(""),
    }
}

/// Extracts `K`: the edge-induced subgraph of `F` whose edges' normalized
/// highway tag is in `allowed`. An empty `allowed` set is not an error — it
/// yields an empty `K`, which every downstream stage treats as
/// "already balanced" (spec.md §4.1, §7).
pub fn extract_k(f: &MultiDiGraph, allowed: &HashSet<String>) -> MultiDiGraph {
    let mut k = MultiDiGraph::empty();
    for (key, data) in f.edges() {
        if !allowed.contains(&data.highway) {
            continue;
        }
        let (u, v, disc) = key.clone();
        k.ensure_node(u.clone(), f.node_coords(&u).expect("F node missing coordinates"));
        k.ensure_node(v.clone(), f.node_coords(&v).expect("F node missing coordinates"));
        k.add_edge(u, v, Some(disc), data.clone());
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Node, RoadGraph, RoadGraphNodes, RoadSegment};
    use std::convert::TryFrom;

    fn four_node_graph() -> MultiDiGraph {
        let rg = RoadGraph {
            nodes: RoadGraphNodes {
                nodes: vec![
                    Node { id: "1".into(), coordinates: (0.0, 0.0) },
                    Node { id: "2".into(), coordinates: (1.0, 0.0) },
                    Node { id: "3".into(), coordinates: (2.0, 0.0) },
                    Node { id: "4".into(), coordinates: (3.0, 0.0) },
                ],
            },
            roads: vec![
                RoadSegment { p1: "1".into(), p2: "2".into(), discriminator: None, length: 10.0, geometry: None, highway: HighwayValue::Single("residential".into()) },
                RoadSegment { p1: "2".into(), p2: "3".into(), discriminator: None, length: 10.0, geometry: None, highway: HighwayValue::List(vec!["primary".into(), "trunk".into()]) },
                RoadSegment { p1: "3".into(), p2: "4".into(), discriminator: None, length: 10.0, geometry: None, highway: HighwayValue::Single("footway".into()) },
            ],
        };
        MultiDiGraph::try_from(&rg).unwrap()
    }

    #[test]
    fn normalizes_list_tags_to_first_element() {
        assert_eq!(normalize_highway(&HighwayValue::Single("residential".into())), "residential");
        assert_eq!(normalize_highway(&HighwayValue::List(vec!["primary".into(), "trunk".into()])), "primary");
    }

    #[test]
    fn k_contains_only_allowed_edges_and_their_endpoints() {
        let f = four_node_graph();
        let allowed: HashSet<String> = ["residential".to_string(), "primary".to_string()].into_iter().collect();
        let k = extract_k(&f, &allowed);
        assert_eq!(k.edge_count(), 2);
        assert_eq!(k.node_count(), 3);
        assert!(!k.nodes().any(|n| n.as_ref() == "4"));
    }

    #[test]
    fn empty_allowed_set_yields_empty_k() {
        let f = four_node_graph();
        let k = extract_k(&f, &HashSet::new());
        assert_eq!(k.edge_count(), 0);
        assert_eq!(k.node_count(), 0);
    }

    proptest::proptest! {
        /// spec.md §8 property 1: K's nodes and edges are always a subset of F's.
        #[test]
        fn k_is_always_a_subset_of_f(
            edges in proptest::collection::vec((0usize..5, 0usize..5, 0usize..3), 0..12),
            allowed_mask in proptest::collection::vec(proptest::bool::ANY, 3),
        ) {
            use crate::graph::EdgeData;
            use crate::numeric::n64;

            let tags = ["residential".to_string(), "primary".to_string(), "footway".to_string()];
            let mut f = MultiDiGraph::empty();
            for i in 0..5 {
                f.ensure_node(i.to_string().into(), (i as f64, 0.0));
            }
            for (u, v, tag_idx) in &edges {
                let data = EdgeData::sweep(n64(1.0), None, tags[*tag_idx].clone());
                f.add_edge(u.to_string().into(), v.to_string().into(), None, data);
            }
            let allowed: HashSet<String> =
                tags.iter().zip(allowed_mask.iter()).filter(|(_, &keep)| keep).map(|(t, _)| t.clone()).collect();

            let k = extract_k(&f, &allowed);

            for n in k.nodes() {
                proptest::prop_assert!(f.node_coords(n).is_some());
            }
            for (key, _) in k.edges() {
                proptest::prop_assert!(f.edge(key).is_some());
            }
        }
    }
}
