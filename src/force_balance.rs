//! S4 — forced parity balancing (spec.md §4.4).
//!
//! Grounded on `original_source/src/routing/force_balance.py`: a safety net
//! that greedily routes any imbalance transportation (S2) and connectivity
//! (S3) left behind, walking `F` directly (falling back to an undirected
//! walk of `F`) and copying or reverse-copying edges into `E` one path step
//! at a time.

use crate::dijkstra;
use crate::error::{EngineError, EngineResult};
use crate::graph::{EdgeData, EdgeMode, MultiDiGraph};
use crate::transportation::ensure_node_coordinates;
use crate::NodeId;

const DEFAULT_MAX_ITERS: u32 = 100_000;

/// Runs S4 to (best-effort) balance `e`, per spec.md §4.4. Does not fail
/// when the loop can't reach perfect balance — callers should check
/// [`crate::graph::MultiDiGraph::imbalance`] afterwards if they need to
/// know whether S5 can proceed.
pub fn force_balance(e: &MultiDiGraph, f: &MultiDiGraph) -> EngineResult<MultiDiGraph> {
    force_balance_with_iters(e, f, DEFAULT_MAX_ITERS)
}

fn force_balance_with_iters(e: &MultiDiGraph, f: &MultiDiGraph, max_iters: u32) -> EngineResult<MultiDiGraph> {
    let mut e = e.clone();
    let mut prev = total_positive_imbalance(&e);
    let mut it = 0;

    while prev > 0 && it < max_iters {
        it += 1;

        let supply = e.nodes().find(|n| e.in_degree(n) > e.out_degree(n)).cloned();
        let demand = e.nodes().find(|n| e.out_degree(n) > e.in_degree(n)).cloned();
        let (s, d) = match (supply, demand) {
            (Some(s), Some(d)) => (s, d),
            _ => break,
        };

        let directed = dijkstra::single_source(f, &s);
        let node_path = match directed.node_path_to(&d) {
            Some(path) => path,
            None => dijkstra::single_source_undirected(f, &s)
                .node_path_to(&d)
                .ok_or_else(|| EngineError::NoEdgeBetween(s.clone(), d.clone()))?,
        };

        for (a, b) in node_path.iter().zip(node_path.iter().skip(1)) {
            add_directed_step(&mut e, f, a, b)?;
        }

        let now = total_positive_imbalance(&e);
        if now >= prev {
            break;
        }
        prev = now;
    }

    ensure_node_coordinates(&mut e, f)?;
    Ok(e)
}

fn total_positive_imbalance(e: &MultiDiGraph) -> i64 {
    e.nodes().map(|n| (e.in_degree(n) as i64 - e.out_degree(n) as i64).max(0)).sum()
}

/// Adds one `a -> b` step to `e`, preferring a direct copy of `F`'s
/// min-cost `a -> b` edge; falling back to a reverse-traversal copy of
/// `F`'s `b -> a` edge (tagged `DeadheadForce`) when only that direction
/// exists; failing if neither does (spec.md §4.4 step 3).
fn add_directed_step(e: &mut MultiDiGraph, f: &MultiDiGraph, a: &NodeId, b: &NodeId) -> EngineResult<()> {
    if let Some(key) = f.min_cost_edge_from_to(a, b) {
        let data = f.edge(&key).expect("looked-up edge exists").clone();
        e.ensure_node(a.clone(), f.node_coords(a).expect("F node has coordinates"));
        e.ensure_node(b.clone(), f.node_coords(b).expect("F node has coordinates"));
        e.add_edge(
            a.clone(),
            b.clone(),
            None,
            EdgeData {
                mode: EdgeMode::Deadhead,
                is_deadhead_added: true,
                is_force_balance: true,
                reversed_from_oneway: false,
                ..data
            },
        );
        return Ok(());
    }

    if let Some(key) = f.min_cost_edge_from_to(b, a) {
        let data = f.edge(&key).expect("looked-up edge exists").clone();
        e.ensure_node(a.clone(), f.node_coords(a).expect("F node has coordinates"));
        e.ensure_node(b.clone(), f.node_coords(b).expect("F node has coordinates"));
        e.add_edge(
            a.clone(),
            b.clone(),
            None,
            EdgeData {
                geometry: data.reversed_geometry(),
                mode: EdgeMode::DeadheadForce,
                is_deadhead_added: true,
                is_force_balance: true,
                reversed_from_oneway: true,
                ..data
            },
        );
        return Ok(());
    }

    Err(EngineError::NoEdgeBetween(a.clone(), b.clone()))
}
