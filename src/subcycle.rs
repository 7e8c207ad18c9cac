//! S5a subcycle enumeration and S5b node-splicing merge (spec.md §4.6).
//!
//! Grounded on `original_source/src/routing/tour/subcycle.py`. The pairing
//! computed by [`crate::pairing`] decomposes `E`'s edge set into disjoint
//! closed walks (every edge used exactly once); this module enumerates
//! those walks and then splices them together at shared nodes into one
//! closed Euler tour.
//!
//! Rotation deviates from the original: `spec.md` §9's open question on
//! which of the two rotation rules to keep is resolved in favor of a single
//! rule — rotate so the chosen node is the *head* of the cycle's last edge,
//! i.e. look for `node` among edge heads, not tails. A closed walk's node is
//! always both some edge's head and the next edge's tail, so this is
//! sufficient on its own; it also makes plain concatenation (`tour_rot ++
//! cy_rot`) the correct merge, rather than splicing after the first edge.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::error::{EngineError, EngineResult};
use crate::graph::{EdgeKey, MultiDiGraph};
use crate::pairing::Pairing;
use crate::NodeId;

/// Splits `E`'s edges into disjoint closed walks by following `pairing`
/// from an arbitrary unused edge until it loops back to its start.
pub fn enumerate_subcycles(e: &MultiDiGraph, pairing: &Pairing) -> EngineResult<Vec<Vec<EdgeKey>>> {
    let mut unused: IndexSet<EdgeKey> = e.edges().map(|(k, _)| k.clone()).collect();
    let mut cycles = Vec::new();

    while let Some(start) = unused.iter().next().cloned() {
        let mut cycle = Vec::new();
        let mut cur = start.clone();

        loop {
            if !unused.swap_remove(&cur) {
                break;
            }
            cycle.push(cur.clone());

            let next = pairing.get(&cur).ok_or_else(|| EngineError::PairingInconsistent(cur.clone()))?;
            cur = next.clone();

            if cur == start {
                break;
            }
        }

        cycles.push(cycle);
    }

    Ok(cycles)
}

/// The node sequence a closed walk visits: `[e0.u, e0.v, e1.v, ..., en.v]`
/// (length `edge_cycle.len() + 1`, with the first and last entries equal).
fn cycle_nodes(edge_cycle: &[EdgeKey]) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(edge_cycle.len() + 1);
    if let Some(first) = edge_cycle.first() {
        nodes.push(first.0.clone());
    }
    nodes.extend(edge_cycle.iter().map(|e| e.1.clone()));
    nodes
}

/// Rotates a closed walk so it starts immediately after arriving at `node`
/// (`node` must appear as some edge's head). Returns `None` if it doesn't.
fn rotate_after_arrival_at(edge_cycle: &[EdgeKey], node: &NodeId) -> Option<Vec<EdgeKey>> {
    let m = edge_cycle.len();
    let t = edge_cycle.iter().position(|e| &e.1 == node)?;
    let split = (t + 1) % m;
    let mut rotated = edge_cycle[split..].to_vec();
    rotated.extend_from_slice(&edge_cycle[..split]);
    Some(rotated)
}

/// Splices every subcycle into a single closed walk covering all of their
/// edges, by repeatedly merging in a subcycle that shares a node with the
/// walk built so far.
pub fn merge_subcycles(cycles: Vec<Vec<EdgeKey>>) -> EngineResult<Vec<EdgeKey>> {
    let mut cycles = cycles.into_iter().filter(|c| !c.is_empty());
    let mut tour = match cycles.next() {
        Some(c) => c,
        None => return Ok(Vec::new()),
    };
    let mut remaining: Vec<Vec<EdgeKey>> = cycles.collect();

    while !remaining.is_empty() {
        let tour_nodes: BTreeSet<NodeId> = cycle_nodes(&tour).into_iter().collect();
        let mut merged_at = None;

        'candidates: for idx in 0..remaining.len() {
            let cy_nodes: BTreeSet<NodeId> = cycle_nodes(&remaining[idx]).into_iter().collect();
            for x in tour_nodes.intersection(&cy_nodes) {
                if let (Some(tour_rot), Some(cy_rot)) =
                    (rotate_after_arrival_at(&tour, x), rotate_after_arrival_at(&remaining[idx], x))
                {
                    let mut spliced = tour_rot;
                    spliced.extend(cy_rot);
                    merged_at = Some((idx, spliced));
                    break 'candidates;
                }
            }
        }

        match merged_at {
            Some((idx, spliced)) => {
                tour = spliced;
                remaining.remove(idx);
            }
            None => return Err(EngineError::DisjointCycles),
        }
    }

    Ok(tour)
}
