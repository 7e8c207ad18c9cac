//! Pipeline driver — spec.md §6's one engine operation:
//! `solve(F, allowed_types, route_time_hours) -> (E, H, routes, tour)`.
//!
//! Chains S1-S5 in the fixed order spec.md §5 requires (each stage must
//! complete before the next begins), logging entry/exit the way the
//! teacher's `brr.rs` logs around its own solver stages.

use std::collections::HashSet;

use crate::connectivity::connect_components;
use crate::error::EngineResult;
use crate::force_balance::force_balance;
use crate::graph::{EdgeKey, MultiDiGraph};
use crate::pairing::compute_local_pairings;
use crate::split::split_giant_tour;
use crate::subcycle::{enumerate_subcycles, merge_subcycles};
use crate::subnetwork::extract_k;
use crate::transportation::make_balanced_h;

/// The full result of one schedule block, per spec.md §6.
pub struct SolveOutput {
    pub e: MultiDiGraph,
    pub h: MultiDiGraph,
    pub routes: Vec<Vec<EdgeKey>>,
    pub tour: Vec<EdgeKey>,
}

/// Runs S1 through S5 once, per spec.md §2's five-stage pipeline.
pub fn solve(f: &MultiDiGraph, allowed_types: &HashSet<String>, route_time_hours: f64) -> EngineResult<SolveOutput> {
    log::info!("S1: extracting subnetwork (allowed types: {})", allowed_types.len());
    let k = extract_k(f, allowed_types);
    log::debug!("K: {} nodes, {} edges", k.node_count(), k.edge_count());

    log::info!("S2: transportation balancing");
    let (h, transport_info) = make_balanced_h(&k, f)?;
    if !transport_info.unreachable_supplies.is_empty() {
        log::warn!(
            "S2: {} supply node(s) unreachable from any demand, excluded from flow",
            transport_info.unreachable_supplies.len()
        );
    }
    log::debug!("H: {} nodes, {} edges, transport cost {:.1}", h.node_count(), h.edge_count(), transport_info.transport_cost);

    log::info!("S3: component stitching");
    let components_before = h.weak_components().len();
    let e = connect_components(&h, f)?;
    log::debug!("E (pre-S4): {} weak components -> {}", components_before, e.weak_components().len());

    log::info!("S4: forced parity balancing");
    let e = force_balance(&e, f)?;
    let residual = e.imbalance().values().filter(|i| i.diff != 0).count();
    if residual > 0 {
        log::warn!("S4: {residual} node(s) still unbalanced after the iteration cap");
    }

    log::info!("S5a: local turn pairing");
    let pairing = compute_local_pairings(&e)?;

    log::info!("S5a: subcycle enumeration");
    let cycles = enumerate_subcycles(&e, &pairing)?;
    log::debug!("{} subcycle(s) before merge", cycles.len());

    log::info!("S5b: merging subcycles into the giant tour");
    let tour = merge_subcycles(cycles)?;

    log::info!("S5c: splitting the tour into time-bounded routes");
    let max_route_time_secs = route_time_hours * 3600.0;
    let routes = split_giant_tour(&e, &tour, max_route_time_secs);
    log::info!("solved: {} edge tour split into {} route(s)", tour.len(), routes.len());

    Ok(SolveOutput { e, h, routes, tour })
}
