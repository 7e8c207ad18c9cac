//! S5a (local pairing) — spec.md §4.5.
//!
//! Grounded on `original_source/src/routing/tour/pair.py`: for every node of
//! a balanced graph, pair its in-edges to its out-edges via a per-node
//! Hungarian assignment that minimizes turn angle plus a mode-switch
//! penalty. [`hungarian`] supplies the assignment solver; this module only
//! builds the per-node cost matrices and the bearing/penalty functions that
//! feed it.

use indexmap::IndexMap;

use crate::error::{EngineError, EngineResult};
use crate::graph::{EdgeKey, EdgeMode, MultiDiGraph};
use crate::hungarian::min_cost_assignment;
use crate::numeric::{n64, N64};
use crate::NodeId;

/// `pairing[in_edge] = out_edge`: the out-edge an Euler-tour walker should
/// take immediately after traversing `in_edge`, chosen to minimize turning.
pub type Pairing = IndexMap<EdgeKey, EdgeKey>;

/// Builds the full local pairing for every node of `e`. Fails if any node
/// is unbalanced (spec.md §4.5 requires `E` to already be balanced by S4).
pub fn compute_local_pairings(e: &MultiDiGraph) -> EngineResult<Pairing> {
    let mut pairing = Pairing::new();

    for n in e.nodes().cloned().collect::<Vec<_>>() {
        let in_edges = e.in_edges(&n).to_vec();
        let out_edges = e.out_edges(&n).to_vec();

        if in_edges.len() != out_edges.len() {
            return Err(EngineError::NodeNotBalanced {
                node: n.clone(),
                in_degree: in_edges.len(),
                out_degree: out_edges.len(),
            });
        }

        let m = in_edges.len();
        if m == 0 {
            continue;
        }

        let cost: Vec<Vec<N64>> = in_edges
            .iter()
            .map(|ine| out_edges.iter().map(|oute| pairing_cost(e, ine, oute)).collect())
            .collect();

        let assign = min_cost_assignment(&cost);
        for (i, &j) in assign.iter().enumerate() {
            pairing.insert(in_edges[i].clone(), out_edges[j].clone());
        }
    }

    Ok(pairing)
}

fn pairing_cost(e: &MultiDiGraph, in_edge: &EdgeKey, out_edge: &EdgeKey) -> N64 {
    let (u, n, _) = in_edge;
    let (n2, v, _) = out_edge;
    debug_assert_eq!(n, n2, "pairing_cost called across mismatched nodes");

    let bin = edge_bearing_in(e, u, n, in_edge);
    let bout = edge_bearing_out(e, n, v, out_edge);
    let ang = angle_diff_deg(bin, bout);

    let in_mode = e.edge(in_edge).map(|d| d.mode);
    let out_mode = e.edge(out_edge).map(|d| d.mode);

    n64(turn_penalty(ang) + mode_switch_penalty(in_mode, out_mode))
}

/// spec.md §4.5's turn-angle cost bands: straight-through is free, a
/// reversal is (practically) forbidden.
fn turn_penalty(angle_deg: f64) -> f64 {
    if angle_deg >= 150.0 {
        1000.0
    } else if angle_deg >= 120.0 {
        20.0
    } else if angle_deg >= 90.0 {
        10.0
    } else if angle_deg >= 45.0 {
        3.0
    } else {
        0.0
    }
}

fn mode_switch_penalty(in_mode: Option<EdgeMode>, out_mode: Option<EdgeMode>) -> f64 {
    match (in_mode, out_mode) {
        (Some(a), Some(b)) if a != b => 2.0,
        _ => 0.0,
    }
}

fn bearing_deg(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let (dx, dy) = (x2 - x1, y2 - y1);
    // Compass-style bearing: atan2(dx, dy), i.e. `y` and `x` swapped
    // relative to the usual math convention, so north (dy>0,dx=0) is 0.
    let ang = dx.atan2(dy).to_degrees();
    (ang + 360.0) % 360.0
}

/// Bearing of the last segment of `in_edge` arriving at `n` (its geometry's
/// final two points, or straight node-to-node if there's no geometry).
fn edge_bearing_in(e: &MultiDiGraph, u: &NodeId, n: &NodeId, key: &EdgeKey) -> f64 {
    if let Some(geom) = e.edge(key).and_then(|d| d.geometry.as_ref()) {
        if geom.len() >= 2 {
            let (x1, y1) = geom[geom.len() - 2];
            let (x2, y2) = geom[geom.len() - 1];
            return bearing_deg(x1, y1, x2, y2);
        }
    }
    let (x1, y1) = e.node_coords(u).unwrap_or((0.0, 0.0));
    let (x2, y2) = e.node_coords(n).unwrap_or((0.0, 0.0));
    bearing_deg(x1, y1, x2, y2)
}

/// Bearing of the first segment of `out_edge` leaving `n`.
fn edge_bearing_out(e: &MultiDiGraph, n: &NodeId, v: &NodeId, key: &EdgeKey) -> f64 {
    if let Some(geom) = e.edge(key).and_then(|d| d.geometry.as_ref()) {
        if geom.len() >= 2 {
            let (x1, y1) = geom[0];
            let (x2, y2) = geom[1];
            return bearing_deg(x1, y1, x2, y2);
        }
    }
    let (x1, y1) = e.node_coords(n).unwrap_or((0.0, 0.0));
    let (x2, y2) = e.node_coords(v).unwrap_or((0.0, 0.0));
    bearing_deg(x1, y1, x2, y2)
}

fn angle_diff_deg(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}
