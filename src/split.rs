//! S5c — splitting the giant Euler tour into time-bounded routes (spec.md
//! §4.7). Grounded on `original_source/src/routing/split_routes.py`: a
//! single greedy linear scan over the tour, closing out the current route
//! whenever the next edge would push it over budget.

use crate::graph::{EdgeKey, EdgeMode, MultiDiGraph};

const SWEEP_SPEED_MPS: f64 = 1.9;
const DEADHEAD_SPEED_MPS: f64 = 3.6;

/// Travel time for one edge, in seconds, per spec.md §4.7's speed model:
/// sweep edges at 1.9 m/s, deadheads (forced or not) at 3.6 m/s.
pub fn edge_time(e: &MultiDiGraph, key: &EdgeKey) -> f64 {
    let data = match e.edge(key) {
        Some(d) => d,
        None => return 0.0,
    };
    let length = data.length.raw();
    match data.mode {
        EdgeMode::Sweep => length / SWEEP_SPEED_MPS,
        EdgeMode::Deadhead | EdgeMode::DeadheadForce => length / DEADHEAD_SPEED_MPS,
    }
}

/// Splits `tour` into consecutive routes, each at most `max_route_time_secs`
/// long, per spec.md §4.7. A single edge longer than the budget still gets
/// its own route (the budget check only applies when `cur` is non-empty).
pub fn split_giant_tour(e: &MultiDiGraph, tour: &[EdgeKey], max_route_time_secs: f64) -> Vec<Vec<EdgeKey>> {
    let mut routes = Vec::new();
    let mut cur: Vec<EdgeKey> = Vec::new();
    let mut t = 0.0;

    for key in tour {
        let dt = edge_time(e, key);

        if !cur.is_empty() && t + dt > max_route_time_secs {
            routes.push(std::mem::take(&mut cur));
            t = 0.0;
        }

        cur.push(key.clone());
        t += dt;
    }

    if !cur.is_empty() {
        routes.push(cur);
    }

    routes
}

/// Summary statistics for one route, per spec.md §4.7 (reported in hours).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStats {
    pub edges: usize,
    pub total_time_hours: f64,
    pub sweep_time_hours: f64,
    pub deadhead_time_hours: f64,
    pub deadhead_pct: f64,
}

pub fn route_stats(e: &MultiDiGraph, route: &[EdgeKey]) -> RouteStats {
    let mut sweep_t = 0.0;
    let mut dead_t = 0.0;
    let mut total_t = 0.0;

    for key in route {
        let dt = edge_time(e, key);
        total_t += dt;
        match e.edge(key).map(|d| d.mode) {
            Some(EdgeMode::Sweep) => sweep_t += dt,
            _ => dead_t += dt,
        }
    }

    RouteStats {
        edges: route.len(),
        total_time_hours: total_t / 3600.0,
        sweep_time_hours: sweep_t / 3600.0,
        deadhead_time_hours: dead_t / 3600.0,
        deadhead_pct: if total_t > 0.0 { dead_t / total_t } else { 0.0 },
    }
}
