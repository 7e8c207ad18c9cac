//! Kuhn–Munkres (Hungarian) minimum-cost perfect matching, O(n³) with
//! potentials.
//!
//! Direct Rust port of
//! `original_source/src/routing/tour/pair.py::hungarian_min_cost`, the
//! classic 1-indexed potentials formulation; generalized from `Vec<Vec<f64>>`
//! to `Vec<Vec<N64>>` (costs, like everywhere else, are non-negative) since
//! `spec.md` §4.5 measures pairing cost with the same ordered-float type as
//! the rest of the engine. `n = in-degree <= ~8` in practice on street
//! networks (spec.md §9), so the O(n³) constant factors don't matter.
//!
//! The node potentials `u`/`v` and reduced costs the algorithm juggles
//! internally can go negative even though the input costs never do, so the
//! bookkeeping below runs on plain signed `R64`, converting back to the
//! caller's non-negative `N64` only doesn't happen — callers only ever see
//! the resulting assignment, never a potential.

use noisy_float::types::{r64, R64};

use crate::numeric::N64;

/// `cost[i][j]` is the price of matching row `i` to column `j`. `cost` must
/// be square. Returns `assignment` where `assignment[i]` is the column
/// matched to row `i`.
pub fn min_cost_assignment(cost: &[Vec<N64>]) -> Vec<usize> {
    let n = cost.len();
    if n == 0 {
        return Vec::new();
    }
    debug_assert!(cost.iter().all(|row| row.len() == n), "cost matrix must be square");

    let inf = r64(f64::INFINITY);
    let zero = r64(0.0);

    // 1-indexed throughout, as in the original: row/column 0 is a sentinel.
    let mut u = vec![zero; n + 1];
    let mut v = vec![zero; n + 1];
    let mut p = vec![0usize; n + 1]; // p[j] = row currently matched to column j
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![inf; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = inf;
            let mut j1 = 0usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = r64(cost[i0 - 1][j - 1].raw()) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        assignment[p[j] - 1] = j - 1;
    }
    assignment
}
