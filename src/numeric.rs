//! Ordered, non-NaN floating point cost/time/length values.
//!
//! The teacher crate hand-rolled this wrapper (`f64nn.rs`); its later sibling
//! (`WFBFA-SNOMOR/Real_case`) uses `noisy_float`'s `N64` directly instead, and
//! that is what every stage of this engine uses for `length`, `cost` and
//! traversal time.

pub use noisy_float::prelude::*;
pub use noisy_float::types::N64;

/// Validates a raw `f64` pulled from JSON/YAML into an `N64`, rejecting NaN.
/// Unlike the bare `n64()` constructor (which panics on NaN), this is meant
/// for untrusted input at the graph-loading boundary.
pub fn try_cost(v: f64) -> Option<N64> {
    N64::try_new(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan() {
        assert_eq!(try_cost(f64::NAN), None);
        assert_eq!(try_cost(1.5).map(|n| n.raw()), Some(1.5));
    }

    #[test]
    fn orders_like_f64() {
        assert!(n64(1.0) < n64(2.0));
    }
}
