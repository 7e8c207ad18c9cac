//! Error taxonomy for the routing engine, per `spec.md` §7.
//!
//! The teacher expresses fallibility with bare `Result<_, String>`
//! everywhere (see `brr.rs::Edge::add`). To faithfully carry the seven error
//! kinds the specification names, this crate uses `thiserror` for one typed
//! enum instead — see `DESIGN.md` for why this one module departs from the
//! teacher's raw-string texture.

use crate::graph::EdgeKey;
use crate::NodeId;

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// A node was added to a downstream graph (H/E) without an `(x, y)` and
    /// could not inherit one from `F` either. Fatal (spec.md §4.4, §7).
    #[error("node {0} has no coordinates and none could be inherited from F")]
    MissingCoordinates(NodeId),

    /// Forced balancing (S4) found no edge of `F` in either direction
    /// between two consecutive path nodes. Fatal (spec.md §4.4, §7).
    #[error("no edge between {0} and {1} in either direction")]
    NoEdgeBetween(NodeId, NodeId),

    /// S5a requires every node of `E` to be balanced before pairing.
    /// Fatal (spec.md §4.5, §7).
    #[error("node {node} not balanced: in={in_degree} out={out_degree}")]
    NodeNotBalanced {
        node: NodeId,
        in_degree: usize,
        out_degree: usize,
    },

    /// S5b could not find a node shared between the running tour and a
    /// remaining subcycle. Fatal; signals `E` is not weakly connected
    /// (spec.md §4.6, §7).
    #[error("disjoint cycles: no node shared between the tour so far and the remaining subcycles")]
    DisjointCycles,

    /// S5a produced a pairing that revisits an edge before a cycle closes.
    /// Fatal — indicates a malformed pairing (spec.md §4.5, §7).
    #[error("pairing inconsistency: edge {0:?} consumed before its cycle closed")]
    PairingInconsistent(EdgeKey),

    /// A schedule block named an allowed road type that does not normalize
    /// to anything sensible, or similar configuration-shaped issues. Not
    /// fatal to the pipeline as a whole — an empty allowed set simply
    /// yields an empty `K` (spec.md §4.1, §7) — but surfaced so the driver
    /// can log it.
    #[error("configuration issue: {0}")]
    Configuration(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
