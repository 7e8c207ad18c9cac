//! Road-network JSON schema.
//!
//! Grounded on `data.rs` in both `WFBFA-Flight-Paths` and
//! `WFBFA-SNOMOR/Real_case/Paths` — `RoadSegment`/`Node`/`RoadGraph` here
//! play the same role as there, extended with the fields `spec.md` §3
//! requires that the teacher's flight-path variant didn't need: a `highway`
//! tag and optional `geometry` per edge.

use serde::*;

use crate::NodeId;

/// One edge of the raw road network `F`, as loaded from disk. The loader
/// that produces this JSON (fetching from a map provider, caching to disk)
/// is an external collaborator — out of scope here (spec.md §1).
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct RoadSegment {
    pub p1: NodeId,
    pub p2: NodeId,
    /// Disambiguates parallel edges between the same `(p1, p2)` pair.
    pub discriminator: Option<u64>,
    pub length: f64,
    /// Optional ordered coordinate sequence for the edge's geometry.
    pub geometry: Option<Vec<(f64, f64)>>,
    /// Either a single tag or a list (normalized to its first element by
    /// `crate::subnetwork::normalize_highway`).
    pub highway: HighwayValue,
}

/// The `highway` tag as it appears in the source JSON — OSM sometimes
/// encodes a list of candidate tags for one way.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[serde(untagged)]
pub enum HighwayValue {
    Single(String),
    List(Vec<String>),
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct Node {
    pub id: NodeId,
    pub coordinates: (f64, f64),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RoadGraph {
    pub roads: Vec<RoadSegment>,
    #[serde(flatten)]
    pub nodes: RoadGraphNodes,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RoadGraphNodes {
    pub nodes: Vec<Node>,
}
