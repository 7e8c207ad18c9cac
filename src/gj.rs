//! GeoJSON export of a tour's geometry (spec.md §6's thin survivor of the
//! out-of-scope visualization collaborator — full HTML map rendering stays
//! out of scope, per spec.md §1).
//!
//! Grounded on the teacher's `gj.rs::path_to_geojson`: a `LineString` built
//! by walking a path and collecting each step's coordinates, falling back
//! to node coordinates when an edge carries no explicit geometry.

use geojson::{Geometry, Value};

use crate::graph::{EdgeKey, MultiDiGraph};

/// Renders a sequence of `E`-edges (a tour or a single route) as one
/// GeoJSON `LineString`, using each edge's `geometry` when present and
/// falling back to its endpoints' coordinates otherwise.
pub fn edges_to_geojson(e: &MultiDiGraph, edges: &[EdgeKey]) -> Geometry {
    let mut coords: Vec<Vec<f64>> = Vec::new();

    for key in edges {
        let data = match e.edge(key) {
            Some(d) => d,
            None => continue,
        };
        let points: Vec<(f64, f64)> = match &data.geometry {
            Some(g) if g.len() >= 2 => g.clone(),
            _ => {
                let (u, v, _) = key;
                match (e.node_coords(u), e.node_coords(v)) {
                    (Some(a), Some(b)) => vec![a, b],
                    _ => continue,
                }
            }
        };
        for (x, y) in points {
            coords.push(vec![x, y]);
        }
    }

    Geometry::new(Value::LineString(coords))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeData;
    use crate::numeric::n64;

    #[test]
    fn falls_back_to_node_coordinates_without_geometry() {
        let mut g = MultiDiGraph::empty();
        g.ensure_node("1".into(), (0.0, 0.0));
        g.ensure_node("2".into(), (1.0, 2.0));
        let key = g.add_edge("1".into(), "2".into(), None, EdgeData::sweep(n64(10.0), None, "residential".into()));

        let geom = edges_to_geojson(&g, &[key]);
        match geom.value {
            Value::LineString(coords) => assert_eq!(coords, vec![vec![0.0, 0.0], vec![1.0, 2.0]]),
            other => panic!("expected a LineString, got {other:?}"),
        }
    }

    #[test]
    fn uses_explicit_geometry_when_present() {
        let mut g = MultiDiGraph::empty();
        g.ensure_node("1".into(), (0.0, 0.0));
        g.ensure_node("2".into(), (1.0, 2.0));
        let mut data = EdgeData::sweep(n64(10.0), None, "residential".into());
        data.geometry = Some(vec![(0.0, 0.0), (0.5, 1.0), (1.0, 2.0)]);
        let key = g.add_edge("1".into(), "2".into(), None, data);

        let geom = edges_to_geojson(&g, &[key]);
        match geom.value {
            Value::LineString(coords) => assert_eq!(coords.len(), 3),
            other => panic!("expected a LineString, got {other:?}"),
        }
    }
}
