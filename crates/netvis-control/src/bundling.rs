use netvis_core::{EdgeId, Graph, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How edges are rendered.  Only `CurvedBundled` needs intermediate points,
/// so it alone triggers bundling work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveStyle {
    #[default]
    Straight,
    Bezier,
    CurvedBundled,
}

pub(crate) fn should_bundle(style: CurveStyle, edge_count: usize) -> bool {
    style == CurveStyle::CurvedBundled && edge_count >= 1
}

/// The distinct edges incident to any of `vertices`.  An edge between two of
/// them appears once.
pub(crate) fn unique_incident_edges<'a>(
    graph: &Graph,
    vertices: impl IntoIterator<Item = &'a VertexId>,
) -> Vec<EdgeId> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for id in vertices {
        if let Some(vertex) = graph.vertex(*id) {
            for &edge in &vertex.incident_edges {
                if seen.insert(edge) {
                    edges.push(edge);
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_bundle_predicate() {
        assert!(should_bundle(CurveStyle::CurvedBundled, 1));
        assert!(!should_bundle(CurveStyle::CurvedBundled, 0));
        assert!(!should_bundle(CurveStyle::Straight, 5));
        assert!(!should_bundle(CurveStyle::Bezier, 5));
    }

    #[test]
    fn test_unique_incident_edges_dedups_shared_edge() {
        let mut graph = Graph::new(false);
        let a = graph.add_vertex();
        let b = graph.add_vertex();
        let c = graph.add_vertex();
        let ab = graph.add_edge(a, b).unwrap();
        let bc = graph.add_edge(b, c).unwrap();

        let edges = unique_incident_edges(&graph, &[a, b]);
        assert_eq!(edges.len(), 2);
        assert!(edges.contains(&ab) && edges.contains(&bc));

        // The edge between a and b is reported once even though both
        // endpoints are in the set.
        let edges = unique_incident_edges(&graph, &[a, b, c]);
        assert_eq!(edges.len(), 2);
    }
}
