use crate::attributes::AttributeMap;
use crate::error::NetvisError;
use crate::geometry::Vec2;
use crate::{EdgeId, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub location: Vec2,
    /// Maintained by [`Graph`]; contains e iff e is live and has this vertex
    /// as an endpoint.
    pub incident_edges: Vec<EdgeId>,
    pub attributes: AttributeMap,
}

impl Vertex {
    pub fn new(id: VertexId, location: Vec2) -> Self {
        Self {
            id,
            location,
            incident_edges: Vec::new(),
            attributes: AttributeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: VertexId,
    pub target: VertexId,
    pub attributes: AttributeMap,
}

/// Id-keyed graph.  Vertices and edges refer to each other through ids only,
/// so removed entities can be held by value elsewhere and re-admitted later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    directed: bool,
    vertices: HashMap<VertexId, Vertex>,
    edges: HashMap<EdgeId, Edge>,
    next_vertex_id: i64,
    next_edge_id: i64,
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Default::default()
        }
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertices_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.vertices.values_mut()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.values_mut()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    pub fn add_vertex(&mut self) -> VertexId {
        self.add_vertex_at(Vec2::default())
    }

    pub fn add_vertex_at(&mut self, location: Vec2) -> VertexId {
        let id = VertexId(self.next_vertex_id);
        self.next_vertex_id += 1;
        self.vertices.insert(id, Vertex::new(id, location));
        id
    }

    pub fn add_edge(&mut self, source: VertexId, target: VertexId) -> Result<EdgeId, NetvisError> {
        if !self.vertices.contains_key(&source) {
            return Err(NetvisError::UnknownVertex(source));
        }
        if !self.vertices.contains_key(&target) {
            return Err(NetvisError::UnknownVertex(target));
        }
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                attributes: AttributeMap::new(),
            },
        );
        self.attach(id, source, target);
        Ok(id)
    }

    /// Re-admit a previously removed vertex, keeping its id.
    pub fn insert_vertex(&mut self, mut vertex: Vertex) -> Result<(), NetvisError> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(NetvisError::DuplicateVertex(vertex.id));
        }
        // Adjacency is rebuilt as edges come back.
        vertex.incident_edges.clear();
        self.next_vertex_id = self.next_vertex_id.max(vertex.id.0 + 1);
        self.vertices.insert(vertex.id, vertex);
        Ok(())
    }

    /// Re-admit a previously removed edge, keeping its id.  Both endpoints
    /// must already be present.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), NetvisError> {
        if self.edges.contains_key(&edge.id) {
            return Err(NetvisError::DuplicateEdge(edge.id));
        }
        if !self.vertices.contains_key(&edge.source) {
            return Err(NetvisError::UnknownVertex(edge.source));
        }
        if !self.vertices.contains_key(&edge.target) {
            return Err(NetvisError::UnknownVertex(edge.target));
        }
        let (id, source, target) = (edge.id, edge.source, edge.target);
        self.next_edge_id = self.next_edge_id.max(id.0 + 1);
        self.edges.insert(id, edge);
        self.attach(id, source, target);
        Ok(())
    }

    /// Remove a vertex and return it by value.  The caller must remove its
    /// incident edges first.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let vertex = self.vertices.remove(&id)?;
        debug_assert!(
            vertex.incident_edges.is_empty(),
            "vertex {id} removed with incident edges still attached"
        );
        Some(vertex)
    }

    /// Remove an edge and return it by value, detaching it from both
    /// endpoints' adjacency lists.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;
        self.detach(id, edge.source);
        if edge.target != edge.source {
            self.detach(id, edge.target);
        }
        Some(edge)
    }

    /// The endpoint of `edge` that is not `vertex`.  For a self-loop this is
    /// the vertex itself.
    pub fn other_endpoint(&self, edge: EdgeId, vertex: VertexId) -> Option<VertexId> {
        let edge = self.edges.get(&edge)?;
        if edge.source == vertex {
            Some(edge.target)
        } else if edge.target == vertex {
            Some(edge.source)
        } else {
            None
        }
    }

    /// Add a new edge between `new_source` and `new_target` carrying a copy
    /// of the original edge's attributes.
    pub fn clone_edge_rewired(
        &mut self,
        edge: EdgeId,
        new_source: VertexId,
        new_target: VertexId,
    ) -> Result<EdgeId, NetvisError> {
        let attributes = self
            .edges
            .get(&edge)
            .ok_or(NetvisError::UnknownEdge(edge))?
            .attributes
            .clone();
        let clone = self.add_edge(new_source, new_target)?;
        if let Some(e) = self.edges.get_mut(&clone) {
            e.attributes = attributes;
        }
        Ok(clone)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.next_vertex_id = 0;
        self.next_edge_id = 0;
    }

    fn attach(&mut self, edge: EdgeId, source: VertexId, target: VertexId) {
        if let Some(v) = self.vertices.get_mut(&source) {
            v.incident_edges.push(edge);
        }
        if source != target {
            if let Some(v) = self.vertices.get_mut(&target) {
                v.incident_edges.push(edge);
            }
        }
    }

    fn detach(&mut self, edge: EdgeId, vertex: VertexId) {
        match self.vertices.get_mut(&vertex) {
            Some(v) => v.incident_edges.retain(|&e| e != edge),
            None => {
                tracing::warn!(
                    "edge {} referenced missing vertex {} while detaching",
                    edge,
                    vertex
                );
            }
        }
    }
}

/// Round every vertex location to the nearest multiple of `grid_size`.
pub fn snap_to_grid(graph: &mut Graph, grid_size: u32) -> Result<(), NetvisError> {
    if grid_size == 0 {
        return Err(NetvisError::InvalidArgument("grid size must be positive"));
    }
    let grid = grid_size as f32;
    for vertex in graph.vertices_mut() {
        vertex.location = Vec2::new(
            (vertex.location.x / grid).round() * grid,
            (vertex.location.y / grid).round() * grid,
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph, [VertexId; 3], [EdgeId; 3]) {
        let mut g = Graph::new(false);
        let a = g.add_vertex_at(Vec2::new(0.0, 0.0));
        let b = g.add_vertex_at(Vec2::new(10.0, 0.0));
        let c = g.add_vertex_at(Vec2::new(5.0, 10.0));
        let ab = g.add_edge(a, b).unwrap();
        let bc = g.add_edge(b, c).unwrap();
        let ca = g.add_edge(c, a).unwrap();
        (g, [a, b, c], [ab, bc, ca])
    }

    fn adjacency_consistent(g: &Graph) -> bool {
        for v in g.vertices() {
            for &e in &v.incident_edges {
                let Some(edge) = g.edge(e) else { return false };
                if edge.source != v.id && edge.target != v.id {
                    return false;
                }
            }
        }
        for e in g.edges() {
            for endpoint in [e.source, e.target] {
                let Some(v) = g.vertex(endpoint) else {
                    return false;
                };
                if !v.incident_edges.contains(&e.id) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_add_and_adjacency() {
        let (g, [a, b, _c], [ab, _bc, ca]) = triangle();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.vertex(a).unwrap().incident_edges, vec![ab, ca]);
        assert_eq!(g.other_endpoint(ab, a), Some(b));
        assert_eq!(g.other_endpoint(ab, b), Some(a));
        assert!(adjacency_consistent(&g));
    }

    #[test]
    fn test_add_edge_unknown_endpoint() {
        let mut g = Graph::new(false);
        let a = g.add_vertex();
        let err = g.add_edge(a, VertexId(99)).unwrap_err();
        assert_eq!(err, NetvisError::UnknownVertex(VertexId(99)));
    }

    #[test]
    fn test_remove_and_reinsert_round_trip() {
        let (mut g, [a, _b, _c], [ab, _bc, ca]) = triangle();
        let e1 = g.remove_edge(ab).unwrap();
        let e2 = g.remove_edge(ca).unwrap();
        let v = g.remove_vertex(a).unwrap();
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
        assert!(adjacency_consistent(&g));

        g.insert_vertex(v).unwrap();
        g.insert_edge(e1).unwrap();
        g.insert_edge(e2).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert!(adjacency_consistent(&g));

        // Ids were preserved and are not reused for new entities.
        assert!(g.vertex(a).is_some());
        let fresh = g.add_vertex();
        assert_ne!(fresh, a);
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let (mut g, [a, ..], [ab, ..]) = triangle();
        let v = g.vertex(a).unwrap().clone();
        assert_eq!(
            g.insert_vertex(v).unwrap_err(),
            NetvisError::DuplicateVertex(a)
        );
        let e = g.edge(ab).unwrap().clone();
        assert_eq!(g.insert_edge(e).unwrap_err(), NetvisError::DuplicateEdge(ab));
    }

    #[test]
    fn test_clone_edge_rewired_copies_attributes() {
        use crate::attributes::AttributeValue;

        let (mut g, [a, b, c], [ab, ..]) = triangle();
        g.edge_mut(ab)
            .unwrap()
            .attributes
            .set("weight", AttributeValue::Float(3.0));

        let clone = g.clone_edge_rewired(ab, a, c).unwrap();
        assert_ne!(clone, ab);
        let cloned = g.edge(clone).unwrap();
        assert_eq!(cloned.source, a);
        assert_eq!(cloned.target, c);
        assert_eq!(
            cloned.attributes.get("weight"),
            Some(&AttributeValue::Float(3.0))
        );
        // The original is untouched.
        assert_eq!(g.edge(ab).unwrap().target, b);
        assert!(adjacency_consistent(&g));
    }

    #[test]
    fn test_self_loop_adjacency() {
        let mut g = Graph::new(false);
        let a = g.add_vertex();
        let e = g.add_edge(a, a).unwrap();
        // A self-loop appears once in the adjacency list.
        assert_eq!(g.vertex(a).unwrap().incident_edges, vec![e]);
        assert_eq!(g.other_endpoint(e, a), Some(a));
        g.remove_edge(e).unwrap();
        assert!(g.vertex(a).unwrap().incident_edges.is_empty());
    }

    #[test]
    fn test_snap_to_grid() {
        let mut g = Graph::new(false);
        let a = g.add_vertex_at(Vec2::new(12.0, 17.0));
        let b = g.add_vertex_at(Vec2::new(-3.0, 4.9));
        snap_to_grid(&mut g, 10).unwrap();
        assert_eq!(g.vertex(a).unwrap().location, Vec2::new(10.0, 20.0));
        assert_eq!(g.vertex(b).unwrap().location, Vec2::new(-0.0, 0.0));

        assert_eq!(
            snap_to_grid(&mut g, 0).unwrap_err(),
            NetvisError::InvalidArgument("grid size must be positive")
        );
    }
}
