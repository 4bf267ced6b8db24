use netvis_core::{keys, AttributeValue, EdgeId, Graph, VertexId, Visibility};
use std::collections::HashSet;

/// The selected vertices and edges, cached as sets.
///
/// The `IS_SELECTED` attribute on each entity is kept in exact lockstep with
/// set membership; all mutation goes through these methods.
#[derive(Debug, Default)]
pub struct SelectionSet {
    vertices: HashSet<VertexId>,
    edges: HashSet<EdgeId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &HashSet<VertexId> {
        &self.vertices
    }

    pub fn edges(&self) -> &HashSet<EdgeId> {
        &self.edges
    }

    pub fn vertex_is_selected(&self, id: VertexId) -> bool {
        self.vertices.contains(&id)
    }

    pub fn edge_is_selected(&self, id: EdgeId) -> bool {
        self.edges.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Mark or unmark a vertex, updating both the set and the attribute flag.
    /// Returns whether anything changed.
    pub(crate) fn set_vertex(&mut self, graph: &mut Graph, id: VertexId, selected: bool) -> bool {
        let changed = if selected {
            self.vertices.insert(id)
        } else {
            self.vertices.remove(&id)
        };
        if let Some(vertex) = graph.vertex_mut(id) {
            write_flag(&mut vertex.attributes, selected);
        }
        changed
    }

    pub(crate) fn set_edge(&mut self, graph: &mut Graph, id: EdgeId, selected: bool) -> bool {
        let changed = if selected {
            self.edges.insert(id)
        } else {
            self.edges.remove(&id)
        };
        if let Some(edge) = graph.edge_mut(id) {
            write_flag(&mut edge.attributes, selected);
        }
        changed
    }

    /// Deselect everything.  Returns whether anything changed.
    pub(crate) fn clear(&mut self, graph: &mut Graph) -> bool {
        if self.is_empty() {
            return false;
        }
        for id in self.vertices.drain() {
            if let Some(vertex) = graph.vertex_mut(id) {
                write_flag(&mut vertex.attributes, false);
            }
        }
        for id in self.edges.drain() {
            if let Some(edge) = graph.edge_mut(id) {
                write_flag(&mut edge.attributes, false);
            }
        }
        true
    }

    /// Forget an entity that is leaving the graph.  Its attribute flag (if
    /// any) travels with the removed value.
    pub(crate) fn forget_vertex(&mut self, id: VertexId) {
        self.vertices.remove(&id);
    }

    pub(crate) fn forget_edge(&mut self, id: EdgeId) {
        self.edges.remove(&id);
    }

    /// Adopt an entity whose attributes already carry the selected flag, as
    /// happens when a collapse clones a selected edge.
    pub(crate) fn adopt_edge_flag(&mut self, graph: &Graph, id: EdgeId) {
        if let Some(edge) = graph.edge(id) {
            if edge.attributes.contains(keys::IS_SELECTED) {
                self.edges.insert(id);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn flags_consistent(&self, graph: &Graph) -> bool {
        graph
            .vertices()
            .all(|v| v.attributes.contains(keys::IS_SELECTED) == self.vertices.contains(&v.id))
            && graph
                .edges()
                .all(|e| e.attributes.contains(keys::IS_SELECTED) == self.edges.contains(&e.id))
    }
}

fn write_flag(attributes: &mut netvis_core::AttributeMap, selected: bool) {
    if selected {
        attributes.set(keys::IS_SELECTED, AttributeValue::Bool(true));
    } else {
        attributes.remove(keys::IS_SELECTED);
    }
}

/// Whether an entity with these attributes may become selected.  Deselection
/// is always allowed and never goes through this check.
pub(crate) fn can_be_selected(attributes: &netvis_core::AttributeMap, filtered_alpha: f32) -> bool {
    match attributes.visibility() {
        Visibility::Visible => true,
        Visibility::Hidden => false,
        Visibility::Filtered => filtered_alpha > 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netvis_core::AttributeMap;

    #[test]
    fn test_set_and_clear_keep_flags_in_sync() {
        let mut graph = Graph::new(false);
        let a = graph.add_vertex();
        let b = graph.add_vertex();
        let e = graph.add_edge(a, b).unwrap();

        let mut selection = SelectionSet::new();
        assert!(selection.set_vertex(&mut graph, a, true));
        assert!(selection.set_edge(&mut graph, e, true));
        assert!(selection.flags_consistent(&graph));

        // Selecting again changes nothing.
        assert!(!selection.set_vertex(&mut graph, a, true));

        assert!(selection.clear(&mut graph));
        assert!(selection.is_empty());
        assert!(selection.flags_consistent(&graph));

        // Clearing an empty selection reports no change.
        assert!(!selection.clear(&mut graph));
        let _ = b;
    }

    #[test]
    fn test_selectability_rules() {
        let mut visible = AttributeMap::new();
        assert!(can_be_selected(&visible, 0.0));

        visible.set_visibility(Visibility::Hidden);
        assert!(!can_be_selected(&visible, 1.0));

        visible.set_visibility(Visibility::Filtered);
        assert!(!can_be_selected(&visible, 0.0));
        assert!(can_be_selected(&visible, 0.1));
    }
}
