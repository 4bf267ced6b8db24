use crate::selection::SelectionSet;
use netvis_core::{
    keys, AttributeValue, Edge, EdgeId, EndpointBackRef, EndpointSide, Graph, NetvisError, Vec2,
    Vertex, VertexId, Visibility,
};
use std::collections::{HashMap, HashSet};

/// A named, host-defined set of vertices that can be collapsed into a single
/// surrogate vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupInfo {
    pub name: String,
    pub vertices: Vec<VertexId>,
    /// Where the surrogate goes on the next collapse.  Updated from the
    /// surrogate's position whenever it moves or a layout completes.
    pub collapsed_location: Option<Vec2>,
}

impl GroupInfo {
    pub fn new(name: impl Into<String>, vertices: Vec<VertexId>) -> Self {
        Self {
            name: name.into(),
            vertices,
            collapsed_location: None,
        }
    }
}

/// Everything a collapse removed from the graph, keyed by group name in
/// [`GroupManager`].  Owning the removed values makes expand a re-insertion
/// rather than a reconstruction.
#[derive(Debug)]
pub(crate) struct CollapsedGroupRecord {
    pub surrogate: VertexId,
    pub members: Vec<Vertex>,
    pub internal_edges: Vec<Edge>,
}

/// What a collapse changed, so the caller can draw in the right order.
#[derive(Debug)]
pub(crate) struct CollapseOutcome {
    pub surrogate: VertexId,
    pub external_clones: Vec<EdgeId>,
    pub removed_vertices: Vec<VertexId>,
    pub removed_edges: Vec<EdgeId>,
}

#[derive(Debug)]
pub(crate) struct ExpandOutcome {
    pub removed_surrogate: VertexId,
    pub restored_vertices: Vec<VertexId>,
    pub restored_edges: Vec<EdgeId>,
    /// The external clones the expand consumed.
    pub removed_edges: Vec<EdgeId>,
}

/// Registered groups plus the records of the ones currently collapsed.
#[derive(Debug, Default)]
pub(crate) struct GroupManager {
    groups: HashMap<String, GroupInfo>,
    collapsed: HashMap<String, CollapsedGroupRecord>,
}

impl GroupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered groups.  Groups must not share vertices.
    /// Collapsed records are unaffected; an already-collapsed group can still
    /// be expanded after its registration is replaced.
    pub fn set_groups(&mut self, groups: Vec<GroupInfo>) -> Result<(), NetvisError> {
        let mut seen = HashSet::new();
        for group in &groups {
            for id in &group.vertices {
                if !seen.insert(*id) {
                    return Err(NetvisError::InvalidArgument("groups must not overlap"));
                }
            }
        }
        self.groups = groups.into_iter().map(|g| (g.name.clone(), g)).collect();
        Ok(())
    }

    pub fn group(&self, name: &str) -> Option<&GroupInfo> {
        self.groups.get(name)
    }

    pub fn is_collapsed(&self, name: &str) -> bool {
        self.collapsed.contains_key(name)
    }

    pub fn surrogate_of(&self, name: &str) -> Option<VertexId> {
        self.collapsed.get(name).map(|r| r.surrogate)
    }

    /// Re-remember each collapsed group's location from its surrogate's
    /// current position.
    pub fn update_collapsed_locations(&mut self, graph: &Graph) {
        for (name, record) in &self.collapsed {
            if let Some(vertex) = graph.vertex(record.surrogate) {
                if let Some(info) = self.groups.get_mut(name) {
                    info.collapsed_location = Some(vertex.location);
                }
            }
        }
    }

    /// Collapse a registered group into a surrogate vertex.
    ///
    /// Internal edges and member vertices move into the group's record.
    /// External edges are cloned onto the surrogate, each clone carrying a
    /// back-reference to the endpoint it displaced, and the originals are
    /// removed.  Returns `None` when preconditions are not met (unknown name,
    /// already collapsed, no members present in the graph).
    pub fn collapse(
        &mut self,
        name: &str,
        graph: &mut Graph,
        selection: &mut SelectionSet,
    ) -> Option<CollapseOutcome> {
        if self.collapsed.contains_key(name) {
            return None;
        }
        let info = self.groups.get(name)?;

        let members: Vec<VertexId> = info
            .vertices
            .iter()
            .copied()
            .filter(|id| graph.vertex(*id).is_some())
            .collect();
        if members.is_empty() {
            return None;
        }
        let member_set: HashSet<VertexId> = members.iter().copied().collect();

        let all_selected = members.iter().all(|id| selection.vertex_is_selected(*id));
        let all_hidden = members.iter().all(|id| {
            graph
                .vertex(*id)
                .map(|v| v.attributes.visibility() == Visibility::Hidden)
                .unwrap_or(false)
        });
        let location = info
            .collapsed_location
            .or_else(|| graph.vertex(members[0]).map(|v| v.location))?;

        let surrogate = graph.add_vertex_at(location);
        if let Some(vertex) = graph.vertex_mut(surrogate) {
            vertex
                .attributes
                .set(keys::COLLAPSED_GROUP, AttributeValue::Str(name.to_string()));
            if all_hidden {
                vertex.attributes.set_visibility(Visibility::Hidden);
            }
        }

        // Walk each member's incident edges once.
        let mut seen_edges = HashSet::new();
        let mut incident = Vec::new();
        for id in &members {
            if let Some(vertex) = graph.vertex(*id) {
                for &edge in &vertex.incident_edges {
                    if seen_edges.insert(edge) {
                        incident.push(edge);
                    }
                }
            }
        }

        let mut internal_edges = Vec::new();
        let mut external_clones = Vec::new();
        let mut removed_edges = Vec::new();
        for id in incident {
            let Some(edge) = graph.edge(id) else { continue };
            let source_in = member_set.contains(&edge.source);
            let target_in = member_set.contains(&edge.target);
            if source_in && target_in {
                selection.forget_edge(id);
                if let Some(mut edge) = graph.remove_edge(id) {
                    edge.attributes.remove(keys::IS_SELECTED);
                    internal_edges.push(edge);
                    removed_edges.push(id);
                }
                continue;
            }

            // External edge: clone onto the surrogate, recording what the
            // surrogate displaced, then drop the original.
            let (source, target) = (edge.source, edge.target);
            let new_source = if source_in { surrogate } else { source };
            let new_target = if target_in { surrogate } else { target };
            match graph.clone_edge_rewired(id, new_source, new_target) {
                Ok(clone) => {
                    if let Some(edge) = graph.edge_mut(clone) {
                        if source_in {
                            edge.attributes.push_backref(EndpointBackRef {
                                group: name.to_string(),
                                original: source,
                                side: EndpointSide::Source,
                            });
                        }
                        if target_in {
                            edge.attributes.push_backref(EndpointBackRef {
                                group: name.to_string(),
                                original: target,
                                side: EndpointSide::Target,
                            });
                        }
                    }
                    selection.adopt_edge_flag(graph, clone);
                    external_clones.push(clone);
                }
                Err(err) => {
                    tracing::warn!("failed to clone external edge {} during collapse: {}", id, err);
                }
            }
            selection.forget_edge(id);
            if graph.remove_edge(id).is_some() {
                removed_edges.push(id);
            }
        }

        let mut stashed = Vec::with_capacity(members.len());
        let mut removed_vertices = Vec::with_capacity(members.len());
        for id in &members {
            selection.forget_vertex(*id);
            if let Some(mut vertex) = graph.remove_vertex(*id) {
                vertex.attributes.remove(keys::IS_SELECTED);
                stashed.push(vertex);
                removed_vertices.push(*id);
            }
        }

        if all_selected {
            selection.set_vertex(graph, surrogate, true);
        }

        self.collapsed.insert(
            name.to_string(),
            CollapsedGroupRecord {
                surrogate,
                members: stashed,
                internal_edges,
            },
        );
        Some(CollapseOutcome {
            surrogate,
            external_clones,
            removed_vertices,
            removed_edges,
        })
    }

    /// Expand a collapsed group, restoring its members and internal edges and
    /// rewiring external edges back to their original endpoints.  The
    /// surrogate's selected state propagates to the restored members and
    /// internal edges.
    pub fn expand(
        &mut self,
        name: &str,
        graph: &mut Graph,
        selection: &mut SelectionSet,
    ) -> Option<ExpandOutcome> {
        let surrogate = self.collapsed.get(name)?.surrogate;
        let surrogate_location = match graph.vertex(surrogate) {
            Some(vertex) => vertex.location,
            None => {
                tracing::warn!("surrogate {} of group {:?} is missing; dropping record", surrogate, name);
                self.collapsed.remove(name);
                return None;
            }
        };
        let surrogate_selected = selection.vertex_is_selected(surrogate);

        if let Some(info) = self.groups.get_mut(name) {
            info.collapsed_location = Some(surrogate_location);
        }

        let record = self.collapsed.remove(name)?;
        let mut restored_vertices = Vec::with_capacity(record.members.len());
        let mut restored_edges = Vec::new();

        for mut vertex in record.members {
            // Members that were never positioned start at the surrogate; the
            // next layout pass disperses them.
            if vertex.location == Vec2::default() {
                vertex.location = surrogate_location;
            }
            let id = vertex.id;
            match graph.insert_vertex(vertex) {
                Ok(()) => {
                    restored_vertices.push(id);
                    if surrogate_selected {
                        selection.set_vertex(graph, id, true);
                    }
                }
                Err(err) => tracing::warn!("failed to restore member {}: {}", id, err),
            }
        }

        for mut edge in record.internal_edges {
            edge.attributes.remove(keys::IS_SELECTED);
            let id = edge.id;
            match graph.insert_edge(edge) {
                Ok(()) => {
                    restored_edges.push(id);
                    if surrogate_selected {
                        selection.set_edge(graph, id, true);
                    }
                }
                Err(err) => tracing::warn!("failed to restore internal edge {}: {}", id, err),
            }
        }

        let incident: Vec<EdgeId> = graph
            .vertex(surrogate)
            .map(|v| v.incident_edges.clone())
            .unwrap_or_default();
        let fallback = restored_vertices.first().copied();
        let mut removed_edges = Vec::with_capacity(incident.len());
        for id in incident {
            selection.forget_edge(id);
            let Some(mut edge) = graph.remove_edge(id) else { continue };
            removed_edges.push(id);
            match edge.attributes.take_backref(name) {
                Some(backref) => match backref.side {
                    EndpointSide::Source => edge.source = backref.original,
                    EndpointSide::Target => edge.target = backref.original,
                },
                None => {
                    // The host attached an edge to the surrogate directly.
                    tracing::warn!(
                        "edge {} on surrogate {} has no back-reference for group {:?}",
                        id,
                        surrogate,
                        name
                    );
                    let Some(member) = fallback else { continue };
                    if edge.source == surrogate {
                        edge.source = member;
                    }
                    if edge.target == surrogate {
                        edge.target = member;
                    }
                }
            }
            let id = edge.id;
            match graph.insert_edge(edge) {
                Ok(()) => {
                    selection.adopt_edge_flag(graph, id);
                    restored_edges.push(id);
                }
                Err(err) => tracing::warn!("failed to restore external edge {}: {}", id, err),
            }
        }

        selection.set_vertex(graph, surrogate, false);
        selection.forget_vertex(surrogate);
        graph.remove_vertex(surrogate);

        Some(ExpandOutcome {
            removed_surrogate: surrogate,
            restored_vertices,
            restored_edges,
            removed_edges,
        })
    }
}
