use crate::VertexId;
use crate::geometry::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known attribute keys.
///
/// Hosts may store their own keys alongside these; only the keys below carry
/// meaning for the engine itself.
pub mod keys {
    /// `AttributeValue::Str` holding a [`super::Visibility`] marker.  Absent
    /// means visible.
    pub const VISIBILITY: &str = "netvis.visibility";
    /// Presence marker maintained by the selection manager.  Do not set this
    /// directly; use the selection methods on the canvas.
    pub const IS_SELECTED: &str = "netvis.is-selected";
    /// `AttributeValue::Str` with the group name, present only on a
    /// surrogate vertex that stands in for a collapsed group.
    pub const COLLAPSED_GROUP: &str = "netvis.collapsed-group";
    /// `AttributeValue::BackRefs` on an external-edge clone, recording which
    /// original endpoint each collapse displaced.
    pub const ENDPOINT_BACKREFS: &str = "netvis.endpoint-backrefs";
}

/// Visibility state of a vertex or edge, stored under [`keys::VISIBILITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Visible,
    /// Never drawn and never selectable.
    Hidden,
    /// Drawn at reduced opacity; selectable only if the configured filtered
    /// alpha is above zero.
    Filtered,
}

/// Which endpoint of an edge a back-reference applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointSide {
    Source,
    Target,
}

/// Recorded on an external-edge clone during group collapse: the vertex the
/// surrogate displaced and on which side.  One entry per collapsed group, so
/// several groups sharing an external edge never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointBackRef {
    pub group: String,
    pub original: VertexId,
    pub side: EndpointSide,
}

/// A typed attribute value.  The engine stores its own markers here and the
/// host is free to attach anything else it needs per vertex or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Str(String),
    Point(Vec2),
    VertexRef(VertexId),
    BackRefs(Vec<EndpointBackRef>),
}

/// Open-ended per-entity attribute map keyed by string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap {
    values: HashMap<String, AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttributeValue> {
        self.values.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(AttributeValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(AttributeValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_point(&self, key: &str) -> Option<Vec2> {
        match self.get(key) {
            Some(AttributeValue::Point(p)) => Some(*p),
            _ => None,
        }
    }

    /// Visibility marker, defaulting to `Visible` when absent or malformed.
    pub fn visibility(&self) -> Visibility {
        match self.get_str(keys::VISIBILITY) {
            Some("hidden") => Visibility::Hidden,
            Some("filtered") => Visibility::Filtered,
            _ => Visibility::Visible,
        }
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        match visibility {
            Visibility::Visible => {
                self.remove(keys::VISIBILITY);
            }
            Visibility::Hidden => {
                self.set(keys::VISIBILITY, AttributeValue::Str("hidden".into()));
            }
            Visibility::Filtered => {
                self.set(keys::VISIBILITY, AttributeValue::Str("filtered".into()));
            }
        }
    }

    /// Append a collapse back-reference, creating the list on first use.
    pub fn push_backref(&mut self, backref: EndpointBackRef) {
        match self.get_mut(keys::ENDPOINT_BACKREFS) {
            Some(AttributeValue::BackRefs(refs)) => refs.push(backref),
            _ => {
                self.set(
                    keys::ENDPOINT_BACKREFS,
                    AttributeValue::BackRefs(vec![backref]),
                );
            }
        }
    }

    /// Remove and return the back-reference recorded for `group`, dropping
    /// the list entirely once it is empty.
    pub fn take_backref(&mut self, group: &str) -> Option<EndpointBackRef> {
        let taken = match self.get_mut(keys::ENDPOINT_BACKREFS) {
            Some(AttributeValue::BackRefs(refs)) => {
                let idx = refs.iter().position(|r| r.group == group)?;
                Some(refs.remove(idx))
            }
            _ => None,
        }?;

        if let Some(AttributeValue::BackRefs(refs)) = self.get(keys::ENDPOINT_BACKREFS) {
            if refs.is_empty() {
                self.remove(keys::ENDPOINT_BACKREFS);
            }
        }

        Some(taken)
    }
}
