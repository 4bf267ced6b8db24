use serde::{Deserialize, Serialize};
use std::fmt;

pub mod attributes;
pub mod error;
pub mod geometry;
pub mod graph;

pub use attributes::{
    AttributeMap, AttributeValue, EndpointBackRef, EndpointSide, Visibility, keys,
};
pub use error::NetvisError;
pub use geometry::{Rect, Vec2};
pub use graph::{Edge, Graph, Vertex, snap_to_grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(pub i64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
