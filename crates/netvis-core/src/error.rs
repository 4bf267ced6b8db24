use crate::{EdgeId, VertexId};
use thiserror::Error;

/// Errors surfaced by the graph model and the interaction engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetvisError {
    /// A mutating operation arrived while an asynchronous layout pass was in
    /// flight.  Callers should retry after the laid-out notification.
    #[error("cannot {operation} while the graph is being laid out")]
    LayoutInProgress { operation: &'static str },

    #[error("vertex {0} is not in the graph")]
    UnknownVertex(VertexId),

    #[error("edge {0} is not in the graph")]
    UnknownEdge(EdgeId),

    #[error("vertex {0} is already in the graph")]
    DuplicateVertex(VertexId),

    #[error("edge {0} is already in the graph")]
    DuplicateEdge(EdgeId),

    #[error("zoom {zoom} is outside the allowed range [{min}, {max}]")]
    ZoomOutOfRange { zoom: f64, min: f64, max: f64 },

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
