//! Traits the host implements to supply drawing, layout mathematics, and
//! edge-bundling mathematics.

use crossbeam_channel::{bounded, Receiver, Sender};
use netvis_core::{EdgeId, Graph, Rect, Vec2, VertexId};
use std::collections::HashMap;

/// Everything a drawer needs besides the graph itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingContext {
    pub graph_rect: Rect,
    pub margin: f32,
}

/// Renders the graph and answers spatial queries about the rendering.
///
/// Incremental methods exist so collapse/expand can add and remove single
/// entities without a full redraw.
pub trait Drawer {
    fn draw_graph(&mut self, graph: &Graph, ctx: &DrawingContext);

    fn draw_new_vertex(&mut self, id: VertexId, graph: &Graph, ctx: &DrawingContext);
    fn draw_new_edge(&mut self, id: EdgeId, graph: &Graph, ctx: &DrawingContext);
    fn undraw_vertex(&mut self, id: VertexId, graph: &Graph, ctx: &DrawingContext);
    fn undraw_edge(&mut self, id: EdgeId, graph: &Graph, ctx: &DrawingContext);
    fn redraw_vertex(&mut self, id: VertexId, graph: &Graph, ctx: &DrawingContext);
    fn redraw_edge(&mut self, id: EdgeId, graph: &Graph, ctx: &DrawingContext);

    /// The topmost vertex whose rendering contains `point`, if any.
    fn hit_test_vertex(&self, graph: &Graph, point: Vec2) -> Option<VertexId>;

    /// Vertices whose renderings intersect `rect` (marquee selection).
    fn vertices_intersecting(&self, graph: &Graph, rect: Rect) -> Vec<VertexId>;
}

/// The rectangle a layout pass targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub graph_rect: Rect,
}

/// Result of one layout pass.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    pub positions: HashMap<VertexId, Vec2>,
    pub error: Option<String>,
}

/// Completion channel for a layout pass.  The engine may compute on a worker
/// thread; the canvas polls the handle from its own thread.
#[derive(Debug)]
pub struct LayoutHandle {
    receiver: Receiver<LayoutOutcome>,
}

impl LayoutHandle {
    pub fn new(receiver: Receiver<LayoutOutcome>) -> Self {
        Self { receiver }
    }

    /// A sender/handle pair.  A single send completes the pass.
    pub fn channel() -> (Sender<LayoutOutcome>, LayoutHandle) {
        let (tx, rx) = bounded(1);
        (tx, LayoutHandle::new(rx))
    }

    /// A handle that is already complete, for synchronous engines.
    pub fn completed(outcome: LayoutOutcome) -> Self {
        let (tx, handle) = Self::channel();
        let _ = tx.send(outcome);
        handle
    }

    pub fn try_outcome(&self) -> Option<LayoutOutcome> {
        self.receiver.try_recv().ok()
    }
}

/// Computes vertex positions.  `lay_out` receives the graph by reference and
/// must snapshot whatever it needs before returning; positions come back
/// through the handle.
pub trait LayoutEngine {
    fn lay_out(&self, graph: &Graph, ctx: &LayoutContext) -> LayoutHandle;

    /// Synchronously rescale existing positions from `old` to `new`.  Used
    /// when the surface resizes and a full pass is not warranted.
    fn transform_layout(&self, graph: &mut Graph, old: &LayoutContext, new: &LayoutContext);

    /// Margin the layout keeps between vertices and the rectangle edge.
    fn margin(&self) -> f32 {
        6.0
    }
}

/// Computes intermediate points for curved-bundled edges.
pub trait EdgeBundler {
    fn bundle_all(&self, graph: &mut Graph, rect: Rect);
    fn bundle_subset(&self, graph: &mut Graph, edges: &[EdgeId], rect: Rect);
}
