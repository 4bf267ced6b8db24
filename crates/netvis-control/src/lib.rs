//! Interaction engine for an interactive graph-visualization surface.
//!
//! [`GraphCanvas`] owns the graph and coordinates selection, vertex dragging,
//! marquee selection, group collapse/expand, zoom/pan, asynchronous layout,
//! and edge-bundling invalidation. Drawing, layout mathematics, and bundling
//! mathematics are supplied by the host through the [`Drawer`],
//! [`LayoutEngine`], and [`EdgeBundler`] traits.

pub mod bundling;
pub mod canvas;
pub mod collaborators;
pub mod drag;
pub mod groups;
pub mod layout_state;
pub mod selection;
pub mod transform;

pub use bundling::CurveStyle;
pub use canvas::{CanvasOptions, GraphCanvas};
pub use collaborators::{
    Drawer, DrawingContext, EdgeBundler, LayoutContext, LayoutEngine, LayoutHandle, LayoutOutcome,
};
pub use drag::{Modifiers, MouseMode, PointerButton};
pub use groups::GroupInfo;
pub use layout_state::LayoutState;
pub use transform::ViewTransform;
