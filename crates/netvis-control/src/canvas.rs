use crate::bundling::{should_bundle, unique_incident_edges, CurveStyle};
use crate::collaborators::{Drawer, DrawingContext, EdgeBundler, LayoutContext, LayoutEngine};
use crate::drag::{
    clamp_offset, clamp_point, marquee_rect, offset_range, DragSession, MarqueePolicy, Modifiers,
    MouseMode, PointerButton,
};
use crate::groups::{GroupInfo, GroupManager};
use crate::layout_state::{LayoutCoordinator, LayoutState};
use crate::selection::{can_be_selected, SelectionSet};
use crate::transform::{ViewTransform, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM};
use netvis_core::{keys, EdgeId, Graph, NetvisError, Rect, Vec2, VertexId};
use netvis_events::{CanvasEvent, EventBus};
use std::collections::HashSet;

/// Zoom factor for a single click in ZoomIn mode.
const CLICK_ZOOM_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasOptions {
    pub mouse_mode: MouseMode,
    /// Selecting or deselecting a vertex also applies to its incident edges.
    pub also_selects_incident_edges: bool,
    pub allow_vertex_drag: bool,
    /// Opacity of filtered entities.  Zero makes them unselectable.
    pub filtered_alpha: f32,
    pub curve_style: CurveStyle,
    /// How strongly bundled edges are pulled toward straight lines, 0 to 1.
    pub straightening: f32,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            mouse_mode: MouseMode::Select,
            also_selects_incident_edges: true,
            allow_vertex_drag: true,
            filtered_alpha: 0.1,
            curve_style: CurveStyle::Straight,
            straightening: 0.15,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// The interaction engine.  Owns the graph and every piece of interaction
/// state; the host forwards pointer and keyboard input, drives the layout
/// cycle, and drains the event bus.
#[derive(Debug)]
pub struct GraphCanvas<D: Drawer, L: LayoutEngine, B: EdgeBundler> {
    graph: Graph,
    drawer: D,
    layout: L,
    bundler: B,
    options: CanvasOptions,
    selection: SelectionSet,
    groups: GroupManager,
    transform: ViewTransform,
    drag: Option<DragSession>,
    coordinator: LayoutCoordinator,
    events: EventBus,
}

impl<D: Drawer, L: LayoutEngine, B: EdgeBundler> GraphCanvas<D, L, B> {
    pub fn new(drawer: D, layout: L, bundler: B, surface: Rect) -> Self {
        // The default options carry the transform's own default zoom range.
        Self::build(
            drawer,
            layout,
            bundler,
            ViewTransform::new(surface),
            CanvasOptions::default(),
        )
    }

    /// Rejects options whose zoom range is empty or non-positive.
    pub fn with_options(
        drawer: D,
        layout: L,
        bundler: B,
        surface: Rect,
        options: CanvasOptions,
    ) -> Result<Self, NetvisError> {
        let mut transform = ViewTransform::new(surface);
        transform.set_zoom_range(options.min_zoom, options.max_zoom)?;
        Ok(Self::build(drawer, layout, bundler, transform, options))
    }

    fn build(
        drawer: D,
        layout: L,
        bundler: B,
        transform: ViewTransform,
        options: CanvasOptions,
    ) -> Self {
        Self {
            graph: Graph::new(false),
            drawer,
            layout,
            bundler,
            options,
            selection: SelectionSet::new(),
            groups: GroupManager::new(),
            transform,
            drag: None,
            coordinator: LayoutCoordinator::new(),
            events: EventBus::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable graph access, rejected while a layout pass is in flight.
    pub fn graph_mut(&mut self) -> Result<&mut Graph, NetvisError> {
        self.coordinator.check_not_laying_out("mutate the graph")?;
        Ok(&mut self.graph)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    pub fn view(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn layout_state(&self) -> LayoutState {
        self.coordinator.state
    }

    pub fn is_laying_out(&self) -> bool {
        self.coordinator.is_laying_out()
    }

    pub fn drag_in_progress(&self) -> bool {
        self.drag.is_some()
    }

    pub fn set_mouse_mode(&mut self, mode: MouseMode) {
        self.options.mouse_mode = mode;
    }

    /// Replace the graph, resetting selection, groups, and any drag.
    /// Selection flags carried by the incoming graph are stripped.
    pub fn set_graph(&mut self, mut graph: Graph) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("replace the graph")?;
        for vertex in graph.vertices_mut() {
            vertex.attributes.remove(keys::IS_SELECTED);
        }
        for edge in graph.edges_mut() {
            edge.attributes.remove(keys::IS_SELECTED);
        }
        self.graph = graph;
        self.selection = SelectionSet::new();
        self.groups = GroupManager::new();
        self.drag = None;
        self.coordinator.laid_out_rect = None;
        Ok(())
    }

    pub fn clear_graph(&mut self) -> Result<(), NetvisError> {
        let directed = self.graph.directed();
        self.set_graph(Graph::new(directed))
    }

    // ------------------------------------------------------------------
    // Layout cycle
    // ------------------------------------------------------------------

    /// Request a redraw.  With `lay_out_first` the next `run_layout_cycle`
    /// starts an asynchronous pass; without it the graph is drawn with its
    /// current locations immediately.  A no-op while a pass is in flight.
    pub fn draw_graph(&mut self, lay_out_first: bool) {
        if self.coordinator.is_laying_out() {
            return;
        }
        if lay_out_first {
            self.coordinator.set_state(LayoutState::LayoutRequired);
        } else {
            self.coordinator.set_state(LayoutState::LayoutCompleted);
            self.run_layout_cycle();
        }
    }

    /// Advance the layout cycle one step.  The host calls this after its
    /// measure pass and after `poll_layout` reports completion.
    pub fn run_layout_cycle(&mut self) {
        match self.coordinator.state {
            LayoutState::LayoutRequired => {
                if self.graph.vertex_count() == 0 {
                    self.coordinator.set_state(LayoutState::Stable);
                    self.draw();
                    return;
                }
                self.events.publish(CanvasEvent::LayingOutGraph);
                let ctx = LayoutContext {
                    graph_rect: self.transform.surface(),
                };
                self.coordinator.pass_rect = Some(ctx.graph_rect);
                self.coordinator.set_state(LayoutState::LayingOut);
                self.coordinator.handle = Some(self.layout.lay_out(&self.graph, &ctx));
            }
            LayoutState::LayoutCompleted | LayoutState::TransformRequired => {
                self.transform_to_surface();
                self.coordinator.set_state(LayoutState::Stable);
                self.draw();
            }
            LayoutState::Stable | LayoutState::LayingOut => {}
        }
    }

    /// Check the in-flight pass for completion; apply its positions or its
    /// failure.  Safe to call every frame.
    pub fn poll_layout(&mut self) {
        if !self.coordinator.is_laying_out() {
            return;
        }
        let Some(handle) = &self.coordinator.handle else {
            self.coordinator.set_state(LayoutState::Stable);
            return;
        };
        let Some(outcome) = handle.try_outcome() else {
            return;
        };
        self.coordinator.handle = None;

        if let Some(error) = outcome.error {
            // Keep the previous drawing and positions.
            self.coordinator.pass_rect = None;
            self.coordinator.set_state(LayoutState::Stable);
            self.events
                .publish(CanvasEvent::GraphLaidOut { error: Some(error) });
            return;
        }

        for (id, location) in outcome.positions {
            match self.graph.vertex_mut(id) {
                Some(vertex) => vertex.location = location,
                None => tracing::warn!("layout returned a position for missing vertex {}", id),
            }
        }
        self.coordinator.laid_out_rect = self.coordinator.pass_rect.take();
        self.groups.update_collapsed_locations(&self.graph);
        self.coordinator.set_state(LayoutState::LayoutCompleted);
        self.bundle_all_if_appropriate();
        self.events.publish(CanvasEvent::GraphLaidOut { error: None });
        self.run_layout_cycle();
    }

    /// The surface changed size.  Existing positions are rescaled rather
    /// than relaid; a resize during a pass is reconciled when it completes.
    pub fn resize(&mut self, surface: Rect) {
        self.transform.set_surface(surface);
        self.transform.center_zoom();
        if self.coordinator.state == LayoutState::Stable
            && self.coordinator.has_layout()
            && self.coordinator.laid_out_rect != Some(surface)
        {
            self.coordinator.set_state(LayoutState::TransformRequired);
            self.run_layout_cycle();
        }
    }

    fn transform_to_surface(&mut self) {
        let current = self.transform.surface();
        if let Some(old) = self.coordinator.laid_out_rect {
            if old != current {
                self.layout.transform_layout(
                    &mut self.graph,
                    &LayoutContext { graph_rect: old },
                    &LayoutContext {
                        graph_rect: current,
                    },
                );
            }
            self.coordinator.laid_out_rect = Some(current);
        }
    }

    fn draw(&mut self) {
        let ctx = self.drawing_context();
        self.drawer.draw_graph(&self.graph, &ctx);
    }

    fn drawing_context(&self) -> DrawingContext {
        DrawingContext {
            graph_rect: self.transform.surface(),
            margin: self.layout.margin(),
        }
    }

    fn layout_rect_minus_margin(&self) -> Option<Rect> {
        let rect = self.transform.surface().inflate(-self.layout.margin());
        if rect.is_positive() {
            Some(rect)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn vertex_is_selected(&self, id: VertexId) -> bool {
        self.selection.vertex_is_selected(id)
    }

    pub fn edge_is_selected(&self, id: EdgeId) -> bool {
        self.selection.edge_is_selected(id)
    }

    pub fn selected_vertices(&self) -> &HashSet<VertexId> {
        self.selection.vertices()
    }

    pub fn selected_edges(&self) -> &HashSet<EdgeId> {
        self.selection.edges()
    }

    pub fn set_vertex_selected(
        &mut self,
        id: VertexId,
        selected: bool,
        also_incident_edges: bool,
    ) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("select vertices")?;
        if self.graph.vertex(id).is_none() {
            return Err(NetvisError::UnknownVertex(id));
        }
        if self.set_vertex_selected_internal(id, selected, also_incident_edges) {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    pub fn set_edge_selected(
        &mut self,
        id: EdgeId,
        selected: bool,
        also_adjacent_vertices: bool,
    ) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("select edges")?;
        if self.graph.edge(id).is_none() {
            return Err(NetvisError::UnknownEdge(id));
        }
        if self.set_edge_selected_internal(id, selected, also_adjacent_vertices) {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    /// Replace the entire selection.
    pub fn set_selected(
        &mut self,
        vertices: &[VertexId],
        edges: &[EdgeId],
    ) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("replace the selection")?;
        for id in vertices {
            if self.graph.vertex(*id).is_none() {
                return Err(NetvisError::UnknownVertex(*id));
            }
        }
        for id in edges {
            if self.graph.edge(*id).is_none() {
                return Err(NetvisError::UnknownEdge(*id));
            }
        }
        let mut changed = self.selection.clear(&mut self.graph);
        for id in vertices {
            changed |= self.set_vertex_selected_internal(*id, true, false);
        }
        for id in edges {
            changed |= self.set_edge_selected_internal(*id, true, false);
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    pub fn select_all(&mut self) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("select all")?;
        let vertices: Vec<VertexId> = self.graph.vertex_ids().collect();
        let edges: Vec<EdgeId> = self.graph.edge_ids().collect();
        let mut changed = false;
        for id in vertices {
            changed |= self.set_vertex_selected_internal(id, true, false);
        }
        for id in edges {
            changed |= self.set_edge_selected_internal(id, true, false);
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    /// Deselect everything.  Publishes nothing when the selection is already
    /// empty.
    pub fn deselect_all(&mut self) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("deselect all")?;
        if self.selection.clear(&mut self.graph) {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    pub fn invert_selection(&mut self) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("invert the selection")?;
        let vertices: Vec<VertexId> = self.graph.vertex_ids().collect();
        let edges: Vec<EdgeId> = self.graph.edge_ids().collect();
        let mut changed = false;
        for id in vertices {
            let target = !self.selection.vertex_is_selected(id);
            changed |= self.set_vertex_selected_internal(id, target, false);
        }
        for id in edges {
            let target = !self.selection.edge_is_selected(id);
            changed |= self.set_edge_selected_internal(id, target, false);
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        Ok(())
    }

    /// Silent per-entity application of the selectability rules: hidden
    /// entities and, at zero filtered alpha, filtered entities refuse
    /// selection; deselection always goes through.
    fn set_vertex_selected_internal(
        &mut self,
        id: VertexId,
        selected: bool,
        also_incident_edges: bool,
    ) -> bool {
        let mut changed = false;
        if self.vertex_accepts(id, selected) {
            changed |= self.selection.set_vertex(&mut self.graph, id, selected);
        }
        if also_incident_edges {
            let incident = self
                .graph
                .vertex(id)
                .map(|v| v.incident_edges.clone())
                .unwrap_or_default();
            for edge in incident {
                changed |= self.set_edge_selected_internal(edge, selected, false);
            }
        }
        changed
    }

    fn set_edge_selected_internal(
        &mut self,
        id: EdgeId,
        selected: bool,
        also_adjacent_vertices: bool,
    ) -> bool {
        let mut changed = false;
        if self.edge_accepts(id, selected) {
            changed |= self.selection.set_edge(&mut self.graph, id, selected);
        }
        if also_adjacent_vertices {
            if let Some(edge) = self.graph.edge(id) {
                let (source, target) = (edge.source, edge.target);
                changed |= self.set_vertex_selected_internal(source, selected, false);
                changed |= self.set_vertex_selected_internal(target, selected, false);
            }
        }
        changed
    }

    fn vertex_accepts(&self, id: VertexId, selected: bool) -> bool {
        if !selected {
            return true;
        }
        self.graph
            .vertex(id)
            .map(|v| can_be_selected(&v.attributes, self.options.filtered_alpha))
            .unwrap_or(false)
    }

    fn edge_accepts(&self, id: EdgeId, selected: bool) -> bool {
        if !selected {
            return true;
        }
        self.graph
            .edge(id)
            .map(|e| can_be_selected(&e.attributes, self.options.filtered_alpha))
            .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    pub fn hit_test_vertex(&self, point: Vec2) -> Option<VertexId> {
        self.drawer.hit_test_vertex(&self.graph, point)
    }

    /// All pointer handlers are silent no-ops while a layout pass is in
    /// flight, and while a drag is already in progress.
    pub fn pointer_down(
        &mut self,
        point: Vec2,
        button: PointerButton,
        modifiers: Modifiers,
        clicks: u8,
    ) {
        if self.coordinator.is_laying_out() || self.drag.is_some() {
            return;
        }
        match button {
            PointerButton::Middle => self.begin_translation_drag(point),
            PointerButton::Left => self.on_left_down(point, modifiers, clicks),
            PointerButton::Right => self.on_right_down(point),
        }
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        match &mut self.drag {
            Some(DragSession::Vertices {
                anchor,
                offset,
                offset_range,
                ..
            }) => {
                let raw = Vec2::new(point.x - anchor.x, point.y - anchor.y);
                *offset = clamp_offset(raw, *offset_range);
            }
            Some(DragSession::Marquee {
                current, bounds, ..
            }) => {
                *current = clamp_point(point, *bounds);
            }
            Some(DragSession::Translation { anchor, origin }) => {
                let dx = (point.x - anchor.x) as f64;
                let dy = (point.y - anchor.y) as f64;
                let before = self.transform.translation();
                self.transform.translate_to(origin.0 + dx, origin.1 + dy);
                let after = self.transform.translation();
                if after != before {
                    self.events.publish(CanvasEvent::TranslationChanged {
                        x: after.0,
                        y: after.1,
                    });
                }
            }
            None => {}
        }
    }

    /// Ends whatever drag is in progress.  Escape held at release cancels a
    /// vertex or marquee drag without touching the graph or the selection.
    pub fn pointer_up(&mut self, point: Vec2, modifiers: Modifiers) {
        let Some(session) = self.drag.take() else {
            return;
        };
        match session {
            DragSession::Vertices {
                vertices,
                anchor,
                offset_range,
                ..
            } => {
                if modifiers.escape {
                    return;
                }
                let raw = Vec2::new(point.x - anchor.x, point.y - anchor.y);
                let offset = clamp_offset(raw, offset_range);
                if offset == Vec2::default() {
                    return;
                }
                self.commit_vertex_move(&vertices, offset);
            }
            DragSession::Marquee { anchor, bounds, .. } => {
                if modifiers.escape {
                    return;
                }
                let rect = marquee_rect(anchor, clamp_point(point, bounds));
                self.apply_marquee(rect, modifiers);
            }
            DragSession::Translation { .. } => {}
        }
    }

    /// Move the selected vertices by whole-key steps (arrow keys).
    pub fn nudge_selection(&mut self, dx: f32, dy: f32) -> Result<(), NetvisError> {
        self.move_selected_vertices(dx, dy)
    }

    pub fn move_selected_vertices(&mut self, dx: f32, dy: f32) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("move vertices")?;
        let vertices: Vec<VertexId> = self.selection.vertices().iter().copied().collect();
        if vertices.is_empty() || (dx == 0.0 && dy == 0.0) {
            return Ok(());
        }
        self.commit_vertex_move(&vertices, Vec2::new(dx, dy));
        Ok(())
    }

    fn on_left_down(&mut self, point: Vec2, modifiers: Modifiers, clicks: u8) {
        if modifiers.space || self.options.mouse_mode == MouseMode::Translate {
            self.begin_translation_drag(point);
            return;
        }
        match self.options.mouse_mode {
            MouseMode::DoNothing => return,
            MouseMode::ZoomIn => {
                self.zoom_about(point, CLICK_ZOOM_FACTOR);
                return;
            }
            MouseMode::ZoomOut => {
                self.zoom_about(point, 1.0 / CLICK_ZOOM_FACTOR);
                return;
            }
            _ => {}
        }
        match self.hit_test_vertex(point) {
            Some(vertex) => self.on_left_down_vertex(vertex, point, modifiers, clicks),
            None => self.on_left_down_background(point, modifiers),
        }
    }

    fn on_left_down_vertex(
        &mut self,
        vertex: VertexId,
        point: Vec2,
        modifiers: Modifiers,
        clicks: u8,
    ) {
        self.events.publish(CanvasEvent::VertexClicked(vertex));
        if clicks == 2 {
            self.events.publish(CanvasEvent::VertexDoubleClicked(vertex));
        }

        let incident = self.options.also_selects_incident_edges;
        let mut changed = false;
        match self.options.mouse_mode {
            MouseMode::Select => {
                if modifiers.control {
                    let target = !self.selection.vertex_is_selected(vertex);
                    changed = self.set_vertex_selected_internal(vertex, target, incident);
                } else if !self.selection.vertex_is_selected(vertex) {
                    // Clicking an already-selected vertex leaves the
                    // selection alone so the whole set can be dragged.
                    changed = self.selection.clear(&mut self.graph);
                    changed |= self.set_vertex_selected_internal(vertex, true, incident);
                }
            }
            MouseMode::AddToSelection => {
                let target = if modifiers.control {
                    !self.selection.vertex_is_selected(vertex)
                } else {
                    true
                };
                changed = self.set_vertex_selected_internal(vertex, target, incident);
            }
            MouseMode::SubtractFromSelection => {
                changed = self.set_vertex_selected_internal(vertex, false, incident);
            }
            _ => {}
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }

        if self.options.allow_vertex_drag
            && matches!(
                self.options.mouse_mode,
                MouseMode::Select | MouseMode::AddToSelection
            )
            && self.selection.vertex_is_selected(vertex)
        {
            self.begin_vertex_drag(point);
        }
    }

    fn on_left_down_background(&mut self, point: Vec2, modifiers: Modifiers) {
        if self.graph.vertex_count() == 0 {
            return;
        }
        if !matches!(
            self.options.mouse_mode,
            MouseMode::Select | MouseMode::AddToSelection | MouseMode::SubtractFromSelection
        ) {
            return;
        }
        if self.options.mouse_mode == MouseMode::Select
            && !modifiers.control
            && self.selection.clear(&mut self.graph)
        {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
        let bounds = self.transform.surface();
        let anchor = clamp_point(point, bounds);
        self.drag = Some(DragSession::Marquee {
            anchor,
            current: anchor,
            bounds,
        });
    }

    fn on_right_down(&mut self, point: Vec2) {
        let Some(vertex) = self.hit_test_vertex(point) else {
            return;
        };
        self.events.publish(CanvasEvent::VertexClicked(vertex));
        let incident = self.options.also_selects_incident_edges;
        let mut changed = false;
        match self.options.mouse_mode {
            MouseMode::Select => {
                if !self.selection.vertex_is_selected(vertex) {
                    changed = self.selection.clear(&mut self.graph);
                    changed |= self.set_vertex_selected_internal(vertex, true, incident);
                }
            }
            MouseMode::AddToSelection => {
                changed = self.set_vertex_selected_internal(vertex, true, incident);
            }
            MouseMode::SubtractFromSelection => {
                changed = self.set_vertex_selected_internal(vertex, false, incident);
            }
            _ => {}
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
    }

    fn begin_translation_drag(&mut self, anchor: Vec2) {
        self.drag = Some(DragSession::Translation {
            anchor,
            origin: self.transform.translation(),
        });
    }

    fn begin_vertex_drag(&mut self, anchor: Vec2) {
        let vertices: Vec<VertexId> = self.selection.vertices().iter().copied().collect();
        if vertices.is_empty() {
            return;
        }
        let Some(bounds) = self.layout_rect_minus_margin() else {
            return;
        };
        let mut bbox: Option<Rect> = None;
        for id in &vertices {
            if let Some(vertex) = self.graph.vertex(*id) {
                let p = vertex.location;
                bbox = Some(match bbox {
                    None => Rect::from_min_max(p, p),
                    Some(r) => Rect::from_min_max(
                        Vec2::new(r.min.x.min(p.x), r.min.y.min(p.y)),
                        Vec2::new(r.max.x.max(p.x), r.max.y.max(p.y)),
                    ),
                });
            }
        }
        let Some(bbox) = bbox else {
            return;
        };
        self.drag = Some(DragSession::Vertices {
            vertices,
            anchor,
            offset: Vec2::default(),
            offset_range: offset_range(bbox, bounds),
        });
    }

    fn commit_vertex_move(&mut self, vertices: &[VertexId], offset: Vec2) {
        for id in vertices {
            if let Some(vertex) = self.graph.vertex_mut(*id) {
                vertex.location =
                    Vec2::new(vertex.location.x + offset.x, vertex.location.y + offset.y);
            }
        }
        self.groups.update_collapsed_locations(&self.graph);
        self.rebundle_incident_if_appropriate(vertices);
        let ctx = self.drawing_context();
        for id in vertices {
            self.drawer.redraw_vertex(*id, &self.graph, &ctx);
        }
        for edge in unique_incident_edges(&self.graph, vertices) {
            self.drawer.redraw_edge(edge, &self.graph, &ctx);
        }
        self.events.publish(CanvasEvent::VerticesMoved {
            vertices: vertices.to_vec(),
        });
    }

    fn apply_marquee(&mut self, rect: Rect, modifiers: Modifiers) {
        let Some(policy) = MarqueePolicy::from_mode(self.options.mouse_mode, modifiers.control)
        else {
            return;
        };
        let hits = self.drawer.vertices_intersecting(&self.graph, rect);
        let incident = self.options.also_selects_incident_edges;
        let mut changed = false;
        for vertex in hits {
            let target = match policy {
                MarqueePolicy::Replace | MarqueePolicy::Add => true,
                MarqueePolicy::Subtract => false,
                MarqueePolicy::Invert => !self.selection.vertex_is_selected(vertex),
            };
            changed |= self.set_vertex_selected_internal(vertex, target, incident);
        }
        if changed {
            self.events.publish(CanvasEvent::SelectionChanged);
        }
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn set_groups(&mut self, groups: Vec<GroupInfo>) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("set groups")?;
        self.groups.set_groups(groups)
    }

    pub fn group(&self, name: &str) -> Option<&GroupInfo> {
        self.groups.group(name)
    }

    pub fn is_collapsed_group(&self, name: &str) -> bool {
        self.groups.is_collapsed(name)
    }

    /// Collapse a group into a surrogate vertex.  Unknown, empty, and
    /// already-collapsed groups are silent no-ops.
    pub fn collapse_group(&mut self, name: &str, redraw: bool) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("collapse a group")?;
        let Some(outcome) = self
            .groups
            .collapse(name, &mut self.graph, &mut self.selection)
        else {
            return Ok(());
        };
        if redraw {
            let ctx = self.drawing_context();
            for edge in &outcome.removed_edges {
                self.drawer.undraw_edge(*edge, &self.graph, &ctx);
            }
            for vertex in &outcome.removed_vertices {
                self.drawer.undraw_vertex(*vertex, &self.graph, &ctx);
            }
            // The clones are already in the graph when the surrogate is
            // drawn; they are drawn after it.
            self.drawer.draw_new_vertex(outcome.surrogate, &self.graph, &ctx);
            for edge in &outcome.external_clones {
                self.drawer.draw_new_edge(*edge, &self.graph, &ctx);
            }
        }
        Ok(())
    }

    /// Expand a collapsed group.  Not-collapsed names are silent no-ops.
    pub fn expand_group(&mut self, name: &str, redraw: bool) -> Result<(), NetvisError> {
        self.coordinator.check_not_laying_out("expand a group")?;
        let Some(outcome) = self
            .groups
            .expand(name, &mut self.graph, &mut self.selection)
        else {
            return Ok(());
        };
        if redraw {
            let ctx = self.drawing_context();
            for edge in &outcome.removed_edges {
                self.drawer.undraw_edge(*edge, &self.graph, &ctx);
            }
            self.drawer
                .undraw_vertex(outcome.removed_surrogate, &self.graph, &ctx);
            for vertex in &outcome.restored_vertices {
                self.drawer.draw_new_vertex(*vertex, &self.graph, &ctx);
            }
            for edge in &outcome.restored_edges {
                self.drawer.draw_new_edge(*edge, &self.graph, &ctx);
            }
        }
        Ok(())
    }

    /// Select the surrogate of a collapsed group together with its edges.
    pub fn select_collapsed_group(&mut self, name: &str) -> Result<(), NetvisError> {
        self.coordinator
            .check_not_laying_out("select a collapsed group")?;
        match self.groups.surrogate_of(name) {
            Some(surrogate) => self.set_vertex_selected(surrogate, true, true),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Zoom and pan
    // ------------------------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.transform.zoom()
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), NetvisError> {
        let before = self.transform.translation();
        self.transform.set_zoom(zoom)?;
        self.events.publish(CanvasEvent::ZoomChanged { zoom });
        self.publish_translation_if_changed(before);
        Ok(())
    }

    /// Wheel or click zoom about a point, clamped into the zoom range.
    pub fn zoom_about(&mut self, point: Vec2, factor: f64) {
        let before_zoom = self.transform.zoom();
        let before = self.transform.translation();
        self.transform.zoom_about(point, factor);
        let zoom = self.transform.zoom();
        if zoom != before_zoom {
            self.events.publish(CanvasEvent::ZoomChanged { zoom });
        }
        self.publish_translation_if_changed(before);
    }

    pub fn translate_to(&mut self, x: f64, y: f64) {
        let before = self.transform.translation();
        self.transform.translate_to(x, y);
        self.publish_translation_if_changed(before);
    }

    pub fn translate_by(&mut self, dx: f64, dy: f64) {
        let before = self.transform.translation();
        self.transform.translate_by(dx, dy);
        self.publish_translation_if_changed(before);
    }

    fn publish_translation_if_changed(&mut self, before: (f64, f64)) {
        let after = self.transform.translation();
        if after != before {
            self.events.publish(CanvasEvent::TranslationChanged {
                x: after.0,
                y: after.1,
            });
        }
    }

    // ------------------------------------------------------------------
    // Bundling and styling
    // ------------------------------------------------------------------

    pub fn set_curve_style(&mut self, style: CurveStyle) {
        if self.options.curve_style == style {
            return;
        }
        self.options.curve_style = style;
        self.bundle_all_if_appropriate();
        self.draw();
    }

    pub fn set_straightening(&mut self, straightening: f32) {
        self.options.straightening = straightening.clamp(0.0, 1.0);
        self.bundle_all_if_appropriate();
        self.draw();
    }

    pub fn snap_vertices_to_grid(&mut self, grid_size: u32) -> Result<(), NetvisError> {
        self.coordinator
            .check_not_laying_out("snap vertices to grid")?;
        netvis_core::snap_to_grid(&mut self.graph, grid_size)?;
        self.groups.update_collapsed_locations(&self.graph);
        self.bundle_all_if_appropriate();
        self.draw();
        Ok(())
    }

    fn bundle_all_if_appropriate(&mut self) {
        if !should_bundle(self.options.curve_style, self.graph.edge_count()) {
            return;
        }
        let Some(rect) = self.layout_rect_minus_margin() else {
            return;
        };
        self.bundler.bundle_all(&mut self.graph, rect);
    }

    fn rebundle_incident_if_appropriate(&mut self, vertices: &[VertexId]) {
        if !should_bundle(self.options.curve_style, self.graph.edge_count()) {
            return;
        }
        let Some(rect) = self.layout_rect_minus_margin() else {
            return;
        };
        let edges = unique_incident_edges(&self.graph, vertices);
        if edges.is_empty() {
            return;
        }
        self.bundler.bundle_subset(&mut self.graph, &edges, rect);
    }
}
