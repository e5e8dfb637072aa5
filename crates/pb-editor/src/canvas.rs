//! The canvas editor: owns every piece of canvas state and talks to the host.
//!
//! Pointer input goes through `handle`, which hit-tests the event, feeds the
//! interaction state machine and applies the resulting actions. Everything
//! that changes positions or connections ends with exactly one
//! `on_layout_change` carrying the full `CanvasState`.

use crate::host::CanvasHost;
use crate::input::InputEvent;
use crate::interaction::{CanvasAction, Interaction, InteractionState};
use crate::selection::Selection;
use pb_core::config::CanvasConfig;
use pb_core::connections::ConnectionStore;
use pb_core::id::{ConnectionId, NodeId};
use pb_core::layout::{GridPlacement, LayoutStore, Viewport};
use pb_core::model::{CanvasState, NodeRecord, NodeType, NodeUpdate, Position};
use pb_core::search::search_nodes;
use pb_core::transform::ViewTransform;
use pb_render::geometry::to_point;
use pb_render::hit::{HitTarget, hit_test};
use pb_render::scene::{CanvasScene, ConnectionPreview, Overlay, build_scene};
use pb_render::view::{CanvasView, CollapsedMap};

pub struct CanvasEditor<H: CanvasHost> {
    host: H,
    config: CanvasConfig,
    nodes: Vec<NodeRecord>,
    node_types: Vec<NodeType>,
    layout: LayoutStore,
    connections: ConnectionStore,
    transform: ViewTransform,
    viewport: Viewport,
    selection: Selection,
    collapsed: CollapsedMap,
    interaction: Interaction,
}

impl<H: CanvasHost> CanvasEditor<H> {
    /// Restore from a persisted state. Nodes arrive separately via `set_nodes`.
    pub fn new(state: CanvasState, config: CanvasConfig, host: H) -> Self {
        let layout = LayoutStore::from_positions(state.positions, GridPlacement::from_config(&config));
        let connections = ConnectionStore::from_connections(state.connections);
        let transform = ViewTransform::with_limits(config.min_scale, config.max_scale);
        Self {
            host,
            config,
            nodes: Vec::new(),
            node_types: Vec::new(),
            layout,
            connections,
            transform,
            viewport: Viewport::default(),
            selection: Selection::new(),
            collapsed: CollapsedMap::new(),
            interaction: Interaction::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn layout(&self) -> &LayoutStore {
        &self.layout
    }

    pub fn connections(&self) -> &ConnectionStore {
        &self.connections
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> &[NodeId] {
        self.selection.as_slice()
    }

    pub fn interaction(&self) -> &InteractionState {
        self.interaction.state()
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.get(&id).copied().unwrap_or(false)
    }

    /// Snapshot of the persisted unit.
    pub fn state(&self) -> CanvasState {
        CanvasState {
            positions: self.layout.positions().clone(),
            connections: self.connections.as_slice().to_vec(),
        }
    }

    pub fn view(&self) -> CanvasView<'_> {
        CanvasView::new(
            &self.nodes,
            &self.node_types,
            &self.layout,
            &self.connections,
            &self.collapsed,
            &self.config,
        )
    }

    // ─── External inputs ─────────────────────────────────────────────────

    /// Replace the node list. Nodes without a position get their grid slot,
    /// reported to the host in one emission. Selected ids that left the list
    /// are dropped, as is a gesture holding on to one.
    pub fn set_nodes(&mut self, nodes: Vec<NodeRecord>) {
        self.nodes = nodes;
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.selection.retain(|id| ids.contains(&id));
        if self.interaction.holds_node(|id| !ids.contains(&id)) {
            log::debug!("dragged node left the list, cancelling gesture");
            self.interaction.cancel();
        }
        if self.layout.ensure_positions(&ids) {
            self.emit_layout();
        }
    }

    pub fn set_node_types(&mut self, node_types: Vec<NodeType>) {
        self.node_types = node_types;
    }

    /// Replace positions and connections wholesale. Any gesture in flight is
    /// abandoned. Emits only if current nodes had to be auto-placed.
    pub fn load_state(&mut self, state: CanvasState) {
        self.interaction.cancel();
        self.layout = LayoutStore::from_positions(state.positions, GridPlacement::from_config(&self.config));
        self.connections = ConnectionStore::from_connections(state.connections);
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        self.selection.retain(|id| ids.contains(&id));
        if self.layout.ensure_positions(&ids) {
            self.emit_layout();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Process one input event. Returns `true` if the canvas needs a redraw.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Wheel { x, y, delta } = *event {
            let before = self.transform;
            self.transform
                .zoom_at(Position::new(x, y), delta, self.config.zoom_sensitivity);
            return self.transform != before;
        }

        let world = self.transform.screen_to_world(event.position());
        let target = hit_test(&self.view(), to_point(world));
        log::trace!("{event:?} hit {target:?}");

        let before = *self.interaction.state();
        let connections = &self.connections;
        let actions = self.interaction.handle(event, target, |id| {
            connections.get(id).map(|c| (c.source_id, c.target_id))
        });
        let changed = !actions.is_empty() || *self.interaction.state() != before;
        for action in actions {
            self.apply(action);
        }
        changed
    }

    fn apply(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Pan { dx, dy } => self.transform.pan_by(dx, dy),
            CanvasAction::PressNode(id) => self.selection.press(id),
            CanvasAction::ClearSelection => self.selection.clear(),
            CanvasAction::SelectInRect(rect) => {
                let view = CanvasView::new(
                    &self.nodes,
                    &self.node_types,
                    &self.layout,
                    &self.connections,
                    &self.collapsed,
                    &self.config,
                );
                self.selection.select_in_rect(&view, &self.transform, rect);
            }
            CanvasAction::MoveSelection { dx, dy } => {
                let (dx, dy) = self.transform.screen_delta_to_world(dx, dy);
                self.layout.move_positions(self.selection.as_slice(), dx, dy);
            }
            CanvasAction::CommitLayout => self.emit_layout(),
            CanvasAction::Connect { source, target } => {
                self.connect(source, target, None);
            }
            CanvasAction::Reconnect {
                connection,
                source,
                target,
            } => self.reconnect(connection, source, target),
            CanvasAction::RemoveConnection(id) => {
                self.remove_connection(id);
            }
            CanvasAction::OpenDetail(id) => self.open_detail(id),
        }
    }

    /// Detach `connection` and, with a target, attach its label to a new
    /// `source → target` edge. One emission either way.
    fn reconnect(&mut self, connection: ConnectionId, source: NodeId, target: Option<NodeId>) {
        let label = self.connections.get(connection).and_then(|c| c.label.clone());
        if !self.connections.remove(connection) {
            log::debug!("connection {connection} vanished during reconnect");
            return;
        }
        if let Some(target) = target {
            self.connections.add(source, target, label);
        }
        self.emit_layout();
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Add `source → target`. Rejected self-loops and duplicates change
    /// nothing and emit nothing.
    pub fn connect(&mut self, source: NodeId, target: NodeId, label: Option<String>) -> Option<ConnectionId> {
        let id = self.connections.add(source, target, label)?;
        self.emit_layout();
        Some(id)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(id);
        if removed {
            self.emit_layout();
        }
        removed
    }

    pub fn relabel_connection(&mut self, id: ConnectionId, label: &str) -> bool {
        let relabeled = self.connections.relabel(id, label);
        if relabeled {
            self.emit_layout();
        }
        relabeled
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    pub fn set_position(&mut self, id: NodeId, pos: Position) {
        self.layout.set_position(id, pos);
        self.emit_layout();
    }

    /// Ask the host for a new node of `type_id`, then place and select it.
    ///
    /// The provisional record keeps the canvas consistent until the host
    /// refreshes the node list.
    pub fn add_node(&mut self, type_id: &str) -> Option<NodeId> {
        let id = self.host.on_request_new_node(type_id)?;
        log::debug!("host created node {id} of type {type_id}");
        let index = match self.nodes.iter().position(|n| n.id == id) {
            Some(index) => index,
            None => {
                let name = self
                    .node_types
                    .iter()
                    .find(|t| t.id == type_id)
                    .map(|t| format!("New {}", t.name))
                    .unwrap_or_else(|| "New node".to_string());
                self.nodes.push(NodeRecord::new(id, name, type_id));
                self.nodes.len() - 1
            }
        };
        self.layout.ensure_position_at_slot(id, index);
        self.selection.select_only(id);
        self.emit_layout();
        Some(id)
    }

    /// Patch the local copy and forward the edit to the host.
    pub fn update_node(&mut self, id: NodeId, update: NodeUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.apply(&update);
        self.host.on_node_content_change(id, &update);
        true
    }

    /// Set or clear (`None` or blank) a node's annotation.
    pub fn set_annotation(&mut self, id: NodeId, annotation: Option<String>) -> bool {
        let annotation = annotation.filter(|a| !a.trim().is_empty());
        self.update_node(
            id,
            NodeUpdate {
                annotation: Some(annotation),
                ..NodeUpdate::default()
            },
        )
    }

    pub fn open_detail(&mut self, id: NodeId) {
        if self.nodes.iter().any(|n| n.id == id) {
            self.host.on_request_open_detail(id);
        }
    }

    pub fn toggle_collapsed(&mut self, id: NodeId) -> bool {
        let collapsed = !self.is_collapsed(id);
        self.collapsed.insert(id, collapsed);
        collapsed
    }

    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) {
        self.collapsed.insert(id, collapsed);
    }

    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        for node in &self.nodes {
            self.collapsed.insert(node.id, collapsed);
        }
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    /// Center the view on a node's card and make it the only selection.
    /// Unknown or unplaced ids are a no-op.
    pub fn locate_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.iter().any(|n| n.id == id) {
            return false;
        }
        let Some(pos) = self.layout.get(id) else {
            return false;
        };
        let target = pos.offset(self.config.locate_offset_x, self.config.locate_offset_y);
        self.transform.center_on(target, self.viewport);
        self.selection.select_only(id);
        true
    }

    pub fn search(&self, query: &str) -> Vec<&NodeRecord> {
        search_nodes(&self.nodes, query, self.config.search_limit)
    }

    /// Locate the first search hit.
    pub fn search_and_locate(&mut self, query: &str) -> Option<NodeId> {
        let id = self.search(query).first().map(|n| n.id)?;
        self.locate_node(id).then_some(id)
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by_step(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by_step(-self.config.zoom_step);
    }

    /// Zoom around the viewport center.
    pub fn zoom_by_step(&mut self, step: f32) {
        let center = Position::new(self.viewport.width / 2.0, self.viewport.height / 2.0);
        self.transform.set_scale_at(center, self.transform.scale + step);
    }

    pub fn reset_view(&mut self) {
        self.transform.reset();
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Display list for the current frame.
    pub fn scene(&self) -> CanvasScene {
        let mut overlay = Overlay {
            selection: self.selection.as_slice(),
            marquee: self.interaction.marquee_rect(),
            viewport: self.viewport,
            ..Overlay::default()
        };
        match *self.interaction.state() {
            InteractionState::DraggingNodes { node, .. } => overlay.active = Some(node),
            InteractionState::DraggingConnection {
                origin,
                reconnect,
                pointer,
            } => {
                overlay.preview = Some(ConnectionPreview {
                    origin,
                    pointer: self.transform.screen_to_world(pointer),
                });
                overlay.hidden_connection = reconnect.map(|(id, _)| id);
            }
            _ => {}
        }
        build_scene(&self.view(), &self.transform, &overlay)
    }

    /// What lies under a screen point.
    pub fn target_at(&self, screen: Position) -> HitTarget {
        let world = self.transform.screen_to_world(screen);
        hit_test(&self.view(), to_point(world))
    }

    fn emit_layout(&mut self) {
        let state = self.state();
        log::debug!(
            "layout change: {} positions, {} connections",
            state.positions.len(),
            state.connections.len()
        );
        self.host.on_layout_change(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostCall, RecordingHost};
    use pretty_assertions::assert_eq;

    fn editor_with(ids: &[&str]) -> CanvasEditor<RecordingHost> {
        let mut editor = CanvasEditor::new(CanvasState::default(), CanvasConfig::default(), RecordingHost::new());
        editor.set_nodes(
            ids.iter()
                .map(|id| NodeRecord::new(NodeId::intern(id), *id, "puzzle"))
                .collect(),
        );
        editor
    }

    #[test]
    fn set_nodes_emits_once_for_new_positions() {
        let mut editor = editor_with(&["ed_n1", "ed_n2", "ed_n3"]);
        assert_eq!(editor.host().layout_changes(), 1);

        let nodes = editor.nodes().to_vec();
        editor.set_nodes(nodes);
        assert_eq!(editor.host().layout_changes(), 1);
    }

    #[test]
    fn rejected_connect_does_not_emit() {
        let mut editor = editor_with(&["ed_c1", "ed_c2"]);
        editor.host_mut().clear();
        let a = NodeId::intern("ed_c1");
        let b = NodeId::intern("ed_c2");

        assert!(editor.connect(a, b, None).is_some());
        assert!(editor.connect(a, b, None).is_none());
        assert!(editor.connect(a, a, None).is_none());
        assert_eq!(editor.host().layout_changes(), 1);
    }

    #[test]
    fn set_position_emits_the_new_position() {
        let mut editor = editor_with(&["ed_pos"]);
        editor.host_mut().clear();
        let id = NodeId::intern("ed_pos");

        editor.set_position(id, Position::new(-40.0, 75.5));
        assert_eq!(editor.host().layout_changes(), 1);
        let persisted = editor.host().last_layout().unwrap();
        assert_eq!(persisted.positions.get(&id), Some(&Position::new(-40.0, 75.5)));
    }

    #[test]
    fn load_state_emits_once_when_nodes_need_placing() {
        let mut editor = editor_with(&["ed_load_a", "ed_load_b"]);
        let a = NodeId::intern("ed_load_a");
        let b = NodeId::intern("ed_load_b");
        editor.host_mut().clear();

        let full = editor.state();
        editor.load_state(full.clone());
        assert_eq!(editor.host().layout_changes(), 0);

        let mut partial = full;
        partial.positions.remove(&b);
        editor.load_state(partial);
        assert_eq!(editor.host().layout_changes(), 1);
        let persisted = editor.host().last_layout().unwrap();
        assert!(persisted.positions.contains_key(&a));
        assert!(persisted.positions.contains_key(&b));
    }

    #[test]
    fn refreshed_node_list_prunes_the_selection() {
        let mut editor = editor_with(&["ed_keep", "ed_drop"]);
        let keep = NodeId::intern("ed_keep");
        let gone = NodeId::intern("ed_drop");
        editor.selection.replace([keep, gone]);

        let kept: Vec<NodeRecord> = editor.nodes().iter().filter(|n| n.id == keep).cloned().collect();
        editor.set_nodes(kept);
        assert_eq!(editor.selection(), &[keep]);
    }

    #[test]
    fn reconnecting_a_vanished_connection_adds_nothing() {
        let mut editor = editor_with(&["ed_re_a", "ed_re_b", "ed_re_c"]);
        let a = NodeId::intern("ed_re_a");
        let c = NodeId::intern("ed_re_c");
        editor.host_mut().clear();

        editor.apply(CanvasAction::Reconnect {
            connection: ConnectionId::intern("ed_re_gone"),
            source: a,
            target: Some(c),
        });
        assert!(editor.connections().is_empty());
        assert_eq!(editor.host().layout_changes(), 0);
    }

    #[test]
    fn wheel_zoom_keeps_cursor_point() {
        let mut editor = editor_with(&["ed_zoom"]);
        let cursor = Position::new(300.0, 200.0);
        let before = editor.transform().screen_to_world(cursor);
        assert!(editor.handle(&InputEvent::Wheel {
            x: 300.0,
            y: 200.0,
            delta: 500.0,
        }));
        assert!((editor.transform().scale - 1.5).abs() < 1e-4);
        let after = editor.transform().screen_to_world(cursor);
        assert!((before.x - after.x).abs() < 1e-3 && (before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn annotation_is_patched_locally_and_forwarded() {
        let mut editor = editor_with(&["ed_note"]);
        let id = NodeId::intern("ed_note");
        assert!(editor.set_annotation(id, Some("check pacing".into())));
        assert_eq!(editor.nodes()[0].annotation_text(), Some("check pacing"));

        assert!(editor.set_annotation(id, Some("   ".into())));
        assert_eq!(editor.nodes()[0].annotation, None);
        assert!(matches!(
            editor.host().calls.last(),
            Some(HostCall::ContentChange(node, _)) if *node == id
        ));
        assert!(!editor.set_annotation(NodeId::intern("ed_note_missing"), None));
    }

    #[test]
    fn zoom_buttons_step_and_reset() {
        let mut editor = editor_with(&[]);
        editor.resize(800.0, 600.0);
        editor.zoom_in();
        assert!((editor.transform().scale - 1.1).abs() < 1e-6);
        editor.zoom_out();
        editor.zoom_out();
        assert!((editor.transform().scale - 0.9).abs() < 1e-6);
        editor.reset_view();
        assert_eq!(*editor.transform(), ViewTransform::new());
    }
}
