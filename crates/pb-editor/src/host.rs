//! Host seam: everything the canvas asks of its embedding application.
//!
//! The canvas never persists anything and never creates nodes itself. It
//! reports mutations through these callbacks and carries on without waiting
//! for an acknowledgement.

use pb_core::id::NodeId;
use pb_core::model::{CanvasState, NodeUpdate};

pub trait CanvasHost {
    /// Positions and connections after a mutating operation, as one unit.
    fn on_layout_change(&mut self, state: &CanvasState);

    /// Create a node of the given type and return its id, or `None` if the
    /// host declined.
    fn on_request_new_node(&mut self, type_id: &str) -> Option<NodeId>;

    /// Quick-edit of node content (name, annotation, section text).
    fn on_node_content_change(&mut self, node: NodeId, update: &NodeUpdate);

    /// The user wants the full editor for this node.
    fn on_request_open_detail(&mut self, node: NodeId);
}

/// One recorded host callback.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    LayoutChange(CanvasState),
    NewNode { type_id: String, created: Option<NodeId> },
    ContentChange(NodeId, NodeUpdate),
    OpenDetail(NodeId),
}

/// Host that records every callback and hands out `{type_id}_{n}` ids.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    /// When set, node creation requests are declined.
    pub refuse_new_nodes: bool,
    created: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent layout emission.
    pub fn last_layout(&self) -> Option<&CanvasState> {
        self.calls.iter().rev().find_map(|call| match call {
            HostCall::LayoutChange(state) => Some(state),
            _ => None,
        })
    }

    pub fn layout_changes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::LayoutChange(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl CanvasHost for RecordingHost {
    fn on_layout_change(&mut self, state: &CanvasState) {
        self.calls.push(HostCall::LayoutChange(state.clone()));
    }

    fn on_request_new_node(&mut self, type_id: &str) -> Option<NodeId> {
        let created = if self.refuse_new_nodes {
            None
        } else {
            self.created += 1;
            Some(NodeId::intern(&format!("{type_id}_{}", self.created)))
        };
        self.calls.push(HostCall::NewNode {
            type_id: type_id.to_string(),
            created,
        });
        created
    }

    fn on_node_content_change(&mut self, node: NodeId, update: &NodeUpdate) {
        self.calls.push(HostCall::ContentChange(node, update.clone()));
    }

    fn on_request_open_detail(&mut self, node: NodeId) {
        self.calls.push(HostCall::OpenDetail(node));
    }
}
