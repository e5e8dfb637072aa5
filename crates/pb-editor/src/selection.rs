//! Selection engine: click selection and marquee selection.

use kurbo::Rect;
use pb_core::id::NodeId;
use pb_core::transform::ViewTransform;
use pb_render::hit::hit_test_rect;
use pb_render::view::CanvasView;
use smallvec::SmallVec;

/// Ordered set of selected node ids. Volatile, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: SmallVec<[NodeId; 8]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn select_only(&mut self, id: NodeId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Pressing a node body: an unselected node replaces the selection,
    /// a selected one keeps the whole selection so it can be dragged.
    pub fn press(&mut self, id: NodeId) {
        if !self.contains(id) {
            self.select_only(id);
        }
    }

    /// Keep only the ids for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(NodeId) -> bool) {
        self.ids.retain(|id| keep(*id));
    }

    /// Replace the selection, dropping repeated ids.
    pub fn replace(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Recompute from scratch: every node whose screen box overlaps
    /// `screen_rect`. Never accumulates over previous ticks.
    pub fn select_in_rect(&mut self, view: &CanvasView, transform: &ViewTransform, screen_rect: Rect) {
        self.replace(hit_test_rect(view, transform, screen_rect));
    }
}
