//! Read-only bundle of everything the renderer and hit tester look at.

use crate::geometry;
use kurbo::{Point, Rect};
use pb_core::config::CanvasConfig;
use pb_core::connections::ConnectionStore;
use pb_core::id::NodeId;
use pb_core::layout::LayoutStore;
use pb_core::model::{Connection, NodeRecord, NodeType, Position};
use std::collections::HashMap;

/// Collapsed-state map: node id → collapsed. Missing ids are expanded.
pub type CollapsedMap = HashMap<NodeId, bool>;

pub struct CanvasView<'a> {
    pub nodes: &'a [NodeRecord],
    pub node_types: &'a [NodeType],
    pub layout: &'a LayoutStore,
    pub connections: &'a ConnectionStore,
    pub collapsed: &'a CollapsedMap,
    pub config: &'a CanvasConfig,
    index: HashMap<NodeId, usize>,
}

impl<'a> CanvasView<'a> {
    pub fn new(
        nodes: &'a [NodeRecord],
        node_types: &'a [NodeType],
        layout: &'a LayoutStore,
        connections: &'a ConnectionStore,
        collapsed: &'a CollapsedMap,
        config: &'a CanvasConfig,
    ) -> Self {
        let index = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        Self {
            nodes,
            node_types,
            layout,
            connections,
            collapsed,
            config,
            index,
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&'a NodeRecord> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_type(&self, type_id: &str) -> Option<&'a NodeType> {
        self.node_types.iter().find(|t| t.id == type_id)
    }

    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.collapsed.get(&id).copied().unwrap_or(false)
    }

    /// Position of a node that is both in the node list and placed.
    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.index.get(&id)?;
        self.layout.get(id)
    }

    /// Placed nodes in paint order (node-list order, last on top).
    pub fn placed_nodes(&self) -> impl DoubleEndedIterator<Item = (&'a NodeRecord, Position)> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| self.layout.get(n.id).map(|p| (n, p)))
    }

    pub fn card_rect(&self, id: NodeId) -> Option<Rect> {
        let pos = self.position(id)?;
        Some(geometry::card_rect(pos, self.is_collapsed(id), self.config))
    }

    pub fn input_anchor(&self, id: NodeId) -> Option<Point> {
        let pos = self.position(id)?;
        Some(geometry::input_anchor(pos, self.is_collapsed(id), self.config))
    }

    pub fn output_anchor(&self, id: NodeId) -> Option<Point> {
        let pos = self.position(id)?;
        Some(geometry::output_anchor(pos, self.is_collapsed(id), self.config))
    }

    /// Source output anchor and target input anchor, or `None` when either
    /// end is dangling.
    pub fn connection_endpoints(&self, conn: &Connection) -> Option<(Point, Point)> {
        Some((
            self.output_anchor(conn.source_id)?,
            self.input_anchor(conn.target_id)?,
        ))
    }
}
