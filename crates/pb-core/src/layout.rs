//! Node layout store: node id → world position.
//!
//! Nodes that arrive without a position are auto-placed on a fixed grid
//! (three columns, 350 × 250 apart, 100 units from the origin) the first
//! time they are observed.

use crate::config::CanvasConfig;
use crate::id::NodeId;
use crate::model::Position;
use std::collections::BTreeMap;

/// The visible canvas area in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Auto-placement grid parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPlacement {
    pub margin: f32,
    pub spacing_x: f32,
    pub spacing_y: f32,
    pub columns: u32,
}

impl Default for GridPlacement {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl GridPlacement {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            margin: config.auto_place_margin,
            spacing_x: config.auto_place_spacing_x,
            spacing_y: config.auto_place_spacing_y,
            columns: config.auto_place_columns.max(1),
        }
    }

    /// World position of the `index`-th slot (0-based, row-major).
    pub fn slot(&self, index: usize) -> Position {
        let columns = self.columns as usize;
        let col = (index % columns) as f32;
        let row = (index / columns) as f32;
        Position::new(
            self.margin + col * self.spacing_x,
            self.margin + row * self.spacing_y,
        )
    }
}

/// Owns every node's world position.
#[derive(Debug, Clone, Default)]
pub struct LayoutStore {
    positions: BTreeMap<NodeId, Position>,
    placement: GridPlacement,
}

impl LayoutStore {
    pub fn new(placement: GridPlacement) -> Self {
        Self {
            positions: BTreeMap::new(),
            placement,
        }
    }

    pub fn from_positions(positions: BTreeMap<NodeId, Position>, placement: GridPlacement) -> Self {
        Self {
            positions,
            placement,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, Position> {
        &self.positions
    }

    /// Give every id without a position its grid slot. The slot index is the
    /// id's index in `ids`. Existing positions are never touched.
    ///
    /// Returns `true` if at least one position was added.
    pub fn ensure_positions(&mut self, ids: &[NodeId]) -> bool {
        let mut added = 0;
        for (index, id) in ids.iter().enumerate() {
            if !self.positions.contains_key(id) {
                let slot = self.placement.slot(index);
                log::debug!("auto-placing {id} at ({}, {})", slot.x, slot.y);
                self.positions.insert(*id, slot);
                added += 1;
            }
        }
        added > 0
    }

    /// Place a single id at grid slot `index` unless it already has a position.
    pub fn ensure_position_at_slot(&mut self, id: NodeId, index: usize) -> bool {
        if self.positions.contains_key(&id) {
            return false;
        }
        self.positions.insert(id, self.placement.slot(index));
        true
    }

    /// Translate every listed id by a world-space delta. Ids without a
    /// position are skipped. Returns `true` if anything moved.
    pub fn move_positions(&mut self, ids: &[NodeId], dx: f32, dy: f32) -> bool {
        let mut moved = false;
        for id in ids {
            if let Some(pos) = self.positions.get_mut(id) {
                *pos = pos.offset(dx, dy);
                moved = true;
            }
        }
        moved
    }

    pub fn set_position(&mut self, id: NodeId, pos: Position) {
        self.positions.insert(id, pos);
    }
}
