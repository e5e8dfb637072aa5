//! Canvas tuning constants.
//!
//! Every field has a default, so a host only overrides what it needs:
//! `CanvasConfig::from_json(r#"{"zoomSensitivity": 0.002}"#)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    // ── Cards ──
    pub card_width: f32,
    /// Card height with only the header visible.
    pub collapsed_height: f32,
    /// Card height with content sections. Fixed, not measured.
    pub expanded_height: f32,

    // ── Sockets and connections ──
    pub collapsed_socket_y: f32,
    pub expanded_socket_y: f32,
    pub socket_radius: f32,
    /// Distance of the unplug handle to the left of the target's input anchor.
    pub unplug_offset: f32,
    pub unplug_radius: f32,
    /// Max world distance from a curve that still counts as a hit.
    pub connection_hit_tolerance: f32,

    // ── Grid ──
    pub grid_cell: f32,
    pub grid_major_every: u32,

    // ── View ──
    pub zoom_sensitivity: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Scale increment for toolbar zoom buttons.
    pub zoom_step: f32,
    /// Offset from a card's top-left that `locate` centers in the viewport.
    pub locate_offset_x: f32,
    pub locate_offset_y: f32,

    // ── Auto-placement ──
    pub auto_place_margin: f32,
    pub auto_place_spacing_x: f32,
    pub auto_place_spacing_y: f32,
    pub auto_place_columns: u32,

    // ── Search ──
    pub search_limit: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            card_width: 260.0,
            collapsed_height: 56.0,
            expanded_height: 200.0,
            collapsed_socket_y: 28.0,
            expanded_socket_y: 28.0,
            socket_radius: 8.0,
            unplug_offset: 18.0,
            unplug_radius: 6.0,
            connection_hit_tolerance: 6.0,
            grid_cell: 20.0,
            grid_major_every: 5,
            zoom_sensitivity: 0.001,
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_step: 0.1,
            locate_offset_x: 130.0,
            locate_offset_y: 100.0,
            auto_place_margin: 100.0,
            auto_place_spacing_x: 350.0,
            auto_place_spacing_y: 250.0,
            auto_place_columns: 3,
            search_limit: 5,
        }
    }
}

impl CanvasConfig {
    /// Parse a partial JSON override on top of the defaults.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or the scale range is empty.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid canvas config: {e}"))?;
        if !(config.min_scale > 0.0 && config.min_scale <= config.max_scale) {
            return Err(format!(
                "invalid canvas config: scale range [{}, {}]",
                config.min_scale, config.max_scale
            ));
        }
        if config.auto_place_columns == 0 {
            return Err("invalid canvas config: autoPlaceColumns must be > 0".to_string());
        }
        Ok(config)
    }

    pub fn card_height(&self, collapsed: bool) -> f32 {
        if collapsed {
            self.collapsed_height
        } else {
            self.expanded_height
        }
    }

    pub fn socket_y(&self, collapsed: bool) -> f32 {
        if collapsed {
            self.collapsed_socket_y
        } else {
            self.expanded_socket_y
        }
    }
}
