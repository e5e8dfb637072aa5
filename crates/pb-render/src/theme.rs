//! Canvas color palettes shared by the Vello and Canvas2D painters.

use pb_core::model::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTheme {
    pub background: Color,
    pub grid_minor: Color,
    pub grid_major: Color,
    pub card_fill: Color,
    pub card_text: Color,
    pub card_muted_text: Color,
    pub edge: Color,
    pub edge_highlight: Color,
    pub label_fill: Color,
    pub selection: Color,
    pub annotation_fill: Color,
    pub annotation_text: Color,
    pub marquee_fill: Color,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            background: Color::rgba(0.961, 0.961, 0.969, 1.0),
            grid_minor: Color::rgba(0.0, 0.0, 0.0, 0.04),
            grid_major: Color::rgba(0.0, 0.0, 0.0, 0.09),
            card_fill: Color::rgba(1.0, 1.0, 1.0, 1.0),
            card_text: Color::rgba(0.114, 0.114, 0.122, 1.0),
            card_muted_text: Color::rgba(0.525, 0.525, 0.545, 1.0),
            edge: Color::rgba(0.42, 0.44, 0.5, 1.0),
            edge_highlight: Color::rgba(0.31, 0.765, 0.969, 1.0),
            label_fill: Color::rgba(1.0, 1.0, 1.0, 0.95),
            selection: Color::rgba(0.31, 0.765, 0.969, 1.0),
            annotation_fill: Color::rgba(0.961, 0.62, 0.043, 1.0),
            annotation_text: Color::rgba(1.0, 1.0, 1.0, 1.0),
            marquee_fill: Color::rgba(0.31, 0.765, 0.969, 0.08),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::rgba(0.11, 0.11, 0.118, 1.0),
            grid_minor: Color::rgba(1.0, 1.0, 1.0, 0.03),
            grid_major: Color::rgba(1.0, 1.0, 1.0, 0.07),
            card_fill: Color::rgba(0.173, 0.173, 0.18, 1.0),
            card_text: Color::rgba(0.961, 0.961, 0.969, 1.0),
            card_muted_text: Color::rgba(0.596, 0.596, 0.616, 1.0),
            edge: Color::rgba(0.545, 0.565, 0.62, 1.0),
            edge_highlight: Color::rgba(0.31, 0.765, 0.969, 1.0),
            label_fill: Color::rgba(0.173, 0.173, 0.18, 0.95),
            selection: Color::rgba(0.31, 0.765, 0.969, 1.0),
            annotation_fill: Color::rgba(0.961, 0.62, 0.043, 1.0),
            annotation_text: Color::rgba(0.11, 0.11, 0.118, 1.0),
            marquee_fill: Color::rgba(0.31, 0.765, 0.969, 0.12),
        }
    }
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}
