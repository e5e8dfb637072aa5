//! Display list → Vello drawing commands.
//!
//! World-space items are drawn through the view transform; grid lines and
//! the marquee are already in screen space.

use crate::scene::{Axis, CanvasScene, CardView, EdgeView, GridLine, SocketView};
use crate::theme::CanvasTheme;
use kurbo::{Affine, Circle, CubicBez, Line, Rect, Stroke};
use pb_core::layout::Viewport;
use pb_core::model::Color;
use pb_core::transform::ViewTransform;
use peniko::{Color as PenikoColor, Fill};
use vello::Scene;

const CARD_RADIUS: f64 = 10.0;
const ACCENT_BAR_HEIGHT: f64 = 6.0;
const HALO_WIDTH: f64 = 3.0;
const EDGE_WIDTH: f64 = 2.0;
const LABEL_BADGE: (f64, f64) = (56.0, 20.0);
const ANNOTATION_BADGE: (f64, f64) = (90.0, 20.0);

/// Paint the whole canvas. Call once per frame with a cleared `Scene`.
pub fn paint_canvas(
    scene: &mut Scene,
    canvas: &CanvasScene,
    transform: &ViewTransform,
    viewport: Viewport,
    theme: &CanvasTheme,
) {
    let screen = Rect::new(0.0, 0.0, viewport.width as f64, viewport.height as f64);
    scene.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(theme.background), None, &screen);

    for line in &canvas.grid {
        paint_grid_line(scene, line, screen, theme);
    }

    let world = Affine::translate((transform.pan_x as f64, transform.pan_y as f64))
        * Affine::scale(transform.scale as f64);

    for edge in &canvas.edges {
        paint_edge(scene, world, edge, theme);
    }
    if let Some(preview) = &canvas.preview {
        paint_preview(scene, world, preview, theme);
    }
    for card in &canvas.cards {
        paint_card(scene, world, card, theme);
    }

    if let Some(marquee) = canvas.marquee {
        scene.fill(Fill::NonZero, Affine::IDENTITY, to_peniko(theme.marquee_fill), None, &marquee);
        let dashed = Stroke::new(1.0).with_dashes(0.0, [4.0, 4.0]);
        scene.stroke(&dashed, Affine::IDENTITY, to_peniko(theme.selection), None, &marquee);
    }
}

fn paint_grid_line(scene: &mut Scene, line: &GridLine, screen: Rect, theme: &CanvasTheme) {
    let shape = match line.axis {
        Axis::Vertical => Line::new((line.offset, screen.y0), (line.offset, screen.y1)),
        Axis::Horizontal => Line::new((screen.x0, line.offset), (screen.x1, line.offset)),
    };
    let color = if line.major { theme.grid_major } else { theme.grid_minor };
    scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, to_peniko(color), None, &shape);
}

fn paint_edge(scene: &mut Scene, world: Affine, edge: &EdgeView, theme: &CanvasTheme) {
    let color = if edge.highlighted { theme.edge_highlight } else { theme.edge };
    scene.stroke(&Stroke::new(EDGE_WIDTH), world, to_peniko(color), None, &edge.curve);

    scene.fill(Fill::NonZero, world, to_peniko(color), None, &Circle::new(edge.unplug, 4.0));

    if let Some(label) = &edge.label {
        let (w, h) = LABEL_BADGE;
        let badge = Rect::from_center_size(edge.label_pos, (w, h)).to_rounded_rect(h / 2.0);
        scene.fill(Fill::NonZero, world, to_peniko(theme.label_fill), None, &badge);
        scene.stroke(&Stroke::new(1.0), world, to_peniko(color), None, &badge);
        log::trace!("LABEL {:?} at {:?}", label, edge.label_pos);
    }
}

fn paint_preview(scene: &mut Scene, world: Affine, curve: &CubicBez, theme: &CanvasTheme) {
    let dashed = Stroke::new(EDGE_WIDTH).with_dashes(0.0, [6.0, 4.0]);
    scene.stroke(&dashed, world, to_peniko(theme.edge_highlight), None, curve);
}

fn paint_card(scene: &mut Scene, world: Affine, card: &CardView, theme: &CanvasTheme) {
    let body = card.rect.to_rounded_rect(CARD_RADIUS);

    if card.selected {
        let halo = card.rect.inflate(HALO_WIDTH, HALO_WIDTH).to_rounded_rect(CARD_RADIUS + HALO_WIDTH);
        scene.stroke(&Stroke::new(HALO_WIDTH), world, to_peniko(theme.selection), None, &halo);
    }

    scene.fill(Fill::NonZero, world, to_peniko(theme.card_fill), None, &body);
    scene.stroke(&Stroke::new(1.5), world, to_peniko(card.accent), None, &body);

    let bar = Rect::new(card.rect.x0, card.rect.y0, card.rect.x1, card.rect.y0 + ACCENT_BAR_HEIGHT)
        .to_rounded_rect((CARD_RADIUS, CARD_RADIUS, 0.0, 0.0));
    scene.fill(Fill::NonZero, world, to_peniko(card.accent), None, &bar);

    paint_socket(scene, world, &card.input, card.accent);
    paint_socket(scene, world, &card.output, card.accent);

    if card.annotation.is_some() {
        let (w, h) = ANNOTATION_BADGE;
        let badge = Rect::new(card.rect.x0, card.rect.y0 - h - 6.0, card.rect.x0 + w, card.rect.y0 - 6.0)
            .to_rounded_rect(h / 2.0);
        scene.fill(Fill::NonZero, world, to_peniko(theme.annotation_fill), None, &badge);
    }

    // Text shaping needs a font context; painted by the host for now.
    log::trace!(
        "CARD {} {:?} at ({}, {}) sections={}",
        card.id,
        card.name,
        card.rect.x0,
        card.rect.y0,
        card.sections.len()
    );
}

fn paint_socket(scene: &mut Scene, world: Affine, socket: &SocketView, accent: Color) {
    let circle = Circle::new(socket.center, 6.0);
    if socket.connected {
        scene.fill(Fill::NonZero, world, to_peniko(accent), None, &circle);
    } else {
        scene.fill(Fill::NonZero, world, PenikoColor::from_rgba8(255, 255, 255, 255), None, &circle);
        scene.stroke(&Stroke::new(2.0), world, to_peniko(accent), None, &circle);
    }
}

fn to_peniko(color: Color) -> PenikoColor {
    let [r, g, b, a] = color.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Overlay, build_scene};
    use crate::view::{CanvasView, CollapsedMap};
    use pb_core::config::CanvasConfig;
    use pb_core::connections::ConnectionStore;
    use pb_core::id::NodeId;
    use pb_core::layout::LayoutStore;
    use pb_core::model::NodeRecord;

    #[test]
    fn paints_a_small_canvas() {
        let a = NodeId::intern("paint_a");
        let b = NodeId::intern("paint_b");
        let nodes = vec![NodeRecord::new(a, "A", "puzzle"), NodeRecord::new(b, "B", "puzzle")];
        let mut layout = LayoutStore::default();
        layout.ensure_positions(&[a, b]);
        let mut connections = ConnectionStore::new();
        connections.add(a, b, Some("opens".into()));
        let collapsed = CollapsedMap::new();
        let config = CanvasConfig::default();
        let view = CanvasView::new(&nodes, &[], &layout, &connections, &collapsed, &config);

        let transform = ViewTransform::new();
        let selection = [a];
        let overlay = Overlay {
            selection: &selection,
            marquee: Some(Rect::new(10.0, 10.0, 50.0, 40.0)),
            ..Overlay::default()
        };
        let canvas = build_scene(&view, &transform, &overlay);

        let mut scene = Scene::new();
        paint_canvas(&mut scene, &canvas, &transform, Viewport::default(), &CanvasTheme::dark());
        assert!(!scene.encoding().is_empty());
    }
}
