//! Canvas2D software renderer.
//!
//! Draws a `CanvasScene` display list to an HTML `<canvas>` via
//! `CanvasRenderingContext2d`. Grid and marquee are already in screen
//! space; everything else is drawn under the view transform.

use kurbo::{CubicBez, Rect};
use pb_core::model::Color;
use pb_core::transform::ViewTransform;
use pb_render::scene::{Axis, CanvasScene, CardView, EdgeView, SocketView};
use pb_render::theme::CanvasTheme;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const FONT_FAMILY: &str = "Inter, system-ui, sans-serif";
const CARD_RADIUS: f64 = 10.0;
const CARD_PADDING: f64 = 12.0;
const ACCENT_BAR_HEIGHT: f64 = 6.0;
const SOCKET_RADIUS: f64 = 6.0;
const SECTION_LINE_HEIGHT: f64 = 14.0;

pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    scene: &CanvasScene,
    transform: &ViewTransform,
    width: f64,
    height: f64,
    theme: &CanvasTheme,
) {
    ctx.set_fill_style_str(&css(theme.background));
    ctx.fill_rect(0.0, 0.0, width, height);

    draw_grid(ctx, scene, width, height, theme);

    ctx.save();
    let scale = transform.scale as f64;
    let _ = ctx.set_transform(scale, 0.0, 0.0, scale, transform.pan_x as f64, transform.pan_y as f64);

    for edge in &scene.edges {
        draw_edge(ctx, edge, theme);
    }
    if let Some(preview) = &scene.preview {
        draw_preview(ctx, preview, theme);
    }
    for card in &scene.cards {
        draw_card(ctx, card, theme);
    }

    ctx.restore();

    if let Some(marquee) = scene.marquee {
        draw_marquee_rect(ctx, marquee, theme);
    }
}

// ─── Background ──────────────────────────────────────────────────────────

fn draw_grid(ctx: &CanvasRenderingContext2d, scene: &CanvasScene, width: f64, height: f64, theme: &CanvasTheme) {
    ctx.set_line_width(1.0);
    for major in [false, true] {
        let color = if major { theme.grid_major } else { theme.grid_minor };
        ctx.set_stroke_style_str(&css(color));
        ctx.begin_path();
        for line in scene.grid.iter().filter(|l| l.major == major) {
            // Half-pixel offset keeps 1px lines crisp.
            let offset = line.offset.round() + 0.5;
            match line.axis {
                Axis::Vertical => {
                    ctx.move_to(offset, 0.0);
                    ctx.line_to(offset, height);
                }
                Axis::Horizontal => {
                    ctx.move_to(0.0, offset);
                    ctx.line_to(width, offset);
                }
            }
        }
        ctx.stroke();
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeView, theme: &CanvasTheme) {
    let color = css(if edge.highlighted { theme.edge_highlight } else { theme.edge });

    ctx.save();
    ctx.set_stroke_style_str(&color);
    ctx.set_line_width(2.0);
    curve_path(ctx, &edge.curve);
    ctx.stroke();

    ctx.set_fill_style_str(&color);
    ctx.begin_path();
    let _ = ctx.arc(edge.unplug.x, edge.unplug.y, 4.0, 0.0, std::f64::consts::TAU);
    ctx.fill();

    if let Some(label) = &edge.label {
        ctx.set_font(&format!("11px {FONT_FAMILY}"));
        let text_width = ctx.measure_text(label).map(|m| m.width()).unwrap_or(40.0);
        let (w, h) = (text_width + 16.0, 20.0);
        let (x, y) = (edge.label_pos.x - w / 2.0, edge.label_pos.y - h / 2.0);
        rounded_rect_path(ctx, x, y, w, h, h / 2.0);
        ctx.set_fill_style_str(&css(theme.label_fill));
        ctx.fill();
        ctx.set_stroke_style_str(&color);
        ctx.set_line_width(1.0);
        ctx.stroke();

        ctx.set_fill_style_str(&css(theme.card_text));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text(label, edge.label_pos.x, edge.label_pos.y);
    }
    ctx.restore();
}

fn draw_preview(ctx: &CanvasRenderingContext2d, curve: &CubicBez, theme: &CanvasTheme) {
    ctx.save();
    ctx.set_stroke_style_str(&css(theme.edge_highlight));
    ctx.set_line_width(2.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(6.0),
        &JsValue::from_f64(4.0),
    ));
    curve_path(ctx, curve);
    ctx.stroke();
    ctx.restore();
}

fn curve_path(ctx: &CanvasRenderingContext2d, c: &CubicBez) {
    ctx.begin_path();
    ctx.move_to(c.p0.x, c.p0.y);
    ctx.bezier_curve_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, c.p3.x, c.p3.y);
}

// ─── Cards ───────────────────────────────────────────────────────────────

fn draw_card(ctx: &CanvasRenderingContext2d, card: &CardView, theme: &CanvasTheme) {
    let r = card.rect;
    let (x, y, w, h) = (r.x0, r.y0, r.width(), r.height());
    let accent = css(card.accent);

    ctx.save();

    if card.selected {
        ctx.set_stroke_style_str(&css(theme.selection));
        ctx.set_line_width(3.0);
        rounded_rect_path(ctx, x - 3.0, y - 3.0, w + 6.0, h + 6.0, CARD_RADIUS + 3.0);
        ctx.stroke();
    }

    rounded_rect_path(ctx, x, y, w, h, CARD_RADIUS);
    ctx.set_fill_style_str(&css(theme.card_fill));
    ctx.fill();
    ctx.set_stroke_style_str(&accent);
    ctx.set_line_width(1.5);
    ctx.stroke();

    // Accent bar, clipped to the rounded card.
    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, CARD_RADIUS);
    ctx.clip();
    ctx.set_fill_style_str(&accent);
    ctx.fill_rect(x, y, w, ACCENT_BAR_HEIGHT);
    draw_card_text(ctx, card, theme);
    ctx.restore();

    draw_socket(ctx, &card.input, &accent, theme);
    draw_socket(ctx, &card.output, &accent, theme);

    if let Some(note) = &card.annotation {
        draw_annotation_badge(ctx, r, note, theme);
    }

    ctx.restore();
}

fn draw_card_text(ctx: &CanvasRenderingContext2d, card: &CardView, theme: &CanvasTheme) {
    let r = card.rect;
    let left = r.x0 + CARD_PADDING;
    let max_width = r.width() - 2.0 * CARD_PADDING;

    ctx.set_text_align("left");
    ctx.set_text_baseline("alphabetic");

    ctx.set_font(&format!("600 14px {FONT_FAMILY}"));
    ctx.set_fill_style_str(&css(theme.card_text));
    let name = fit_text(ctx, &card.name, max_width);
    let _ = ctx.fill_text(&name, left, r.y0 + 28.0);

    ctx.set_font(&format!("11px {FONT_FAMILY}"));
    ctx.set_fill_style_str(&css(theme.card_muted_text));
    let type_name = card.type_name.as_deref().unwrap_or("Unknown type");
    let _ = ctx.fill_text(type_name, left, r.y0 + 44.0);

    if card.collapsed {
        return;
    }

    let mut cursor = r.y0 + 68.0;
    for section in &card.sections {
        if cursor > r.y1 - SECTION_LINE_HEIGHT {
            break;
        }
        ctx.set_font(&format!("600 11px {FONT_FAMILY}"));
        ctx.set_fill_style_str(&css(card.accent));
        let _ = ctx.fill_text(section.title, left, cursor);
        cursor += SECTION_LINE_HEIGHT;

        ctx.set_font(&format!("11px {FONT_FAMILY}"));
        ctx.set_fill_style_str(&css(theme.card_text));
        for line in &section.lines {
            let line = fit_text(ctx, line, max_width);
            let _ = ctx.fill_text(&line, left, cursor);
            cursor += SECTION_LINE_HEIGHT;
        }
        cursor += 4.0;
    }
}

fn draw_socket(ctx: &CanvasRenderingContext2d, socket: &SocketView, accent: &str, theme: &CanvasTheme) {
    ctx.begin_path();
    let _ = ctx.arc(
        socket.center.x,
        socket.center.y,
        SOCKET_RADIUS,
        0.0,
        std::f64::consts::TAU,
    );
    if socket.connected {
        ctx.set_fill_style_str(accent);
        ctx.fill();
    } else {
        ctx.set_fill_style_str(&css(theme.card_fill));
        ctx.fill();
        ctx.set_stroke_style_str(accent);
        ctx.set_line_width(2.0);
        ctx.stroke();
    }
}

/// Pill above the card's top-left corner.
fn draw_annotation_badge(ctx: &CanvasRenderingContext2d, card: Rect, note: &str, theme: &CanvasTheme) {
    ctx.set_font(&format!("600 10px {FONT_FAMILY}"));
    let text = fit_text(ctx, note, card.width() - 16.0);
    let text_width = ctx.measure_text(&text).map(|m| m.width()).unwrap_or(60.0);
    let (w, h) = (text_width + 16.0, 20.0);
    let (x, y) = (card.x0, card.y0 - h - 6.0);

    rounded_rect_path(ctx, x, y, w, h, h / 2.0);
    ctx.set_fill_style_str(&css(theme.annotation_fill));
    ctx.fill();

    ctx.set_fill_style_str(&css(theme.annotation_text));
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(&text, x + 8.0, y + h / 2.0);
}

// ─── Overlay ─────────────────────────────────────────────────────────────

fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, rect: Rect, theme: &CanvasTheme) {
    if rect.width() < 1.0 && rect.height() < 1.0 {
        return;
    }

    ctx.save();
    ctx.set_fill_style_str(&css(theme.marquee_fill));
    ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());

    ctx.set_stroke_style_str(&css(theme.selection));
    ctx.set_line_width(1.0);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(4.0),
        &JsValue::from_f64(4.0),
    ));
    ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
    ctx.restore();
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn css(color: Color) -> String {
    color.to_css(1.0)
}

/// Truncate with an ellipsis so the text fits `max_width` in the current font.
fn fit_text(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> String {
    let width_of = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
    if width_of(text) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "…";
        if width_of(&candidate) <= max_width {
            return candidate;
        }
    }
    "…".to_string()
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
