//! Canvas state → display list.
//!
//! `build_scene` is a pure projection: it reads the stores, node list and
//! interaction overlay and produces everything a painter needs. Cards,
//! edges and the preview curve are in world space; grid lines and the
//! marquee are in screen space.

use crate::geometry::{self, connection_curve};
use crate::view::CanvasView;
use kurbo::{CubicBez, ParamCurve, Point, Rect};
use pb_core::id::{ConnectionId, NodeId};
use pb_core::layout::Viewport;
use pb_core::model::{Color, FALLBACK_ACCENT, Position, SectionKind};
use pb_core::transform::ViewTransform;

/// Lines shown per content section in an expanded card.
pub const MAX_SECTION_LINES: usize = 3;

/// Below this on-screen spacing a grid level is skipped.
const MIN_GRID_SPACING_PX: f64 = 4.0;

/// Transient interaction state that affects what is drawn.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay<'a> {
    pub selection: &'a [NodeId],
    /// Node currently pressed or being dragged.
    pub active: Option<NodeId>,
    pub preview: Option<ConnectionPreview>,
    /// Connection detached by an in-flight reconnect drag.
    pub hidden_connection: Option<ConnectionId>,
    /// Marquee rectangle in screen space.
    pub marquee: Option<Rect>,
    pub viewport: Viewport,
}

/// In-progress connection drag: from `origin`'s output to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionPreview {
    pub origin: NodeId,
    pub pointer: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A vertical line at screen x = `offset`.
    Vertical,
    /// A horizontal line at screen y = `offset`.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub axis: Axis,
    pub offset: f64,
    pub major: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub id: ConnectionId,
    pub curve: CubicBez,
    pub label: Option<String>,
    /// Curve midpoint (t = 0.5), where the label badge is centered.
    pub label_pos: Point,
    pub unplug: Point,
    /// Touches a selected node.
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocketView {
    pub center: Point,
    /// Filled when at least one connection uses this socket.
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub title: &'static str,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: NodeId,
    pub rect: Rect,
    pub name: String,
    pub type_name: Option<String>,
    pub accent: Color,
    pub collapsed: bool,
    pub selected: bool,
    pub sections: Vec<SectionView>,
    pub annotation: Option<String>,
    pub input: SocketView,
    pub output: SocketView,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasScene {
    pub grid: Vec<GridLine>,
    pub edges: Vec<EdgeView>,
    pub preview: Option<CubicBez>,
    pub cards: Vec<CardView>,
    pub marquee: Option<Rect>,
}

pub fn build_scene(view: &CanvasView, transform: &ViewTransform, overlay: &Overlay) -> CanvasScene {
    let grid = grid_lines(transform, overlay.viewport, view.config.grid_cell, view.config.grid_major_every);

    let edges = view
        .connections
        .iter()
        .filter(|c| Some(c.id) != overlay.hidden_connection)
        .filter_map(|conn| {
            let (from, to) = view.connection_endpoints(conn)?;
            let curve = connection_curve(from, to);
            Some(EdgeView {
                id: conn.id,
                curve,
                label: conn.label_text().map(str::to_string),
                label_pos: curve.eval(0.5),
                unplug: geometry::unplug_handle(to, view.config),
                highlighted: overlay.selection.contains(&conn.source_id)
                    || overlay.selection.contains(&conn.target_id),
            })
        })
        .collect();

    let preview = overlay.preview.and_then(|p| {
        let from = view.output_anchor(p.origin)?;
        Some(connection_curve(from, geometry::to_point(p.pointer)))
    });

    let cards = view
        .placed_nodes()
        .map(|(node, pos)| {
            let collapsed = view.is_collapsed(node.id);
            let node_type = view.node_type(&node.type_id);
            let sections = match node_type {
                Some(ty) if !collapsed => SectionKind::ALL
                    .into_iter()
                    .filter(|kind| ty.shows(*kind))
                    .map(|kind| SectionView {
                        title: kind.title(),
                        lines: node
                            .section(kind)
                            .preview_lines()
                            .into_iter()
                            .take(MAX_SECTION_LINES)
                            .collect(),
                    })
                    .collect(),
                _ => Vec::new(),
            };
            CardView {
                id: node.id,
                rect: geometry::card_rect(pos, collapsed, view.config),
                name: node.name.clone(),
                type_name: node_type.map(|t| t.name.clone()),
                accent: node_type.map(|t| t.accent()).unwrap_or(FALLBACK_ACCENT),
                collapsed,
                selected: overlay.selection.contains(&node.id) || overlay.active == Some(node.id),
                sections,
                annotation: node.annotation_text().map(str::to_string),
                input: SocketView {
                    center: geometry::input_anchor(pos, collapsed, view.config),
                    connected: view.connections.has_incoming(node.id),
                },
                output: SocketView {
                    center: geometry::output_anchor(pos, collapsed, view.config),
                    connected: view.connections.has_outgoing(node.id),
                },
            }
        })
        .collect();

    CanvasScene {
        grid,
        edges,
        preview,
        cards,
        marquee: overlay.marquee,
    }
}

/// Screen-space grid lines covering the viewport.
///
/// Minor lines are dropped when they would be closer than a few pixels;
/// major lines follow the same rule at their own spacing.
pub fn grid_lines(transform: &ViewTransform, viewport: Viewport, cell: f32, major_every: u32) -> Vec<GridLine> {
    let mut lines = Vec::new();
    if cell <= 0.0 {
        return lines;
    }
    let scale = transform.scale as f64;
    let cell = cell as f64;
    let major_every = major_every.max(1) as i64;
    let show_minor = cell * scale >= MIN_GRID_SPACING_PX;
    let show_major = cell * major_every as f64 * scale >= MIN_GRID_SPACING_PX;
    if !show_major {
        return lines;
    }

    let top_left = transform.screen_to_world(Position::new(0.0, 0.0));
    let bottom_right = transform.screen_to_world(Position::new(viewport.width, viewport.height));

    let mut push_axis = |axis: Axis, from: f32, to: f32, pan: f32| {
        let first = (from as f64 / cell).floor() as i64;
        let last = (to as f64 / cell).ceil() as i64;
        for k in first..=last {
            let major = k.rem_euclid(major_every) == 0;
            if major || show_minor {
                lines.push(GridLine {
                    axis,
                    offset: k as f64 * cell * scale + pan as f64,
                    major,
                });
            }
        }
    };
    push_axis(Axis::Vertical, top_left.x, bottom_right.x, transform.pan_x);
    push_axis(Axis::Horizontal, top_left.y, bottom_right.y, transform.pan_y);
    lines
}
