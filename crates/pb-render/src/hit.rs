//! Hit testing: world point → canvas element, screen rect → nodes.
//!
//! Precedence for a point: connection unplug handles, then nodes from the
//! topmost down (output socket, input socket, card body), then connection
//! curves and labels, then the background.

use crate::geometry::{self, connection_curve};
use crate::view::CanvasView;
use kurbo::{ParamCurve, ParamCurveNearest, Point, Rect};
use pb_core::id::{ConnectionId, NodeId};
use pb_core::model::Position;
use pb_core::transform::ViewTransform;

/// Half-size of the clickable area around a connection label, world units.
const LABEL_HIT_HALF_WIDTH: f64 = 28.0;
const LABEL_HIT_HALF_HEIGHT: f64 = 10.0;

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Background,
    NodeBody(NodeId),
    InputSocket(NodeId),
    OutputSocket(NodeId),
    UnplugHandle(ConnectionId),
    Connection(ConnectionId),
}

/// Find the element under the world-space point `world`.
pub fn hit_test(view: &CanvasView, world: Point) -> HitTarget {
    let config = view.config;

    let unplug_r = config.unplug_radius as f64;
    for conn in view.connections.iter().rev() {
        if let Some((_, to)) = view.connection_endpoints(conn)
            && geometry::unplug_handle(to, config).distance(world) <= unplug_r
        {
            return HitTarget::UnplugHandle(conn.id);
        }
    }

    let socket_r = config.socket_radius as f64;
    for (node, pos) in view.placed_nodes().rev() {
        let collapsed = view.is_collapsed(node.id);
        if geometry::output_anchor(pos, collapsed, config).distance(world) <= socket_r {
            return HitTarget::OutputSocket(node.id);
        }
        if geometry::input_anchor(pos, collapsed, config).distance(world) <= socket_r {
            return HitTarget::InputSocket(node.id);
        }
        if geometry::card_rect(pos, collapsed, config).contains(world) {
            return HitTarget::NodeBody(node.id);
        }
    }

    let tolerance = config.connection_hit_tolerance as f64;
    for conn in view.connections.iter().rev() {
        let Some((from, to)) = view.connection_endpoints(conn) else {
            continue;
        };
        let curve = connection_curve(from, to);
        if conn.label_text().is_some() {
            let mid = curve.eval(0.5);
            let badge = Rect::new(
                mid.x - LABEL_HIT_HALF_WIDTH,
                mid.y - LABEL_HIT_HALF_HEIGHT,
                mid.x + LABEL_HIT_HALF_WIDTH,
                mid.y + LABEL_HIT_HALF_HEIGHT,
            );
            if badge.contains(world) {
                return HitTarget::Connection(conn.id);
            }
        }
        if curve.nearest(world, 0.1).distance_sq <= tolerance * tolerance {
            return HitTarget::Connection(conn.id);
        }
    }

    HitTarget::Background
}

/// All placed nodes whose screen-projected card box overlaps `screen_rect`.
///
/// Uses open intervals, so boxes that merely touch the rectangle's edge are
/// not selected. Card heights are the fixed collapsed/expanded values.
pub fn hit_test_rect(view: &CanvasView, transform: &ViewTransform, screen_rect: Rect) -> Vec<NodeId> {
    let config = view.config;
    let (left, top, right, bottom) = (
        screen_rect.x0 as f32,
        screen_rect.y0 as f32,
        screen_rect.x1 as f32,
        screen_rect.y1 as f32,
    );
    view.placed_nodes()
        .filter(|(node, pos)| {
            let Position { x: sx, y: sy } = transform.world_to_screen(*pos);
            let width = config.card_width * transform.scale;
            let height = config.card_height(view.is_collapsed(node.id)) * transform.scale;
            sx < right && sx + width > left && sy < bottom && sy + height > top
        })
        .map(|(node, _)| node.id)
        .collect()
}
