//! Card, socket and connection geometry in world space.

use kurbo::{CubicBez, Point, Rect};
use pb_core::config::CanvasConfig;
use pb_core::model::Position;

pub fn to_point(p: Position) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

/// World-space box of a node card whose top-left is `pos`.
pub fn card_rect(pos: Position, collapsed: bool, config: &CanvasConfig) -> Rect {
    let origin = to_point(pos);
    Rect::new(
        origin.x,
        origin.y,
        origin.x + config.card_width as f64,
        origin.y + config.card_height(collapsed) as f64,
    )
}

/// Input socket center: left edge of the card.
pub fn input_anchor(pos: Position, collapsed: bool, config: &CanvasConfig) -> Point {
    Point::new(pos.x as f64, (pos.y + config.socket_y(collapsed)) as f64)
}

/// Output socket center: right edge of the card.
pub fn output_anchor(pos: Position, collapsed: bool, config: &CanvasConfig) -> Point {
    Point::new(
        (pos.x + config.card_width) as f64,
        (pos.y + config.socket_y(collapsed)) as f64,
    )
}

/// Horizontal S-curve from `from` to `to`. Both control points sit on the
/// horizontal midpoint, each at its own endpoint's height.
pub fn connection_curve(from: Point, to: Point) -> CubicBez {
    let mid_x = (from.x + to.x) / 2.0;
    CubicBez::new(
        from,
        Point::new(mid_x, from.y),
        Point::new(mid_x, to.y),
        to,
    )
}

/// Grab point for detaching a connection, just left of its target socket.
pub fn unplug_handle(target_anchor: Point, config: &CanvasConfig) -> Point {
    Point::new(target_anchor.x - config.unplug_offset as f64, target_anchor.y)
}

/// Normalize two corner points into a rectangle.
pub fn rect_from_corners(a: Position, b: Position) -> Rect {
    Rect::from_points(to_point(a), to_point(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::ParamCurve;

    #[test]
    fn anchors_follow_collapsed_state() {
        let config = CanvasConfig {
            collapsed_socket_y: 20.0,
            expanded_socket_y: 40.0,
            ..CanvasConfig::default()
        };
        let pos = Position::new(10.0, 50.0);
        assert_eq!(input_anchor(pos, true, &config), Point::new(10.0, 70.0));
        assert_eq!(input_anchor(pos, false, &config), Point::new(10.0, 90.0));
        assert_eq!(
            output_anchor(pos, false, &config),
            Point::new(10.0 + config.card_width as f64, 90.0)
        );
        assert_eq!(card_rect(pos, true, &config).height(), config.collapsed_height as f64);
        assert_eq!(card_rect(pos, false, &config).height(), config.expanded_height as f64);
    }

    #[test]
    fn s_curve_control_points() {
        let curve = connection_curve(Point::new(0.0, 0.0), Point::new(200.0, 100.0));
        assert_eq!(curve.p1, Point::new(100.0, 0.0));
        assert_eq!(curve.p2, Point::new(100.0, 100.0));
        // Symmetric curve passes through the midpoint of its endpoints.
        let mid = curve.eval(0.5);
        assert!((mid.x - 100.0).abs() < 1e-9 && (mid.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn backwards_curve_still_flows_horizontally() {
        let curve = connection_curve(Point::new(300.0, 10.0), Point::new(100.0, 90.0));
        assert_eq!(curve.p1, Point::new(200.0, 10.0));
        assert_eq!(curve.p2, Point::new(200.0, 90.0));
    }
}
