//! Pointer interaction state machine.
//!
//! One pointer stream drives four mutually exclusive gestures. The gesture
//! is chosen on pointer-down from the button and the hit target, and lasts
//! until pointer-up:
//!
//! | Pointer-down on               | Gesture                                  |
//! |-------------------------------|------------------------------------------|
//! | middle button, anywhere       | `Panning`                                |
//! | output socket                 | `DraggingConnection` (new edge)          |
//! | unplug handle                 | `DraggingConnection` (reconnect)         |
//! | node body / input socket      | `DraggingNodes`                          |
//! | background (+ ⌘/Ctrl)         | `Panning`                                |
//! | background                    | `Selecting` (marquee)                    |
//!
//! The machine never touches canvas state. It turns events into
//! `CanvasAction`s that the editor applies, so every transition can be
//! tested without a renderer.

use crate::input::{InputEvent, PointerButton};
use kurbo::Rect;
use pb_core::id::{ConnectionId, NodeId};
use pb_core::model::Position;
use pb_render::geometry::rect_from_corners;
use pb_render::hit::HitTarget;

/// Current gesture. Pointer positions are in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Panning {
        last: Position,
    },
    DraggingNodes {
        node: NodeId,
        last: Position,
        moved: bool,
    },
    Selecting {
        anchor: Position,
        current: Position,
    },
    DraggingConnection {
        origin: NodeId,
        /// Detached connection and its original target, for reconnects.
        reconnect: Option<(ConnectionId, NodeId)>,
        pointer: Position,
    },
}

/// A state change requested by the interaction machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    /// Screen-space pan.
    Pan { dx: f32, dy: f32 },
    /// A node body was pressed; selection collapses to it unless it is
    /// already selected.
    PressNode(NodeId),
    ClearSelection,
    /// Replace the selection with everything overlapping this screen rect.
    SelectInRect(Rect),
    /// Translate the selection by a screen-space delta.
    MoveSelection { dx: f32, dy: f32 },
    /// A node drag ended after moving; persist the layout.
    CommitLayout,
    Connect { source: NodeId, target: NodeId },
    /// Remove `connection`, then connect `source → target` if a new target
    /// was given.
    Reconnect {
        connection: ConnectionId,
        source: NodeId,
        target: Option<NodeId>,
    },
    RemoveConnection(ConnectionId),
    OpenDetail(NodeId),
}

#[derive(Debug, Clone)]
pub struct Interaction {
    state: InteractionState,
}

impl Default for Interaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Abandon the current gesture without emitting anything.
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Whether the current gesture holds on to a node matching `pred`.
    pub fn holds_node(&self, mut pred: impl FnMut(NodeId) -> bool) -> bool {
        match self.state {
            InteractionState::DraggingNodes { node, .. } => pred(node),
            InteractionState::DraggingConnection { origin, reconnect, .. } => {
                pred(origin) || reconnect.is_some_and(|(_, target)| pred(target))
            }
            _ => false,
        }
    }

    /// Marquee rectangle in screen space while selecting.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::Selecting { anchor, current } => Some(rect_from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Handle one event. `target` is what lies under the event's position.
    ///
    /// `connection_source` resolves a connection id to its `(source, target)`
    /// pair; it is only consulted when an unplug handle is pressed.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        target: HitTarget,
        connection_source: impl Fn(ConnectionId) -> Option<(NodeId, NodeId)>,
    ) -> Vec<CanvasAction> {
        match *event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                if !self.is_idle() {
                    log::trace!("pointer-down ignored while {:?}", self.state);
                    return vec![];
                }
                let at = Position::new(x, y);
                self.pointer_down(at, button, modifiers.pan_override(), target, connection_source)
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Position::new(x, y)),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Position::new(x, y), target),
            InputEvent::DoubleClick { .. } => match (self.state, target) {
                (InteractionState::Idle, HitTarget::NodeBody(id)) => vec![CanvasAction::OpenDetail(id)],
                _ => vec![],
            },
            // Zoom is handled by the editor directly.
            InputEvent::Wheel { .. } => vec![],
        }
    }

    fn pointer_down(
        &mut self,
        at: Position,
        button: PointerButton,
        pan_override: bool,
        target: HitTarget,
        connection_source: impl Fn(ConnectionId) -> Option<(NodeId, NodeId)>,
    ) -> Vec<CanvasAction> {
        match button {
            PointerButton::Middle => {
                self.state = InteractionState::Panning { last: at };
                vec![]
            }
            PointerButton::Secondary => match target {
                HitTarget::Connection(id) | HitTarget::UnplugHandle(id) => {
                    vec![CanvasAction::RemoveConnection(id)]
                }
                _ => vec![],
            },
            PointerButton::Primary => match target {
                HitTarget::OutputSocket(origin) => {
                    self.state = InteractionState::DraggingConnection {
                        origin,
                        reconnect: None,
                        pointer: at,
                    };
                    vec![]
                }
                HitTarget::UnplugHandle(id) => {
                    if let Some((origin, original_target)) = connection_source(id) {
                        self.state = InteractionState::DraggingConnection {
                            origin,
                            reconnect: Some((id, original_target)),
                            pointer: at,
                        };
                    }
                    vec![]
                }
                HitTarget::NodeBody(node) | HitTarget::InputSocket(node) => {
                    self.state = InteractionState::DraggingNodes {
                        node,
                        last: at,
                        moved: false,
                    };
                    vec![CanvasAction::PressNode(node)]
                }
                HitTarget::Background | HitTarget::Connection(_) => {
                    if pan_override {
                        self.state = InteractionState::Panning { last: at };
                        vec![]
                    } else {
                        self.state = InteractionState::Selecting {
                            anchor: at,
                            current: at,
                        };
                        vec![CanvasAction::ClearSelection]
                    }
                }
            },
        }
    }

    fn pointer_move(&mut self, at: Position) -> Vec<CanvasAction> {
        match &mut self.state {
            InteractionState::Idle => vec![],
            InteractionState::Panning { last } => {
                let (dx, dy) = (at.x - last.x, at.y - last.y);
                *last = at;
                vec![CanvasAction::Pan { dx, dy }]
            }
            InteractionState::DraggingNodes { last, moved, .. } => {
                let (dx, dy) = (at.x - last.x, at.y - last.y);
                *last = at;
                if dx == 0.0 && dy == 0.0 {
                    return vec![];
                }
                *moved = true;
                vec![CanvasAction::MoveSelection { dx, dy }]
            }
            InteractionState::Selecting { anchor, current } => {
                *current = at;
                vec![CanvasAction::SelectInRect(rect_from_corners(*anchor, at))]
            }
            InteractionState::DraggingConnection { pointer, .. } => {
                *pointer = at;
                vec![]
            }
        }
    }

    fn pointer_up(&mut self, at: Position, target: HitTarget) -> Vec<CanvasAction> {
        let state = std::mem::replace(&mut self.state, InteractionState::Idle);
        match state {
            InteractionState::Idle | InteractionState::Panning { .. } => vec![],
            InteractionState::Selecting { .. } => vec![],
            InteractionState::DraggingNodes { moved, .. } => {
                if moved {
                    vec![CanvasAction::CommitLayout]
                } else {
                    vec![]
                }
            }
            InteractionState::DraggingConnection {
                origin, reconnect, ..
            } => {
                log::trace!("connection drag from {origin} released at ({}, {})", at.x, at.y);
                let dropped_on = match target {
                    HitTarget::InputSocket(node) if node != origin => Some(node),
                    _ => None,
                };
                match (reconnect, dropped_on) {
                    (None, Some(target)) => vec![CanvasAction::Connect {
                        source: origin,
                        target,
                    }],
                    (None, None) => vec![],
                    (Some((_, original)), Some(target)) if target == original => vec![],
                    (Some((connection, _)), target) => vec![CanvasAction::Reconnect {
                        connection,
                        source: origin,
                        target,
                    }],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, Modifiers, PointerButton};
    use pretty_assertions::assert_eq;

    fn no_connections(_: ConnectionId) -> Option<(NodeId, NodeId)> {
        None
    }

    #[test]
    fn middle_button_pans_even_over_nodes() {
        let mut fsm = Interaction::new();
        let node = NodeId::intern("fsm_pan_node");
        let down = InputEvent::down(10.0, 10.0, PointerButton::Middle);
        assert!(fsm.handle(&down, HitTarget::NodeBody(node), no_connections).is_empty());

        let actions = fsm.handle(&InputEvent::moved(25.0, 4.0), HitTarget::Background, no_connections);
        assert_eq!(actions, vec![CanvasAction::Pan { dx: 15.0, dy: -6.0 }]);

        fsm.handle(&InputEvent::up(25.0, 4.0), HitTarget::Background, no_connections);
        assert!(fsm.is_idle());
    }

    #[test]
    fn ctrl_drag_on_background_pans() {
        let mut fsm = Interaction::new();
        let down = InputEvent::PointerDown {
            x: 0.0,
            y: 0.0,
            button: PointerButton::Primary,
            modifiers: Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        };
        fsm.handle(&down, HitTarget::Background, no_connections);
        assert!(matches!(fsm.state(), InteractionState::Panning { .. }));
    }

    #[test]
    fn node_drag_emits_screen_deltas_and_commits() {
        let mut fsm = Interaction::new();
        let node = NodeId::intern("fsm_drag");
        let actions = fsm.handle(
            &InputEvent::down(100.0, 100.0, PointerButton::Primary),
            HitTarget::NodeBody(node),
            no_connections,
        );
        assert_eq!(actions, vec![CanvasAction::PressNode(node)]);

        let actions = fsm.handle(&InputEvent::moved(110.0, 95.0), HitTarget::NodeBody(node), no_connections);
        assert_eq!(actions, vec![CanvasAction::MoveSelection { dx: 10.0, dy: -5.0 }]);

        let actions = fsm.handle(&InputEvent::up(110.0, 95.0), HitTarget::NodeBody(node), no_connections);
        assert_eq!(actions, vec![CanvasAction::CommitLayout]);
    }

    #[test]
    fn click_without_move_does_not_commit() {
        let mut fsm = Interaction::new();
        let node = NodeId::intern("fsm_click");
        fsm.handle(
            &InputEvent::down(5.0, 5.0, PointerButton::Primary),
            HitTarget::NodeBody(node),
            no_connections,
        );
        let actions = fsm.handle(&InputEvent::up(5.0, 5.0), HitTarget::NodeBody(node), no_connections);
        assert!(actions.is_empty());
    }

    #[test]
    fn gestures_are_mutually_exclusive() {
        let mut fsm = Interaction::new();
        fsm.handle(
            &InputEvent::down(0.0, 0.0, PointerButton::Primary),
            HitTarget::Background,
            no_connections,
        );
        let state_before = *fsm.state();

        // A second pointer-down (another button, other target) is ignored.
        let other = NodeId::intern("fsm_exclusive");
        let ignored = fsm.handle(
            &InputEvent::down(50.0, 50.0, PointerButton::Middle),
            HitTarget::OutputSocket(other),
            no_connections,
        );
        assert!(ignored.is_empty());
        assert_eq!(*fsm.state(), state_before);
    }

    #[test]
    fn marquee_recomputes_from_anchor() {
        let mut fsm = Interaction::new();
        let actions = fsm.handle(
            &InputEvent::down(200.0, 200.0, PointerButton::Primary),
            HitTarget::Background,
            no_connections,
        );
        assert_eq!(actions, vec![CanvasAction::ClearSelection]);

        let actions = fsm.handle(&InputEvent::moved(50.0, 260.0), HitTarget::Background, no_connections);
        assert_eq!(
            actions,
            vec![CanvasAction::SelectInRect(Rect::new(50.0, 200.0, 200.0, 260.0))]
        );
        assert_eq!(fsm.marquee_rect(), Some(Rect::new(50.0, 200.0, 200.0, 260.0)));

        fsm.handle(&InputEvent::up(50.0, 260.0), HitTarget::Background, no_connections);
        assert_eq!(fsm.marquee_rect(), None);
    }

    #[test]
    fn fresh_connection_drop_targets() {
        let a = NodeId::intern("fsm_conn_a");
        let b = NodeId::intern("fsm_conn_b");
        let down = InputEvent::down(0.0, 0.0, PointerButton::Primary);

        let mut fsm = Interaction::new();
        fsm.handle(&down, HitTarget::OutputSocket(a), no_connections);
        let actions = fsm.handle(&InputEvent::up(9.0, 9.0), HitTarget::InputSocket(b), no_connections);
        assert_eq!(actions, vec![CanvasAction::Connect { source: a, target: b }]);

        // Own input socket and empty space create nothing.
        fsm.handle(&down, HitTarget::OutputSocket(a), no_connections);
        assert!(fsm.handle(&InputEvent::up(0.0, 0.0), HitTarget::InputSocket(a), no_connections).is_empty());
        fsm.handle(&down, HitTarget::OutputSocket(a), no_connections);
        assert!(fsm.handle(&InputEvent::up(0.0, 0.0), HitTarget::Background, no_connections).is_empty());
        // Dropping on a node body is not a socket.
        fsm.handle(&down, HitTarget::OutputSocket(a), no_connections);
        assert!(fsm.handle(&InputEvent::up(0.0, 0.0), HitTarget::NodeBody(b), no_connections).is_empty());
    }

    #[test]
    fn reconnect_drop_targets() {
        let a = NodeId::intern("fsm_re_a");
        let b = NodeId::intern("fsm_re_b");
        let c = NodeId::intern("fsm_re_c");
        let conn = ConnectionId::intern("fsm_re_conn");
        let lookup = move |id: ConnectionId| (id == conn).then_some((a, b));
        let down = InputEvent::down(0.0, 0.0, PointerButton::Primary);

        let mut fsm = Interaction::new();
        fsm.handle(&down, HitTarget::UnplugHandle(conn), lookup);
        assert_eq!(
            *fsm.state(),
            InteractionState::DraggingConnection {
                origin: a,
                reconnect: Some((conn, b)),
                pointer: Position::new(0.0, 0.0),
            }
        );
        let actions = fsm.handle(&InputEvent::up(1.0, 1.0), HitTarget::InputSocket(c), lookup);
        assert_eq!(
            actions,
            vec![CanvasAction::Reconnect {
                connection: conn,
                source: a,
                target: Some(c),
            }]
        );

        fsm.handle(&down, HitTarget::UnplugHandle(conn), lookup);
        let actions = fsm.handle(&InputEvent::up(1.0, 1.0), HitTarget::Background, lookup);
        assert_eq!(
            actions,
            vec![CanvasAction::Reconnect {
                connection: conn,
                source: a,
                target: None,
            }]
        );

        // Dropping back on the original target keeps the connection.
        fsm.handle(&down, HitTarget::UnplugHandle(conn), lookup);
        assert!(fsm.handle(&InputEvent::up(1.0, 1.0), HitTarget::InputSocket(b), lookup).is_empty());
    }

    #[test]
    fn cancelled_reconnect_releases_without_actions() {
        let a = NodeId::intern("fsm_cancel_a");
        let b = NodeId::intern("fsm_cancel_b");
        let c = NodeId::intern("fsm_cancel_c");
        let conn = ConnectionId::intern("fsm_cancel_conn");
        let lookup = move |id: ConnectionId| (id == conn).then_some((a, b));

        let mut fsm = Interaction::new();
        fsm.handle(
            &InputEvent::down(0.0, 0.0, PointerButton::Primary),
            HitTarget::UnplugHandle(conn),
            lookup,
        );
        assert!(fsm.holds_node(|id| id == a));
        assert!(fsm.holds_node(|id| id == b));
        assert!(!fsm.holds_node(|id| id == c));

        fsm.cancel();
        assert!(fsm.is_idle());
        assert!(!fsm.holds_node(|_| true));
        assert!(fsm.handle(&InputEvent::up(1.0, 1.0), HitTarget::InputSocket(c), lookup).is_empty());
    }

    #[test]
    fn right_click_removes_connection() {
        let conn = ConnectionId::intern("fsm_right");
        let mut fsm = Interaction::new();
        let actions = fsm.handle(
            &InputEvent::down(0.0, 0.0, PointerButton::Secondary),
            HitTarget::Connection(conn),
            no_connections,
        );
        assert_eq!(actions, vec![CanvasAction::RemoveConnection(conn)]);
        assert!(fsm.is_idle());
    }

    #[test]
    fn double_click_opens_detail() {
        let node = NodeId::intern("fsm_detail");
        let mut fsm = Interaction::new();
        let actions = fsm.handle(
            &InputEvent::DoubleClick { x: 1.0, y: 1.0 },
            HitTarget::NodeBody(node),
            no_connections,
        );
        assert_eq!(actions, vec![CanvasAction::OpenDetail(node)]);
    }
}
