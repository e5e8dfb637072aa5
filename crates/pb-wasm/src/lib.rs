//! WASM bridge for Plotboard: exposes the canvas editor to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the node
//! store and persistence; it feeds nodes in as JSON and receives layout
//! changes and node requests through registered callbacks.

mod render2d;

use pb_core::config::CanvasConfig;
use pb_core::id::{ConnectionId, NodeId};
use pb_core::model::{CanvasState, NodeRecord, NodeType, NodeUpdate, Position};
use pb_editor::CanvasEditor;
use pb_editor::host::CanvasHost;
use pb_editor::input::{InputEvent, Modifiers, PointerButton};
use pb_render::hit::HitTarget;
use pb_render::theme::CanvasTheme;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

// ─── JS host ─────────────────────────────────────────────────────────────

/// Host that forwards every callback to a registered JS function.
/// Unregistered callbacks are skipped.
#[derive(Default)]
struct JsHost {
    on_layout_change: Option<js_sys::Function>,
    on_request_new_node: Option<js_sys::Function>,
    on_node_content_change: Option<js_sys::Function>,
    on_request_open_detail: Option<js_sys::Function>,
}

impl CanvasHost for JsHost {
    fn on_layout_change(&mut self, state: &CanvasState) {
        let Some(callback) = &self.on_layout_change else {
            return;
        };
        match state.to_json() {
            Ok(json) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("layout callback threw: {e:?}");
                }
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    fn on_request_new_node(&mut self, type_id: &str) -> Option<NodeId> {
        let callback = self.on_request_new_node.as_ref()?;
        match callback.call1(&JsValue::NULL, &JsValue::from_str(type_id)) {
            Ok(value) => value
                .as_string()
                .filter(|id| !id.is_empty())
                .map(|id| NodeId::intern(&id)),
            Err(e) => {
                log::warn!("new-node callback threw: {e:?}");
                None
            }
        }
    }

    fn on_node_content_change(&mut self, node: NodeId, update: &NodeUpdate) {
        let Some(callback) = &self.on_node_content_change else {
            return;
        };
        let json = match serde_json::to_string(update) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to encode node update: {e}");
                return;
            }
        };
        if let Err(e) = callback.call2(
            &JsValue::NULL,
            &JsValue::from_str(node.as_str()),
            &JsValue::from_str(&json),
        ) {
            log::warn!("content callback threw: {e:?}");
        }
    }

    fn on_request_open_detail(&mut self, node: NodeId) {
        if let Some(callback) = &self.on_request_open_detail
            && let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(node.as_str()))
        {
            log::warn!("detail callback threw: {e:?}");
        }
    }
}

// ─── Canvas controller ───────────────────────────────────────────────────

/// The main WASM-facing canvas controller.
///
/// Holds the editor and the theme. All interaction from the page goes
/// through this struct.
#[wasm_bindgen]
pub struct PlotCanvas {
    editor: CanvasEditor<JsHost>,
    width: f64,
    height: f64,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl PlotCanvas {
    /// Create a new canvas controller with the given dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        Self::build(width, height, CanvasConfig::default())
    }

    /// Like `new`, with a JSON `CanvasConfig` (missing fields take defaults).
    pub fn with_config(width: f64, height: f64, config_json: &str) -> Result<PlotCanvas, JsValue> {
        let config = CanvasConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self::build(width, height, config))
    }

    // ─── Callbacks ───────────────────────────────────────────────────────

    /// `(stateJson: string) => void`
    pub fn set_on_layout_change(&mut self, callback: js_sys::Function) {
        self.editor.host_mut().on_layout_change = Some(callback);
    }

    /// `(typeId: string) => string`, returning the new node id or `""`.
    pub fn set_on_request_new_node(&mut self, callback: js_sys::Function) {
        self.editor.host_mut().on_request_new_node = Some(callback);
    }

    /// `(nodeId: string, updateJson: string) => void`
    pub fn set_on_node_content_change(&mut self, callback: js_sys::Function) {
        self.editor.host_mut().on_node_content_change = Some(callback);
    }

    /// `(nodeId: string) => void`
    pub fn set_on_request_open_detail(&mut self, callback: js_sys::Function) {
        self.editor.host_mut().on_request_open_detail = Some(callback);
    }

    // ─── Data in / out ───────────────────────────────────────────────────

    /// Replace the node list from a JSON array of node records.
    /// Returns `false` (and keeps the old list) on malformed input.
    pub fn set_nodes_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Vec<NodeRecord>>(json) {
            Ok(nodes) => {
                self.editor.set_nodes(nodes);
                true
            }
            Err(e) => {
                log::warn!("rejected node list: {e}");
                false
            }
        }
    }

    pub fn set_node_types_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Vec<NodeType>>(json) {
            Ok(types) => {
                self.editor.set_node_types(types);
                true
            }
            Err(e) => {
                log::warn!("rejected node types: {e}");
                false
            }
        }
    }

    /// Load persisted positions + connections.
    pub fn set_state_json(&mut self, json: &str) -> bool {
        match CanvasState::from_json(json) {
            Ok(state) => {
                self.editor.load_state(state);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn get_state_json(&self) -> String {
        self.editor.state().to_json().unwrap_or_else(|e| {
            log::warn!("{e}");
            "{}".to_string()
        })
    }

    /// Compact MessagePack snapshot for local caching.
    pub fn get_state_msgpack(&self) -> Vec<u8> {
        self.editor.state().to_msgpack().unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        })
    }

    pub fn set_state_msgpack(&mut self, bytes: &[u8]) -> bool {
        match CanvasState::from_msgpack(bytes) {
            Ok(state) => {
                self.editor.load_state(state);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the canvas to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            CanvasTheme::dark()
        } else {
            CanvasTheme::light()
        };
        render2d::render_scene(
            ctx,
            &self.editor.scene(),
            self.editor.transform(),
            self.width,
            self.height,
            &theme,
        );
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.editor.resize(width as f32, height as f32);
    }

    // ─── Pointer input ───────────────────────────────────────────────────
    //
    // Coordinates are CSS pixels relative to the canvas. Each handler
    // returns `true` when the canvas should be redrawn.

    /// `button` is the DOM `MouseEvent.button` code.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        self.editor.handle(&InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_dom(button),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.editor.handle(&InputEvent::PointerMove {
            x,
            y,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.editor.handle(&InputEvent::PointerUp {
            x,
            y,
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        })
    }

    pub fn handle_double_click(&mut self, x: f32, y: f32) -> bool {
        self.editor.handle(&InputEvent::DoubleClick { x, y })
    }

    /// Pass `WheelEvent.deltaY` as is; scrolling up zooms in.
    pub fn handle_wheel(&mut self, x: f32, y: f32, delta_y: f32) -> bool {
        self.editor.handle(&InputEvent::Wheel { x, y, delta: -delta_y })
    }

    /// What lies under a screen point, as JSON `{"kind": ..., "id": ...}`.
    /// Used by the page for context menus and hover cursors.
    pub fn hit_test(&self, x: f32, y: f32) -> String {
        hit_json(self.editor.target_at(Position::new(x, y)))
    }

    // ─── Navigation ──────────────────────────────────────────────────────

    pub fn locate_node(&mut self, node_id: &str) -> bool {
        self.editor.locate_node(NodeId::intern(node_id))
    }

    /// Up to five `{id, name}` matches as a JSON array.
    pub fn search_json(&self, query: &str) -> String {
        let hits: Vec<SearchHit> = self
            .editor
            .search(query)
            .into_iter()
            .map(|n| SearchHit {
                id: n.id.as_str(),
                name: &n.name,
            })
            .collect();
        serde_json::to_string(&hits).unwrap_or_else(|_| "[]".to_string())
    }

    /// Locate the first search match. Returns its id, or `""`.
    pub fn search_and_locate(&mut self, query: &str) -> String {
        self.editor
            .search_and_locate(query)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn zoom_in(&mut self) {
        self.editor.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.editor.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.editor.reset_view();
    }

    pub fn get_scale(&self) -> f32 {
        self.editor.transform().scale
    }

    /// All selected node IDs as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        let ids: Vec<&str> = self.editor.selection().iter().map(|id| id.as_str()).collect();
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Ask the page for a node of `type_id`. Returns the new id, or `""`.
    pub fn add_node(&mut self, type_id: &str) -> String {
        self.editor
            .add_node(type_id)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Move a node to a world position and persist the layout.
    pub fn set_position(&mut self, node_id: &str, x: f32, y: f32) {
        self.editor.set_position(NodeId::intern(node_id), Position::new(x, y));
    }

    /// Returns the new collapsed state.
    pub fn toggle_collapsed(&mut self, node_id: &str) -> bool {
        self.editor.toggle_collapsed(NodeId::intern(node_id))
    }

    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        self.editor.set_all_collapsed(collapsed);
    }

    /// An empty string clears the annotation.
    pub fn set_annotation(&mut self, node_id: &str, text: &str) -> bool {
        self.editor
            .set_annotation(NodeId::intern(node_id), Some(text.to_string()))
    }

    /// Apply a quick-edit `NodeUpdate` given as JSON.
    pub fn update_node_json(&mut self, node_id: &str, json: &str) -> bool {
        match serde_json::from_str::<NodeUpdate>(json) {
            Ok(update) => self.editor.update_node(NodeId::intern(node_id), update),
            Err(e) => {
                log::warn!("rejected node update: {e}");
                false
            }
        }
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Returns the new connection id, or `""` for a duplicate or self-loop.
    pub fn connect(&mut self, source: &str, target: &str, label: &str) -> String {
        let label = (!label.is_empty()).then(|| label.to_string());
        self.editor
            .connect(NodeId::intern(source), NodeId::intern(target), label)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn relabel_connection(&mut self, connection_id: &str, label: &str) -> bool {
        self.editor
            .relabel_connection(ConnectionId::intern(connection_id), label)
    }

    pub fn remove_connection(&mut self, connection_id: &str) -> bool {
        self.editor
            .remove_connection(ConnectionId::intern(connection_id))
    }
}

impl PlotCanvas {
    fn build(width: f64, height: f64, config: CanvasConfig) -> Self {
        console_error_panic_hook_setup();
        let mut editor = CanvasEditor::new(CanvasState::default(), config, JsHost::default());
        editor.resize(width as f32, height as f32);
        Self {
            editor,
            width,
            height,
            dark_mode: false,
        }
    }
}

#[derive(Serialize)]
struct SearchHit<'a> {
    id: &'a str,
    name: &'a str,
}

fn hit_json(target: HitTarget) -> String {
    let (kind, id) = match &target {
        HitTarget::Background => ("background", None),
        HitTarget::NodeBody(id) => ("node", Some(id.as_str())),
        HitTarget::InputSocket(id) => ("input", Some(id.as_str())),
        HitTarget::OutputSocket(id) => ("output", Some(id.as_str())),
        HitTarget::UnplugHandle(id) => ("unplug", Some(id.as_str())),
        HitTarget::Connection(id) => ("connection", Some(id.as_str())),
    };
    serde_json::json!({ "kind": kind, "id": id }).to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Plotboard WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
