//! Canvas data model.
//!
//! Node records and node types are owned by the host project and only
//! mirrored here. Positions and connections are owned by the canvas and
//! persisted together as one `CanvasState`.

use crate::id::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ─── Geometry ────────────────────────────────────────────────────────────

/// World-space position of a node card's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// An sRGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Accent used for nodes whose type is unknown or has an unparsable color.
pub const FALLBACK_ACCENT: Color = Color::rgba(0.42, 0.44, 0.5, 1.0);

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn hex_pair(hi: u8, lo: u8) -> Option<f32> {
    Some((hex_val(hi)? * 16 + hex_val(lo)?) as f32 / 255.0)
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let b = hex.as_bytes();
        match b.len() {
            3 => Some(Self::rgba(
                (hex_val(b[0])? * 17) as f32 / 255.0,
                (hex_val(b[1])? * 17) as f32 / 255.0,
                (hex_val(b[2])? * 17) as f32 / 255.0,
                1.0,
            )),
            6 => Some(Self::rgba(
                hex_pair(b[0], b[1])?,
                hex_pair(b[2], b[3])?,
                hex_pair(b[4], b[5])?,
                1.0,
            )),
            8 => Some(Self::rgba(
                hex_pair(b[0], b[1])?,
                hex_pair(b[2], b[3])?,
                hex_pair(b[4], b[5])?,
                hex_pair(b[6], b[7])?,
            )),
            _ => None,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [c(self.r), c(self.g), c(self.b), c(self.a)]
    }

    /// CSS `rgba(...)` string, with alpha multiplied by `alpha`.
    pub fn to_css(self, alpha: f32) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({r}, {g}, {b}, {})", (self.a * alpha).clamp(0.0, 1.0))
    }
}

// ─── Node content ────────────────────────────────────────────────────────

/// A typed attribute value. The variant follows the owning attribute's
/// declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Text(String),
    Number(f64),
    Images(Vec<String>),
    Choices(BTreeSet<String>),
}

impl AttributeValue {
    /// Short tag strings shown in a card preview when a section has no
    /// free-text description.
    pub fn tag_labels(&self) -> Vec<String> {
        match self {
            AttributeValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    vec![]
                } else {
                    vec![s.to_string()]
                }
            }
            AttributeValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    vec![format!("{n:.0}")]
                } else {
                    vec![n.to_string()]
                }
            }
            AttributeValue::Images(paths) => paths
                .iter()
                .map(|p| p.rsplit(['/', '\\']).next().unwrap_or(p).to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            AttributeValue::Choices(set) => set.iter().cloned().collect(),
        }
    }
}

/// One content section of a node (hints, mechanics or rewards).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    pub description: Option<String>,
    pub tags: Vec<AttributeValue>,
}

impl ContentSection {
    /// Lines to preview: the description if set, otherwise the tag labels.
    pub fn preview_lines(&self) -> Vec<String> {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => vec![text.to_string()],
            _ => self.tags.iter().flat_map(AttributeValue::tag_labels).collect(),
        }
    }
}

/// A user-defined attribute attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub name: String,
    pub value: AttributeValue,
}

/// Which content section of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Hints,
    Mechanics,
    Rewards,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [Self::Hints, Self::Mechanics, Self::Rewards];

    pub fn title(self) -> &'static str {
        match self {
            Self::Hints => "Hints",
            Self::Mechanics => "Mechanics",
            Self::Rewards => "Rewards",
        }
    }
}

/// A node as supplied by the host project (puzzle or narrative beat).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: String,
    pub type_id: String,
    #[serde(default)]
    pub annotation: Option<String>,
    #[serde(default)]
    pub hints: ContentSection,
    #[serde(default)]
    pub mechanics: ContentSection,
    #[serde(default)]
    pub rewards: ContentSection,
    #[serde(default)]
    pub attributes: Vec<CustomAttribute>,
}

impl NodeRecord {
    pub fn new(id: NodeId, name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            type_id: type_id.into(),
            annotation: None,
            hints: ContentSection::default(),
            mechanics: ContentSection::default(),
            rewards: ContentSection::default(),
            attributes: Vec::new(),
        }
    }

    pub fn section(&self, kind: SectionKind) -> &ContentSection {
        match kind {
            SectionKind::Hints => &self.hints,
            SectionKind::Mechanics => &self.mechanics,
            SectionKind::Rewards => &self.rewards,
        }
    }

    fn section_mut(&mut self, kind: SectionKind) -> &mut ContentSection {
        match kind {
            SectionKind::Hints => &mut self.hints,
            SectionKind::Mechanics => &mut self.mechanics,
            SectionKind::Rewards => &mut self.rewards,
        }
    }

    /// Non-empty annotation text, if any.
    pub fn annotation_text(&self) -> Option<&str> {
        self.annotation
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &NodeUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(annotation) = &update.annotation {
            self.annotation = annotation.clone();
        }
        for (kind, text) in &update.descriptions {
            self.section_mut(*kind).description = text.clone();
        }
    }
}

/// Partial edit of a node, produced by the quick-edit panel and the
/// annotation editor and forwarded to the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeUpdate {
    pub name: Option<String>,
    /// `Some(None)` clears the annotation.
    pub annotation: Option<Option<String>>,
    pub descriptions: Vec<(SectionKind, Option<String>)>,
}

impl NodeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.annotation.is_none() && self.descriptions.is_empty()
    }
}

/// Visual template applied to nodes through `NodeRecord::type_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub show_hints: bool,
    #[serde(default)]
    pub show_mechanics: bool,
    #[serde(default)]
    pub show_rewards: bool,
}

impl NodeType {
    /// Parsed accent color, or the fallback accent.
    pub fn accent(&self) -> Color {
        Color::from_hex(&self.color).unwrap_or(FALLBACK_ACCENT)
    }

    pub fn shows(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Hints => self.show_hints,
            SectionKind::Mechanics => self.show_mechanics,
            SectionKind::Rewards => self.show_rewards,
        }
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Connection {
    /// Label text to draw, if non-empty.
    pub fn label_text(&self) -> Option<&str> {
        self.label.as_deref().filter(|s| !s.trim().is_empty())
    }
}

// ─── Persisted state ─────────────────────────────────────────────────────

/// Positions and connections, persisted by the host as one unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    pub positions: BTreeMap<NodeId, Position>,
    pub connections: Vec<Connection>,
}

impl CanvasState {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid canvas state: {e}"))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("failed to encode canvas state: {e}"))
    }

    /// Compact MessagePack snapshot.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, String> {
        rmp_serde::to_vec_named(self).map_err(|e| format!("failed to encode canvas state: {e}"))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, String> {
        rmp_serde::from_slice(bytes).map_err(|e| format!("invalid canvas snapshot: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_parsing() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert_eq!(c.to_rgba8(), [255, 128, 0, 255]);
        let short = Color::from_hex("0f0").unwrap();
        assert_eq!(short.to_rgba8(), [0, 255, 0, 255]);
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn unparsable_type_color_falls_back() {
        let ty = NodeType {
            id: "puzzle".into(),
            name: "Puzzle".into(),
            color: "not-a-color".into(),
            show_hints: true,
            show_mechanics: false,
            show_rewards: false,
        };
        assert_eq!(ty.accent(), FALLBACK_ACCENT);
        assert!(ty.shows(SectionKind::Hints));
        assert!(!ty.shows(SectionKind::Rewards));
    }

    #[test]
    fn tag_labels_branch_on_variant() {
        assert_eq!(AttributeValue::Text("  key ".into()).tag_labels(), vec!["key"]);
        assert!(AttributeValue::Text("   ".into()).tag_labels().is_empty());
        assert_eq!(AttributeValue::Number(3.0).tag_labels(), vec!["3"]);
        assert_eq!(AttributeValue::Number(2.5).tag_labels(), vec!["2.5"]);
        assert_eq!(
            AttributeValue::Number(1e20).tag_labels(),
            vec!["100000000000000000000"]
        );
        assert_eq!(
            AttributeValue::Images(vec!["art/door.png".into(), "map.jpg".into()]).tag_labels(),
            vec!["door.png", "map.jpg"]
        );
        let choices: BTreeSet<String> = ["stealth", "combat"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            AttributeValue::Choices(choices).tag_labels(),
            vec!["combat", "stealth"]
        );
    }

    #[test]
    fn section_prefers_description_over_tags() {
        let mut section = ContentSection {
            description: None,
            tags: vec![AttributeValue::Text("lever".into()), AttributeValue::Number(4.0)],
        };
        assert_eq!(section.preview_lines(), vec!["lever", "4"]);
        section.description = Some("Pull the lever twice".into());
        assert_eq!(section.preview_lines(), vec!["Pull the lever twice"]);
        section.description = Some("  ".into());
        assert_eq!(section.preview_lines(), vec!["lever", "4"]);
    }

    #[test]
    fn node_update_patches_record() {
        let mut node = NodeRecord::new(NodeId::intern("n_update"), "Old", "puzzle");
        node.apply(&NodeUpdate {
            name: Some("Vault door".into()),
            annotation: Some(Some("needs playtest".into())),
            descriptions: vec![(SectionKind::Rewards, Some("Brass key".into()))],
        });
        assert_eq!(node.name, "Vault door");
        assert_eq!(node.annotation_text(), Some("needs playtest"));
        assert_eq!(node.rewards.description.as_deref(), Some("Brass key"));

        node.apply(&NodeUpdate {
            annotation: Some(None),
            ..NodeUpdate::default()
        });
        assert_eq!(node.annotation_text(), None);
    }

    #[test]
    fn canvas_state_json_uses_camel_case() {
        let mut state = CanvasState::default();
        state
            .positions
            .insert(NodeId::intern("json_a"), Position::new(100.0, 100.0));
        state.connections.push(Connection {
            id: ConnectionId::intern("c_json"),
            source_id: NodeId::intern("json_a"),
            target_id: NodeId::intern("json_b"),
            label: Some("opens".into()),
        });
        let json = state.to_json().unwrap();
        assert!(json.contains("\"sourceId\":\"json_a\""));
        assert!(json.contains("\"targetId\":\"json_b\""));
        assert_eq!(CanvasState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn canvas_state_msgpack_snapshot() {
        let mut state = CanvasState::default();
        state
            .positions
            .insert(NodeId::intern("pack_a"), Position::new(-20.5, 7.0));
        let bytes = state.to_msgpack().unwrap();
        assert_eq!(CanvasState::from_msgpack(&bytes).unwrap(), state);
        assert!(CanvasState::from_msgpack(&[0xc1]).is_err());
    }

    #[test]
    fn missing_fields_default() {
        let state = CanvasState::from_json("{}").unwrap();
        assert!(state.positions.is_empty());
        assert!(state.connections.is_empty());
        assert!(CanvasState::from_json("[1, 2").is_err());
    }
}
