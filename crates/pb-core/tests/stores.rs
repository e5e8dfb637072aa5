//! Integration tests: layout + connection stores and the persisted state.
//!
//! Exercises the `pb-core` pieces the editor builds on: auto-placement,
//! duplicate suppression, and the positions + connections round trip.

use pb_core::id::NodeId;
use pb_core::layout::{GridPlacement, LayoutStore};
use pb_core::model::{CanvasState, Position};
use pb_core::{CanvasConfig, ConnectionStore};
use pretty_assertions::assert_eq;

fn ids(names: &[&str]) -> Vec<NodeId> {
    names.iter().map(|n| NodeId::intern(n)).collect()
}

// ─── Auto-placement ──────────────────────────────────────────────────────

#[test]
fn three_fresh_nodes_fill_the_first_row() {
    let nodes = ids(&["n1", "n2", "n3"]);
    let mut store = LayoutStore::new(GridPlacement::from_config(&CanvasConfig::default()));

    assert!(store.ensure_positions(&nodes));

    assert_eq!(store.get(nodes[0]), Some(Position::new(100.0, 100.0)));
    assert_eq!(store.get(nodes[1]), Some(Position::new(450.0, 100.0)));
    assert_eq!(store.get(nodes[2]), Some(Position::new(800.0, 100.0)));
}

#[test]
fn every_node_has_a_position_after_ensure() {
    let nodes: Vec<NodeId> = (0..11)
        .map(|i| NodeId::intern(&format!("every_{i}")))
        .collect();
    let mut store = LayoutStore::default();
    store.set_position(nodes[4], Position::new(1.0, 2.0));
    store.set_position(nodes[9], Position::new(-300.0, 40.0));

    store.ensure_positions(&nodes);

    for id in &nodes {
        assert!(store.contains(*id), "{id} has no position");
    }
    assert_eq!(store.get(nodes[4]), Some(Position::new(1.0, 2.0)));
    assert_eq!(store.get(nodes[9]), Some(Position::new(-300.0, 40.0)));
    // Index 10 → column 1, row 3.
    assert_eq!(store.get(nodes[10]), Some(Position::new(450.0, 850.0)));
}

// ─── Connections ─────────────────────────────────────────────────────────

#[test]
fn second_add_of_same_pair_is_rejected_outright() {
    let n = ids(&["n1", "n2"]);
    let mut store = ConnectionStore::new();

    assert!(store.add(n[0], n[1], Some("opens".into())).is_some());
    assert!(store.add(n[0], n[1], Some("again".into())).is_none());

    let labels: Vec<Option<&str>> = store.iter().map(|c| c.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("opens")]);
}

#[test]
fn relabel_is_the_way_to_change_a_label() {
    let n = ids(&["n1", "n2"]);
    let mut store = ConnectionStore::new();
    let id = store.add(n[0], n[1], Some("opens".into())).unwrap();

    assert!(store.relabel(id, "again"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(id).and_then(|c| c.label.as_deref()), Some("again"));
}

// ─── Persisted state ─────────────────────────────────────────────────────

#[test]
fn state_survives_json_and_reload() {
    let n = ids(&["persist_a", "persist_b", "persist_c"]);
    let mut layout = LayoutStore::default();
    layout.ensure_positions(&n);
    let mut connections = ConnectionStore::new();
    connections.add(n[0], n[1], Some("key".into()));
    connections.add(n[1], n[2], None);

    let state = CanvasState {
        positions: layout.positions().clone(),
        connections: connections.as_slice().to_vec(),
    };
    let json = state.to_json().unwrap();
    let loaded = CanvasState::from_json(&json).unwrap();
    assert_eq!(loaded, state);

    let mut reloaded = ConnectionStore::from_connections(loaded.connections);
    assert!(reloaded.contains_pair(n[0], n[1]));
    assert!(reloaded.contains_pair(n[1], n[2]));
    assert!(reloaded.add(n[0], n[1], None).is_none());
}
