//! Connection store: directed edges between nodes.
//!
//! Connections keep insertion order (that is the paint order). A
//! `DiGraphMap` keyed by node id indexes the ordered `(source, target)`
//! pairs so duplicate checks and socket-state queries are O(1)/O(degree).

use crate::id::{ConnectionId, NodeId};
use crate::model::Connection;
use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;

#[derive(Debug, Clone, Default)]
pub struct ConnectionStore {
    connections: Vec<Connection>,
    pairs: DiGraphMap<NodeId, ConnectionId>,
}

impl ConnectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted connections. Self-loops and repeated
    /// pairs in the input are dropped (first one wins).
    pub fn from_connections(connections: Vec<Connection>) -> Self {
        let mut store = Self::new();
        for conn in connections {
            if conn.source_id == conn.target_id
                || store.contains_pair(conn.source_id, conn.target_id)
            {
                log::warn!("dropping invalid persisted connection {}", conn.id);
                continue;
            }
            store.pairs.add_edge(conn.source_id, conn.target_id, conn.id);
            store.connections.push(conn);
        }
        store
    }

    /// Add `source → target`.
    ///
    /// Returns `None` (and changes nothing) for a self-loop or when the
    /// ordered pair already exists; the existing label is kept.
    pub fn add(
        &mut self,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
    ) -> Option<ConnectionId> {
        if source == target {
            log::debug!("rejected self-loop on {source}");
            return None;
        }
        if self.contains_pair(source, target) {
            log::debug!("rejected duplicate connection {source} -> {target}");
            return None;
        }
        let id = ConnectionId::generate();
        self.pairs.add_edge(source, target, id);
        self.connections.push(Connection {
            id,
            source_id: source,
            target_id: target,
            label: label.filter(|l| !l.is_empty()),
        });
        log::debug!("connected {source} -> {target} as {id}");
        Some(id)
    }

    /// Remove by id. Returns `false` if there was no such connection.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        let Some(index) = self.connections.iter().position(|c| c.id == id) else {
            return false;
        };
        let conn = self.connections.remove(index);
        self.pairs.remove_edge(conn.source_id, conn.target_id);
        log::debug!("removed connection {id}");
        true
    }

    /// Replace the label. An empty label clears it. Returns `false` if the
    /// connection does not exist.
    pub fn relabel(&mut self, id: ConnectionId, label: &str) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(conn) => {
                conn.label = if label.is_empty() {
                    None
                } else {
                    Some(label.to_string())
                };
                log::debug!("relabeled connection {id}");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn as_slice(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains_pair(&self, source: NodeId, target: NodeId) -> bool {
        self.pairs.contains_edge(source, target)
    }

    /// Whether any connection ends at `node`.
    pub fn has_incoming(&self, node: NodeId) -> bool {
        self.pairs.contains_node(node)
            && self
                .pairs
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_some()
    }

    /// Whether any connection starts at `node`.
    pub fn has_outgoing(&self, node: NodeId) -> bool {
        self.pairs.contains_node(node)
            && self
                .pairs
                .neighbors_directed(node, Direction::Outgoing)
                .next()
                .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(a: &str, b: &str) -> (NodeId, NodeId) {
        (NodeId::intern(a), NodeId::intern(b))
    }

    #[test]
    fn duplicate_pair_is_rejected_and_label_kept() {
        let (n1, n2) = ids("conn_n1", "conn_n2");
        let mut store = ConnectionStore::new();
        let first = store.add(n1, n2, Some("opens".into()));
        assert!(first.is_some());
        assert_eq!(store.add(n1, n2, Some("again".into())), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.as_slice()[0].label.as_deref(), Some("opens"));
    }

    #[test]
    fn reverse_pair_is_a_different_connection() {
        let (a, b) = ids("conn_rev_a", "conn_rev_b");
        let mut store = ConnectionStore::new();
        assert!(store.add(a, b, None).is_some());
        assert!(store.add(b, a, None).is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn self_loop_is_rejected() {
        let a = NodeId::intern("conn_self");
        let mut store = ConnectionStore::new();
        assert_eq!(store.add(a, a, None), None);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_and_relabel_tolerate_missing_ids() {
        let (a, b) = ids("conn_rm_a", "conn_rm_b");
        let mut store = ConnectionStore::new();
        let id = store.add(a, b, None).unwrap();

        assert!(store.relabel(id, "unlocks"));
        assert_eq!(store.get(id).unwrap().label.as_deref(), Some("unlocks"));
        assert!(store.relabel(id, ""));
        assert_eq!(store.get(id).unwrap().label, None);

        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(!store.relabel(id, "gone"));
        assert!(!store.contains_pair(a, b));
        // Pair is free again after removal.
        assert!(store.add(a, b, None).is_some());
    }

    #[test]
    fn socket_state_queries() {
        let (a, b) = ids("conn_sock_a", "conn_sock_b");
        let c = NodeId::intern("conn_sock_c");
        let mut store = ConnectionStore::new();
        store.add(a, b, None);

        assert!(store.has_outgoing(a));
        assert!(!store.has_incoming(a));
        assert!(store.has_incoming(b));
        assert!(!store.has_outgoing(b));
        assert!(!store.has_incoming(c));
        assert!(!store.has_outgoing(c));
    }

    #[test]
    fn persisted_connections_are_sanitized() {
        let (a, b) = ids("conn_load_a", "conn_load_b");
        let make = |id: &str, s, t| Connection {
            id: ConnectionId::intern(id),
            source_id: s,
            target_id: t,
            label: None,
        };
        let store = ConnectionStore::from_connections(vec![
            make("load_1", a, b),
            make("load_2", a, b),
            make("load_3", a, a),
            make("load_4", b, a),
        ]);
        let kept: Vec<&str> = store.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(kept, vec!["load_1", "load_4"]);
    }

    #[test]
    fn iterates_newest_first_in_reverse() {
        let (a, b) = ids("conn_order_a", "conn_order_b");
        let c = NodeId::intern("conn_order_c");
        let mut store = ConnectionStore::new();
        let first = store.add(a, b, None).unwrap();
        let second = store.add(c, b, None).unwrap();
        let newest_first: Vec<ConnectionId> = store.iter().rev().map(|conn| conn.id).collect();
        assert_eq!(newest_first, vec![second, first]);
    }
}
