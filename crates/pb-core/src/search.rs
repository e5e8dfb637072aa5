//! Node search for the canvas "jump to node" box.

use crate::model::NodeRecord;

/// Case-insensitive substring match on node names, in node-list order,
/// capped at `limit` results. A blank query matches nothing.
pub fn search_nodes<'a>(nodes: &'a [NodeRecord], query: &str, limit: usize) -> Vec<&'a NodeRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    nodes
        .iter()
        .filter(|n| n.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;

    fn node(id: &str, name: &str) -> NodeRecord {
        NodeRecord::new(NodeId::intern(id), name, "puzzle")
    }

    #[test]
    fn matches_case_insensitively() {
        let nodes = vec![
            node("s1", "Clock Tower"),
            node("s2", "Library"),
            node("s3", "tower of Hanoi"),
        ];
        let hits: Vec<&str> = search_nodes(&nodes, "TOWER", 5)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Clock Tower", "tower of Hanoi"]);
    }

    #[test]
    fn caps_results() {
        let nodes: Vec<NodeRecord> = (0..9)
            .map(|i| node(&format!("cap_{i}"), &format!("Room {i}")))
            .collect();
        assert_eq!(search_nodes(&nodes, "room", 5).len(), 5);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let nodes = vec![node("blank_1", "Cellar")];
        assert!(search_nodes(&nodes, "", 5).is_empty());
        assert!(search_nodes(&nodes, "   ", 5).is_empty());
    }
}
