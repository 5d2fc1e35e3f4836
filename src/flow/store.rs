// SPDX-License-Identifier: MIT

//! In-memory graph storage for the flow editor

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::binder::{Binder, BoundNode};
use super::id::IdAllocator;
use super::node::{Node, NodeData, NodeKind, Position};
use crate::error::{FlowError, Result};

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Handle-free copy of the graph, ready to be serialized
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Graph contents shared between a store and the handles it issued
#[derive(Debug, Default)]
pub struct GraphState {
    epoch: u64,
    nodes: Vec<BoundNode>,
    edges: Vec<Edge>,
}

impl GraphState {
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    fn position_of(&self, node_id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == node_id)
    }

    fn contains(&self, node_id: &str) -> bool {
        self.position_of(node_id).is_some()
    }

    pub(crate) fn update_field(&mut self, node_id: &str, field: &str, value: &str) -> Result<()> {
        let idx = self
            .position_of(node_id)
            .ok_or_else(|| FlowError::NodeNotFound(node_id.to_string()))?;

        let node = self.nodes[idx].node_mut();
        node.data = node.data.set_field(field, value)?;
        Ok(())
    }
}

pub(crate) fn read_state(state: &RwLock<GraphState>) -> RwLockReadGuard<'_, GraphState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_state(state: &RwLock<GraphState>) -> RwLockWriteGuard<'_, GraphState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the nodes and edges being edited
///
/// Cloning the store yields another handle onto the same graph. Every
/// operation is synchronous; mutations are last-writer-wins.
#[derive(Clone)]
pub struct GraphStore {
    state: Arc<RwLock<GraphState>>,
    node_ids: Arc<IdAllocator>,
    edge_ids: Arc<IdAllocator>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(GraphState::default())),
            node_ids: Arc::new(IdAllocator::nodes()),
            edge_ids: Arc::new(IdAllocator::edges()),
        }
    }

    /// Binder for the current epoch
    pub fn binder(&self) -> Binder {
        let epoch = read_state(&self.state).epoch;
        Binder::new(&self.state, epoch)
    }

    /// Add a node of `kind` with its default payload and return its identifier
    pub fn add_node(&self, kind: NodeKind, position: Position) -> String {
        let mut state = write_state(&self.state);

        let mut id = self.node_ids.next_id();
        while state.contains(&id) {
            id = self.node_ids.next_id();
        }

        let binder = Binder::new(&self.state, state.epoch);
        let node = Node::new(id.clone(), position, NodeData::default_for(kind));
        state.nodes.push(binder.bind(node));

        log::debug!("Added {} node {}", kind, id);
        id
    }

    /// Replace one field of one node's payload
    pub fn update_node_field(&self, node_id: &str, field: &str, value: &str) -> Result<()> {
        write_state(&self.state).update_field(node_id, field, value)
    }

    /// Move a node on the canvas
    pub fn move_node(&self, node_id: &str, position: Position) -> Result<()> {
        let mut state = write_state(&self.state);
        let idx = state
            .position_of(node_id)
            .ok_or_else(|| FlowError::NodeNotFound(node_id.to_string()))?;
        state.nodes[idx].node_mut().position = position;
        Ok(())
    }

    /// Connect `source` to `target`, returning the new edge identifier.
    ///
    /// Parallel edges and self-loops are accepted.
    pub fn connect(&self, source: &str, target: &str) -> Result<String> {
        let mut state = write_state(&self.state);
        for endpoint in [source, target] {
            if !state.contains(endpoint) {
                return Err(FlowError::NodeNotFound(endpoint.to_string()));
            }
        }

        let mut id = self.edge_ids.next_id();
        while state.edges.iter().any(|e| e.id == id) {
            id = self.edge_ids.next_id();
        }

        state.edges.push(Edge::new(id.clone(), source, target));
        log::debug!("Connected {} -> {} as {}", source, target, id);
        Ok(id)
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&self, node_id: &str) -> Result<()> {
        let mut state = write_state(&self.state);
        let idx = state
            .position_of(node_id)
            .ok_or_else(|| FlowError::NodeNotFound(node_id.to_string()))?;

        state.nodes.remove(idx);
        let before = state.edges.len();
        state.edges.retain(|e| !e.touches(node_id));

        log::debug!(
            "Removed node {} and {} incident edge(s)",
            node_id,
            before - state.edges.len()
        );
        Ok(())
    }

    pub fn remove_edge(&self, edge_id: &str) -> Result<()> {
        let mut state = write_state(&self.state);
        let idx = state
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| FlowError::EdgeNotFound(edge_id.to_string()))?;
        state.edges.remove(idx);
        Ok(())
    }

    /// Replace the whole graph, binding every incoming node to a fresh epoch.
    ///
    /// Handles issued before this call stop working. Duplicate node ids keep
    /// their first occurrence; edges whose endpoints are missing are dropped.
    pub fn replace_all(
        &self,
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) {
        let mut state = write_state(&self.state);
        state.epoch += 1;
        let binder = Binder::new(&self.state, state.epoch);

        let mut seen = HashSet::new();
        let mut bound = Vec::new();
        for node in nodes {
            if !seen.insert(node.id.clone()) {
                log::warn!("Dropping duplicate node id {}", node.id);
                continue;
            }
            self.node_ids.reserve(&node.id);
            bound.push(binder.bind(node));
        }

        let mut kept = Vec::new();
        for edge in edges {
            if !seen.contains(&edge.source) || !seen.contains(&edge.target) {
                log::warn!(
                    "Dropping edge {} with missing endpoint ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
                continue;
            }
            self.edge_ids.reserve(&edge.id);
            kept.push(edge);
        }

        log::debug!(
            "Replaced graph: {} node(s), {} edge(s), epoch {}",
            bound.len(),
            kept.len(),
            state.epoch
        );
        state.nodes = bound;
        state.edges = kept;
    }

    /// Copy of the graph with every handle stripped
    pub fn snapshot(&self) -> GraphSnapshot {
        let state = read_state(&self.state);
        GraphSnapshot {
            nodes: state.nodes.iter().map(|n| n.node().clone()).collect(),
            edges: state.edges.clone(),
        }
    }

    /// Bound nodes, in insertion order
    pub fn nodes(&self) -> Vec<BoundNode> {
        read_state(&self.state).nodes.clone()
    }

    pub fn node(&self, node_id: &str) -> Option<BoundNode> {
        read_state(&self.state)
            .nodes
            .iter()
            .find(|n| n.id() == node_id)
            .cloned()
    }

    pub fn edges(&self) -> Vec<Edge> {
        read_state(&self.state).edges.clone()
    }

    pub fn len(&self) -> usize {
        read_state(&self.state).nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        read_state(&self.state).nodes.is_empty()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::flow::node::EmailData;

    fn email(id: &str, to: &str) -> Node {
        Node::new(
            id,
            Position::new(10.0, 20.0),
            NodeData::Email(EmailData {
                to: to.to_string(),
                subject: "Hi".to_string(),
                body: "Hello".to_string(),
            }),
        )
    }

    #[test]
    fn test_add_node_uses_defaults() {
        let store = GraphStore::new();
        let id = store.add_node(NodeKind::Wait, Position::new(1.0, 2.0));

        let node = store.node(&id).unwrap();
        assert_eq!(node.node().kind(), NodeKind::Wait);
        assert_eq!(node.node().data.field("delay"), Some("1 minute"));
        assert_eq!(node.node().position, Position::new(1.0, 2.0));
    }

    #[test]
    fn test_add_node_ids_are_unique() {
        let store = GraphStore::new();
        let ids: HashSet<String> = (0..100)
            .map(|i| {
                let kind = if i % 2 == 0 {
                    NodeKind::Email
                } else {
                    NodeKind::Wait
                };
                store.add_node(kind, Position::default())
            })
            .collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_add_node_after_load_avoids_loaded_ids() {
        let store = GraphStore::new();
        store.replace_all(vec![email("node-1", ""), email("2", "")], vec![]);

        let id = store.add_node(NodeKind::Email, Position::default());
        assert_ne!(id, "node-1");
        assert_ne!(id, "node-2");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_update_field_is_isolated() {
        let store = GraphStore::new();
        store.replace_all(
            vec![email("a", "a@b.com"), email("b", "c@d.com")],
            vec![Edge::new("e1", "a", "b")],
        );
        let before = store.snapshot();

        store.update_node_field("a", "subject", "X").unwrap();

        let after = store.snapshot();
        assert_eq!(after.edges, before.edges);
        assert_eq!(after.nodes[1], before.nodes[1]);
        assert_eq!(after.nodes[0].data.field("subject"), Some("X"));
        assert_eq!(after.nodes[0].data.field("to"), Some("a@b.com"));
        assert_eq!(after.nodes[0].data.field("body"), Some("Hello"));
        assert_eq!(after.nodes[0].position, before.nodes[0].position);
    }

    #[test]
    fn test_update_missing_node_is_not_found() {
        let store = GraphStore::new();
        store.add_node(NodeKind::Email, Position::default());
        let before = store.snapshot();

        let err = store.update_node_field("ghost", "to", "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_update_unknown_field_leaves_node() {
        let store = GraphStore::new();
        let id = store.add_node(NodeKind::Wait, Position::default());
        let before = store.snapshot();

        assert!(store.update_node_field(&id, "subject", "x").is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_keystroke_updates_keep_single_binding() {
        let store = GraphStore::new();
        let id = store.add_node(NodeKind::Email, Position::default());
        let epoch = store.node(&id).unwrap().on_change().epoch();

        let mut typed = String::new();
        for ch in "hello@example.com".chars() {
            typed.push(ch);
            store.update_node_field(&id, "to", &typed).unwrap();
        }

        let node = store.node(&id).unwrap();
        assert_eq!(node.node().data.field("to"), Some("hello@example.com"));
        assert_eq!(node.on_change().epoch(), epoch);
        assert!(node.on_change().is_live());
    }

    #[test]
    fn test_connect_requires_both_endpoints() {
        let store = GraphStore::new();
        let a = store.add_node(NodeKind::Email, Position::default());

        let err = store.connect(&a, "missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.connect("missing", &a).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(store.edges().is_empty());
    }

    #[test]
    fn test_connect_allows_parallel_edges() {
        let store = GraphStore::new();
        let a = store.add_node(NodeKind::Email, Position::default());
        let b = store.add_node(NodeKind::Wait, Position::default());

        let e1 = store.connect(&a, &b).unwrap();
        let e2 = store.connect(&a, &b).unwrap();
        assert_ne!(e1, e2);
        assert_eq!(store.edges().len(), 2);
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let store = GraphStore::new();
        let a = store.add_node(NodeKind::Email, Position::default());
        let b = store.add_node(NodeKind::Wait, Position::default());
        let c = store.add_node(NodeKind::Email, Position::default());
        store.connect(&a, &b).unwrap();
        store.connect(&b, &c).unwrap();
        store.connect(&b, &b).unwrap();
        let keep = store.connect(&a, &c).unwrap();

        store.remove_node(&b).unwrap();

        let edges = store.edges();
        assert!(edges.iter().all(|e| !e.touches(&b)));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].id, keep);
        assert!(store.node(&b).is_none());
    }

    #[test]
    fn test_remove_missing_entities() {
        let store = GraphStore::new();
        assert_eq!(
            store.remove_node("nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            store.remove_edge("nope").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_remove_edge_keeps_nodes() {
        let store = GraphStore::new();
        let a = store.add_node(NodeKind::Email, Position::default());
        let b = store.add_node(NodeKind::Wait, Position::default());
        let edge = store.connect(&a, &b).unwrap();

        store.remove_edge(&edge).unwrap();
        assert!(store.edges().is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_move_node() {
        let store = GraphStore::new();
        let a = store.add_node(NodeKind::Email, Position::default());
        store.move_node(&a, Position::new(300.0, 40.5)).unwrap();
        assert_eq!(
            store.node(&a).unwrap().node().position,
            Position::new(300.0, 40.5)
        );
        assert!(store.move_node("ghost", Position::default()).is_err());
    }

    #[test]
    fn test_replace_all_drops_dangling_edges_and_duplicates() {
        let store = GraphStore::new();
        store.replace_all(
            vec![email("a", "1"), email("b", "2"), email("a", "dup")],
            vec![Edge::new("e1", "a", "b"), Edge::new("e2", "a", "zzz")],
        );

        let snapshot = store.snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.nodes[0].data.field("to"), Some("1"));
        assert_eq!(snapshot.edges, vec![Edge::new("e1", "a", "b")]);
    }

    #[test]
    fn test_replace_all_rebinds_every_node() {
        let store = GraphStore::new();
        store.add_node(NodeKind::Email, Position::default());
        let old_epoch = store.binder().updater().epoch();

        store.replace_all(vec![email("a", ""), email("b", "")], vec![]);

        for node in store.nodes() {
            assert!(node.on_change().is_live());
            assert!(node.on_change().epoch() > old_epoch);
        }
    }

    #[test]
    fn test_clones_share_the_graph() {
        let store = GraphStore::new();
        let other = store.clone();
        let id = other.add_node(NodeKind::Wait, Position::default());
        assert!(store.node(&id).is_some());
        assert!(!store.is_empty());
    }
}
