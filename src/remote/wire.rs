// SPDX-License-Identifier: MIT

//! JSON shapes exchanged with the flow backend
//!
//! Node payloads travel as a free-form `data` object on the wire; they are
//! decoded by `type` into [`NodeData`] and re-encoded from it, so only the
//! declared fields (`to`/`subject`/`body` or `delay`) are ever sent back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::flow::node::{EmailData, Node, NodeData, NodeKind, Position, WaitData};
use crate::flow::store::{Edge, GraphSnapshot};

/// A node as it appears in flow documents and request bodies
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WireNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: Value,
}

impl From<&Node> for WireNode {
    fn from(node: &Node) -> Self {
        let data = match &node.data {
            NodeData::Email(email) => serde_json::json!({
                "to": email.to,
                "subject": email.subject,
                "body": email.body,
            }),
            NodeData::Wait(wait) => serde_json::json!({ "delay": wait.delay }),
        };

        Self {
            id: node.id.clone(),
            kind: node.kind(),
            position: node.position,
            data,
        }
    }
}

impl TryFrom<WireNode> for Node {
    type Error = FlowError;

    fn try_from(wire: WireNode) -> Result<Self> {
        let invalid = |e: serde_json::Error| {
            FlowError::InvalidDocument(format!("node '{}' has malformed data: {}", wire.id, e))
        };

        let data = if wire.data.is_null() {
            NodeData::default_for(wire.kind)
        } else {
            match wire.kind {
                NodeKind::Email => NodeData::Email(
                    serde_json::from_value::<EmailData>(wire.data.clone()).map_err(invalid)?,
                ),
                NodeKind::Wait => NodeData::Wait(
                    serde_json::from_value::<WaitData>(wire.data.clone()).map_err(invalid)?,
                ),
            }
        };

        Ok(Node::new(wire.id, wire.position, data))
    }
}

/// Body of `POST /flows` and `PUT /flows/{id}`; also the flow file format
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowPayload {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl FlowPayload {
    pub fn from_snapshot(name: &str, snapshot: &GraphSnapshot) -> Self {
        Self {
            name: name.to_string(),
            nodes: snapshot.nodes.iter().map(WireNode::from).collect(),
            edges: snapshot.edges.clone(),
        }
    }

    pub fn to_snapshot(&self) -> Result<GraphSnapshot> {
        decode_graph(&self.nodes, &self.edges)
    }
}

/// A stored flow as returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `GET /flows/{id}` response
#[derive(Debug, Deserialize)]
pub struct FlowEnvelope {
    #[serde(default)]
    pub flow: Option<FlowDocument>,
}

/// `GET /flows` response; entries are decoded one by one
#[derive(Debug, Deserialize)]
pub struct FlowListEnvelope {
    #[serde(default)]
    pub flows: Vec<Value>,
}

/// Create/update responses, accepted either wrapped in `{ flow }` or bare
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SavedFlow {
    Wrapped { flow: FlowDocument },
    Bare(FlowDocument),
}

impl SavedFlow {
    pub fn into_document(self) -> FlowDocument {
        match self {
            SavedFlow::Wrapped { flow } => flow,
            SavedFlow::Bare(doc) => doc,
        }
    }
}

/// `POST /flow/{id}/execute` response
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the backend attaches to non-success responses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A flow document mapped onto the editor's types
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    pub id: String,
    pub name: String,
    pub graph: GraphSnapshot,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<FlowDocument> for FlowRecord {
    type Error = FlowError;

    fn try_from(doc: FlowDocument) -> Result<Self> {
        let graph = decode_graph(&doc.nodes, &doc.edges)?;
        Ok(Self {
            id: doc.id,
            name: doc.name,
            graph,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

fn decode_graph(nodes: &[WireNode], edges: &[Edge]) -> Result<GraphSnapshot> {
    let nodes = nodes
        .iter()
        .cloned()
        .map(Node::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(GraphSnapshot {
        nodes,
        edges: edges.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "_id": "65f1c0ffee0123456789abcd",
            "name": "Welcome Flow",
            "nodes": [
                {
                    "id": "1",
                    "type": "email",
                    "position": { "x": 12.5, "y": 40 },
                    "data": { "to": "a@b.com", "subject": "Hi", "body": "Hello", "label": "legacy" }
                },
                {
                    "id": "2",
                    "type": "wait",
                    "position": { "x": 0, "y": 200 },
                    "data": { "delay": "2 minutes" }
                }
            ],
            "edges": [ { "id": "xy-edge__1-2", "source": "1", "target": "2" } ],
            "createdAt": "2025-03-01T10:00:00.000Z",
            "updatedAt": "2025-03-02T11:30:00.000Z",
            "__v": 0
        })
    }

    #[test]
    fn test_decode_get_envelope() {
        let envelope: FlowEnvelope =
            serde_json::from_value(json!({ "flow": sample_document() })).unwrap();
        let record = FlowRecord::try_from(envelope.flow.unwrap()).unwrap();

        assert_eq!(record.id, "65f1c0ffee0123456789abcd");
        assert_eq!(record.name, "Welcome Flow");
        assert_eq!(record.graph.nodes.len(), 2);
        assert_eq!(record.graph.nodes[0].kind(), NodeKind::Email);
        assert_eq!(record.graph.nodes[0].position, Position::new(12.5, 40.0));
        assert_eq!(record.graph.nodes[1].data.field("delay"), Some("2 minutes"));
        assert_eq!(record.graph.edges[0].source, "1");
        assert!(record.created_at.is_some());
    }

    #[test]
    fn test_envelope_without_flow() {
        let envelope: FlowEnvelope = serde_json::from_value(json!({ "flow": null })).unwrap();
        assert!(envelope.flow.is_none());
    }

    #[test]
    fn test_saved_flow_accepts_both_shapes() {
        let wrapped: SavedFlow =
            serde_json::from_value(json!({ "flow": sample_document() })).unwrap();
        let bare: SavedFlow = serde_json::from_value(sample_document()).unwrap();
        assert_eq!(wrapped.into_document(), bare.into_document());
    }

    #[test]
    fn test_encoded_data_has_only_declared_fields() {
        let node = Node::new(
            "node-1",
            Position::default(),
            NodeData::default_for(NodeKind::Email),
        );
        let wire = serde_json::to_value(WireNode::from(&node)).unwrap();

        assert_eq!(wire["type"], "email");
        assert_eq!(wire["data"], json!({ "to": "", "subject": "", "body": "" }));
    }

    #[test]
    fn test_callback_in_incoming_data_is_ignored() {
        let wire: WireNode = serde_json::from_value(json!({
            "id": "n",
            "type": "wait",
            "data": { "delay": "3 days", "onChange": {} }
        }))
        .unwrap();
        let node = Node::try_from(wire).unwrap();
        let back = serde_json::to_value(WireNode::from(&node)).unwrap();
        assert_eq!(back["data"], json!({ "delay": "3 days" }));
    }

    #[test]
    fn test_missing_data_uses_defaults() {
        let wire: WireNode =
            serde_json::from_value(json!({ "id": "n", "type": "wait" })).unwrap();
        let node = Node::try_from(wire).unwrap();
        assert_eq!(node.data.field("delay"), Some("1 minute"));
        assert_eq!(node.position, Position::default());
    }

    #[test]
    fn test_malformed_data_is_invalid_document() {
        let wire: WireNode = serde_json::from_value(json!({
            "id": "n",
            "type": "email",
            "data": "not an object"
        }))
        .unwrap();
        let err = Node::try_from(wire).unwrap_err();
        assert!(matches!(err, FlowError::InvalidDocument(_)));
    }

    #[test]
    fn test_unknown_node_type_fails_to_decode() {
        let result = serde_json::from_value::<WireNode>(json!({
            "id": "n",
            "type": "sms",
            "data": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_payload_shape() {
        let snapshot = GraphSnapshot {
            nodes: vec![Node::new(
                "node-1",
                Position::new(1.0, 2.0),
                NodeData::default_for(NodeKind::Wait),
            )],
            edges: vec![],
        };
        let body = serde_json::to_value(FlowPayload::from_snapshot("Drip", &snapshot)).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Drip",
                "nodes": [{
                    "id": "node-1",
                    "type": "wait",
                    "position": { "x": 1.0, "y": 2.0 },
                    "data": { "delay": "1 minute" }
                }],
                "edges": []
            })
        );
    }
}
