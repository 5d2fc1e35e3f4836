// SPDX-License-Identifier: MIT

//! Node data model
//!
//! `NodeData` holds only the persisted, user-editable fields of a step. The
//! editing handle that writes back into the graph lives next to it in
//! [`BoundNode`](super::binder::BoundNode), never inside it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FlowError, Result};

/// Delay given to freshly added wait nodes
pub const DEFAULT_DELAY: &str = "1 minute";

/// Kind of step in a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Email,
    Wait,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Email => "email",
            NodeKind::Wait => "wait",
        }
    }

    /// Field names editable on this kind, in display order
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            NodeKind::Email => &["to", "subject", "body"],
            NodeKind::Wait => &["delay"],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NodeKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email" => Ok(NodeKind::Email),
            "wait" => Ok(NodeKind::Wait),
            other => Err(FlowError::validation(format!(
                "unknown node type '{}'",
                other
            ))),
        }
    }
}

/// Canvas coordinates, used for rendering only
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Payload of an email step
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct EmailData {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Payload of a wait step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WaitData {
    #[serde(default = "default_delay")]
    pub delay: String,
}

impl Default for WaitData {
    fn default() -> Self {
        Self {
            delay: default_delay(),
        }
    }
}

fn default_delay() -> String {
    DEFAULT_DELAY.to_string()
}

/// Kind-specific payload of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Email(EmailData),
    Wait(WaitData),
}

impl NodeData {
    /// Default payload for a freshly added node
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Email => NodeData::Email(EmailData::default()),
            NodeKind::Wait => NodeData::Wait(WaitData::default()),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Email(_) => NodeKind::Email,
            NodeData::Wait(_) => NodeKind::Wait,
        }
    }

    /// Return a copy with exactly one field replaced.
    ///
    /// Fields not defined for the node's kind are rejected.
    pub fn set_field(&self, field: &str, value: impl Into<String>) -> Result<NodeData> {
        let value = value.into();
        let mut next = self.clone();
        match &mut next {
            NodeData::Email(email) => match field {
                "to" => email.to = value,
                "subject" => email.subject = value,
                "body" => email.body = value,
                _ => return Err(self.unknown_field(field)),
            },
            NodeData::Wait(wait) => match field {
                "delay" => wait.delay = value,
                _ => return Err(self.unknown_field(field)),
            },
        }
        Ok(next)
    }

    /// Read a field by name
    pub fn field(&self, field: &str) -> Option<&str> {
        match (self, field) {
            (NodeData::Email(email), "to") => Some(&email.to),
            (NodeData::Email(email), "subject") => Some(&email.subject),
            (NodeData::Email(email), "body") => Some(&email.body),
            (NodeData::Wait(wait), "delay") => Some(&wait.delay),
            _ => None,
        }
    }

    /// All `(name, value)` pairs in display order
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        self.kind()
            .field_names()
            .iter()
            .filter_map(|name| self.field(name).map(|value| (*name, value)))
            .collect()
    }

    fn unknown_field(&self, field: &str) -> FlowError {
        FlowError::UnknownField {
            kind: self.kind().to_string(),
            field: field.to_string(),
        }
    }
}

/// A step in a flow, as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(id: impl Into<String>, position: Position, data: NodeData) -> Self {
        Self {
            id: id.into(),
            position,
            data,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_email_is_empty() {
        let data = NodeData::default_for(NodeKind::Email);
        assert_eq!(data, NodeData::Email(EmailData::default()));
        assert_eq!(data.field("to"), Some(""));
    }

    #[test]
    fn test_default_wait_has_delay() {
        let data = NodeData::default_for(NodeKind::Wait);
        assert_eq!(data.field("delay"), Some("1 minute"));
    }

    #[test]
    fn test_set_field_replaces_one_field() {
        let data = NodeData::Email(EmailData {
            to: "a@b.com".into(),
            subject: "Hi".into(),
            body: "Hello".into(),
        });
        let next = data.set_field("subject", "Welcome").unwrap();

        assert_eq!(next.field("subject"), Some("Welcome"));
        assert_eq!(next.field("to"), Some("a@b.com"));
        assert_eq!(next.field("body"), Some("Hello"));
        // Original untouched
        assert_eq!(data.field("subject"), Some("Hi"));
    }

    #[test]
    fn test_set_field_rejects_foreign_field() {
        let data = NodeData::default_for(NodeKind::Wait);
        let err = data.set_field("subject", "X").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_set_field_rejects_callback_name() {
        let data = NodeData::default_for(NodeKind::Email);
        assert!(data.set_field("onChange", "x").is_err());
    }

    #[test]
    fn test_fields_in_display_order() {
        let data = NodeData::default_for(NodeKind::Email)
            .set_field("to", "x@y.z")
            .unwrap();
        let names: Vec<&str> = data.fields().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["to", "subject", "body"]);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("email".parse::<NodeKind>().unwrap(), NodeKind::Email);
        assert_eq!("wait".parse::<NodeKind>().unwrap(), NodeKind::Wait);
        assert!("sms".parse::<NodeKind>().is_err());
    }

    #[test]
    fn test_wait_data_defaults_missing_delay() {
        let wait: WaitData = serde_json::from_str("{}").unwrap();
        assert_eq!(wait.delay, DEFAULT_DELAY);
    }
}
