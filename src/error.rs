// SPDX-License-Identifier: MIT

//! Typed error handling for mailflow-rs
//!
//! Every failure surfaced by the editor, the gateway, or the trigger is a
//! `FlowError`. Callers that only care about the broad category match on
//! [`FlowError::kind`].

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FlowError>;

/// Broad error categories reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing flow, node, edge, or a binding whose node no longer exists
    NotFound,
    /// Missing or rejected credential
    Unauthorized,
    /// Payload rejected locally or by the backend
    Validation,
    /// Transport failure, timeout, or unusable backend response
    Network,
    /// Client configuration problem
    Config,
    /// Local file or encoding failure
    Io,
}

/// Top-level error type for mailflow-rs
#[derive(Debug, Error)]
pub enum FlowError {
    /// Node identifier absent from the graph store
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    /// Edge identifier absent from the graph store
    #[error("Edge '{0}' not found")]
    EdgeNotFound(String),

    /// Backend reported no flow for the identifier
    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    /// A field updater issued before the graph was replaced
    #[error("Binding for node '{node_id}' is stale")]
    StaleBinding { node_id: String },

    /// Operation needs a saved flow but the session is still new
    #[error("Flow has not been saved yet")]
    MissingFlowId,

    /// Credential missing or rejected by the backend
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Field name not defined for the node kind
    #[error("Field '{field}' is not defined for {kind} nodes")]
    UnknownField { kind: String, field: String },

    /// Payload rejected, locally or by the backend
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Backend document could not be mapped onto the graph model
    #[error("Invalid flow document: {0}")]
    InvalidDocument(String),

    /// Backend unreachable or returned an unusable response
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP transport errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Configuration errors (missing env vars, invalid base URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl FlowError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NodeNotFound(_)
            | Self::EdgeNotFound(_)
            | Self::FlowNotFound(_)
            | Self::StaleBinding { .. }
            | Self::MissingFlowId => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::UnknownField { .. } | Self::Validation(_) | Self::InvalidDocument(_) => {
                ErrorKind::Validation
            }
            Self::Network(_) | Self::Http(_) => ErrorKind::Network,
            Self::Config(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => ErrorKind::Io,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}
