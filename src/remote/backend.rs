// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::wire::{ExecuteResponse, FlowDocument, FlowPayload};
use crate::error::Result;

/// Document store holding saved flows, plus the execution entry point.
///
/// [`HttpBackend`](super::client::HttpBackend) talks to the REST service;
/// tests substitute in-memory implementations.
#[async_trait]
pub trait FlowBackend: Send + Sync {
    /// Fetch one flow document
    async fn get_flow(&self, id: &str) -> Result<FlowDocument>;

    /// Fetch every flow visible to the credential
    async fn list_flows(&self) -> Result<Vec<FlowDocument>>;

    /// Store a new flow and return it with its assigned identifier
    async fn create_flow(&self, payload: &FlowPayload) -> Result<FlowDocument>;

    /// Overwrite an existing flow
    async fn update_flow(&self, id: &str, payload: &FlowPayload) -> Result<FlowDocument>;

    async fn delete_flow(&self, id: &str) -> Result<()>;

    /// Ask the execution engine to run a flow; returns once the request is accepted
    async fn execute_flow(&self, id: &str) -> Result<ExecuteResponse>;
}
