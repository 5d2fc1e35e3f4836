// SPDX-License-Identifier: MIT

//! Fire-and-forget execution requests

use std::sync::Arc;

use super::backend::FlowBackend;
use crate::error::{FlowError, Result};

/// Message reported when the backend accepts without saying anything
pub const DEFAULT_ACK_MESSAGE: &str = "Flow execution started";

/// Backend acknowledgement of an execution request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionAck {
    pub flow_id: String,
    pub message: String,
}

/// Asks the execution engine to run a flow. Progress is not tracked.
#[derive(Clone)]
pub struct ExecutionTrigger {
    backend: Arc<dyn FlowBackend>,
}

impl ExecutionTrigger {
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, flow_id: &str) -> Result<ExecutionAck> {
        if flow_id.trim().is_empty() {
            return Err(FlowError::MissingFlowId);
        }

        let response = self.backend.execute_flow(flow_id).await?;
        let message = response
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACK_MESSAGE.to_string());

        log::info!("Execution accepted for flow {}: {}", flow_id, message);
        Ok(ExecutionAck {
            flow_id: flow_id.to_string(),
            message,
        })
    }
}
