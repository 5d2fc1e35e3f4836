// SPDX-License-Identifier: MIT

//! An editing session over one flow
//!
//! A session starts "new" (no identifier). The first successful save adopts
//! the identifier assigned by the backend; every later save updates that
//! document instead of creating another one.

use std::sync::Arc;

use super::store::GraphStore;
use crate::error::{FlowError, Result};
use crate::remote::{ExecutionAck, ExecutionTrigger, FlowBackend, FlowRecord, PersistenceGateway};

/// Name given to flows that have not been renamed yet
pub const DEFAULT_FLOW_NAME: &str = "My New Flow";

pub struct FlowSession {
    store: GraphStore,
    gateway: PersistenceGateway,
    trigger: ExecutionTrigger,
    flow_id: Option<String>,
    name: String,
}

impl FlowSession {
    /// Start a new, unsaved flow
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        Self {
            store: GraphStore::new(),
            gateway: PersistenceGateway::new(backend.clone()),
            trigger: ExecutionTrigger::new(backend),
            flow_id: None,
            name: DEFAULT_FLOW_NAME.to_string(),
        }
    }

    /// Load an existing flow into this session's store.
    ///
    /// On failure the session keeps its current graph, name and identifier.
    pub async fn open(&mut self, flow_id: &str) -> Result<FlowRecord> {
        let record = self.gateway.load(flow_id, &self.store).await?;
        self.flow_id = Some(record.id.clone());
        self.name = record.name.clone();
        Ok(record)
    }

    /// Persist the current graph, creating the flow on first save
    pub async fn save(&mut self) -> Result<FlowRecord> {
        let snapshot = self.store.snapshot();
        let record = self
            .gateway
            .save(self.flow_id.as_deref(), &self.name, &snapshot)
            .await?;

        if self.flow_id.is_none() {
            self.flow_id = Some(record.id.clone());
        }
        Ok(record)
    }

    pub async fn execute(&self) -> Result<ExecutionAck> {
        let id = self.flow_id.as_deref().ok_or(FlowError::MissingFlowId)?;
        self.trigger.execute(id).await
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_id(&self) -> Option<&str> {
        self.flow_id.as_deref()
    }

    pub fn is_new(&self) -> bool {
        self.flow_id.is_none()
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }
}
