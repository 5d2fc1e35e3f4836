// SPDX-License-Identifier: MIT

//! Load/save boundary between the graph store and the flow backend

use std::sync::Arc;

use super::backend::FlowBackend;
use super::client::HttpBackend;
use super::wire::{FlowPayload, FlowRecord};
use crate::config::ClientConfig;
use crate::error::{FlowError, Result};
use crate::flow::store::{GraphSnapshot, GraphStore};

/// Persists flows and maps backend documents back into editable graphs
#[derive(Clone)]
pub struct PersistenceGateway {
    backend: Arc<dyn FlowBackend>,
}

impl PersistenceGateway {
    pub fn new(backend: Arc<dyn FlowBackend>) -> Self {
        Self { backend }
    }

    /// Gateway over the REST backend described by `config`
    pub fn http(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpBackend::new(config)?)))
    }

    pub fn backend(&self) -> Arc<dyn FlowBackend> {
        self.backend.clone()
    }

    /// Fetch and decode a flow without touching any store
    pub async fn fetch(&self, flow_id: &str) -> Result<FlowRecord> {
        let doc = self.backend.get_flow(flow_id).await?;
        FlowRecord::try_from(doc)
    }

    /// Fetch a flow and make it the store's graph.
    ///
    /// The store is replaced only once the response has arrived and decoded,
    /// so the nodes are bound to whatever graph is current at that moment. On
    /// any error the store is left as it was.
    pub async fn load(&self, flow_id: &str, store: &GraphStore) -> Result<FlowRecord> {
        let record = self.fetch(flow_id).await?;
        store.replace_all(record.graph.nodes.clone(), record.graph.edges.clone());

        log::info!(
            "Loaded flow {} ('{}'): {} node(s), {} edge(s)",
            record.id,
            record.name,
            record.graph.nodes.len(),
            record.graph.edges.len()
        );
        Ok(record)
    }

    /// Create (`flow_id == None`) or update a flow from a handle-free snapshot
    pub async fn save(
        &self,
        flow_id: Option<&str>,
        name: &str,
        snapshot: &GraphSnapshot,
    ) -> Result<FlowRecord> {
        if name.trim().is_empty() {
            return Err(FlowError::validation("flow name must not be empty"));
        }

        let payload = FlowPayload::from_snapshot(name, snapshot);
        let doc = match flow_id {
            None => self.backend.create_flow(&payload).await?,
            Some(id) => self.backend.update_flow(id, &payload).await?,
        };
        let record = FlowRecord::try_from(doc)?;

        match flow_id {
            None => log::info!("Created flow {} ('{}')", record.id, record.name),
            Some(_) => log::info!("Updated flow {} ('{}')", record.id, record.name),
        }
        Ok(record)
    }

    /// List saved flows, skipping documents that do not map onto a graph
    pub async fn list(&self) -> Result<Vec<FlowRecord>> {
        let records = self
            .backend
            .list_flows()
            .await?
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match FlowRecord::try_from(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::warn!("Skipping flow {} in listing: {}", id, e);
                        None
                    }
                }
            })
            .collect();
        Ok(records)
    }

    pub async fn delete(&self, flow_id: &str) -> Result<()> {
        self.backend.delete_flow(flow_id).await?;
        log::info!("Deleted flow {}", flow_id);
        Ok(())
    }
}
