// SPDX-License-Identifier: MIT

//! Attaching the live field-update handle to nodes
//!
//! Every node handed out by the [`GraphStore`](super::store::GraphStore) comes
//! with a [`FieldUpdater`], the `onChange(node_id, field, value)` entry point a
//! rendering layer calls on each keystroke. The updater does not capture any
//! graph data; it points at the store's shared state plus the binding epoch it
//! was issued in. `replace_all` starts a new epoch, so updaters issued before a
//! load refuse to write instead of editing a graph that no longer exists.

use std::sync::{Arc, RwLock, Weak};

use super::node::Node;
use super::store::{read_state, write_state, GraphState};
use crate::error::{FlowError, Result};

/// The `onChange(node_id, field, value)` handle shared by all nodes of one epoch
#[derive(Debug, Clone)]
pub struct FieldUpdater {
    state: Weak<RwLock<GraphState>>,
    epoch: u64,
}

impl FieldUpdater {
    /// Write `value` into `field` of node `node_id` in the live graph
    pub fn call(&self, node_id: &str, field: &str, value: &str) -> Result<()> {
        let stale = || FlowError::StaleBinding {
            node_id: node_id.to_string(),
        };

        let state = self.state.upgrade().ok_or_else(stale)?;
        let mut guard = write_state(&state);
        if guard.epoch() != self.epoch {
            log::debug!(
                "Refusing update from epoch {} (current {}) for node {}",
                self.epoch,
                guard.epoch(),
                node_id
            );
            return Err(stale());
        }
        guard.update_field(node_id, field, value)
    }

    /// Whether this handle still targets the current graph
    pub fn is_live(&self) -> bool {
        match self.state.upgrade() {
            Some(state) => {
                let current = read_state(&state).epoch();
                current == self.epoch
            }
            None => false,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// A node together with its editing handle
#[derive(Debug, Clone)]
pub struct BoundNode {
    node: Node,
    on_change: FieldUpdater,
}

impl BoundNode {
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn on_change(&self) -> &FieldUpdater {
        &self.on_change
    }

    /// Edit one of this node's fields through its handle
    pub fn set(&self, field: &str, value: &str) -> Result<()> {
        self.on_change.call(&self.node.id, field, value)
    }

    /// Drop the handle, keeping only persisted data
    pub fn into_node(self) -> Node {
        self.node
    }

    pub(crate) fn node_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

/// Issues handles for one binding epoch of a store
#[derive(Debug, Clone)]
pub struct Binder {
    state: Weak<RwLock<GraphState>>,
    epoch: u64,
}

impl Binder {
    pub(crate) fn new(state: &Arc<RwLock<GraphState>>, epoch: u64) -> Self {
        Self {
            state: Arc::downgrade(state),
            epoch,
        }
    }

    /// Attach the current handle to a node
    pub fn bind(&self, node: Node) -> BoundNode {
        BoundNode {
            node,
            on_change: self.updater(),
        }
    }

    /// Refresh the handle of an already bound node
    pub fn rebind(&self, node: BoundNode) -> BoundNode {
        self.bind(node.into_node())
    }

    pub fn updater(&self) -> FieldUpdater {
        FieldUpdater {
            state: self.state.clone(),
            epoch: self.epoch,
        }
    }
}
