// SPDX-License-Identifier: MIT

//! Flow graph editing
//!
//! This module provides:
//! - `GraphStore` - the nodes and edges being edited
//! - `Binder` / `FieldUpdater` - live field-update handles for nodes
//! - `FlowSession` - a flow's name and identifier tied to a store and the backend
//! - `FlowFileLoader` - flow files on disk

pub mod binder;
pub mod id;
pub mod loader;
pub mod node;
pub mod session;
pub mod store;

pub use binder::{Binder, BoundNode, FieldUpdater};
pub use id::IdAllocator;
pub use loader::FlowFileLoader;
pub use node::{EmailData, Node, NodeData, NodeKind, Position, WaitData};
pub use session::{FlowSession, DEFAULT_FLOW_NAME};
pub use store::{Edge, GraphSnapshot, GraphStore};
