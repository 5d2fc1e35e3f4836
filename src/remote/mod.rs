// SPDX-License-Identifier: MIT

//! Backend access: wire format, transport, persistence and execution

pub mod backend;
pub mod client;
pub mod gateway;
pub mod trigger;
pub mod wire;

pub use backend::FlowBackend;
pub use client::HttpBackend;
pub use gateway::PersistenceGateway;
pub use trigger::{ExecutionAck, ExecutionTrigger};
pub use wire::{FlowDocument, FlowPayload, FlowRecord};
