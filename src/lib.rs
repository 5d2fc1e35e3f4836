// SPDX-License-Identifier: MIT

//! Editing, persisting and triggering email automation flows.

pub mod config;
pub mod error;
pub mod flow;
pub mod remote;
