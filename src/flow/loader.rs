//! Flow file loader - YAML/JSON flow files
//!
//! A flow file has the same shape as a save request body (`name`, `nodes`,
//! `edges`). Files ending in `.yaml`/`.yml` are YAML, anything else is JSON.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::remote::wire::FlowPayload;

/// Reads and writes flow files
pub struct FlowFileLoader;

impl FlowFileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a flow from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<FlowPayload> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if is_yaml(path) {
            Self::parse_yaml(&content)
        } else {
            Self::parse_json(&content)
        }
    }

    /// Write a flow to a file
    pub fn save<P: AsRef<Path>>(&self, path: P, flow: &FlowPayload) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(flow)?
        } else {
            serde_json::to_string_pretty(flow)?
        };
        fs::write(path, content)?;
        Ok(())
    }

    pub fn parse_yaml(content: &str) -> Result<FlowPayload> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn parse_json(content: &str) -> Result<FlowPayload> {
        Ok(serde_json::from_str(content)?)
    }
}

impl Default for FlowFileLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}
