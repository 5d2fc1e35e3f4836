// SPDX-License-Identifier: MIT

//! Client-side identifier allocation for nodes and edges

use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix for node identifiers allocated by the editor
pub const NODE_PREFIX: &str = "node";
/// Prefix for edge identifiers allocated by the editor
pub const EDGE_PREFIX: &str = "edge";

/// Hands out `"{prefix}-{n}"` identifiers, distinct for the allocator's lifetime.
///
/// The prefix keeps client identifiers in their own namespace: backend flow
/// identifiers are hex document ids and never contain a dash.
#[derive(Debug)]
pub struct IdAllocator {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub fn nodes() -> Self {
        Self::new(NODE_PREFIX)
    }

    pub fn edges() -> Self {
        Self::new(EDGE_PREFIX)
    }

    /// Allocate the next identifier
    pub fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }

    /// Make sure future identifiers never repeat `id`.
    ///
    /// Recognises both this allocator's own `"{prefix}-{n}"` form and bare
    /// numeric identifiers, which older flows were saved with.
    pub fn reserve(&self, id: &str) {
        let numeric = id
            .strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .unwrap_or(id);

        if let Ok(n) = numeric.parse::<u64>() {
            self.next.fetch_max(n.saturating_add(1), Ordering::Relaxed);
        }
    }
}
