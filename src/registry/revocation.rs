//! Revoked Task Registry
//!
//! Holds the ids of tasks that must not run on this worker. Revocation is permanent
//! for the lifetime of the process; there is no removal path.

use dashmap::DashSet;
use std::sync::Arc;

pub struct RevocationSet {
    revoked: DashSet<String>,
}

impl RevocationSet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marks `task_id` as revoked. Returns `false` if it already was.
    pub fn add(&self, task_id: impl Into<String>) -> bool {
        self.revoked.insert(task_id.into())
    }

    /// Execution slots call this immediately before running a task.
    pub fn contains(&self, task_id: &str) -> bool {
        self.revoked.contains(task_id)
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

impl Default for RevocationSet {
    fn default() -> Self {
        Self {
            revoked: DashSet::new(),
        }
    }
}
