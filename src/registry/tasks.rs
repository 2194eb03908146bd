//! Task Type Registry
//!
//! Maps task type names (e.g. "reports.generate") to their descriptor and the async
//! Rust closure that implements them. Execution slots read descriptors from here
//! before admitting a task; the control plane overwrites rate limits in place.

use super::types::{RateLimit, TaskTypeDescriptor};
use crate::executor::types::TaskMessage;

use anyhow::Result;
use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a thread-safe, asynchronous task handler function.
/// It receives the full `TaskMessage` and resolves to a `Result<()>`.
pub type TaskHandlerFn =
    Arc<dyn Fn(TaskMessage) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

struct TaskType {
    descriptor: TaskTypeDescriptor,
    handler: TaskHandlerFn,
}

/// Registry holding every task type this worker can execute.
pub struct TaskTypeRegistry {
    types: DashMap<String, TaskType>,
}

impl TaskTypeRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a task type under `descriptor.name`, replacing any previous one.
    pub fn register<F, Fut>(&self, descriptor: TaskTypeDescriptor, handler: F)
    where
        F: Fn(TaskMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        // Type-erase the concrete future so different handlers share one map.
        let handler: TaskHandlerFn = Arc::new(move |message: TaskMessage| {
            Box::pin(handler(message)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        });

        tracing::info!(
            "Registered task type: {} (rate limit: {})",
            descriptor.name,
            describe_rate_limit(descriptor.rate_limit.as_ref())
        );

        self.types
            .insert(descriptor.name.clone(), TaskType { descriptor, handler });
    }

    /// Returns a copy of the current descriptor for `name`.
    pub fn get(&self, name: &str) -> Option<TaskTypeDescriptor> {
        self.types.get(name).map(|entry| entry.descriptor.clone())
    }

    /// Overwrites the rate limit of an existing task type.
    ///
    /// Unknown names are ignored and never create an entry. Returns whether the
    /// task type was found.
    pub fn set_rate_limit(&self, name: &str, rate_limit: Option<RateLimit>) -> bool {
        match self.types.get_mut(name) {
            Some(mut entry) => {
                entry.descriptor.rate_limit = rate_limit;
                true
            }
            None => false,
        }
    }

    /// Runs the handler registered for `message.task`.
    ///
    /// # Returns
    /// * `Ok(())` if the handler executed successfully.
    /// * `Err` if the handler failed or if no task type exists for the given name.
    pub async fn execute(&self, message: &TaskMessage) -> Result<()> {
        // Clone the handler out so no shard lock is held across the await.
        let handler = self
            .types
            .get(&message.task)
            .map(|entry| entry.handler.clone());

        match handler {
            Some(handler) => {
                tracing::debug!(
                    "Executing task {} of type '{}' (args size: {} bytes)",
                    message.id.0,
                    message.task,
                    message.args.to_string().len()
                );
                handler(message.clone()).await
            }
            None => {
                let error = format!("Unknown task type: {}", message.task);
                tracing::error!("{}", error);
                Err(anyhow::anyhow!(error))
            }
        }
    }

    /// Returns the names of all registered task types, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TaskTypeRegistry {
    fn default() -> Self {
        Self {
            types: DashMap::new(),
        }
    }
}

pub(crate) fn describe_rate_limit(rate_limit: Option<&RateLimit>) -> String {
    match rate_limit {
        Some(limit) => limit.to_string(),
        None => "none".to_string(),
    }
}
