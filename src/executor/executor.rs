//! Execution Slots
//!
//! Spawns a fixed number of workers that pull promoted task messages from the
//! ready queue and run them through the `TaskTypeRegistry`.
//!
//! ## Responsibilities
//! - **Revocation**: Skipping any task whose id is in the `RevocationSet`.
//! - **Rate Limiting**: Spacing admissions of a task type according to its current rate limit.
//! - **Execution**: Invoking the handler registered for the task type.
//! - **Retries**: Re-entering failed invocations into the scheduler after the type's retry delay.

use super::queue::{schedule_message, ReadyReceiver, TaskScheduler};
use super::types::*;
use crate::registry::{RateLimit, RevocationSet, TaskTypeRegistry};

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// The engine that drives task execution.
pub struct TaskExecutor {
    /// Receiving end of the ready queue, shared by all slots.
    ready: Mutex<ReadyReceiver>,
    /// Task types and their handlers.
    registry: Arc<TaskTypeRegistry>,
    /// Ids that must be skipped.
    revoked: Arc<RevocationSet>,
    /// Used to schedule retries.
    scheduler: Arc<TaskScheduler>,
    limiter: RateLimiter,
    /// Number of concurrent execution slots.
    concurrency: usize,
}

impl TaskExecutor {
    pub fn new(
        ready: ReadyReceiver,
        registry: Arc<TaskTypeRegistry>,
        revoked: Arc<RevocationSet>,
        scheduler: Arc<TaskScheduler>,
        concurrency: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            ready: Mutex::new(ready),
            registry,
            revoked,
            scheduler,
            limiter: RateLimiter::default(),
            concurrency,
        })
    }

    /// Spawns the execution slots and returns their handles.
    pub fn start(self: &Arc<Self>) -> Vec<tokio::task::JoinHandle<()>> {
        tracing::info!("Starting {} execution slots", self.concurrency);

        (0..self.concurrency)
            .map(|slot_id| {
                let executor = self.clone();
                tokio::spawn(async move {
                    executor.slot_loop(slot_id).await;
                })
            })
            .collect()
    }

    async fn slot_loop(&self, slot_id: usize) {
        tracing::debug!("Execution slot {} started", slot_id);

        loop {
            let next = self.ready.lock().await.recv().await;
            let Some(message) = next else {
                tracing::info!("Ready queue closed, execution slot {} exiting", slot_id);
                break;
            };

            let task_id = message.id.clone();
            let outcome = self.process(message).await;
            tracing::debug!("Slot {} finished task {}: {:?}", slot_id, task_id.0, outcome);
        }
    }

    /// Runs one ready item through revocation, rate limiting and its handler.
    pub async fn process(&self, message: TaskMessage) -> ExecutionOutcome {
        if self.is_revoked(&message) {
            return ExecutionOutcome::Revoked;
        }

        let Some(descriptor) = self.registry.get(&message.task) else {
            tracing::error!(
                "Received task {} of unregistered type '{}', discarding",
                message.id.0,
                message.task
            );
            return ExecutionOutcome::UnknownTaskType;
        };

        self.limiter
            .admit(&descriptor.name, descriptor.rate_limit.as_ref())
            .await;

        // The task may have been revoked while waiting for admission.
        if self.is_revoked(&message) {
            return ExecutionOutcome::Revoked;
        }

        match self.registry.execute(&message).await {
            Ok(()) => {
                tracing::info!("Task {} ({}) succeeded", message.id.0, message.task);
                ExecutionOutcome::Succeeded
            }
            Err(e) if message.retries < descriptor.max_retries => {
                let attempt = message.retries + 1;
                tracing::warn!(
                    "Task {} ({}) failed: {:#}. Retry {}/{} in {:?}",
                    message.id.0,
                    message.task,
                    e,
                    attempt,
                    descriptor.max_retries,
                    descriptor.retry_delay
                );

                let eta = chrono::Duration::from_std(descriptor.retry_delay)
                    .map(|delay| Utc::now() + delay)
                    .ok();
                let retry = TaskMessage {
                    retries: attempt,
                    eta,
                    ..message
                };
                schedule_message(&self.scheduler, retry);

                ExecutionOutcome::Retrying { attempt }
            }
            Err(e) => {
                tracing::error!("Task {} ({}) failed: {:#}", message.id.0, message.task, e);
                ExecutionOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    fn is_revoked(&self, message: &TaskMessage) -> bool {
        if self.revoked.contains(&message.id.0) {
            tracing::warn!("Skipping revoked task {} ({})", message.id.0, message.task);
            return true;
        }
        false
    }
}

/// Spaces admissions per task type so that at most `rate` executions start per period.
///
/// The spacing is computed from the limit passed to each `admit` call, so a changed
/// rate limit applies to the very next admission.
#[derive(Default)]
pub(crate) struct RateLimiter {
    /// Instant at which the last execution of each task type was admitted.
    last_admitted: DashMap<String, Instant>,
}

impl RateLimiter {
    pub(crate) async fn admit(&self, task_type: &str, rate_limit: Option<&RateLimit>) {
        let Some(rate_limit) = rate_limit else {
            return;
        };

        let now = Instant::now();
        let start = match self.last_admitted.entry(task_type.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                now
            }
            Entry::Occupied(mut entry) => {
                let start = match entry.get().checked_add(rate_limit.interval()) {
                    Some(earliest) => earliest.max(now),
                    None => {
                        tracing::error!(
                            "Rate limit {} for '{}' cannot be enforced, admitting without delay",
                            rate_limit,
                            task_type
                        );
                        now
                    }
                };
                entry.insert(start);
                start
            }
        };

        if start > now {
            tracing::debug!(
                "Rate limit {} for '{}': delaying execution by {:?}",
                rate_limit,
                task_type,
                start - now
            );
            tokio::time::sleep_until(start).await;
        }
    }
}
