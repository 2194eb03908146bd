//! Task Scheduling Glue
//!
//! Connects broker-delivered `TaskMessage`s to the ETA scheduler and the ready queue
//! consumed by the execution slots.
//!
//! Wall-clock ETAs (`chrono`) are converted to monotonic deadlines on entry; a task
//! whose ETA is already in the past is due immediately.

use super::types::*;
use crate::scheduler::DelayScheduler;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

pub type ReadySender = UnboundedSender<TaskMessage>;
pub type ReadyReceiver = UnboundedReceiver<TaskMessage>;

/// The scheduler instance a worker uses for task messages.
pub type TaskScheduler = DelayScheduler<TaskMessage, ReadySender>;

pub fn ready_channel() -> (ReadySender, ReadyReceiver) {
    mpsc::unbounded_channel()
}

/// Converts a wall-clock ETA into a deadline on the scheduler's clock.
pub fn eta_to_instant(eta: Option<DateTime<Utc>>) -> Option<Instant> {
    let eta = eta?;
    let now = Instant::now();
    match (eta - Utc::now()).to_std() {
        Ok(remaining) => Some(now + remaining),
        // Negative durations do not convert: the ETA has passed.
        Err(_) => Some(now),
    }
}

/// Enters `message` into `scheduler`, due at its ETA.
pub fn schedule_message(scheduler: &TaskScheduler, message: TaskMessage) -> TaskId {
    let task_id = message.id.clone();
    let due_time = eta_to_instant(message.eta);

    match message.eta {
        Some(eta) => tracing::info!("Task {} ({}) scheduled for {}", task_id.0, message.task, eta),
        None => tracing::debug!("Task {} ({}) received", task_id.0, message.task),
    }

    let promoted_id = task_id.clone();
    scheduler.enter(
        message,
        due_time,
        0,
        Some(Box::new(move || {
            tracing::debug!("Task {} is due, moved to ready queue", promoted_id.0);
        })),
    );

    task_id
}
