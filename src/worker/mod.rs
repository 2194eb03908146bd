//! Worker Context
//!
//! The top-level object of a worker process. It constructs every shared component
//! once at startup and hands them to each other explicitly:
//!
//! ```text
//!  /task/submit ──► TaskScheduler ──advance──► ready queue ──► TaskExecutor slots
//!                                                                 │ contains?
//!  /control ──► ControlDispatch ──► ControlPanel ──► RevocationSet ◄┘
//!                                               └──► TaskTypeRegistry (rate limits)
//! ```

use crate::control::handlers::handle_control;
use crate::control::protocol::ENDPOINT_CONTROL;
use crate::control::{ControlDispatch, ControlPanel};
use crate::executor::executor::TaskExecutor;
use crate::executor::handlers::handle_submit_task;
use crate::executor::protocol::ENDPOINT_SUBMIT_TASK;
use crate::executor::queue::{ready_channel, schedule_message, TaskScheduler};
use crate::executor::types::{TaskId, TaskMessage};
use crate::registry::{RevocationSet, TaskTypeRegistry};
use crate::scheduler::driver;

use axum::{extract::Extension, routing::post, Router};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct Worker {
    hostname: String,
    registry: Arc<TaskTypeRegistry>,
    revoked: Arc<RevocationSet>,
    scheduler: Arc<TaskScheduler>,
    control: Arc<ControlDispatch>,
    executor: Arc<TaskExecutor>,
}

impl Worker {
    /// Wires a worker around an already populated task type registry.
    pub fn new(
        hostname: impl Into<String>,
        registry: Arc<TaskTypeRegistry>,
        concurrency: usize,
    ) -> Arc<Self> {
        let hostname = hostname.into();
        let revoked = RevocationSet::new();

        let (ready_tx, ready_rx) = ready_channel();
        let scheduler = Arc::new(TaskScheduler::new(ready_tx));

        let panel = ControlPanel::new(revoked.clone(), registry.clone());
        let control = Arc::new(ControlDispatch::new(hostname.clone(), panel));

        let executor = TaskExecutor::new(
            ready_rx,
            registry.clone(),
            revoked.clone(),
            scheduler.clone(),
            concurrency,
        );

        Arc::new(Self {
            hostname,
            registry,
            revoked,
            scheduler,
            control,
            executor,
        })
    }

    /// Spawns the scheduler loop and the execution slots.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        tracing::info!(
            "Worker {} starting with task types: {:?}",
            self.hostname,
            self.registry.names()
        );

        let mut handles = vec![driver::spawn(self.scheduler.clone())];
        handles.extend(self.executor.start());
        handles
    }

    /// Accepts a task message from the broker.
    pub fn receive_task(&self, message: TaskMessage) -> TaskId {
        schedule_message(&self.scheduler, message)
    }

    /// Accepts a control message from the broker.
    pub fn receive_control(&self, message: &Value) -> Option<Value> {
        self.control.dispatch_from_message(message)
    }

    /// HTTP ingress for task and control messages.
    pub fn router(&self) -> Router {
        Router::new()
            .route(ENDPOINT_SUBMIT_TASK, post(handle_submit_task))
            .route(ENDPOINT_CONTROL, post(handle_control))
            .layer(Extension(self.scheduler.clone()))
            .layer(Extension(self.registry.clone()))
            .layer(Extension(self.control.clone()))
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn registry(&self) -> &Arc<TaskTypeRegistry> {
        &self.registry
    }

    pub fn revoked(&self) -> &Arc<RevocationSet> {
        &self.revoked
    }

    pub fn scheduler(&self) -> &Arc<TaskScheduler> {
        &self.scheduler
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }
}
