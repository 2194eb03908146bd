use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a task invocation.
///
/// Wrapper around a UUID string. This is the id that `revoke` control commands
/// refer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single task invocation as delivered by the broker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskMessage {
    #[serde(default)]
    pub id: TaskId,
    /// Name of the registered task type to run.
    pub task: String,
    /// Arbitrary JSON arguments passed to the handler.
    #[serde(default)]
    pub args: serde_json::Value,
    /// Earliest execution time. Absent or past means "run as soon as possible".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta: Option<DateTime<Utc>>,
    /// How many times this invocation has already been retried.
    #[serde(default)]
    pub retries: u32,
}

impl TaskMessage {
    pub fn new(task: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: TaskId::new(),
            task: task.into(),
            args,
            eta: None,
            retries: 0,
        }
    }

    pub fn with_eta(mut self, eta: DateTime<Utc>) -> Self {
        self.eta = Some(eta);
        self
    }
}

/// What an execution slot did with a ready item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The task id was in the revocation set; the handler never ran.
    Revoked,
    /// No task type with that name is registered.
    UnknownTaskType,
    /// The handler returned `Ok`.
    Succeeded,
    /// The handler failed and the invocation was scheduled again.
    Retrying { attempt: u32 },
    /// The handler failed and no retries are left.
    Failed { error: String },
}
