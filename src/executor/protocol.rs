//! Network Protocol Definitions
//!
//! DTOs for the HTTP ingress through which a broker adapter (or an operator) hands
//! task invocations to this worker.

use super::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const ENDPOINT_SUBMIT_TASK: &str = "/task/submit";

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskRequest {
    pub task: String,
    #[serde(default)]
    pub args: serde_json::Value,
    #[serde(default)]
    pub eta: Option<DateTime<Utc>>,
}

impl SubmitTaskRequest {
    pub fn into_message(self) -> TaskMessage {
        TaskMessage {
            id: TaskId::new(),
            task: self.task,
            args: self.args,
            eta: self.eta,
            retries: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskResponse {
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
