use super::protocol::*;
use super::queue::{schedule_message, TaskScheduler};
use crate::registry::TaskTypeRegistry;

use axum::{extract::Extension, http::StatusCode, Json};
use std::sync::Arc;

pub async fn handle_submit_task(
    Extension(scheduler): Extension<Arc<TaskScheduler>>,
    Extension(registry): Extension<Arc<TaskTypeRegistry>>,
    Json(req): Json<SubmitTaskRequest>,
) -> (StatusCode, Json<SubmitTaskResponse>) {
    if !registry.contains(&req.task) {
        tracing::warn!("Rejected task of unregistered type '{}'", req.task);
        return (
            StatusCode::NOT_FOUND,
            Json(SubmitTaskResponse {
                task_id: None,
                error: Some(format!("Unknown task type: {}", req.task)),
            }),
        );
    }

    let task_id = schedule_message(&scheduler, req.into_message());
    tracing::info!("Task submitted successfully: {}", task_id.0);

    (
        StatusCode::OK,
        Json(SubmitTaskResponse {
            task_id: Some(task_id),
            error: None,
        }),
    )
}
