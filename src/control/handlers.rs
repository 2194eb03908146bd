use super::dispatch::ControlDispatch;

use axum::{extract::Extension, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;

/// Receives a broadcast control message. Always accepted: there is no reply channel.
pub async fn handle_control(
    Extension(control): Extension<Arc<ControlDispatch>>,
    Json(message): Json<Value>,
) -> StatusCode {
    if let Some(result) = control.dispatch_from_message(&message) {
        tracing::debug!("Control command result: {}", result);
    }

    StatusCode::ACCEPTED
}
