//! Broadcast Publisher
//!
//! Client side of the control plane: sends one control message to every known
//! worker. Each worker filters by `destination` itself.

use super::protocol::{ControlMessage, ENDPOINT_CONTROL};

use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

pub struct ControlPublisher {
    /// Base URLs of the workers, e.g. `http://10.0.0.7:6000`.
    peers: Vec<String>,
    http_client: reqwest::Client,
}

impl ControlPublisher {
    pub fn new(peers: Vec<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .context("failed to build control HTTP client")?;

        Ok(Self { peers, http_client })
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Sends `message` to every peer. Returns how many peers accepted it.
    pub async fn broadcast(&self, message: &ControlMessage) -> usize {
        let mut delivered = 0;

        for peer in &self.peers {
            let url = format!("{}{}", peer.trim_end_matches('/'), ENDPOINT_CONTROL);
            match self.http_client.post(&url).json(message).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Delivered control command {} to {}", message.command, peer);
                    delivered += 1;
                }
                Ok(response) => {
                    tracing::warn!(
                        "Peer {} rejected control command {}: HTTP {}",
                        peer,
                        message.command,
                        response.status()
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to send control command {} to {}: {}",
                        message.command,
                        peer,
                        e
                    );
                }
            }
        }

        delivered
    }

    /// Revokes a task on every worker (or only on `destination`).
    pub async fn revoke(&self, task_id: &str, destination: Option<String>) -> usize {
        let message = ControlMessage::new("revoke")
            .to(destination)
            .arg("task_id", task_id);
        self.broadcast(&message).await
    }

    /// Changes the rate limit of a task type. `Value::Null` disables limiting.
    pub async fn rate_limit(
        &self,
        task_name: &str,
        rate_limit: Value,
        destination: Option<String>,
    ) -> usize {
        let message = ControlMessage::new("rate_limit")
            .to(destination)
            .arg("task_name", task_name)
            .arg("rate_limit", rate_limit);
        self.broadcast(&message).await
    }

    pub async fn ping(&self, destination: Option<String>) -> usize {
        self.broadcast(&ControlMessage::new("ping").to(destination)).await
    }
}
