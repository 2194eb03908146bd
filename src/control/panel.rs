//! Worker Control Panel
//!
//! The closed set of operations a remote operator may invoke on a running worker.
//! Commands live in a name-keyed table built at construction time; each entry is
//! either `Exposed` (reachable from a control message) or `Internal`.

use super::protocol::CommandArgs;
use crate::registry::tasks::describe_rate_limit;
use crate::registry::{RateLimit, RevocationSet, TaskTypeRegistry};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Signature shared by every control command.
pub type CommandFn = Arc<dyn Fn(&ControlPanel, CommandArgs) -> Result<Value> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Callable from a broadcast control message.
    Exposed,
    /// Present on the panel, never dispatched remotely.
    Internal,
}

#[derive(Clone)]
pub struct Command {
    pub exposure: Exposure,
    pub handler: CommandFn,
}

impl Command {
    pub fn is_exposed(&self) -> bool {
        self.exposure == Exposure::Exposed
    }
}

#[derive(Deserialize)]
struct RevokeArgs {
    task_id: String,
}

#[derive(Deserialize)]
struct RateLimitArgs {
    task_name: String,
    #[serde(default)]
    rate_limit: Value,
}

pub struct ControlPanel {
    revoked: Arc<RevocationSet>,
    registry: Arc<TaskTypeRegistry>,
    commands: HashMap<String, Command>,
}

impl ControlPanel {
    /// Creates a panel with the built-in commands: `revoke`, `rate_limit` and `ping`.
    pub fn new(revoked: Arc<RevocationSet>, registry: Arc<TaskTypeRegistry>) -> Self {
        let mut panel = Self {
            revoked,
            registry,
            commands: HashMap::new(),
        };

        panel.register("revoke", Exposure::Exposed, |panel, args| {
            let args: RevokeArgs = bind_args("revoke", args)?;
            Ok(panel.revoke(&args.task_id))
        });
        panel.register("rate_limit", Exposure::Exposed, |panel, args| {
            let args: RateLimitArgs = bind_args("rate_limit", args)?;
            let rate_limit = RateLimit::from_value(&args.rate_limit)
                .with_context(|| format!("invalid rate limit for task type {}", args.task_name))?;
            Ok(panel.rate_limit(&args.task_name, rate_limit))
        });
        panel.register("ping", Exposure::Exposed, |_panel, _args| Ok(json!("pong")));

        panel
    }

    /// Adds (or replaces) a command.
    pub fn register<F>(&mut self, name: &str, exposure: Exposure, handler: F)
    where
        F: Fn(&ControlPanel, CommandArgs) -> Result<Value> + Send + Sync + 'static,
    {
        self.commands.insert(
            name.to_string(),
            Command {
                exposure,
                handler: Arc::new(handler),
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// Revokes a task by id.
    pub fn revoke(&self, task_id: &str) -> Value {
        self.revoked.add(task_id);
        tracing::warn!("Task {} revoked.", task_id);
        json!({ "ok": format!("task {} revoked", task_id) })
    }

    /// Sets a new rate limit for a task type. `None` disables limiting.
    pub fn rate_limit(&self, task_name: &str, rate_limit: Option<RateLimit>) -> Value {
        if !self.registry.set_rate_limit(task_name, rate_limit) {
            tracing::warn!(
                "Rate limit change to {} ignored: unknown task type {}",
                describe_rate_limit(rate_limit.as_ref()),
                task_name
            );
            return json!({ "error": format!("unknown task type {}", task_name) });
        }

        match rate_limit {
            None => {
                tracing::warn!("Disabled rate limits for tasks of type {}", task_name);
                json!({ "ok": "rate limit disabled successfully" })
            }
            Some(limit) => {
                tracing::warn!("New rate limit for tasks of type {}: {}.", task_name, limit);
                json!({ "ok": "new rate limit set successfully" })
            }
        }
    }

    pub fn revoked(&self) -> &Arc<RevocationSet> {
        &self.revoked
    }
}

/// Binds keyword arguments to a command's typed argument struct. Unknown keys are ignored.
fn bind_args<T: for<'de> Deserialize<'de>>(command: &str, args: CommandArgs) -> Result<T> {
    serde_json::from_value(Value::Object(args))
        .with_context(|| format!("bad arguments for control command {}", command))
}
