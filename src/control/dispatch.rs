//! Control Command Dispatch
//!
//! Decodes broadcast control messages, drops those addressed to another worker and
//! runs the rest against the `ControlPanel`. Dispatch is fire-and-forget: failures
//! are logged here and never reach whoever published the message.

use super::panel::ControlPanel;
use super::protocol::{CommandArgs, ControlMessage};

use serde_json::Value;

pub struct ControlDispatch {
    /// Identity this worker answers to in `destination`.
    hostname: String,
    panel: ControlPanel,
}

impl ControlDispatch {
    pub fn new(hostname: impl Into<String>, panel: ControlPanel) -> Self {
        Self {
            hostname: hostname.into(),
            panel,
        }
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    /// Dispatches a message as received from the broker.
    ///
    /// Messages without a destination are for every worker; messages for another
    /// destination are ignored.
    pub fn dispatch_from_message(&self, message: &Value) -> Option<Value> {
        let message = match ControlMessage::decode(message) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Dropping malformed control message: {}", e);
                return None;
            }
        };

        if !self.is_addressed_to_me(message.destination.as_deref()) {
            tracing::debug!(
                "Ignoring control command {} for {:?}",
                message.command,
                message.destination
            );
            return None;
        }

        self.execute(&message.command, message.arguments)
    }

    /// Executes a command by name with keyword arguments.
    ///
    /// Returns `None` if the command is unknown, not exposed, or fails.
    pub fn execute(&self, command: &str, kwargs: CommandArgs) -> Option<Value> {
        let control = match self.panel.lookup(command) {
            Some(control) if control.is_exposed() => control,
            _ => {
                tracing::error!("No such control command: {}", command);
                return None;
            }
        };

        match (control.handler)(&self.panel, kwargs) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("Control command {} failed: {:#}", command, e);
                None
            }
        }
    }

    fn is_addressed_to_me(&self, destination: Option<&str>) -> bool {
        match destination {
            None => true,
            Some(destination) => destination == self.hostname,
        }
    }
}
