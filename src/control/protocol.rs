//! Control Message Wire Format
//!
//! ```json
//! {"command": "rate_limit", "destination": "worker-3", "task_name": "emails.send", "rate_limit": "10/m"}
//! ```
//!
//! Every key other than `command` and `destination` is a keyword argument for the command.

use super::error::ControlError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ENDPOINT_CONTROL: &str = "/control";

/// Keyword arguments of a control command.
pub type CommandArgs = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(flatten)]
    pub arguments: CommandArgs,
}

impl ControlMessage {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            destination: None,
            arguments: CommandArgs::new(),
        }
    }

    pub fn to(mut self, destination: Option<String>) -> Self {
        self.destination = destination;
        self
    }

    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.to_string(), value.into());
        self
    }

    /// Decodes a received message without modifying it.
    ///
    /// The input may be shared with other consumers of the broadcast, so the
    /// arguments are copied out instead of taken.
    pub fn decode(message: &Value) -> Result<Self, ControlError> {
        let fields = message.as_object().ok_or(ControlError::NotAnObject)?;

        let command = fields
            .get("command")
            .and_then(Value::as_str)
            .ok_or(ControlError::MissingCommand)?
            .to_string();

        let destination = match fields.get("destination") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ControlError::InvalidDestination),
        };

        let arguments = fields
            .iter()
            .filter(|(key, _)| key.as_str() != "command" && key.as_str() != "destination")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            command,
            destination,
            arguments,
        })
    }
}
