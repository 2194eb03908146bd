//! Remote Control Module
//!
//! Lets an operator reconfigure a running worker fleet with broadcast messages:
//! revoke a task, change a task type's rate limit, ping.
//!
//! ## Message Flow
//! 1. **Publish**: `ControlPublisher` sends one message to every worker.
//! 2. **Filter**: `ControlDispatch` decodes it and drops it unless `destination` is absent
//!    or equals this worker's hostname.
//! 3. **Execute**: The named command is looked up in the `ControlPanel` table. Only
//!    commands registered as `Exposed` run; anything else is logged and dropped.
//!
//! ## Submodules
//! - **`protocol`**: Wire format of control messages.
//! - **`panel`**: The command table and the built-in commands.
//! - **`dispatch`**: Addressing and command execution.
//! - **`handlers`**: axum handler for the `/control` ingress.
//! - **`publisher`**: HTTP broadcast client.

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod panel;
pub mod protocol;
pub mod publisher;

pub use dispatch::ControlDispatch;
pub use error::ControlError;
pub use panel::{ControlPanel, Exposure};
pub use protocol::{CommandArgs, ControlMessage};
pub use publisher::ControlPublisher;
