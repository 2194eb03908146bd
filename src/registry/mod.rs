//! Worker Registries
//!
//! Process-wide state shared by the execution slots and the control plane. Both
//! registries are constructed once by the `Worker` and handed out as `Arc`s; nothing
//! here is reachable through globals.
//!
//! ## Submodules
//! - **`types`**: Task type descriptors and the `RateLimit` specification.
//! - **`revocation`**: The set of revoked task ids, consulted before every execution.
//! - **`tasks`**: Maps task type names to descriptors and async handlers.

pub mod revocation;
pub mod tasks;
pub mod types;

pub use revocation::RevocationSet;
pub use tasks::{TaskHandlerFn, TaskTypeRegistry};
pub use types::{RateLimit, RateLimitError, TaskTypeDescriptor};

#[cfg(test)]
mod tests;
