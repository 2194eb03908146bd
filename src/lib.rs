//! Distributed Task Worker Library
//!
//! Runtime core of a task-execution worker: invocations arrive from a broker, some
//! are scheduled for a later ETA, and the running fleet can be reconfigured with
//! broadcast control messages.
//!
//! ## Architecture Modules
//! - **`scheduler`**: The ETA delay scheduler. Promotes due entries to the ready queue
//!   exactly once and tells its driving loop how long to sleep.
//! - **`registry`**: Shared worker state: the revoked task ids and the task type
//!   registry with its runtime-tunable rate limits.
//! - **`control`**: The remote control plane. Decodes broadcast commands, applies
//!   hostname addressing and runs allow-listed commands.
//! - **`executor`**: Task messages, the ready queue and the execution slots that check
//!   revocation and rate limits before running a handler.
//! - **`worker`**: The top-level context that constructs and wires everything.
//! - **`config`**: Command-line and environment configuration of the binary.

pub mod config;
pub mod control;
pub mod executor;
pub mod registry;
pub mod scheduler;
pub mod worker;
