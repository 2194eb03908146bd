//! Task Executor Module
//!
//! Everything between a task message arriving at the worker and its handler running.
//!
//! ## Architecture Overview
//! 1. **Ingress**: Task messages arrive (HTTP ingress or another broker adapter) and are
//!    entered into the ETA scheduler with their ETA as due time.
//! 2. **Promotion**: The scheduler driving loop pushes due messages onto the ready queue.
//! 3. **Execution**: Execution slots pop ready messages, check the `RevocationSet`, wait
//!    for rate-limit admission and invoke the registered handler.
//! 4. **Retry**: Failed invocations go back into the scheduler with a later ETA.
//!
//! ## Submodules
//! - **`types`**: Task ids, task messages and execution outcomes.
//! - **`queue`**: Ready channel, ETA conversion and the scheduler entry point.
//! - **`executor`**: The execution slots and per-type rate limiter.
//! - **`protocol`** / **`handlers`**: HTTP contract and axum handler for task submission.

pub mod executor;
pub mod handlers;
pub mod protocol;
pub mod queue;
pub mod types;

#[cfg(test)]
mod tests;
