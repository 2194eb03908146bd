//! ETA Scheduler Module
//!
//! Holds task invocations that must not run before a given time and moves them
//! to the ready queue once they become due.
//!
//! ## Architecture Overview
//! The scheduler is **poll-driven**: it never sleeps or spawns anything itself.
//! 1. **Enter**: Producers (the task ingress, retry logic) insert entries into the
//!    delay frontier, a min-heap ordered by `(due_time, priority, sequence)`.
//! 2. **Advance**: A single driving loop repeatedly calls `advance`, which promotes
//!    at most one due entry per call and tells the loop how long it may sleep.
//! 3. **Wakeup**: `enter` signals the driving loop so a newly inserted entry that is
//!    due earlier than the current head is not missed while the loop sleeps.
//!
//! ## Submodules
//! - **`types`**: Entries, snapshots and the sleep hint returned by `advance`.
//! - **`queue`**: The `ReadyQueue` seam the scheduler pushes promoted items into.
//! - **`delay`**: The `DelayScheduler` itself.
//! - **`driver`**: The async loop that drives `advance` on a tokio runtime.

pub mod delay;
pub mod driver;
pub mod queue;
pub mod types;

pub use delay::DelayScheduler;
pub use queue::ReadyQueue;
pub use types::{EntrySnapshot, PromoteCallback, SleepHint};
