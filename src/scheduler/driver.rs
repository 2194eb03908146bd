//! Scheduler Driving Loop
//!
//! Repeatedly calls `DelayScheduler::advance` and sleeps according to the returned
//! hint. New entries wake the loop early, so a sleep computed from an older head
//! never delays an entry that was inserted later but is due sooner.

use super::delay::DelayScheduler;
use super::queue::ReadyQueue;
use super::types::SleepHint;

use std::sync::Arc;

/// Drives `scheduler` forever.
pub async fn run<T, Q>(scheduler: Arc<DelayScheduler<T, Q>>)
where
    T: Send + 'static,
    Q: ReadyQueue<T> + 'static,
{
    tracing::info!("Scheduler loop started");

    loop {
        match scheduler.advance() {
            SleepHint::Wait(remaining) if remaining.is_zero() => {
                // More entries may be due; let other tasks run between promotions.
                tokio::task::yield_now().await;
            }
            SleepHint::Wait(remaining) => {
                tracing::trace!("Next entry due in {:?}", remaining);
                tokio::select! {
                    _ = tokio::time::sleep(remaining) => {}
                    _ = scheduler.entered() => {}
                }
            }
            SleepHint::Idle => {
                scheduler.entered().await;
            }
        }
    }
}

/// Spawns `run` on the current tokio runtime.
pub fn spawn<T, Q>(scheduler: Arc<DelayScheduler<T, Q>>) -> tokio::task::JoinHandle<()>
where
    T: Send + 'static,
    Q: ReadyQueue<T> + 'static,
{
    tokio::spawn(run(scheduler))
}
