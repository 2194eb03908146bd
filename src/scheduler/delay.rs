//! Delay Scheduler Implementation
//!
//! Keeps a min-heap of entries keyed by `(due_time, priority, sequence)` and promotes
//! due entries into a `ReadyQueue`, one per `advance` call.
//!
//! ## Promotion protocol
//! `advance` peeks the head under the frontier lock, releases it, and, if the head is
//! due, takes the lock again to pop. `enter` may run in between, so the popped entry is
//! compared with the peeked one by sequence number. On a mismatch the popped entry goes
//! back into the heap and nothing is dispatched in that cycle.

use super::queue::ReadyQueue;
use super::types::*;

use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Identity and due time of the frontier head, as seen by a peek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HeadKey {
    pub(crate) due_time: Instant,
    pub(crate) sequence: u64,
}

/// Time-ordered holding area for not-yet-due items.
pub struct DelayScheduler<T, Q> {
    /// The delay frontier. Only `enter` and the peek/pop pair in `advance` touch it.
    frontier: Mutex<BinaryHeap<ScheduledEntry<T>>>,
    /// Source of entry identities.
    next_sequence: AtomicU64,
    /// Where due entries are pushed. Never read from here.
    ready_queue: Q,
    /// Signalled on every `enter` so a sleeping driver re-evaluates the head.
    wakeup: Notify,
}

impl<T, Q> DelayScheduler<T, Q>
where
    T: Send,
    Q: ReadyQueue<T>,
{
    pub fn new(ready_queue: Q) -> Self {
        Self {
            frontier: Mutex::new(BinaryHeap::new()),
            next_sequence: AtomicU64::new(0),
            ready_queue,
            wakeup: Notify::new(),
        }
    }

    /// Inserts `payload` into the frontier.
    ///
    /// A missing `due_time` means "due now". Returns the sequence number that
    /// identifies the new entry.
    pub fn enter(
        &self,
        payload: T,
        due_time: Option<Instant>,
        priority: i32,
        on_promote: Option<PromoteCallback>,
    ) -> u64 {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let entry = ScheduledEntry {
            due_time: due_time.unwrap_or_else(Instant::now),
            priority,
            sequence,
            payload,
            on_promote,
        };

        self.lock().push(entry);
        self.wakeup.notify_one();

        sequence
    }

    /// Runs one step of the promotion protocol against the current time.
    pub fn advance(&self) -> SleepHint {
        self.advance_at(Instant::now())
    }

    /// Runs one step of the promotion protocol as if the current time were `now`.
    pub fn advance_at(&self, now: Instant) -> SleepHint {
        let verify = match self.peek_head() {
            Some(head) => head,
            None => return SleepHint::Idle,
        };

        if now < verify.due_time {
            return SleepHint::Wait(verify.due_time - now);
        }

        match self.pop_verified(verify) {
            Some(entry) => {
                self.promote(entry);
                SleepHint::Wait(Duration::ZERO)
            }
            None => self.hint_at(now),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Copies the frontier in promotion order without removing anything.
    pub fn snapshot(&self) -> Vec<EntrySnapshot<T>>
    where
        T: Clone,
    {
        let mut entries: Vec<EntrySnapshot<T>> = self
            .lock()
            .iter()
            .map(|entry| EntrySnapshot {
                due_time: entry.due_time,
                priority: entry.priority,
                sequence: entry.sequence,
                payload: entry.payload.clone(),
            })
            .collect();

        entries.sort_by_key(|entry| (entry.due_time, entry.priority, entry.sequence));
        entries
    }

    /// Resolves once `enter` has been called since the last wakeup was consumed.
    pub async fn entered(&self) {
        self.wakeup.notified().await;
    }

    pub(crate) fn peek_head(&self) -> Option<HeadKey> {
        self.lock().peek().map(|entry| HeadKey {
            due_time: entry.due_time,
            sequence: entry.sequence,
        })
    }

    /// Pops the head and keeps it only if it is the entry that was peeked.
    pub(crate) fn pop_verified(&self, expected: HeadKey) -> Option<ScheduledEntry<T>> {
        let mut frontier = self.lock();
        let entry = frontier.pop()?;

        if entry.sequence == expected.sequence {
            return Some(entry);
        }

        tracing::debug!(
            "Frontier head changed between peek and pop (expected #{}, got #{}), requeueing",
            expected.sequence,
            entry.sequence
        );
        frontier.push(entry);
        None
    }

    fn hint_at(&self, now: Instant) -> SleepHint {
        match self.peek_head() {
            Some(head) => SleepHint::Wait(head.due_time.saturating_duration_since(now)),
            None => SleepHint::Idle,
        }
    }

    fn promote(&self, entry: ScheduledEntry<T>) {
        let ScheduledEntry {
            sequence,
            payload,
            on_promote,
            ..
        } = entry;

        tracing::trace!("Promoting entry #{} to the ready queue", sequence);
        self.ready_queue.put(payload);

        if let Some(callback) = on_promote {
            callback();
        }
    }

    fn lock(&self) -> MutexGuard<'_, BinaryHeap<ScheduledEntry<T>>> {
        // A panic while holding the lock cannot leave the heap half-updated:
        // every critical section is a single push, pop or peek.
        self.frontier.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
