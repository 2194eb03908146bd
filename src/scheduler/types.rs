use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Zero-argument hook invoked once, right after an entry is promoted.
pub type PromoteCallback = Box<dyn FnOnce() + Send + 'static>;

/// An item waiting in the delay frontier.
///
/// The `sequence` number is assigned by the scheduler on insertion and is unique
/// per scheduler instance. It is the identity of the entry: two entries with the
/// same due time, priority and payload are still distinguishable by it.
pub struct ScheduledEntry<T> {
    pub(crate) due_time: Instant,
    pub(crate) priority: i32,
    pub(crate) sequence: u64,
    pub(crate) payload: T,
    pub(crate) on_promote: Option<PromoteCallback>,
}

impl<T> ScheduledEntry<T> {
    fn key(&self) -> (Instant, i32, u64) {
        (self.due_time, self.priority, self.sequence)
    }
}

impl<T> PartialEq for ScheduledEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for ScheduledEntry<T> {}

impl<T> Ord for ScheduledEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that `BinaryHeap` behaves as a min-heap (earliest first).
        other.key().cmp(&self.key())
    }
}

impl<T> PartialOrd for ScheduledEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: fmt::Debug> fmt::Debug for ScheduledEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEntry")
            .field("due_time", &self.due_time)
            .field("priority", &self.priority)
            .field("sequence", &self.sequence)
            .field("payload", &self.payload)
            .field("on_promote", &self.on_promote.is_some())
            .finish()
    }
}

/// Point-in-time copy of a frontier entry, used for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySnapshot<T> {
    pub due_time: Instant,
    pub priority: i32,
    pub sequence: u64,
    pub payload: T,
}

/// What the driving loop should do after a call to `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepHint {
    /// The frontier is empty. Sleep until the next `enter`.
    Idle,
    /// Sleep for at most this long. `Duration::ZERO` means more work may already
    /// be due and `advance` should be called again right away.
    Wait(Duration),
}

impl SleepHint {
    pub fn is_immediate(&self) -> bool {
        matches!(self, SleepHint::Wait(d) if d.is_zero())
    }
}
