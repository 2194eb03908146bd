//! Executor Module Tests
//!
//! ## Test Scopes
//! - **Processing**: Revoked, unknown, successful and failing task messages.
//! - **Retries**: Failed invocations are re-entered into the scheduler with a later ETA.
//! - **Rate Limiting**: Admissions of one task type are spaced by the configured rate.
//! - **Data Types**: ETA conversion and message serialization.

#[cfg(test)]
mod tests {
    use crate::executor::executor::{RateLimiter, TaskExecutor};
    use crate::executor::queue::{eta_to_instant, ready_channel, TaskScheduler};
    use crate::executor::types::{ExecutionOutcome, TaskId, TaskMessage};
    use crate::registry::{RateLimit, RevocationSet, TaskTypeDescriptor, TaskTypeRegistry};
    use crate::scheduler::SleepHint;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    struct Fixture {
        executor: Arc<TaskExecutor>,
        registry: Arc<TaskTypeRegistry>,
        revoked: Arc<RevocationSet>,
        scheduler: Arc<TaskScheduler>,
        calls: Arc<AtomicUsize>,
    }

    /// Executor with a counting "count" task and an always failing "flaky" task.
    fn fixture() -> Fixture {
        let registry = TaskTypeRegistry::new();
        let revoked = RevocationSet::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_clone = calls.clone();
        registry.register(TaskTypeDescriptor::new("count"), move |_message| {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        registry.register(
            TaskTypeDescriptor::new("flaky").with_retries(2, Duration::from_secs(10)),
            |_message| async { Err(anyhow::anyhow!("Intentional error")) },
        );

        let (tx, rx) = ready_channel();
        let scheduler = Arc::new(TaskScheduler::new(tx));
        let executor = TaskExecutor::new(
            rx,
            registry.clone(),
            revoked.clone(),
            scheduler.clone(),
            2,
        );

        Fixture {
            executor,
            registry,
            revoked,
            scheduler,
            calls,
        }
    }

    // ============================================================
    // PROCESSING
    // ============================================================

    #[tokio::test]
    async fn test_process_runs_handler() {
        let f = fixture();

        let outcome = f.executor.process(TaskMessage::new("count", json!({}))).await;

        assert_eq!(outcome, ExecutionOutcome::Succeeded);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_process_skips_revoked_task() {
        // ARRANGE
        let f = fixture();
        let message = TaskMessage::new("count", json!({}));
        f.revoked.add(message.id.0.clone());

        // ACT
        let outcome = f.executor.process(message).await;

        // ASSERT: handler never ran
        assert_eq!(outcome, ExecutionOutcome::Revoked);
        assert_eq!(f.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_process_unknown_task_type() {
        let f = fixture();

        let outcome = f.executor.process(TaskMessage::new("missing", json!({}))).await;

        assert_eq!(outcome, ExecutionOutcome::UnknownTaskType);
    }

    #[tokio::test]
    async fn test_failed_task_is_rescheduled_until_retries_run_out() {
        // ARRANGE
        let f = fixture();
        let message = TaskMessage::new("flaky", json!({}));
        let task_id = message.id.clone();

        // ACT: first failure
        let outcome = f.executor.process(message.clone()).await;

        // ASSERT: re-entered with a future ETA and a bumped retry count
        assert_eq!(outcome, ExecutionOutcome::Retrying { attempt: 1 });
        let snapshot = f.scheduler.snapshot();
        assert_eq!(snapshot.len(), 1);
        let retry = &snapshot[0].payload;
        assert_eq!(retry.id, task_id);
        assert_eq!(retry.retries, 1);
        assert!(retry.eta.unwrap() > Utc::now() + chrono::Duration::seconds(5));
        assert!(snapshot[0].due_time > Instant::now() + Duration::from_secs(5));

        // ACT: last allowed attempt fails for good
        let last = TaskMessage {
            retries: 2,
            ..message
        };
        let outcome = f.executor.process(last).await;

        assert!(matches!(outcome, ExecutionOutcome::Failed { ref error } if error.contains("Intentional error")));
        assert_eq!(f.scheduler.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_respects_rate_limit_from_registry() {
        // ARRANGE: 2 per second -> 500ms spacing
        let f = fixture();
        f.registry.set_rate_limit("count", Some(RateLimit::per_second(2.0)));
        let start = Instant::now();

        // ACT
        for _ in 0..3 {
            f.executor.process(TaskMessage::new("count", json!({}))).await;
        }

        // ASSERT
        assert_eq!(f.calls.load(Ordering::SeqCst), 3);
        assert!(Instant::now() - start >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_revocation_during_rate_limit_wait_is_honoured() {
        let f = fixture();
        f.registry.set_rate_limit("count", Some(RateLimit::per_second(1.0)));
        f.executor.process(TaskMessage::new("count", json!({}))).await;

        let message = TaskMessage::new("count", json!({}));
        let task_id = message.id.0.clone();
        let executor = f.executor.clone();
        let pending = tokio::spawn(async move { executor.process(message).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        f.revoked.add(task_id);

        assert_eq!(pending.await.unwrap(), ExecutionOutcome::Revoked);
        assert_eq!(f.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_without_limit_never_waits() {
        let limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..10 {
            limiter.admit("free", None).await;
        }

        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_tracks_types_separately() {
        let limiter = RateLimiter::default();
        let limit = RateLimit::per_second(1.0);
        let start = Instant::now();

        limiter.admit("a", Some(&limit)).await;
        limiter.admit("b", Some(&limit)).await;

        assert_eq!(Instant::now(), start);

        limiter.admit("a", Some(&limit)).await;
        assert!(Instant::now() - start >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_applies_raised_limit_to_next_admission() {
        // ARRANGE: admitted once under 1/h
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.admit("t", Some(&RateLimit::per_hour(1.0))).await;

        // ACT: the operator raises the limit to 100/s
        limiter.admit("t", Some(&RateLimit::per_second(100.0))).await;

        // ASSERT: spaced by the new 10ms interval, not the old hour
        let waited = Instant::now() - start;
        assert!(waited >= Duration::from_millis(10));
        assert!(waited < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_applies_lowered_limit_to_next_admission() {
        let limiter = RateLimiter::default();
        let start = Instant::now();
        limiter.admit("t", Some(&RateLimit::per_second(100.0))).await;

        limiter.admit("t", Some(&RateLimit::per_second(1.0))).await;

        let waited = Instant::now() - start;
        assert!(waited >= Duration::from_secs(1));
        assert!(waited < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limiter_with_unrepresentable_interval_does_not_panic() {
        let limiter = RateLimiter::default();
        let limit = RateLimit::per_second(1e-300);

        limiter.admit("t", Some(&limit)).await;
        limiter.admit("t", Some(&limit)).await;
    }

    #[tokio::test]
    async fn test_slots_drain_ready_queue() {
        let f = fixture();
        let handles = f.executor.start();

        for _ in 0..5 {
            f.scheduler.enter(TaskMessage::new("count", json!({})), None, 0, None);
        }
        while f.scheduler.advance() != SleepHint::Idle {}

        for _ in 0..100 {
            if f.calls.load(Ordering::SeqCst) == 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(f.calls.load(Ordering::SeqCst), 5);
        for handle in handles {
            handle.abort();
        }
    }

    // ============================================================
    // DATA TYPES
    // ============================================================

    #[test]
    fn test_task_id_is_unique() {
        let id1 = TaskId::new();
        let id2 = TaskId::new();

        assert_ne!(id1.0, id2.0);
    }

    #[test]
    fn test_eta_conversion() {
        let now = Instant::now();

        assert!(eta_to_instant(None).is_none());

        let past = eta_to_instant(Some(Utc::now() - chrono::Duration::seconds(30))).unwrap();
        assert!(past >= now && past < now + Duration::from_secs(1));

        let future = eta_to_instant(Some(Utc::now() + chrono::Duration::seconds(30))).unwrap();
        assert!(future > now + Duration::from_secs(29));
    }

    #[test]
    fn test_task_message_deserialization_defaults() {
        let message: TaskMessage = serde_json::from_value(json!({
            "task": "count",
            "eta": "2030-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(message.task, "count");
        assert_eq!(message.args, json!(null));
        assert_eq!(message.retries, 0);
        assert!(!message.id.0.is_empty());
        assert_eq!(message.eta.unwrap().to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }
}
