//! Registry Module Tests
//!
//! ## Test Scopes
//! - **RevocationSet**: Idempotent inserts and membership.
//! - **TaskTypeRegistry**: Registration, lookup, execution and runtime rate-limit updates.
//! - **RateLimit**: Parsing of textual and JSON rate specifications.

#[cfg(test)]
mod tests {
    use crate::executor::types::TaskMessage;
    use crate::registry::revocation::RevocationSet;
    use crate::registry::tasks::TaskTypeRegistry;
    use crate::registry::types::{RateLimit, RateLimitError, TaskTypeDescriptor};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn registry_with(name: &str) -> Arc<TaskTypeRegistry> {
        let registry = TaskTypeRegistry::new();
        registry.register(TaskTypeDescriptor::new(name), |_message| async { Ok(()) });
        registry
    }

    // ============================================================
    // REVOCATION SET
    // ============================================================

    #[test]
    fn test_revocation_add_is_idempotent() {
        let revoked = RevocationSet::new();

        assert!(revoked.add("task-1"));
        assert!(!revoked.add("task-1"));

        assert!(revoked.contains("task-1"));
        assert_eq!(revoked.len(), 1);
    }

    #[test]
    fn test_revocation_unknown_id_is_not_contained() {
        let revoked = RevocationSet::new();

        assert!(revoked.is_empty());
        assert!(!revoked.contains("never-added"));
    }

    #[test]
    fn test_revocation_is_shared_across_threads() {
        let revoked = RevocationSet::new();

        let writers: Vec<_> = (0..4)
            .map(|i| {
                let revoked = revoked.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        revoked.add(format!("task-{}", (i * 50 + j) % 100));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(revoked.len(), 100);
        assert!(revoked.contains("task-99"));
    }

    // ============================================================
    // TASK TYPE REGISTRY
    // ============================================================

    #[test]
    fn test_registry_get_returns_descriptor() {
        let registry = TaskTypeRegistry::new();
        registry.register(
            TaskTypeDescriptor::new("reports.generate").with_rate_limit(RateLimit::per_minute(10.0)),
            |_message| async { Ok(()) },
        );

        let descriptor = registry.get("reports.generate").unwrap();

        assert_eq!(descriptor.name, "reports.generate");
        assert_eq!(descriptor.rate_limit, Some(RateLimit::per_minute(10.0)));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), vec!["reports.generate".to_string()]);
    }

    #[test]
    fn test_set_rate_limit_updates_in_place() {
        let registry = registry_with("emails.send");

        assert!(registry.set_rate_limit("emails.send", Some(RateLimit::per_second(5.0))));
        assert_eq!(
            registry.get("emails.send").unwrap().rate_limit,
            Some(RateLimit::per_second(5.0))
        );

        assert!(registry.set_rate_limit("emails.send", None));
        assert_eq!(registry.get("emails.send").unwrap().rate_limit, None);
    }

    #[test]
    fn test_set_rate_limit_on_unknown_type_is_noop() {
        let registry = registry_with("emails.send");

        let found = registry.set_rate_limit("nonexistent-type", Some(RateLimit::per_second(5.0)));

        assert!(!found);
        assert!(!registry.contains("nonexistent-type"));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_registry_execute_invokes_handler() {
        // ARRANGE
        let registry = TaskTypeRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        registry.register(TaskTypeDescriptor::new("count"), move |message| {
            let calls = calls_clone.clone();
            async move {
                assert_eq!(message.args["n"], 7);
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        // ACT
        let result = registry
            .execute(&TaskMessage::new("count", json!({"n": 7})))
            .await;

        // ASSERT
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_registry_unknown_type_returns_error() {
        let registry = TaskTypeRegistry::new();

        let result = registry
            .execute(&TaskMessage::new("missing", json!(null)))
            .await;

        assert!(result.unwrap_err().to_string().contains("Unknown task type"));
    }

    // ============================================================
    // RATE LIMIT
    // ============================================================

    #[test]
    fn test_rate_limit_parse_units() {
        assert_eq!(RateLimit::parse("10/s").unwrap(), Some(RateLimit::per_second(10.0)));
        assert_eq!(RateLimit::parse("100/m").unwrap(), Some(RateLimit::per_minute(100.0)));
        assert_eq!(RateLimit::parse(" 2/h ").unwrap(), Some(RateLimit::per_hour(2.0)));
        assert_eq!(RateLimit::parse("4").unwrap(), Some(RateLimit::per_second(4.0)));
    }

    #[test]
    fn test_rate_limit_parse_disabled_forms() {
        assert_eq!(RateLimit::parse("").unwrap(), None);
        assert_eq!(RateLimit::parse("0").unwrap(), None);
        assert_eq!(RateLimit::parse("0/m").unwrap(), None);
    }

    #[test]
    fn test_rate_limit_parse_errors() {
        assert!(matches!(
            RateLimit::parse("fast"),
            Err(RateLimitError::InvalidAmount(_))
        ));
        assert!(matches!(
            RateLimit::parse("-1/s"),
            Err(RateLimitError::InvalidAmount(_))
        ));
        assert!(matches!(
            RateLimit::parse("10/d"),
            Err(RateLimitError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn test_rate_limit_from_json_value() {
        assert_eq!(RateLimit::from_value(&json!(5)).unwrap(), Some(RateLimit::per_second(5.0)));
        assert_eq!(RateLimit::from_value(&json!("3/m")).unwrap(), Some(RateLimit::per_minute(3.0)));
        assert_eq!(RateLimit::from_value(&json!(null)).unwrap(), None);
        assert_eq!(RateLimit::from_value(&json!(false)).unwrap(), None);
        assert_eq!(RateLimit::from_value(&json!(0)).unwrap(), None);
        assert_eq!(RateLimit::from_value(&json!("")).unwrap(), None);
        assert!(RateLimit::from_value(&json!([1, 2])).is_err());
        assert!(RateLimit::from_value(&json!(-3)).is_err());
    }

    #[test]
    fn test_rate_limit_with_unrepresentable_interval_is_rejected() {
        assert!(matches!(
            RateLimit::parse("1e-20/s"),
            Err(RateLimitError::InvalidAmount(_))
        ));
        assert!(matches!(
            RateLimit::parse("1e-300/h"),
            Err(RateLimitError::InvalidAmount(_))
        ));
        assert!(matches!(
            RateLimit::from_value(&json!(1e-300)),
            Err(RateLimitError::InvalidAmount(_))
        ));

        // Small but representable amounts are still fine
        let slow = RateLimit::parse("0.25/m").unwrap().unwrap();
        assert_eq!(slow.interval(), Duration::from_secs(240));
    }

    #[test]
    fn test_rate_limit_interval_saturates_instead_of_panicking() {
        assert_eq!(RateLimit::per_second(1e-300).interval(), Duration::MAX);
    }

    #[test]
    fn test_rate_limit_interval_and_display() {
        assert_eq!(RateLimit::per_second(4.0).interval(), Duration::from_millis(250));
        assert_eq!(RateLimit::per_minute(60.0).interval(), Duration::from_secs(1));
        assert_eq!(RateLimit::per_minute(100.0).to_string(), "100/m");
        assert_eq!(RateLimit::per_second(2.5).to_string(), "2.5/s");
    }
}
