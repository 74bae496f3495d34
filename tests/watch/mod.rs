//! Watch behavior tests.


/// Verify all public monitor types are exported from the library.
#[test]
fn test_monitor_types_exported() {
    use opwatch::monitor::{WatchRegistry, WatchStatus, DEFAULT_POLL_INTERVAL};

    let registry = WatchRegistry::new();
    assert!(registry.try_activate("proc-export-check"));
    assert_eq!(
        registry.status("proc-export-check"),
        Some(WatchStatus::Active)
    );
    assert_eq!(DEFAULT_POLL_INTERVAL.as_millis(), 1000);
}
