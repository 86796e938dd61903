//! End-to-end resend-window scenarios through the public API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use managed_notify::{
    ConditionKind, ConditionStatus, EligibilityEngine, EligibilityError, ManagedNotification,
    NotificationCatalog, NotificationDefinition, NotificationRecordStore, Severity, status_file,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap()
}

fn definition(name: &str, resend_wait: u32) -> NotificationDefinition {
    NotificationDefinition {
        name: name.to_string(),
        summary: format!("{} summary", name),
        active_body: "active".to_string(),
        resolved_body: "resolved".to_string(),
        severity: Severity::Warning,
        resend_wait,
    }
}

// ============================================================================
// Documented walkthrough: 24h window, sends at t0 and t0+25h
// ============================================================================

#[test]
fn cluster_has_gone_away_walkthrough() {
    let catalog = NotificationCatalog::new(vec![definition("ClusterHasGoneAway", 24)]);
    let engine = EligibilityEngine::new(&catalog);
    let mut store = NotificationRecordStore::new();

    assert!(engine.can_send(&store, "ClusterHasGoneAway", t0()).unwrap());
    engine.record_send(&mut store, "ClusterHasGoneAway", "initial alert", t0());

    assert!(!engine
        .can_send(&store, "ClusterHasGoneAway", t0() + Duration::hours(23))
        .unwrap());

    let later = t0() + Duration::hours(25);
    assert!(engine.can_send(&store, "ClusterHasGoneAway", later).unwrap());
    engine.record_send(&mut store, "ClusterHasGoneAway", "still firing", later);

    let record = store.find("ClusterHasGoneAway").unwrap();
    assert_eq!(record.sent_count, 2);
    assert_eq!(record.last_sent(), Some(later));
    assert_eq!(
        record
            .conditions
            .get(ConditionKind::ServiceLogSent)
            .unwrap()
            .reason,
        "still firing"
    );
}

// ============================================================================
// Names are independent
// ============================================================================

#[test]
fn windows_are_tracked_per_name() {
    let catalog = NotificationCatalog::new(vec![definition("A", 24), definition("B", 1)]);
    let engine = EligibilityEngine::new(&catalog);
    let mut store = NotificationRecordStore::new();

    engine.record_send(&mut store, "A", "a", t0());
    engine.record_send(&mut store, "B", "b", t0());

    let two_hours = t0() + Duration::hours(2);
    assert!(!engine.can_send(&store, "A", two_hours).unwrap());
    assert!(engine.can_send(&store, "B", two_hours).unwrap());
}

#[test]
fn unknown_name_fails_regardless_of_store() {
    let catalog = NotificationCatalog::new(vec![definition("A", 24)]);
    let engine = EligibilityEngine::new(&catalog);
    let mut store = NotificationRecordStore::new();
    store.init("Ghost");

    assert_eq!(
        engine.can_send(&store, "Ghost", t0()).unwrap_err(),
        EligibilityError::DefinitionNotFound {
            name: "Ghost".to_string()
        }
    );
}

// ============================================================================
// Persisted history survives a reload between evaluation cycles
// ============================================================================

#[test]
fn history_persists_across_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let catalog = NotificationCatalog::new(vec![definition("ClusterHasGoneAway", 24)]);
    let engine = EligibilityEngine::new(&catalog);

    // Cycle 1: first send.
    let mut store = status_file::load(&path).unwrap();
    assert!(engine.can_send(&store, "ClusterHasGoneAway", t0()).unwrap());
    engine.record_send(&mut store, "ClusterHasGoneAway", "initial alert", t0());
    status_file::save(&path, &store).unwrap();

    // Cycle 2: reload, still inside the window.
    let store = status_file::load(&path).unwrap();
    assert!(!engine
        .can_send(&store, "ClusterHasGoneAway", t0() + Duration::hours(12))
        .unwrap());
    assert_eq!(store.find("ClusterHasGoneAway").unwrap().sent_count, 1);
}

// ============================================================================
// Alert transitions do not affect the resend window
// ============================================================================

#[test]
fn alert_transitions_leave_window_untouched() {
    let mut manifest = ManagedNotification::from_yaml(
        r#"
spec:
  notifications:
    - name: LoggingVolumeFillingUp
      summary: s
      activeBody: a
      resolvedBody: r
      severity: Warning
      resendWait: 6
"#,
    )
    .unwrap();

    manifest.status.notifications.init("LoggingVolumeFillingUp");
    manifest.status.notifications.find_mut("LoggingVolumeFillingUp").unwrap().set_condition(
        ConditionKind::AlertFiring,
        ConditionStatus::True,
        "alert firing",
        t0(),
    );
    assert!(manifest.can_be_sent("LoggingVolumeFillingUp", t0()).unwrap());

    manifest.record_send("LoggingVolumeFillingUp", "sent for firing alert", t0());
    manifest.status.notifications.find_mut("LoggingVolumeFillingUp").unwrap().set_condition(
        ConditionKind::AlertResolved,
        ConditionStatus::True,
        "alert resolved",
        t0() + Duration::hours(1),
    );

    assert!(!manifest
        .can_be_sent("LoggingVolumeFillingUp", t0() + Duration::hours(5))
        .unwrap());
    assert!(manifest
        .can_be_sent("LoggingVolumeFillingUp", t0() + Duration::hours(6))
        .unwrap());
}
