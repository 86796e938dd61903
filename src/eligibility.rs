//! Resend-window decision over a catalog and a record store.
//!
//! The decision only looks at three things: whether the name is defined,
//! whether the store holds a record for it, and the timestamp of the latest
//! recorded send. Every send overwrites that timestamp, so the full history
//! never needs scanning.
//!
//! Time is always passed in. Nothing here reads the clock, logs, or touches
//! storage; callers serialize access to a store across a check/record pair.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use managed_notify::catalog::{NotificationCatalog, NotificationDefinition, Severity};
//! use managed_notify::eligibility::EligibilityEngine;
//! use managed_notify::record::NotificationRecordStore;
//!
//! let catalog = NotificationCatalog::new(vec![NotificationDefinition {
//!     name: "ClusterHasGoneAway".to_string(),
//!     summary: "Cluster is unreachable".to_string(),
//!     active_body: "We lost contact with your cluster.".to_string(),
//!     resolved_body: "Contact restored.".to_string(),
//!     severity: Severity::Error,
//!     resend_wait: 24,
//! }]);
//! let engine = EligibilityEngine::new(&catalog);
//! let mut store = NotificationRecordStore::new();
//! let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//!
//! assert!(engine.can_send(&store, "ClusterHasGoneAway", t0).unwrap());
//! engine.record_send(&mut store, "ClusterHasGoneAway", "initial alert", t0);
//! assert!(!engine.can_send(&store, "ClusterHasGoneAway", t0 + Duration::hours(23)).unwrap());
//! assert!(engine.can_send(&store, "ClusterHasGoneAway", t0 + Duration::hours(25)).unwrap());
//! ```

use crate::catalog::NotificationCatalog;
use crate::condition::ConditionKind;
use crate::error::EligibilityError;
use crate::record::{NotificationRecord, NotificationRecordStore};
use chrono::{DateTime, Utc};

/// Earliest time a new send for `name` is allowed.
///
/// `Ok(None)` means nothing blocks a send: there is no record, no
/// `ServiceLogSent` condition, or that condition carries no timestamp
/// (a freshly initialized record). A window too large to represent is
/// reported as blocked indefinitely via `Ok(Some(DateTime::<Utc>::MAX_UTC))`.
pub fn next_allowed(
    catalog: &NotificationCatalog,
    store: &NotificationRecordStore,
    name: &str,
) -> Result<Option<DateTime<Utc>>, EligibilityError> {
    let definition = catalog
        .get(name)
        .ok_or_else(|| EligibilityError::DefinitionNotFound {
            name: name.to_string(),
        })?;

    let Some(record) = store.find(name) else {
        return Ok(None);
    };

    let last_sent = record
        .conditions
        .get(ConditionKind::ServiceLogSent)
        .and_then(|c| c.last_transition_time);

    Ok(last_sent.map(|sent| {
        sent.checked_add_signed(definition.resend_wait_duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }))
}

/// Whether a service log for `name` may be sent at `now`.
///
/// The cooldown boundary is inclusive of "allowed": a send exactly
/// `resend_wait` hours after the last one is permitted.
///
/// # Errors
/// Returns [`EligibilityError::DefinitionNotFound`] when `name` is not in the
/// catalog, whatever the store holds.
pub fn can_send(
    catalog: &NotificationCatalog,
    store: &NotificationRecordStore,
    name: &str,
    now: DateTime<Utc>,
) -> Result<bool, EligibilityError> {
    Ok(match next_allowed(catalog, store, name)? {
        Some(next) => now >= next,
        None => true,
    })
}

/// Records a confirmed send for `name` at `now`.
///
/// Creates the record if the store has none. Call exactly once per actual
/// send; this never decides whether a send should have happened.
pub fn record_send<'a>(
    store: &'a mut NotificationRecordStore,
    name: &str,
    reason: &str,
    now: DateTime<Utc>,
) -> &'a NotificationRecord {
    let record = store.insert(name);
    record.record_send(reason, now);
    record
}

/// [`can_send`] and [`record_send`] bound to one catalog.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEngine<'a> {
    catalog: &'a NotificationCatalog,
}

impl<'a> EligibilityEngine<'a> {
    pub fn new(catalog: &'a NotificationCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a NotificationCatalog {
        self.catalog
    }

    pub fn can_send(
        &self,
        store: &NotificationRecordStore,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, EligibilityError> {
        can_send(self.catalog, store, name, now)
    }

    pub fn next_allowed(
        &self,
        store: &NotificationRecordStore,
        name: &str,
    ) -> Result<Option<DateTime<Utc>>, EligibilityError> {
        next_allowed(self.catalog, store, name)
    }

    pub fn record_send<'s>(
        &self,
        store: &'s mut NotificationRecordStore,
        name: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> &'s NotificationRecord {
        record_send(store, name, reason, now)
    }
}
