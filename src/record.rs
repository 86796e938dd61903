//! Per-name send history and the store that owns it.

use crate::condition::{Condition, ConditionKind, ConditionSet, ConditionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest persisted send count. The resource schema stores it as a signed
/// 32-bit integer.
pub const MAX_SENT_COUNT: u32 = i32::MAX as u32;

fn is_zero(n: &u32) -> bool {
    *n == 0
}

fn bounded_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let count = u32::deserialize(deserializer)?;
    if count > MAX_SENT_COUNT {
        return Err(serde::de::Error::custom(format!(
            "serviceLogSentCount {} exceeds {}",
            count, MAX_SENT_COUNT
        )));
    }
    Ok(count)
}

/// Mutable send history for one notification name.
///
/// The name is fixed at construction; it is the key the record is stored
/// under in a [`NotificationRecordStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    name: String,
    /// Number of service logs sent. Only ever increases, up to
    /// [`MAX_SENT_COUNT`].
    #[serde(
        rename = "serviceLogSentCount",
        default,
        skip_serializing_if = "is_zero",
        deserialize_with = "bounded_count"
    )]
    pub sent_count: u32,
    #[serde(default, skip_serializing_if = "ConditionSet::is_empty")]
    pub conditions: ConditionSet,
}

impl NotificationRecord {
    /// Zero-valued record: no sends, no conditions.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent_count: 0,
            conditions: ConditionSet::new(),
        }
    }

    /// Name of the notification definition this record tracks.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resets every known condition kind to the `False` baseline.
    ///
    /// Existing conditions are overwritten; `sent_count` is untouched.
    pub fn init(&mut self) {
        for kind in ConditionKind::ALL {
            self.conditions.set(Condition::baseline(kind));
        }
    }

    /// Records that a service log was just sent.
    pub fn record_send(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        if self.sent_count < MAX_SENT_COUNT {
            self.sent_count += 1;
        }
        self.conditions.set(Condition::new(
            ConditionKind::ServiceLogSent,
            ConditionStatus::True,
            reason,
            Some(now),
        ));
    }

    /// Upserts a condition without counting a send. Used for the alert
    /// firing/resolved transitions observed by the caller.
    pub fn set_condition(
        &mut self,
        kind: ConditionKind,
        status: ConditionStatus,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.conditions
            .set(Condition::new(kind, status, reason, Some(now)));
    }

    /// Time of the most recent recorded send, if any.
    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.conditions
            .get(ConditionKind::ServiceLogSent)
            .and_then(|c| c.last_transition_time)
    }
}

/// Records keyed by name. Persisted as a sequence of records.
///
/// Iteration is ordered by name; the order carries no meaning beyond making
/// the persisted form stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRecordStore {
    records: BTreeMap<String, NotificationRecord>,
}

impl NotificationRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &str) -> Option<&NotificationRecord> {
        self.records.get(name)
    }

    /// Mutable access to a stored record. The record's name cannot be
    /// changed through it, so the store key stays valid.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut NotificationRecord> {
        self.records.get_mut(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Replaces the record with the same name, or adds it.
    pub fn upsert(&mut self, record: NotificationRecord) {
        self.records.insert(record.name.clone(), record);
    }

    /// Adds a zero-valued record for `name` unless one already exists.
    ///
    /// Returns the record now stored under `name`; an existing record is
    /// returned unchanged.
    pub fn insert(&mut self, name: &str) -> &mut NotificationRecord {
        self.records
            .entry(name.to_string())
            .or_insert_with(|| NotificationRecord::new(name))
    }

    /// Find-or-create the record for `name` and reset its conditions to the
    /// baseline.
    pub fn init(&mut self, name: &str) -> &mut NotificationRecord {
        let record = self.insert(name);
        record.init();
        record
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

impl FromIterator<NotificationRecord> for NotificationRecordStore {
    fn from_iter<I: IntoIterator<Item = NotificationRecord>>(iter: I) -> Self {
        let mut store = NotificationRecordStore::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}

impl Serialize for NotificationRecordStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.records.values())
    }
}

impl<'de> Deserialize<'de> for NotificationRecordStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<NotificationRecord>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
