//! Typed condition entries attached to a notification record.
//!
//! A [`ConditionSet`] holds at most one [`Condition`] per [`ConditionKind`].
//! Writing a condition replaces any existing entry of the same kind as a
//! whole; fields are never merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of facts tracked for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    AlertFiring,
    AlertResolved,
    ServiceLogSent,
}

impl ConditionKind {
    /// All kinds, in the order a freshly initialized record lists them.
    pub const ALL: [ConditionKind; 3] = [
        ConditionKind::AlertFiring,
        ConditionKind::AlertResolved,
        ConditionKind::ServiceLogSent,
    ];
}

/// Tri-state status of a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A single timestamped fact about a notification record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub status: ConditionStatus,
    /// When the condition last changed status. Absent for baseline entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Condition {
    pub fn new(
        kind: ConditionKind,
        status: ConditionStatus,
        reason: impl Into<String>,
        last_transition_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind,
            status,
            last_transition_time,
            reason: reason.into(),
        }
    }

    /// Baseline entry: status `False`, no reason, no transition time.
    pub fn baseline(kind: ConditionKind) -> Self {
        Self::new(kind, ConditionStatus::False, "", None)
    }
}

/// Ordered collection of conditions, unique by kind.
///
/// Insertion order of distinct kinds is kept for stable serialization only;
/// lookups always go by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConditionSet(Vec<Condition>);

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the condition of the given kind, if any.
    pub fn get(&self, kind: ConditionKind) -> Option<Condition> {
        self.0.iter().find(|c| c.kind == kind).cloned()
    }

    /// Upsert by kind: replaces an existing entry entirely, otherwise appends.
    pub fn set(&mut self, condition: Condition) {
        match self.0.iter_mut().find(|c| c.kind == condition.kind) {
            Some(existing) => *existing = condition,
            None => self.0.push(condition),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        let mut set = ConditionSet::new();
        for condition in iter {
            set.set(condition);
        }
        set
    }
}

// Persisted sets may carry repeated kinds if written by hand; collapse them
// through the upsert path so the one-per-kind invariant always holds.
impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<Condition>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}
