//! Notification definitions and the read-only catalog that indexes them.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Severity of the service log produced by a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        };
        f.write_str(s)
    }
}

/// A named notification template with its resend cooldown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDefinition {
    /// Name used to associate the notification with an alert.
    pub name: String,
    /// Summary line of the service log.
    pub summary: String,
    /// Body text while the alert is active.
    pub active_body: String,
    /// Body text once the alert has resolved.
    pub resolved_body: String,
    pub severity: Severity,
    /// Minimum hours between two sends for this name.
    pub resend_wait: u32,
}

impl NotificationDefinition {
    pub fn resend_wait_duration(&self) -> Duration {
        Duration::hours(i64::from(self.resend_wait))
    }
}

/// Immutable set of definitions keyed by name.
#[derive(Debug, Clone, Default)]
pub struct NotificationCatalog {
    definitions: HashMap<String, NotificationDefinition>,
}

impl NotificationCatalog {
    /// Builds a catalog. A repeated name keeps the last definition; manifest
    /// validation reports duplicates before a catalog is ever built.
    pub fn new(definitions: impl IntoIterator<Item = NotificationDefinition>) -> Self {
        definitions.into_iter().collect()
    }

    pub fn get(&self, name: &str) -> Option<&NotificationDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definition names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationDefinition> {
        self.definitions.values()
    }
}

impl FromIterator<NotificationDefinition> for NotificationCatalog {
    fn from_iter<I: IntoIterator<Item = NotificationDefinition>>(iter: I) -> Self {
        let definitions = iter
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        Self { definitions }
    }
}
