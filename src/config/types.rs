//! Manifest types and loading.

use super::validation::{validate_template_render, validate_template_syntax};
use crate::catalog::{NotificationCatalog, NotificationDefinition};
use crate::eligibility;
use crate::error::{ConfigError, EligibilityError};
use crate::record::NotificationRecordStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default manifest path.
pub const DEFAULT_MANIFEST_PATH: &str = "/etc/managed-notify/notifications.yaml";

/// Largest accepted `resendWait`, in hours. Matches the signed 32-bit
/// field of the persisted resource schema.
pub const MAX_RESEND_WAIT: u32 = i32::MAX as u32;

/// Identifying metadata of the owning resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Declared notification definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedNotificationSpec {
    pub notifications: Vec<NotificationDefinition>,
}

/// Observed send history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedNotificationStatus {
    #[serde(default, skip_serializing_if = "NotificationRecordStore::is_empty")]
    pub notifications: NotificationRecordStore,
}

/// A set of notification definitions together with their send history.
///
/// Unknown top-level keys (`apiVersion`, `kind`, ...) are ignored, so a full
/// resource manifest loads as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedNotification {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: ManagedNotificationSpec,
    #[serde(default)]
    pub status: ManagedNotificationStatus,
}

impl ManagedNotification {
    /// Load a manifest from a YAML or JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigError::LoadError`] if the file cannot be read.
    /// Returns [`ConfigError::ValidationError`] if the document does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;

        let manifest = Self::from_yaml(&content)?;

        tracing::debug!(
            path = %path.display(),
            notifications = manifest.spec.notifications.len(),
            records = manifest.status.notifications.len(),
            "Manifest loaded"
        );

        Ok(manifest)
    }

    /// Parse a manifest from a YAML (or JSON) string.
    ///
    /// # Errors
    /// Returns [`ConfigError::ValidationError`] if the document does not parse.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Validate every definition and status record.
    ///
    /// # Errors
    /// Returns all problems found, not just the first: empty or duplicate
    /// names, templates that fail to parse or render, and out-of-range
    /// `resendWait` values. Status records without a matching definition
    /// are only logged; they stay in the history untouched.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.spec.notifications.is_empty() {
            errors.push(ConfigError::ValidationError(
                "no notifications defined".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, def) in self.spec.notifications.iter().enumerate() {
            if def.name.trim().is_empty() {
                errors.push(ConfigError::ValidationError(format!(
                    "notification at index {} has an empty name",
                    index
                )));
            } else if !seen.insert(def.name.as_str()) {
                errors.push(ConfigError::DuplicateNotification {
                    name: def.name.clone(),
                });
            }

            let templates = [
                ("summary", &def.summary),
                ("activeBody", &def.active_body),
                ("resolvedBody", &def.resolved_body),
            ];
            for (field, source) in templates {
                if let Err(e) = validate_template_syntax(source) {
                    errors.push(ConfigError::InvalidTemplate {
                        notification: def.name.clone(),
                        message: format!("{}: {}", field, e),
                    });
                } else if let Err(e) = validate_template_render(source) {
                    errors.push(ConfigError::InvalidTemplate {
                        notification: def.name.clone(),
                        message: format!("{} render: {}", field, e),
                    });
                }
            }

            if def.resend_wait > MAX_RESEND_WAIT {
                errors.push(ConfigError::ValidationError(format!(
                    "notification '{}': resendWait {} exceeds {}",
                    def.name, def.resend_wait, MAX_RESEND_WAIT
                )));
            }
        }

        for name in self.orphan_records() {
            tracing::warn!(
                notification = %name,
                "Status record has no matching notification, ignoring"
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Names of status records with no matching definition, sorted.
    pub fn orphan_records(&self) -> Vec<&str> {
        self.status
            .notifications
            .names()
            .filter(|name| !self.spec.notifications.iter().any(|def| def.name == *name))
            .collect()
    }

    /// Build the catalog of definitions.
    pub fn catalog(&self) -> NotificationCatalog {
        self.spec.notifications.iter().cloned().collect()
    }

    /// Copy of the inline send history.
    pub fn store(&self) -> NotificationRecordStore {
        self.status.notifications.clone()
    }

    /// Whether a service log for `name` may be sent at `now`, judged against
    /// this resource's own definitions and history.
    ///
    /// # Errors
    /// Returns [`EligibilityError::DefinitionNotFound`] for undefined names.
    pub fn can_be_sent(&self, name: &str, now: DateTime<Utc>) -> Result<bool, EligibilityError> {
        eligibility::can_send(&self.catalog(), &self.status.notifications, name, now)
    }

    /// Record a send in this resource's inline history.
    pub fn record_send(&mut self, name: &str, reason: &str, now: DateTime<Utc>) {
        eligibility::record_send(&mut self.status.notifications, name, reason, now);
    }
}
