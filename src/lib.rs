// src/lib.rs
//! managed-notify - decide whether an alert-driven service log may be sent,
//! and keep the per-notification send history that decision relies on.

pub mod catalog;
pub mod cli;
pub mod condition;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod record;
pub mod service_log;
pub mod status_file;

// Re-export commonly used types
pub use catalog::{NotificationCatalog, NotificationDefinition, Severity};
pub use cli::LogFormat;
pub use condition::{Condition, ConditionKind, ConditionSet, ConditionStatus};
pub use config::ManagedNotification;
pub use eligibility::{EligibilityEngine, can_send, next_allowed, record_send};
pub use error::{ConfigError, EligibilityError, StatusFileError, TemplateError};
pub use record::{NotificationRecord, NotificationRecordStore};
pub use service_log::{AlertState, ServiceLog, ServiceLogRenderer, render_service_log};
