//! Manifest loading and validation for managed-notify.
//!
//! A manifest carries the notification definitions (the catalog) and,
//! optionally, the persisted send history (the store) for one owning
//! resource.

mod types;
mod validation;

pub use types::{
    DEFAULT_MANIFEST_PATH, MAX_RESEND_WAIT, ManagedNotification, ManagedNotificationSpec,
    ManagedNotificationStatus, ObjectMeta,
};
pub use validation::{validate_template_render, validate_template_syntax};
