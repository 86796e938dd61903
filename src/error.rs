//! Centralized error types for managed-notify using thiserror.
//!
//! The decision core only ever fails with [`EligibilityError`]. The other
//! enums belong to the edges: manifest loading, template rendering and the
//! status file adapter.

use thiserror::Error;

/// Errors raised by the eligibility decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EligibilityError {
    /// The queried name has no definition in the catalog. This is a
    /// consistency bug between the catalog and the caller, not a runtime state.
    #[error("notification '{name}' not found in catalog")]
    DefinitionNotFound { name: String },
}

/// Errors related to manifest loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load manifest: {0}")]
    LoadError(String),
    #[error("invalid manifest: {0}")]
    ValidationError(String),
    #[error("duplicate notification '{name}'")]
    DuplicateNotification { name: String },
    #[error("invalid template in notification '{notification}': {message}")]
    InvalidTemplate {
        notification: String,
        message: String,
    },
}

/// Errors related to service log rendering.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template render failed: {message}")]
    RenderFailed { message: String },
}

/// Errors related to reading and writing the status file.
#[derive(Error, Debug)]
pub enum StatusFileError {
    #[error("failed to read status file: {0}")]
    Read(String),
    #[error("invalid status file: {0}")]
    Parse(String),
    #[error("failed to write status file: {0}")]
    Write(String),
}
