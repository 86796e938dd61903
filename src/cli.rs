//! Command-line interface for managed-notify using clap.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::DEFAULT_MANIFEST_PATH;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format for log aggregation.
    Json,
}

/// Resend-window bookkeeping for service log notifications.
#[derive(Parser, Debug)]
#[command(name = "managed-notify")]
#[command(version)]
#[command(about = "Decide whether alert-driven service logs may be resent")]
pub struct Cli {
    /// Path to the notification manifest.
    #[arg(short = 'c', long = "config", default_value = DEFAULT_MANIFEST_PATH)]
    pub config: PathBuf,

    /// Validate the manifest and exit.
    #[arg(long = "validate")]
    pub validate: bool,

    /// Log format: text or json.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether a service log may be sent now.
    Check {
        /// Notification name.
        name: String,
        /// Status file; defaults to the manifest's inline status.
        #[arg(short = 's', long = "status")]
        status: Option<PathBuf>,
        /// Evaluate at this RFC 3339 time instead of now.
        #[arg(long = "at")]
        at: Option<DateTime<Utc>>,
    },
    /// Record that a service log was sent and persist the status file.
    Record {
        /// Notification name.
        name: String,
        /// Reason stored on the ServiceLogSent condition.
        #[arg(short = 'r', long = "reason")]
        reason: String,
        #[arg(short = 's', long = "status")]
        status: PathBuf,
        /// Record the send at this RFC 3339 time instead of now.
        #[arg(long = "at")]
        at: Option<DateTime<Utc>>,
    },
    /// Reset a record's conditions to the baseline.
    Init {
        /// Notification name.
        name: String,
        #[arg(short = 's', long = "status")]
        status: PathBuf,
    },
    /// Print the service log a notification would produce.
    Render {
        /// Notification name.
        name: String,
        /// Render the resolved body instead of the active one.
        #[arg(long = "resolved")]
        resolved: bool,
        /// Alert label as key=value; repeatable.
        #[arg(short = 'l', long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
    /// Print the send history as JSON.
    Show {
        /// Status file; defaults to the manifest's inline status.
        #[arg(short = 's', long = "status")]
        status: Option<PathBuf>,
    },
}

fn parse_label(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid label '{}': expected key=value", raw)),
    }
}
