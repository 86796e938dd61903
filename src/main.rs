//! managed-notify - resend-window bookkeeping for service log notifications.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use managed_notify::cli::{Cli, Command, LogFormat};
use managed_notify::config::ManagedNotification;
use managed_notify::error::EligibilityError;
use managed_notify::{
    AlertState, EligibilityEngine, NotificationCatalog, NotificationRecordStore,
    ServiceLogRenderer, status_file,
};

/// Initialize the tracing subscriber with the specified log format.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_env_filter(filter)
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format);

    info!(config_path = %cli.config.display(), "Loading manifest");

    let manifest = match ManagedNotification::load(&cli.config) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, path = %cli.config.display(), "Failed to load manifest");
            std::process::exit(1);
        }
    };

    if let Err(errors) = manifest.validate() {
        for e in &errors {
            error!(error = %e, "Manifest validation error");
        }
        error!(error_count = errors.len(), "Manifest validation failed");
        std::process::exit(1);
    }

    if cli.validate {
        println!("Manifest is valid: {}", cli.config.display());
        if !manifest.metadata.name.is_empty() {
            println!("  Name: {}", manifest.metadata.name);
        }
        println!("  Notifications: {}", manifest.spec.notifications.len());
        println!("  Records: {}", manifest.status.notifications.len());
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("no command given, see --help");
    };

    run(&manifest, command)
}

fn load_store(
    manifest: &ManagedNotification,
    status: Option<&Path>,
) -> Result<NotificationRecordStore> {
    match status {
        Some(path) => Ok(status_file::load(path)?),
        None => Ok(manifest.store()),
    }
}

fn require_definition(catalog: &NotificationCatalog, name: &str) -> Result<(), EligibilityError> {
    if catalog.contains(name) {
        Ok(())
    } else {
        Err(EligibilityError::DefinitionNotFound {
            name: name.to_string(),
        })
    }
}

fn run(manifest: &ManagedNotification, command: Command) -> Result<()> {
    let catalog = manifest.catalog();
    let engine = EligibilityEngine::new(&catalog);

    match command {
        Command::Check { name, status, at } => {
            let store = load_store(manifest, status.as_deref())?;
            let now = at.unwrap_or_else(Utc::now);

            let allowed = engine.can_send(&store, &name, now).inspect_err(|e| {
                error!(error = %e, notification = %name, "Eligibility check failed");
            })?;

            if allowed {
                info!(notification = %name, "Service log may be sent");
                println!("{}: allowed", name);
            } else {
                let next = engine.next_allowed(&store, &name)?;
                info!(notification = %name, next_allowed = ?next, "Service log within resend window");
                match next {
                    Some(next) => println!("{}: blocked until {}", name, next.to_rfc3339()),
                    None => println!("{}: blocked", name),
                }
            }
        }
        Command::Record {
            name,
            reason,
            status,
            at,
        } => {
            require_definition(&catalog, &name)?;
            let mut store = status_file::load(&status)?;
            let now = at.unwrap_or_else(Utc::now);

            if !engine.can_send(&store, &name, now)? {
                warn!(notification = %name, "Recording a send inside the resend window");
            }

            let sent_count = engine.record_send(&mut store, &name, &reason, now).sent_count;
            status_file::save(&status, &store)?;

            info!(notification = %name, sent_count, reason = %reason, "Service log send recorded");
            println!("{}: recorded (sent {} times)", name, sent_count);
        }
        Command::Init { name, status } => {
            require_definition(&catalog, &name)?;
            let mut store = status_file::load(&status)?;
            store.init(&name);
            status_file::save(&status, &store)?;

            info!(notification = %name, "Record initialized");
            println!("{}: initialized", name);
        }
        Command::Render {
            name,
            resolved,
            labels,
        } => {
            let definition = catalog
                .get(&name)
                .ok_or_else(|| EligibilityError::DefinitionNotFound { name: name.clone() })?;
            let state = if resolved {
                AlertState::Resolved
            } else {
                AlertState::Firing
            };
            let labels: serde_json::Map<String, serde_json::Value> = labels
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();

            let log = ServiceLogRenderer::new()
                .render(definition, state, &serde_json::Value::Object(labels))
                .with_context(|| format!("rendering service log for '{}'", name))?;
            println!("{}", serde_json::to_string_pretty(&log)?);
        }
        Command::Show { status } => {
            let store = load_store(manifest, status.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&store)?);
        }
    }

    Ok(())
}
