//! Service log payload rendering from a notification definition.
//!
//! Summaries and bodies are Jinja templates rendered against the alert's
//! labels. Plain text without template markup renders verbatim. Delivering
//! the payload is the caller's business.

use crate::catalog::{NotificationDefinition, Severity};
use crate::error::TemplateError;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;

/// Which body of the definition to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Firing,
    Resolved,
}

/// Payload ready to hand to a service log transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceLog {
    pub severity: Severity,
    pub summary: String,
    pub description: String,
}

/// Renders service logs with a single reusable Jinja environment.
///
/// Missing labels render as empty strings.
pub struct ServiceLogRenderer {
    env: Environment<'static>,
}

impl ServiceLogRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        Self { env }
    }

    /// Render the payload for `definition` in the given alert state.
    ///
    /// # Errors
    /// Returns [`TemplateError::RenderFailed`] if either template fails to
    /// parse or render.
    pub fn render(
        &self,
        definition: &NotificationDefinition,
        state: AlertState,
        labels: &Value,
    ) -> Result<ServiceLog, TemplateError> {
        let body = match state {
            AlertState::Firing => &definition.active_body,
            AlertState::Resolved => &definition.resolved_body,
        };

        let summary = self.render_string(&definition.summary, labels)?;
        let description = self.render_string(body, labels)?;

        tracing::trace!(
            notification = %definition.name,
            state = ?state,
            "Service log rendered"
        );

        Ok(ServiceLog {
            severity: definition.severity,
            summary,
            description,
        })
    }

    fn render_string(&self, template: &str, labels: &Value) -> Result<String, TemplateError> {
        self.env
            .render_str(template, labels)
            .map_err(|e| TemplateError::RenderFailed {
                message: e.to_string(),
            })
    }
}

impl Default for ServiceLogRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceLogRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLogRenderer").finish_non_exhaustive()
    }
}

/// One-shot convenience over [`ServiceLogRenderer::render`].
pub fn render_service_log(
    definition: &NotificationDefinition,
    state: AlertState,
    labels: &Value,
) -> Result<ServiceLog, TemplateError> {
    ServiceLogRenderer::new().render(definition, state, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(summary: &str, active: &str, resolved: &str) -> NotificationDefinition {
        NotificationDefinition {
            name: "LoggingVolumeFillingUp".to_string(),
            summary: summary.to_string(),
            active_body: active.to_string(),
            resolved_body: resolved.to_string(),
            severity: Severity::Warning,
            resend_wait: 6,
        }
    }

    #[test]
    fn firing_uses_active_body() {
        let def = definition("Volume filling", "Volume is filling up.", "Volume recovered.");
        let log = render_service_log(&def, AlertState::Firing, &json!({})).unwrap();

        assert_eq!(log.summary, "Volume filling");
        assert_eq!(log.description, "Volume is filling up.");
        assert_eq!(log.severity, Severity::Warning);
    }

    #[test]
    fn resolved_uses_resolved_body() {
        let def = definition("Volume filling", "Volume is filling up.", "Volume recovered.");
        let log = render_service_log(&def, AlertState::Resolved, &json!({})).unwrap();

        assert_eq!(log.description, "Volume recovered.");
    }

    #[test]
    fn labels_are_substituted() {
        let def = definition(
            "{{ namespace }} volume filling",
            "Volume {{ persistentvolumeclaim }} is at {{ percent }}%.",
            "",
        );
        let labels = json!({
            "namespace": "openshift-logging",
            "persistentvolumeclaim": "elasticsearch-0",
            "percent": 92
        });
        let log = render_service_log(&def, AlertState::Firing, &labels).unwrap();

        assert_eq!(log.summary, "openshift-logging volume filling");
        assert_eq!(log.description, "Volume elasticsearch-0 is at 92%.");
    }

    #[test]
    fn missing_labels_render_empty() {
        let def = definition("{{ missing }}!", "x", "y");
        let log = render_service_log(&def, AlertState::Firing, &json!({})).unwrap();

        assert_eq!(log.summary, "!");
    }

    #[test]
    fn broken_template_is_render_error() {
        let def = definition("{% if unclosed", "x", "y");
        let result = render_service_log(&def, AlertState::Firing, &json!({}));

        assert!(matches!(result, Err(TemplateError::RenderFailed { .. })));
    }

    #[test]
    fn renderer_is_reusable() {
        let renderer = ServiceLogRenderer::new();
        let def = definition("{{ host }}", "a", "b");

        let first = renderer.render(&def, AlertState::Firing, &json!({"host": "one"})).unwrap();
        let second = renderer.render(&def, AlertState::Firing, &json!({"host": "two"})).unwrap();

        assert_eq!(first.summary, "one");
        assert_eq!(second.summary, "two");
    }

    #[test]
    fn service_log_serializes_severity_by_name() {
        let log = ServiceLog {
            severity: Severity::Error,
            summary: "s".to_string(),
            description: "d".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&log).unwrap(),
            json!({"severity": "Error", "summary": "s", "description": "d"})
        );
    }
}
