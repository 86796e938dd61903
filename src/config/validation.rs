//! Template validation utilities.

use minijinja::{Environment, UndefinedBehavior};

/// Validates Jinja template syntax without rendering it.
///
/// # Errors
/// Returns the parser's message if the template does not compile.
pub fn validate_template_syntax(source: &str) -> Result<(), String> {
    let mut env = Environment::new();
    env.add_template("_validate", source)
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Validates a Jinja template by rendering it against an empty context.
/// Catches runtime errors such as unknown filters that parse cleanly.
///
/// # Errors
/// Returns the error message if the template fails to compile or render.
pub fn validate_template_render(source: &str) -> Result<(), String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Lenient);
    env.render_str(source, serde_json::json!({}))
        .map_err(|e| e.to_string())?;
    Ok(())
}
