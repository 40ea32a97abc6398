//! Shared display helpers.
//!
//! Used by `setup`, `plan` and `validate` to render steps and
//! validation errors consistently.

use std::path::Path;

use crate::config::ValidationError;
use crate::steps::{Step, StepKind};
use crate::ui::UserInterface;

/// First line of a possibly multi-line message.
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim_end()
}

/// One-line description of what a step does.
///
/// Executable steps show their command line; choice steps their prompt.
pub fn describe_step(step: &Step) -> String {
    match &step.kind {
        StepKind::Choice {
            prompt, choices, ..
        } => {
            let noun = if choices.len() == 1 { "option" } else { "options" };
            format!("{} ({} {})", prompt, choices.len(), noun)
        }
        kind => kind.command_line().unwrap_or_default(),
    }
}

/// Format a validation error as `[rule] step: message`.
pub fn format_validation_error(error: &ValidationError) -> String {
    match &error.step {
        Some(step) if !error.message.contains(&format!("'{}'", step)) => {
            format!("[{}] {}: {}", error.rule, step, error.message)
        }
        _ => format!("[{}] {}", error.rule, error.message),
    }
}

/// Report every validation error for `path` through the UI.
pub fn report_validation_errors(path: &Path, errors: &[ValidationError], ui: &mut dyn UserInterface) {
    let noun = if errors.len() == 1 { "error" } else { "errors" };
    ui.error(&format!(
        "Invalid configuration in {} ({} {})",
        path.display(),
        errors.len(),
        noun
    ));
    for error in errors {
        ui.error(&format!("  {}", format_validation_error(error)));
    }
}
