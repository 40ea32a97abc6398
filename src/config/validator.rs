//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Steps must carry the fields their type requires
//! - Step names must be unique within their list
//! - depends_on must reference existing steps
//! - No circular dependencies allowed
//!
//! Choice actions are checked recursively with the same rules, each
//! action list on its own.

use crate::config::schema::{RigupConfig, StepConfig};
use crate::error::{Result, RigupError};
use crate::runner::DependencyGraph;
use crate::steps::check_fields;
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Step name if error is step-specific
    pub step: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String, step: Option<&str>) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            step: step.map(String::from),
        }
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &RigupConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_steps(&config.setup_steps, &mut errors);
    errors.extend(validate_dependencies(&config.setup_steps));

    errors
}

/// Check fields and names of a step list, recursing into choice actions.
fn validate_steps(steps: &[StepConfig], errors: &mut Vec<ValidationError>) {
    let mut names = HashSet::new();

    for step in steps {
        let name = step.name.trim();

        for problem in check_fields(step) {
            errors.push(ValidationError::new(
                problem.rule,
                problem.message,
                Some(name).filter(|n| !n.is_empty()),
            ));
        }

        if !name.is_empty() && !names.insert(name) {
            errors.push(ValidationError::new(
                "duplicate-step",
                format!("Step '{}' is defined more than once", name),
                Some(name),
            ));
        }

        for choice in &step.choices {
            validate_steps(&choice.actions, errors);
        }
    }
}

/// Validate top-level dependencies: unknown references and cycles.
fn validate_dependencies(steps: &[StepConfig]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let known: HashSet<&str> = steps.iter().map(|s| s.name.trim()).collect();

    for step in steps {
        let name = step.name.trim();
        for dep in &step.depends_on {
            if !known.contains(dep.trim()) {
                errors.push(ValidationError::new(
                    "unknown-dependency",
                    format!("Step '{}' depends on '{}' which does not exist", name, dep.trim()),
                    Some(name),
                ));
            }
        }
    }

    // Cycle check over the references that do resolve, first definition wins.
    let mut seen = HashSet::new();
    let mut builder = DependencyGraph::builder();
    for step in steps {
        let name = step.name.trim();
        if !seen.insert(name) {
            continue;
        }
        let deps = step
            .depends_on
            .iter()
            .map(|d| d.trim())
            .filter(|d| known.contains(d))
            .map(String::from)
            .collect();
        builder = builder.add_step(name, deps);
    }

    if let Err(RigupError::CircularDependency { cycle }) = builder.build() {
        let first = cycle.split(" -> ").next().map(String::from);
        errors.push(ValidationError {
            rule: "circular-dependency".to_string(),
            message: format!("Circular dependency detected: {}", cycle),
            step: first,
        });
    }

    errors
}

/// Validate and return Result.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &RigupConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(RigupError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
