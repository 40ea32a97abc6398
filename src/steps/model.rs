//! Validated step model.
//!
//! [`Step`] is the normalized form of a [`StepConfig`]: strings are trimmed,
//! kind-specific fields are checked and folded into a tagged [`StepKind`],
//! and `depends_on` is deduplicated.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::config::schema::{ChoiceConfig, StepConfig, StepType};
use crate::error::{RigupError, Result};

/// Default arguments for a package manager step without a command.
const DEFAULT_PACKAGE_COMMAND: &str = "install";

/// Default arguments for a docker-compose step without a command.
const DEFAULT_COMPOSE_COMMAND: &str = "up -d";

/// A validated setup step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Step name, unique within its list.
    pub name: String,
    /// Optional description for display.
    pub description: Option<String>,
    /// What the step does.
    pub kind: StepKind,
    /// Names of steps that must complete first.
    pub depends_on: Vec<String>,
    /// Extra environment variables.
    pub env: BTreeMap<String, String>,
}

/// Kind-specific parameters of a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    PackageManager { manager: String, command: String },
    Shell { command: String },
    DockerCompose { command: String },
    Docker { command: String },
    Database { manager: Option<String>, command: String },
    Service { manager: Option<String>, command: String },
    Choice {
        prompt: String,
        default: Option<String>,
        choices: Vec<Choice>,
    },
}

/// One selectable branch of a choice step.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Display label.
    pub name: String,
    /// Stable identifier.
    pub value: String,
    /// Steps run in order when selected.
    pub actions: Vec<Step>,
}

/// A problem found while checking a step's fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    /// Rule identifier (e.g. `missing-command`).
    pub rule: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl StepKind {
    /// The configuration type tag for this kind.
    pub fn step_type(&self) -> StepType {
        match self {
            StepKind::PackageManager { .. } => StepType::PackageManager,
            StepKind::Shell { .. } => StepType::Shell,
            StepKind::DockerCompose { .. } => StepType::DockerCompose,
            StepKind::Docker { .. } => StepType::Docker,
            StepKind::Database { .. } => StepType::Database,
            StepKind::Service { .. } => StepType::Service,
            StepKind::Choice { .. } => StepType::Choice,
        }
    }

    /// The full command line this step runs, or `None` for choice steps.
    pub fn command_line(&self) -> Option<String> {
        match self {
            StepKind::PackageManager { manager, command } => {
                Some(format!("{} {}", manager, command))
            }
            StepKind::Shell { command } => Some(command.clone()),
            StepKind::DockerCompose { command } => Some(format!("docker compose {}", command)),
            StepKind::Docker { command } => Some(format!("docker {}", command)),
            StepKind::Database { manager, command } | StepKind::Service { manager, command } => {
                Some(match manager {
                    Some(m) => format!("{} {}", m, command),
                    None => command.clone(),
                })
            }
            StepKind::Choice { .. } => None,
        }
    }

    /// The program that must be on `PATH` for this step to run.
    ///
    /// Shell steps return `None`: the command is handed to the shell as-is.
    pub fn program(&self) -> Option<&str> {
        match self {
            StepKind::PackageManager { manager, .. } => first_word(manager),
            StepKind::DockerCompose { .. } | StepKind::Docker { .. } => Some("docker"),
            StepKind::Database { manager, .. } | StepKind::Service { manager, .. } => {
                manager.as_deref().and_then(first_word)
            }
            StepKind::Shell { .. } | StepKind::Choice { .. } => None,
        }
    }
}

fn first_word(s: &str) -> Option<&str> {
    s.split_whitespace().next()
}

impl Step {
    /// Build a validated step from its configuration.
    ///
    /// Returns the first field problem as a `ConfigValidationError`. Choice
    /// actions are converted recursively.
    pub fn from_config(config: &StepConfig) -> Result<Self> {
        if let Some(problem) = check_fields(config).into_iter().next() {
            return Err(RigupError::ConfigValidationError {
                message: problem.message,
            });
        }

        let kind = match config.step_type {
            StepType::PackageManager => StepKind::PackageManager {
                manager: required(&config.manager),
                command: optional(&config.command)
                    .unwrap_or_else(|| DEFAULT_PACKAGE_COMMAND.to_string()),
            },
            StepType::Shell => StepKind::Shell {
                command: required(&config.command),
            },
            StepType::DockerCompose => StepKind::DockerCompose {
                command: optional(&config.command)
                    .unwrap_or_else(|| DEFAULT_COMPOSE_COMMAND.to_string()),
            },
            StepType::Docker => StepKind::Docker {
                command: required(&config.command),
            },
            StepType::Database => StepKind::Database {
                manager: optional(&config.manager),
                command: required(&config.command),
            },
            StepType::Service => StepKind::Service {
                manager: optional(&config.manager),
                command: required(&config.command),
            },
            StepType::Choice => StepKind::Choice {
                prompt: required(&config.prompt),
                default: optional(&config.default),
                choices: config
                    .choices
                    .iter()
                    .map(|c| Choice::from_config(&config.name, c))
                    .collect::<Result<Vec<_>>>()?,
            },
        };

        let mut seen = HashSet::new();
        let depends_on = config
            .depends_on
            .iter()
            .map(|d| d.trim().to_string())
            .filter(|d| seen.insert(d.clone()))
            .collect();

        Ok(Self {
            name: config.name.trim().to_string(),
            description: optional(&config.description),
            kind,
            depends_on,
            env: config.env.clone(),
        })
    }

    /// Convert a list of step configs, stopping at the first invalid step.
    pub fn from_configs(configs: &[StepConfig]) -> Result<Vec<Self>> {
        configs.iter().map(Self::from_config).collect()
    }

    /// The configuration type tag of this step.
    pub fn step_type(&self) -> StepType {
        self.kind.step_type()
    }

    /// Whether this step branches interactively.
    pub fn is_choice(&self) -> bool {
        matches!(self.kind, StepKind::Choice { .. })
    }

    /// Label used in progress output: the description if set, else the name.
    pub fn label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

impl Choice {
    fn from_config(step: &str, config: &ChoiceConfig) -> Result<Self> {
        let mut actions = Step::from_configs(&config.actions)?;

        let mut names = HashSet::new();
        for action in &mut actions {
            if !names.insert(action.name.clone()) {
                return Err(RigupError::DuplicateStep {
                    name: action.name.clone(),
                });
            }
            if !action.depends_on.is_empty() {
                warn!(
                    "Action '{}' of choice '{}' in step '{}' declares depends_on; actions run in list order",
                    action.name, config.value, step
                );
                action.depends_on.clear();
            }
        }

        Ok(Self {
            name: config.name.trim().to_string(),
            value: config.value.trim().to_string(),
            actions,
        })
    }
}

/// Check the kind-specific fields of a step, without recursing into actions.
pub fn check_fields(config: &StepConfig) -> Vec<FieldProblem> {
    let mut problems = Vec::new();
    let name = config.name.trim();

    if name.is_empty() {
        problems.push(FieldProblem {
            rule: "missing-name",
            message: format!("A {} step has an empty name", config.step_type),
        });
    }

    let needs_command = matches!(
        config.step_type,
        StepType::Shell | StepType::Docker | StepType::Database | StepType::Service
    );
    if needs_command && optional(&config.command).is_none() {
        problems.push(FieldProblem {
            rule: "missing-command",
            message: format!(
                "Step '{}' of type {} must have a 'command'",
                name, config.step_type
            ),
        });
    }

    if config.step_type == StepType::PackageManager && optional(&config.manager).is_none() {
        problems.push(FieldProblem {
            rule: "missing-manager",
            message: format!("Step '{}' of type package-manager must have a 'manager'", name),
        });
    }

    if config.step_type == StepType::Choice {
        if optional(&config.prompt).is_none() {
            problems.push(FieldProblem {
                rule: "missing-prompt",
                message: format!("Choice step '{}' must have a 'prompt'", name),
            });
        }
        if config.choices.is_empty() {
            problems.push(FieldProblem {
                rule: "empty-choices",
                message: format!("Choice step '{}' must have at least one choice", name),
            });
        }

        let mut values = HashSet::new();
        for choice in &config.choices {
            if choice.actions.is_empty() {
                problems.push(FieldProblem {
                    rule: "empty-actions",
                    message: format!(
                        "Choice '{}' of step '{}' must have at least one action",
                        choice.value, name
                    ),
                });
            }
            if !values.insert(choice.value.trim()) {
                problems.push(FieldProblem {
                    rule: "duplicate-choice-value",
                    message: format!(
                        "Choice step '{}' has more than one choice with value '{}'",
                        name, choice.value
                    ),
                });
            }
        }

        if let Some(default) = optional(&config.default) {
            if !config.choices.iter().any(|c| c.value.trim() == default) {
                problems.push(FieldProblem {
                    rule: "unknown-default",
                    message: format!(
                        "Choice step '{}' has default '{}' which matches no choice",
                        name, default
                    ),
                });
            }
        }
    }

    problems
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Only called after `check_fields` has confirmed the field is present.
fn required(value: &Option<String>) -> String {
    optional(value).unwrap_or_default()
}
