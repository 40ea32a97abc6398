//! Plan command implementation.
//!
//! The `rigup plan` command prints the execution order without running
//! anything.

use serde::Serialize;

use crate::cli::args::PlanArgs;
use crate::config::{validate_config, StepType};
use crate::error::{Result, RigupError};
use crate::runner::SetupEngine;
use crate::steps::{Step, StepKind};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectPaths, EXIT_FAILURE, EXIT_NO_CONFIG};
use super::display::{describe_step, report_validation_errors};

/// The plan command implementation.
pub struct PlanCommand {
    paths: ProjectPaths,
    args: PlanArgs,
}

/// A planned step as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct PlannedStep {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<PlannedChoice>,
}

/// A choice branch as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct PlannedChoice {
    pub value: String,
    pub label: String,
    pub default: bool,
    pub actions: Vec<PlannedStep>,
}

impl PlannedStep {
    fn from_step(step: &Step) -> Self {
        let choices = match &step.kind {
            StepKind::Choice {
                default, choices, ..
            } => choices
                .iter()
                .map(|c| PlannedChoice {
                    value: c.value.clone(),
                    label: c.name.clone(),
                    default: default.as_deref() == Some(c.value.as_str()),
                    actions: c.actions.iter().map(PlannedStep::from_step).collect(),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            name: step.name.clone(),
            step_type: step.step_type(),
            description: step.description.clone(),
            command: step.kind.command_line(),
            depends_on: step.depends_on.clone(),
            choices,
        }
    }
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(paths: ProjectPaths, args: PlanArgs) -> Self {
        Self { paths, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &PlanArgs {
        &self.args
    }

    /// Steps in execution order.
    pub fn planned_steps(steps: &[Step]) -> Result<Vec<PlannedStep>> {
        let order = SetupEngine::plan(steps)?;
        Ok(order
            .iter()
            .filter_map(|name| steps.iter().find(|s| &s.name == name))
            .map(PlannedStep::from_step)
            .collect())
    }

    fn show_step(ui: &mut dyn UserInterface, step: &Step, label: &str, indent: usize) {
        let pad = " ".repeat(indent);
        ui.message(&format!(
            "{}{} {} [{}] {}",
            pad,
            label,
            step.name,
            step.step_type(),
            describe_step(step)
        ));
        if !step.depends_on.is_empty() {
            ui.message(&format!("{}   after: {}", pad, step.depends_on.join(", ")));
        }

        if let StepKind::Choice {
            default, choices, ..
        } = &step.kind
        {
            for choice in choices {
                let marker = if default.as_deref() == Some(choice.value.as_str()) {
                    " (default)"
                } else {
                    ""
                };
                ui.message(&format!(
                    "{}   ◇ {} = {}{}",
                    pad, choice.value, choice.name, marker
                ));
                for action in &choice.actions {
                    Self::show_step(ui, action, "-", indent + 6);
                }
            }
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (config_path, config) = match self.paths.load() {
            Ok(loaded) => loaded,
            Err(RigupError::ConfigNotFound { .. }) => {
                ui.error("No configuration found. Run 'rigup init' first.");
                return Ok(CommandResult::failure(EXIT_NO_CONFIG));
            }
            Err(e) => return Err(e),
        };

        let errors = validate_config(&config);
        if !errors.is_empty() {
            report_validation_errors(&config_path, &errors, ui);
            return Ok(CommandResult::failure(EXIT_FAILURE));
        }

        let steps = Step::from_configs(&config.setup_steps)?;
        let order = SetupEngine::plan(&steps)?;

        if self.args.json {
            let planned = Self::planned_steps(&steps)?;
            let json = serde_json::to_string_pretty(&planned)
                .map_err(|e| RigupError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let name = config.name.as_deref().unwrap_or("project");
        ui.show_header(&format!("Plan for {}", name));

        if order.is_empty() {
            ui.message("No setup steps configured.");
            return Ok(CommandResult::success());
        }

        for (i, name) in order.iter().enumerate() {
            if let Some(step) = steps.iter().find(|s| &s.name == name) {
                Self::show_step(ui, step, &format!("{}.", i + 1), 2);
            }
        }

        let noun = if order.len() == 1 { "step" } else { "steps" };
        ui.message(&format!("\nTotal: {} {}", order.len(), noun));

        Ok(CommandResult::success())
    }
}
