//! Validate command implementation.
//!
//! The `rigup validate` command checks the configuration and reports every
//! problem it finds.

use serde::Serialize;

use crate::cli::args::ValidateArgs;
use crate::config::{validate_config, ValidationError};
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectPaths, EXIT_FAILURE, EXIT_NO_CONFIG};
use super::display::format_validation_error;

/// The validate command implementation.
pub struct ValidateCommand {
    paths: ProjectPaths,
    args: ValidateArgs,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    config: String,
    valid: bool,
    errors: Vec<JsonError<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonError<'a> {
    rule: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'a str>,
}

impl ValidateCommand {
    /// Create a new validate command.
    pub fn new(paths: ProjectPaths, args: ValidateArgs) -> Self {
        Self { paths, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ValidateArgs {
        &self.args
    }

    fn render_json(config: &str, errors: &[ValidationError]) -> Result<String> {
        let report = JsonReport {
            config: config.to_string(),
            valid: errors.is_empty(),
            errors: errors
                .iter()
                .map(|e| JsonError {
                    rule: &e.rule,
                    message: &e.message,
                    step: e.step.as_deref(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report).map_err(|e| RigupError::Other(e.into()))
    }
}

impl Command for ValidateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (config_path, config) = match self.paths.load() {
            Ok(loaded) => loaded,
            Err(RigupError::ConfigNotFound { .. }) => {
                ui.error("No configuration found. Run 'rigup init' first.");
                return Ok(CommandResult::failure(EXIT_NO_CONFIG));
            }
            Err(RigupError::ConfigParseError { path, message }) => {
                ui.error(&format!("Parse error in {}: {}", path.display(), message));
                return Ok(CommandResult::failure(EXIT_FAILURE));
            }
            Err(e) => return Err(e),
        };

        let errors = validate_config(&config);

        if self.args.json {
            let json = Self::render_json(&config_path.display().to_string(), &errors)?;
            ui.message(&json);
        } else if errors.is_empty() {
            let count = config.setup_steps.len();
            let noun = if count == 1 { "step" } else { "steps" };
            ui.success(&format!(
                "{} is valid ({} {})",
                config_path.display(),
                count,
                noun
            ));
        } else {
            for error in &errors {
                ui.error(&format_validation_error(error));
            }
            let noun = if errors.len() == 1 { "error" } else { "errors" };
            ui.message(&format!(
                "\n{} {} found in {}",
                errors.len(),
                noun,
                config_path.display()
            ));
        }

        if errors.is_empty() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(EXIT_FAILURE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn setup_project(config_content: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rigup.yml"), config_content).unwrap();
        temp
    }

    fn run(temp: &TempDir, args: ValidateArgs) -> (CommandResult, MockUI) {
        let mut ui = MockUI::new();
        let cmd = ValidateCommand::new(ProjectPaths::new(temp.path()), args);
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn valid_config_succeeds() {
        let temp = setup_project(
            "setup_steps:\n  - { name: hello, type: shell, command: \"echo hi\" }\n",
        );
        let (result, ui) = run(&temp, ValidateArgs::default());
        assert!(result.success);
        assert!(ui.has_success("is valid (1 step)"));
    }

    #[test]
    fn every_error_is_reported() {
        let temp = setup_project(
            r#"
setup_steps:
  - { name: a, type: shell }
  - { name: a, type: shell, command: "true" }
  - { name: b, type: package-manager, depends_on: [ghost] }
"#,
        );
        let (result, ui) = run(&temp, ValidateArgs::default());

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("[missing-command]"));
        assert!(ui.has_error("[duplicate-step]"));
        assert!(ui.has_error("[missing-manager]"));
        assert!(ui.has_error("[unknown-dependency]"));
        assert!(ui.has_message("4 errors found"));
    }

    #[test]
    fn json_report() {
        let temp = setup_project(
            r#"
setup_steps:
  - { name: a, type: shell, command: "true", depends_on: [b] }
  - { name: b, type: shell, command: "true", depends_on: [a] }
"#,
        );
        let (result, ui) = run(&temp, ValidateArgs { json: true });

        assert_eq!(result.exit_code, 1);
        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"][0]["rule"], "circular-dependency");
    }

    #[test]
    fn parse_error_exits_1() {
        let temp = setup_project("setup_steps: [unclosed\n");
        let (result, ui) = run(&temp, ValidateArgs::default());
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("Parse error"));
    }

    #[test]
    fn missing_config_exits_2() {
        let temp = TempDir::new().unwrap();
        let (result, _) = run(&temp, ValidateArgs::default());
        assert_eq!(result.exit_code, 2);
    }
}
