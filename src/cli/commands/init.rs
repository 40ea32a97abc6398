//! Init command implementation.
//!
//! The `rigup init` command writes a starter `rigup.yml` into the project.

use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};

use crate::cli::args::InitArgs;
use crate::config::{discover_config, CONFIG_FILE_NAMES};
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_FAILURE};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const STARTER_TEMPLATE: &str = "starter.yml";
const PROJECT_NAME_PLACEHOLDER: &str = "{{project_name}}";

/// The init command implementation.
pub struct InitCommand {
    project_root: PathBuf,
    args: InitArgs,
}

impl InitCommand {
    /// Create a new init command.
    pub fn new(project_root: &Path, args: InitArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the command arguments.
    pub fn args(&self) -> &InitArgs {
        &self.args
    }

    /// Starter configuration with the project name filled in.
    pub fn render_starter(project_name: &str) -> Result<String> {
        let template = TEMPLATES_DIR
            .get_file(STARTER_TEMPLATE)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| RigupError::ConfigNotFound {
                path: PathBuf::from("templates").join(STARTER_TEMPLATE),
            })?;
        Ok(template.replace(PROJECT_NAME_PLACEHOLDER, project_name))
    }

    fn project_name(&self) -> String {
        self.project_root
            .canonicalize()
            .ok()
            .as_deref()
            .unwrap_or(self.project_root.as_path())
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("my-project")
            .to_string()
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let target = self.project_root.join(CONFIG_FILE_NAMES[0]);

        if let Some(existing) = discover_config(&self.project_root) {
            if !self.args.force {
                ui.warning(&format!(
                    "Configuration already exists at {}. Use --force to overwrite.",
                    existing.display()
                ));
                return Ok(CommandResult::failure(EXIT_FAILURE));
            }
        }

        let content = Self::render_starter(&self.project_name())?;
        fs::write(&target, content)?;

        ui.success(&format!("Created {}", target.display()));
        ui.message("");
        ui.message("Next steps:");
        ui.message("  Edit setup_steps to match your project");
        ui.message("  Run 'rigup plan' to preview the execution order");
        ui.message("  Run 'rigup setup --no-clone' to run the steps here");

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, validate_config};
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn init_command_creation() {
        let temp = TempDir::new().unwrap();
        let cmd = InitCommand::new(temp.path(), InitArgs::default());
        assert_eq!(cmd.project_root(), temp.path());
        assert!(!cmd.args().force);
    }

    #[test]
    fn starter_config_is_valid() {
        let content = InitCommand::render_starter("widget").unwrap();
        assert!(!content.contains(PROJECT_NAME_PLACEHOLDER));

        let config = parse_config(&content, Path::new("rigup.yml")).unwrap();
        assert_eq!(config.name.as_deref(), Some("widget"));
        assert!(validate_config(&config).is_empty());
        assert!(!config.setup_steps.is_empty());
    }

    #[test]
    fn init_writes_config() {
        let temp = TempDir::new().unwrap();
        let cmd = InitCommand::new(temp.path(), InitArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(temp.path().join("rigup.yml").exists());
        assert!(ui.has_success("Created"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rigup.yml"), "name: mine\n").unwrap();
        let cmd = InitCommand::new(temp.path(), InitArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("--force"));
        let content = fs::read_to_string(temp.path().join("rigup.yml")).unwrap();
        assert_eq!(content, "name: mine\n");
    }

    #[test]
    fn init_force_overwrites() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rigup.yml"), "name: mine\n").unwrap();
        let cmd = InitCommand::new(temp.path(), InitArgs { force: true });
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        let content = fs::read_to_string(temp.path().join("rigup.yml")).unwrap();
        assert!(content.contains("setup_steps:"));
    }
}
