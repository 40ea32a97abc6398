//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, SetupArgs};
use crate::config::{load_config, RigupConfig};
use crate::error::Result;
use crate::ui::UserInterface;

/// Exit code for step failures and invalid configuration.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code when no configuration file can be found.
pub const EXIT_NO_CONFIG: i32 = 2;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command finds its project and configuration.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project directory (config discovery, `init`, default clone parent).
    pub root: PathBuf,
    /// Explicit config file from `--config`.
    pub config: Option<PathBuf>,
}

impl ProjectPaths {
    /// Create paths with no config override.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
        }
    }

    /// Load the configuration, honoring the override.
    pub fn load(&self) -> Result<(PathBuf, RigupConfig)> {
        let config = self.config.as_ref().map(|p| self.root.join(p));
        load_config(&self.root, config.as_deref())
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    paths: ProjectPaths,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            paths: ProjectPaths::new(project_root),
        }
    }

    /// Use an explicit config file instead of discovery.
    pub fn with_config(mut self, config: Option<PathBuf>) -> Self {
        self.paths.config = config;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.paths.root
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Setup(args)) => {
                let cmd = super::setup::SetupCommand::new(self.paths.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Plan(args)) => {
                let cmd = super::plan::PlanCommand::new(self.paths.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Validate(args)) => {
                let cmd = super::validate::ValidateCommand::new(self.paths.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Init(args)) => {
                let cmd = super::init::InitCommand::new(&self.paths.root, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Schema) => super::schema::SchemaCommand.execute(ui),
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to setup with default args
                let cmd = super::setup::SetupCommand::new(self.paths.clone(), SetupArgs::default());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(EXIT_NO_CONFIG);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_root(), Path::new("/test"));
    }

    #[test]
    fn relative_config_override_is_resolved_against_root() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("custom.yml"), "name: Custom").unwrap();

        let paths = ProjectPaths {
            root: temp.path().to_path_buf(),
            config: Some(PathBuf::from("custom.yml")),
        };
        let (path, config) = paths.load().unwrap();
        assert_eq!(path, temp.path().join("custom.yml"));
        assert_eq!(config.name.as_deref(), Some("Custom"));
    }

    #[test]
    fn default_command_without_config_exits_2() {
        let temp = TempDir::new().unwrap();
        let dispatcher = CommandDispatcher::new(temp.path().to_path_buf());
        let cli = Cli::parse_from(["rigup"]);
        let mut ui = MockUI::new();

        let result = dispatcher.dispatch(&cli, &mut ui).unwrap();
        assert_eq!(result.exit_code, EXIT_NO_CONFIG);
        assert!(ui.has_error("No configuration found"));
    }
}
