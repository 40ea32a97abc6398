//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// rigup - Clone a project and run its setup steps.
#[derive(Debug, Parser)]
#[command(name = "rigup")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides discovery of rigup.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project directory (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clone the repository and run setup steps (default if no command specified)
    Setup(SetupArgs),

    /// Show the execution plan without running anything
    Plan(PlanArgs),

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Write a starter rigup.yml
    Init(InitArgs),

    /// Print the JSON Schema of the configuration file
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `setup` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SetupArgs {
    /// Directory to clone into (defaults to ./<repository name>)
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Run steps in the project directory instead of cloning
    #[arg(long)]
    pub no_clone: bool,

    /// Preview commands without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; answer choices from --choose, RIGUP_CHOICE_* or defaults
    #[arg(long)]
    pub non_interactive: bool,

    /// Pre-select a choice (repeatable), e.g. --choose database=postgres
    #[arg(long, value_name = "STEP=VALUE")]
    pub choose: Vec<String>,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ValidateArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Overwrite existing configuration
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["rigup"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn setup_parses_flags() {
        let cli = Cli::parse_from([
            "rigup",
            "setup",
            "--target",
            "work/app",
            "--dry-run",
            "--non-interactive",
            "--choose",
            "database=sqlite",
            "--choose",
            "cache=redis",
        ]);
        match cli.command {
            Some(Commands::Setup(args)) => {
                assert_eq!(args.target, Some(PathBuf::from("work/app")));
                assert!(args.dry_run);
                assert!(args.non_interactive);
                assert!(!args.no_clone);
                assert_eq!(args.choose, vec!["database=sqlite", "cache=redis"]);
            }
            other => panic!("expected setup, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["rigup", "plan", "--config", "x.yml", "--debug"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.yml")));
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Plan(_))));
    }

    #[test]
    fn completions_requires_known_shell() {
        assert!(Cli::try_parse_from(["rigup", "completions", "bash"]).is_ok());
        assert!(Cli::try_parse_from(["rigup", "completions", "tcsh"]).is_err());
    }
}
