//! rigup - Clone a project and run its setup steps.
//!
//! A project describes its local setup in `rigup.yml`: an ordered list of
//! typed steps (package installs, shell commands, docker, databases,
//! services) with `depends_on` edges and interactive choice steps that
//! branch into nested actions. rigup validates the list, orders it with a
//! deterministic topological sort and runs it, stopping at the first
//! failure.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`git`] - Repository cloning
//! - [`runner`] - Dependency graph, scheduling and the setup engine
//! - [`shell`] - Shell command execution
//! - [`steps`] - Step model and executors
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use rigup::config::{StepConfig, StepType};
//! use rigup::runner::SetupEngine;
//! use rigup::steps::Step;
//!
//! let shell = |name: &str, deps: &[&str]| StepConfig {
//!     name: name.to_string(),
//!     step_type: StepType::Shell,
//!     command: Some("true".to_string()),
//!     depends_on: deps.iter().map(|d| d.to_string()).collect(),
//!     ..Default::default()
//! };
//!
//! let steps = Step::from_configs(&[
//!     shell("migrate", &["install"]),
//!     shell("install", &[]),
//!     shell("lint", &[]),
//! ])
//! .unwrap();
//!
//! let plan = SetupEngine::plan(&steps).unwrap();
//! assert_eq!(plan, vec!["install", "migrate", "lint"]);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{Result, RigupError};
