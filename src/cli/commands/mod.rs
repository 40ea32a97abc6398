//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`rigup setup`, `rigup plan`)
//! - Shared config discovery through [`ProjectPaths`]
//! - Consistent exit codes

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod init;
pub mod plan;
pub mod schema;
pub mod setup;
pub mod validate;

pub use dispatcher::{
    Command, CommandDispatcher, CommandResult, ProjectPaths, EXIT_FAILURE, EXIT_NO_CONFIG,
};
