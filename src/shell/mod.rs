//! Shell command execution and platform checks.

pub mod command;
pub mod platform;

pub use command::{execute, execute_with, CommandOptions, Shell, ShellOutcome};
pub use platform::{is_ci, parse_system_path, resolve_tool_path, tool_available};
