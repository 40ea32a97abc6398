//! Error types for rigup operations.
//!
//! This module defines [`RigupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `RigupError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `RigupError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for rigup operations.
#[derive(Debug, Error)]
pub enum RigupError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A `depends_on` entry names a step that does not exist in the same list.
    #[error("Missing dependency: step '{step}' depends on unknown step '{dependency}'")]
    MissingDependency { step: String, dependency: String },

    /// Two steps in the same list share a name.
    #[error("Duplicate step name: '{name}'")]
    DuplicateStep { name: String },

    /// Step dependency cycle detected.
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// Step execution failed.
    #[error("Step '{step}' failed: {message}")]
    StepExecutionError { step: String, message: String },

    /// Shell command could not be run.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Repository clone failed.
    #[error("Failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RigupError {
    /// Whether this error is a configuration problem detected before execution.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RigupError::ConfigNotFound { .. }
                | RigupError::ConfigParseError { .. }
                | RigupError::ConfigValidationError { .. }
                | RigupError::MissingDependency { .. }
                | RigupError::DuplicateStep { .. }
                | RigupError::CircularDependency { .. }
        )
    }
}

/// Result type alias for rigup operations.
pub type Result<T> = std::result::Result<T, RigupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = RigupError::ConfigNotFound {
            path: PathBuf::from("/foo/rigup.yml"),
        };
        assert!(err.to_string().contains("/foo/rigup.yml"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = RigupError::ConfigParseError {
            path: PathBuf::from("/rigup.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/rigup.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn missing_dependency_names_both_steps() {
        let err = RigupError::MissingDependency {
            step: "migrate".into(),
            dependency: "database".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Missing dependency"));
        assert!(msg.contains("migrate"));
        assert!(msg.contains("database"));
    }

    #[test]
    fn duplicate_step_displays_name() {
        let err = RigupError::DuplicateStep {
            name: "install".into(),
        };
        assert!(err.to_string().contains("install"));
    }

    #[test]
    fn circular_dependency_displays_cycle() {
        let err = RigupError::CircularDependency {
            cycle: "a -> b -> a".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Circular dependency detected"));
        assert!(msg.contains("a -> b -> a"));
    }

    #[test]
    fn step_execution_error_displays_step_and_message() {
        let err = RigupError::StepExecutionError {
            step: "install_deps".into(),
            message: "npm not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("install_deps"));
        assert!(msg.contains("npm not found"));
    }

    #[test]
    fn clone_failed_displays_url() {
        let err = RigupError::CloneFailed {
            url: "https://example.com/app.git".into(),
            message: "repository not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/app.git"));
        assert!(msg.contains("repository not found"));
    }

    #[test]
    fn config_errors_are_classified() {
        assert!(RigupError::CircularDependency { cycle: "x".into() }.is_config_error());
        assert!(RigupError::DuplicateStep { name: "x".into() }.is_config_error());
        assert!(!RigupError::StepExecutionError {
            step: "x".into(),
            message: "y".into()
        }
        .is_config_error());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: RigupError = io_err.into();
        assert!(matches!(err, RigupError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: RigupError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, RigupError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
