//! Configuration loading, parsing, and validation for rigup.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use rigup::config::{load_config, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("rigup.yml"),
//!     "name: demo\nsetup_steps:\n  - name: hello\n    type: shell\n    command: echo hi\n",
//! )
//! .unwrap();
//!
//! let (_, config) = load_config(temp.path(), None).unwrap();
//! validate(&config).unwrap();
//! assert_eq!(config.name, Some("demo".to_string()));
//! ```
//!
//! # Configuration File Locations
//!
//! The first of these files found in the project directory is used:
//! 1. `rigup.yml`
//! 2. `rigup.yaml`
//! 3. `rigup.json`
//! 4. `.rigup.yml`

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{
    discover_config, load_config, load_config_file, parse_config, ConfigFormat, CONFIG_FILE_NAMES,
};
pub use schema::{ChoiceConfig, RigupConfig, StepConfig, StepType};
pub use validator::{validate, validate_config, ValidationError};
