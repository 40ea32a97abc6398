//! Configuration schema definitions for rigup.
//!
//! This module contains the struct definitions that map to the YAML/JSON
//! configuration file format. These are the raw, user-facing shapes; the
//! validated form used by the engine lives in [`crate::steps::model`].

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Root configuration structure for rigup.yml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RigupConfig {
    /// Project name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Short project description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Git URL of the repository to clone before running setup steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Branch or tag to check out when cloning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Setup steps, executed in dependency order
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    #[schemars(with = "Option<Vec<StepConfig>>")]
    pub setup_steps: Vec<StepConfig>,
}

/// The closed set of step kinds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    /// Run a package manager (`npm install`, `bundle install`, ...)
    PackageManager,
    /// Run an arbitrary shell command
    #[default]
    Shell,
    /// Run `docker compose <command>`
    DockerCompose,
    /// Run `docker <command>`
    Docker,
    /// Run a database tool (`psql`, `mysql`, migrations, ...)
    Database,
    /// Start or manage a background service
    Service,
    /// Ask the user to pick a branch of actions
    Choice,
}

impl StepType {
    /// All step types, in declaration order.
    pub const ALL: [StepType; 7] = [
        StepType::PackageManager,
        StepType::Shell,
        StepType::DockerCompose,
        StepType::Docker,
        StepType::Database,
        StepType::Service,
        StepType::Choice,
    ];

    /// The name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::PackageManager => "package-manager",
            StepType::Shell => "shell",
            StepType::DockerCompose => "docker-compose",
            StepType::Docker => "docker",
            StepType::Database => "database",
            StepType::Service => "service",
            StepType::Choice => "choice",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single setup step as written in the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepConfig {
    /// Step name, unique within its list
    pub name: String,

    /// Step kind
    #[serde(rename = "type")]
    pub step_type: StepType,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool that runs the command (package manager, database client, service manager)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,

    /// Command (or arguments for the manager/tool)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Question shown for `choice` steps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Branches of a `choice` step
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    #[schemars(with = "Option<Vec<ChoiceConfig>>")]
    pub choices: Vec<ChoiceConfig>,

    /// Value of the choice picked when no one can be asked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Names of steps that must complete before this one
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "null_as_empty"
    )]
    #[schemars(with = "Option<Vec<String>>")]
    pub depends_on: Vec<String>,

    /// Extra environment variables for the command
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// One branch of a `choice` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceConfig {
    /// Label shown to the user
    pub name: String,

    /// Stable identifier returned by the prompt
    pub value: String,

    /// Steps to run, in order, when this branch is selected
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Option<Vec<StepConfig>>")]
    pub actions: Vec<StepConfig>,
}

/// Read an explicit `null` list as empty, the way YAML already does.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
