//! Schema command implementation.
//!
//! The `rigup schema` command prints the JSON Schema of `rigup.yml`, for
//! editor integration.

use crate::config::RigupConfig;
use crate::error::{Result, RigupError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl SchemaCommand {
    /// Render the configuration schema as pretty-printed JSON.
    pub fn render() -> Result<String> {
        let schema = schemars::schema_for!(RigupConfig);
        serde_json::to_string_pretty(&schema).map_err(|e| RigupError::Other(e.into()))
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&Self::render()?);
        Ok(CommandResult::success())
    }
}
