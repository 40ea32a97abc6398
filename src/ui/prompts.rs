//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use crate::error::{Result, RigupError};

use super::{Prompt, PromptOption};

/// Convert dialoguer errors to RigupError.
fn map_dialoguer_err(e: dialoguer::Error) -> RigupError {
    RigupError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Index of the option whose value matches the default, or the first option.
pub(crate) fn default_index(options: &[PromptOption], default: Option<&str>) -> usize {
    default
        .and_then(|d| options.iter().position(|o| o.value == d))
        .unwrap_or(0)
}

/// Show a select prompt and return the chosen option's value.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<String> {
    let options = &prompt.options;
    if options.is_empty() {
        return Err(RigupError::Other(anyhow::anyhow!(
            "prompt '{}' has no options",
            prompt.key
        )));
    }

    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();

    let selection = Select::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .items(&labels)
        .default(default_index(options, prompt.default.as_deref()))
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(options[selection].value.clone())
}
