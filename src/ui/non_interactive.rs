//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{Result, RigupError};

use super::theme::RigupTheme;
use super::{OutputMode, Prompt, RunSummary, SpinnerHandle, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const CHOICE_ENV_PREFIX: &str = "RIGUP_CHOICE_";

/// Environment variable that answers the prompt with the given key.
///
/// The key is uppercased and every character outside `[A-Z0-9]` becomes
/// `_`, so the `database` step reads `RIGUP_CHOICE_DATABASE` and
/// `cache-store` reads `RIGUP_CHOICE_CACHE_STORE`.
pub fn choice_env_key(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{}{}", CHOICE_ENV_PREFIX, normalized)
}

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `RIGUP_CHOICE_*` variables, then from the
/// prompt's default. A prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with(CHOICE_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }

    fn answer(&self, prompt: &Prompt) -> Option<String> {
        self.env_overrides
            .get(&choice_env_key(&prompt.key))
            .map(|v| v.trim().to_string())
            .or_else(|| prompt.default.clone())
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<String> {
        self.answer(prompt)
            .ok_or_else(|| RigupError::StepExecutionError {
                step: prompt.key.clone(),
                message: format!(
                    "cannot prompt in non-interactive mode (set {} or a default)",
                    choice_env_key(&prompt.key)
                ),
            })
    }

    fn start_spinner(&mut self, message: &str, indent: usize) -> Box<dyn SpinnerHandle> {
        let show = self.mode.shows_spinners();
        if show {
            println!("{}{}", " ".repeat(indent), message);
        }
        Box::new(NoopSpinner { indent, show })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", RigupTheme::plain().format_header(title));
        }
    }

    fn show_error_block(&mut self, command: &str, output: &str) {
        for line in RigupTheme::plain().error_block(command, output) {
            eprintln!("{}", line);
        }
    }

    fn show_run_summary(&mut self, summary: &RunSummary) {
        if self.mode.shows_status() {
            println!();
            for line in RigupTheme::plain().summary_block(summary) {
                println!("{}", line);
            }
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner that prints only the final status line.
struct NoopSpinner {
    indent: usize,
    show: bool,
}

impl SpinnerHandle for NoopSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if self.show {
            let prefix = " ".repeat(self.indent);
            println!("{}{}", prefix, RigupTheme::plain().format_success(msg));
        }
    }

    fn finish_error(&mut self, msg: &str) {
        let prefix = " ".repeat(self.indent);
        eprintln!("{}{}", prefix, RigupTheme::plain().format_error(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(key: &str, default: Option<&str>) -> Prompt {
        Prompt {
            key: key.to_string(),
            question: "Which database?".to_string(),
            options: vec![],
            default: default.map(String::from),
        }
    }

    #[test]
    fn non_interactive_is_not_interactive() {
        let ui = NonInteractiveUI::new(OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn env_key_is_normalized() {
        assert_eq!(choice_env_key("database"), "RIGUP_CHOICE_DATABASE");
        assert_eq!(choice_env_key("cache-store"), "RIGUP_CHOICE_CACHE_STORE");
        assert_eq!(choice_env_key("db v2"), "RIGUP_CHOICE_DB_V2");
    }

    #[test]
    fn prompt_uses_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui.prompt(&select("db", Some("sqlite"))).unwrap();
        assert_eq!(result, "sqlite");
    }

    #[test]
    fn prompt_fails_without_default() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let err = ui.prompt(&select("db", None)).unwrap_err();
        assert!(err.to_string().contains("RIGUP_CHOICE_DB"));
    }

    #[test]
    fn prompt_uses_env_override() {
        let mut overrides = HashMap::new();
        overrides.insert("RIGUP_CHOICE_DB".to_string(), " postgres ".to_string());

        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);
        let result = ui.prompt(&select("db", Some("sqlite"))).unwrap();
        assert_eq!(result, "postgres");
    }

    #[test]
    fn output_mode_preserved() {
        let ui = NonInteractiveUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn noop_spinner_methods() {
        let mut spinner = NoopSpinner {
            indent: 2,
            show: true,
        };
        spinner.set_message("test");
        spinner.finish_success("done");
        spinner.finish_error("failed");
    }
}
