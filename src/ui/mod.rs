//! Interactive user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//!
//! # Example
//!
//! ```
//! use rigup::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("My App");
//! ui.success("Setup complete!");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, RigupTheme};

use std::time::Duration;

use crate::error::Result;
use crate::steps::StepStatus;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Ask a select prompt and return the chosen option's value.
    fn prompt(&mut self, prompt: &Prompt) -> Result<String>;

    /// Start a spinner for an operation, indented by `indent` spaces.
    fn start_spinner(&mut self, message: &str, indent: usize) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show the command and output of a failed step.
    fn show_error_block(&mut self, command: &str, output: &str);

    /// Show the end-of-run summary.
    fn show_run_summary(&mut self, summary: &RunSummary);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);
}

/// A select prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for environment overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Options in display order.
    pub options: Vec<PromptOption>,
    /// Value selected if the user just presses enter.
    pub default: Option<String>,
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Display label.
    pub label: String,
    /// Value returned when selected.
    pub value: String,
}

/// One row of the end-of-run summary.
#[derive(Debug, Clone)]
pub struct SummaryLine {
    /// Step name.
    pub name: String,
    /// Final status; `Pending` for steps that never ran.
    pub status: StepStatus,
    /// How long the step took, if it ran.
    pub duration: Option<Duration>,
    /// Extra detail (selected option, failure reason).
    pub detail: Option<String>,
}

/// Data for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rows in plan order.
    pub lines: Vec<SummaryLine>,
    /// Wall-clock time for the whole run.
    pub total_duration: Duration,
}

impl RunSummary {
    /// Number of rows with the given status.
    pub fn count(&self, status: StepStatus) -> usize {
        self.lines.iter().filter(|l| l.status == status).count()
    }

    /// Footer text: "Total: 1.2s · 3 run · 1 failed · 2 not run".
    pub fn footer(&self) -> String {
        let ran = self.count(StepStatus::Completed) + self.count(StepStatus::Failed);
        let mut footer = format!(
            "Total: {} · {} run",
            crate::steps::format_duration(self.total_duration),
            ran
        );
        let failed = self.count(StepStatus::Failed);
        if failed > 0 {
            footer.push_str(&format!(" · {} failed", failed));
        }
        let pending = self.count(StepStatus::Pending);
        if pending > 0 {
            footer.push_str(&format!(" · {} not run", pending));
        }
        footer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, status: StepStatus) -> SummaryLine {
        SummaryLine {
            name: name.to_string(),
            status,
            duration: None,
            detail: None,
        }
    }

    #[test]
    fn summary_counts_by_status() {
        let summary = RunSummary {
            lines: vec![
                line("a", StepStatus::Completed),
                line("b", StepStatus::Failed),
                line("c", StepStatus::Pending),
                line("d", StepStatus::Pending),
            ],
            total_duration: Duration::from_millis(250),
        };
        assert_eq!(summary.count(StepStatus::Pending), 2);
        assert_eq!(
            summary.footer(),
            "Total: 250ms · 2 run · 1 failed · 2 not run"
        );
    }

    #[test]
    fn summary_footer_omits_zero_counts() {
        let summary = RunSummary {
            lines: vec![line("a", StepStatus::Completed)],
            total_duration: Duration::from_millis(5),
        };
        assert_eq!(summary.footer(), "Total: 5ms · 1 run");
    }
}
