//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use super::theme::RigupTheme;
use super::SpinnerHandle;

/// Spinner shown while a step or clone runs.
pub struct ProgressSpinner {
    bar: ProgressBar,
    indent: usize,
    theme: RigupTheme,
}

impl ProgressSpinner {
    /// Start a spinner for a step, indented by `indent` spaces.
    ///
    /// The finish line is rendered with `theme`, so nested choice actions
    /// stay aligned under their choice step.
    pub fn start(message: &str, indent: usize, theme: &RigupTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        let prefix = " ".repeat(indent);
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template(&format!("{}{{spinner:.cyan}} {{msg}}", prefix))
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            indent,
            theme: theme.clone(),
        }
    }

    /// Spinner that draws nothing (silent mode).
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            indent: 0,
            theme: RigupTheme::plain(),
        }
    }

    fn finish_with(&mut self, formatted: String) {
        let prefix = " ".repeat(self.indent);
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar
            .finish_with_message(format!("{}{}", prefix, formatted));
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let formatted = self.theme.format_success(msg);
        self.finish_with(formatted);
    }

    fn finish_error(&mut self, msg: &str) {
        let formatted = self.theme.format_error(msg);
        self.finish_with(formatted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_accepts_updates() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Cloning");
        spinner.finish_success("Cloned");
    }

    #[test]
    fn spinner_finish_error() {
        let mut spinner = ProgressSpinner::start("[1/2] install", 0, &RigupTheme::plain());
        spinner.finish_error("install failed");
    }

    #[test]
    fn indented_spinner_finishes() {
        let mut spinner = ProgressSpinner::start("create-db", 2, &RigupTheme::plain());
        spinner.set_message("create-db (retry)");
        spinner.finish_success("create-db (12ms)");
    }
}
