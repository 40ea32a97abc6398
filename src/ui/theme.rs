//! Visual theme and the framed blocks built from it.

use console::Style;

use crate::steps::{format_duration, StepStatus};

use super::RunSummary;

const FRAME_WIDTH: usize = 38;

/// rigup's visual theme.
#[derive(Debug, Clone)]
pub struct RigupTheme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    /// Secondary text: pending steps, durations, details.
    pub dim: Style,
    pub header: Style,
    /// Commands echoed in error blocks.
    pub command: Style,
    /// Box-drawing borders.
    pub border: Style,
}

impl Default for RigupTheme {
    fn default() -> Self {
        Self::detect()
    }
}

impl RigupTheme {
    /// Colored theme.
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            command: Style::new().dim().italic(),
            border: Style::new().dim(),
        }
    }

    /// Theme without any styling.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            command: Style::new(),
            border: Style::new(),
        }
    }

    /// Colored when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        if should_use_colors() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Style for a step in the given status.
    pub fn status_style(&self, status: StepStatus) -> &Style {
        match status {
            StepStatus::Completed => &self.success,
            StepStatus::Failed => &self.error,
            StepStatus::Pending => &self.dim,
        }
    }

    /// Styled status glyph.
    pub fn status_icon(&self, status: StepStatus) -> String {
        self.status_style(status)
            .apply_to(status.display_char())
            .to_string()
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.success.apply_to(format!("✓ {}", msg)).to_string()
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(format!("⚠ {}", msg)).to_string()
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(format!("✗ {}", msg)).to_string()
    }

    /// Header banner, e.g. `▲ Setting up widget`.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▲"), self.header.apply_to(title))
    }

    /// Framed block showing a failed command and the tail of its output.
    pub fn error_block(&self, command: &str, output: &str) -> Vec<String> {
        let mut frame = Frame::new(self, 4, "Command");
        frame.row(self.command.apply_to(command).to_string());
        if !output.is_empty() {
            frame.divider(Some("Output"));
            for line in output.lines() {
                frame.row(line.to_string());
            }
        }
        frame.close()
    }

    /// Framed end-of-run table: one row per plan step, then the totals.
    pub fn summary_block(&self, summary: &RunSummary) -> Vec<String> {
        let mut frame = Frame::new(self, 2, "Summary");
        for line in &summary.lines {
            let right_side = match (&line.detail, line.duration) {
                (Some(detail), _) => detail.clone(),
                (None, Some(duration)) => format_duration(duration),
                (None, None) => String::new(),
            };
            frame.row(format!(
                "{} {:<20} {}",
                self.status_icon(line.status),
                line.name,
                self.dim.apply_to(right_side)
            ));
        }
        frame.divider(None);
        frame.row(summary.footer());
        frame.close()
    }
}

/// Box-drawn frame with a title, rows and optional dividers.
struct Frame<'t> {
    theme: &'t RigupTheme,
    pad: String,
    lines: Vec<String>,
}

impl<'t> Frame<'t> {
    fn new(theme: &'t RigupTheme, indent: usize, title: &str) -> Self {
        let mut frame = Self {
            theme,
            pad: " ".repeat(indent),
            lines: Vec::new(),
        };
        frame.edge("┌─", Some(title));
        frame
    }

    fn edge(&mut self, corner: &str, title: Option<&str>) {
        let label = match title {
            Some(title) => format!("{} ", title),
            None => String::new(),
        };
        let fill = "─".repeat(FRAME_WIDTH.saturating_sub(label.chars().count() + 2));
        self.lines.push(format!(
            "{}{}",
            self.pad,
            self.theme.border.apply_to(format!("{}{}{}", corner, label, fill))
        ));
    }

    fn row(&mut self, text: String) {
        self.lines
            .push(format!("{}{} {}", self.pad, self.theme.border.apply_to("│"), text));
    }

    fn divider(&mut self, title: Option<&str>) {
        self.edge("├─", title);
    }

    fn close(mut self) -> Vec<String> {
        self.edge("└─", None);
        self.lines
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
