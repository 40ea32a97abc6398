//! Output verbosity.

/// How much a run prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Stream step output live and show the plan before running.
    Verbose,
    /// Spinners, per-step status and the summary.
    #[default]
    Normal,
    /// Like normal; reserved for trimming status lines.
    Quiet,
    /// Errors only.
    Silent,
}

impl OutputMode {
    /// Mode selected by the global `--verbose`/`--quiet` flags.
    ///
    /// `--quiet` wins when both are given.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Self::Quiet,
            (true, false) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// Whether step commands inherit the terminal instead of being captured.
    pub fn streams_step_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether progress spinners are drawn.
    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Silent)
    }

    /// Whether status messages are printed.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Silent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_select_mode() {
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Normal);
        assert_eq!(OutputMode::from_flags(true, false), OutputMode::Verbose);
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Quiet);
    }

    #[test]
    fn silent_prints_nothing_but_errors() {
        assert!(!OutputMode::Silent.shows_status());
        assert!(!OutputMode::Silent.shows_spinners());
        assert!(OutputMode::Quiet.shows_status());
    }

    #[test]
    fn only_verbose_streams_step_output() {
        assert!(OutputMode::Verbose.streams_step_output());
        assert!(!OutputMode::Normal.streams_step_output());
    }
}
