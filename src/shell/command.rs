//! Running step command lines through the user's shell.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Result, RigupError};

/// The shell a command line is handed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    /// `$SHELL -lc`, or `/bin/sh -lc` when `SHELL` is unset.
    ///
    /// A login shell puts version managers activated in the user's
    /// profile (mise, asdf, nvm, rbenv) on `PATH`.
    Posix(String),
    /// `%COMSPEC% /C`.
    Cmd(String),
}

impl Shell {
    /// The shell for this platform and environment.
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Cmd(std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string()))
        } else {
            Self::Posix(
                std::env::var("SHELL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "/bin/sh".to_string()),
            )
        }
    }

    fn command(&self, line: &str) -> Command {
        let (program, flag) = match self {
            Self::Posix(program) => (program, "-lc"),
            Self::Cmd(program) => (program, "/C"),
        };
        let mut cmd = Command::new(program);
        cmd.arg(flag).arg(line);
        cmd
    }
}

/// How a command line is run.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory; inherits ours when unset.
    pub cwd: Option<PathBuf>,
    /// Variables added to the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Pipe stdout and stderr instead of sharing the terminal.
    pub capture: bool,
}

/// What a finished command line produced.
#[derive(Debug, Clone)]
pub struct ShellOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured stdout; empty when not captured.
    pub stdout: String,
    /// Captured stderr; empty when not captured.
    pub stderr: String,
    /// Wall-clock time from spawn to exit.
    pub duration: Duration,
}

impl ShellOutcome {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// The last `max_lines` lines of stderr, or of stdout when stderr is
    /// empty. This is what a failed step shows under its command.
    pub fn output_tail(&self, max_lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let lines: Vec<&str> = source.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        lines[start..].join("\n")
    }
}

/// Run `line` through the detected [`Shell`].
///
/// A non-zero exit is an `Ok` outcome; `Err` means the shell itself could
/// not be started.
pub fn execute(line: &str, options: &CommandOptions) -> Result<ShellOutcome> {
    execute_with(&Shell::detect(), line, options)
}

/// Run `line` through an explicit shell.
pub fn execute_with(shell: &Shell, line: &str, options: &CommandOptions) -> Result<ShellOutcome> {
    let mut cmd = shell.command(line);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(&options.env);
    cmd.stdin(Stdio::inherit());

    let stdio = || {
        if options.capture {
            Stdio::piped()
        } else {
            Stdio::inherit()
        }
    };
    cmd.stdout(stdio()).stderr(stdio());

    let start = Instant::now();
    let output = cmd.output().map_err(|e| {
        debug!("Failed to spawn '{}' via {:?}: {}", line, shell, e);
        RigupError::CommandFailed {
            command: line.to_string(),
            code: None,
        }
    })?;

    Ok(ShellOutcome {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration: start.elapsed(),
    })
}
