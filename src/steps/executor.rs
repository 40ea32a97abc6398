//! Step executors and the registry that dispatches steps to them.
//!
//! Each executable step kind is bound to exactly one [`StepExecutor`]
//! implementation in an [`ExecutorRegistry`]. Choice steps are never
//! executed directly; [`ExecutorRegistry::dispatch`] routes them to the
//! caller's choice resolver instead.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::config::schema::StepType;
use crate::error::{RigupError, Result};
use crate::shell::{execute, tool_available, CommandOptions};
use crate::steps::model::{Choice, Step, StepKind};

/// Number of output lines kept in a failure message.
const FAILURE_OUTPUT_LINES: usize = 20;

/// Outcome of a step as shown in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Step never ran.
    Pending,

    /// Step completed successfully.
    Completed,

    /// Step failed.
    Failed,
}

impl StepStatus {
    /// Get a display character for this status.
    pub fn display_char(&self) -> char {
        match self {
            StepStatus::Pending => '○',
            StepStatus::Completed => '✓',
            StepStatus::Failed => '✗',
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Result of executing a step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Step name.
    pub name: String,

    /// Whether the step succeeded.
    pub success: bool,

    /// Execution duration.
    pub duration: Duration,

    /// Exit code (if a command was run).
    pub exit_code: Option<i32>,

    /// The command line that ran (or would have run).
    pub command: Option<String>,

    /// Error message (if failed).
    pub error: Option<String>,

    /// Captured output (if available).
    pub output: Option<String>,
}

impl StepResult {
    /// Create a success result.
    pub fn success(
        name: &str,
        duration: Duration,
        exit_code: Option<i32>,
        output: Option<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            duration,
            exit_code,
            command: None,
            error: None,
            output,
        }
    }

    /// Create a failure result.
    pub fn failure(name: &str, duration: Duration, error: String, output: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration,
            exit_code: None,
            command: None,
            error: Some(error),
            output,
        }
    }

    /// Attach the command line to this result.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Get the status of this result.
    pub fn status(&self) -> StepStatus {
        if self.success {
            StepStatus::Completed
        } else {
            StepStatus::Failed
        }
    }

    /// Failure message including captured output, for error reporting.
    pub fn failure_message(&self) -> String {
        let error = self.error.as_deref().unwrap_or("unknown error");
        match self.output.as_deref().map(str::trim) {
            Some(output) if !output.is_empty() => format!("{}\n{}", error, output),
            _ => error.to_string(),
        }
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let status = self.status();

        match status {
            StepStatus::Completed => format!(
                "{} {} ({})",
                status.display_char(),
                self.name,
                format_duration(self.duration)
            ),
            _ => {
                let error = self.error.as_deref().unwrap_or("unknown error");
                format!("{} {} - {}", status.display_char(), self.name, error)
            }
        }
    }
}

/// Format a duration for display (`250ms`, `1.2s`, `2m 5s`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

/// Everything an executor needs besides the step itself.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Directory the step runs in (the cloned repository root).
    pub workdir: PathBuf,

    /// Report what would run instead of running it.
    pub dry_run: bool,

    /// Capture output instead of streaming it to the terminal.
    pub capture_output: bool,

    /// Environment applied to every step, before the step's own `env`.
    pub env: BTreeMap<String, String>,
}

impl ExecutionContext {
    /// Create a context for the given working directory.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            capture_output: true,
            ..Default::default()
        }
    }

    /// Get the working directory.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

/// Carries out one kind of step.
///
/// Executors report a failed command as `Ok` with an unsuccessful
/// [`StepResult`]; `Err` is reserved for steps that could not be started.
/// Callers treat both as a failure of the step.
pub trait StepExecutor {
    /// Execute the step in the context's working directory.
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult>;
}

/// Runs `shell` steps: the command is passed to the shell verbatim.
#[derive(Debug, Default)]
pub struct ShellExecutor;

/// Runs `package-manager` steps as `<manager> <command>`.
#[derive(Debug, Default)]
pub struct PackageManagerExecutor;

/// Runs `docker-compose` steps as `docker compose <command>`.
#[derive(Debug, Default)]
pub struct DockerComposeExecutor;

/// Runs `docker` steps as `docker <command>`.
#[derive(Debug, Default)]
pub struct DockerExecutor;

/// Runs `database` steps through the configured client, if any.
#[derive(Debug, Default)]
pub struct DatabaseExecutor;

/// Runs `service` steps through the configured service manager, if any.
#[derive(Debug, Default)]
pub struct ServiceExecutor;

impl StepExecutor for ShellExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        let StepKind::Shell { command } = &step.kind else {
            return Err(kind_mismatch(step, StepType::Shell));
        };
        run_command_line(step, context, None, command)
    }
}

impl StepExecutor for PackageManagerExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        let StepKind::PackageManager { manager, command } = &step.kind else {
            return Err(kind_mismatch(step, StepType::PackageManager));
        };
        let line = format!("{} {}", manager, command);
        run_command_line(step, context, step.kind.program(), &line)
    }
}

impl StepExecutor for DockerComposeExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        let StepKind::DockerCompose { command } = &step.kind else {
            return Err(kind_mismatch(step, StepType::DockerCompose));
        };
        let line = format!("docker compose {}", command);
        run_command_line(step, context, Some("docker"), &line)
    }
}

impl StepExecutor for DockerExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        let StepKind::Docker { command } = &step.kind else {
            return Err(kind_mismatch(step, StepType::Docker));
        };
        let line = format!("docker {}", command);
        run_command_line(step, context, Some("docker"), &line)
    }
}

impl StepExecutor for DatabaseExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        if !matches!(step.kind, StepKind::Database { .. }) {
            return Err(kind_mismatch(step, StepType::Database));
        }
        let line = step.kind.command_line().unwrap_or_default();
        run_command_line(step, context, step.kind.program(), &line)
    }
}

impl StepExecutor for ServiceExecutor {
    fn execute(&self, step: &Step, context: &ExecutionContext) -> Result<StepResult> {
        if !matches!(step.kind, StepKind::Service { .. }) {
            return Err(kind_mismatch(step, StepType::Service));
        }
        let line = step.kind.command_line().unwrap_or_default();
        run_command_line(step, context, step.kind.program(), &line)
    }
}

fn kind_mismatch(step: &Step, expected: StepType) -> RigupError {
    RigupError::StepExecutionError {
        step: step.name.clone(),
        message: format!(
            "{} executor cannot run a {} step",
            expected,
            step.step_type()
        ),
    }
}

/// Shared command runner for all executable kinds.
fn run_command_line(
    step: &Step,
    context: &ExecutionContext,
    program: Option<&str>,
    command: &str,
) -> Result<StepResult> {
    if command.trim().is_empty() {
        return Err(RigupError::StepExecutionError {
            step: step.name.clone(),
            message: "step has no command to execute (command is empty)".to_string(),
        });
    }

    if context.dry_run {
        return Ok(StepResult::success(
            &step.name,
            Duration::ZERO,
            None,
            Some(format!("Would run: {}", command)),
        )
        .with_command(command));
    }

    if let Some(program) = program {
        if !tool_available(program, &context.workdir) {
            return Ok(StepResult::failure(
                &step.name,
                Duration::ZERO,
                format!("'{}' not found on PATH", program),
                None,
            )
            .with_command(command));
        }
    }

    let mut env = context.env.clone();
    env.extend(step.env.iter().map(|(k, v)| (k.clone(), v.clone())));

    let options = CommandOptions {
        cwd: Some(context.workdir.clone()),
        env,
        capture: context.capture_output,
    };

    debug!("Running '{}' in {}", command, context.workdir.display());
    let result = execute(command, &options)?;

    if !result.success() {
        let code = result
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let output = Some(result.output_tail(FAILURE_OUTPUT_LINES)).filter(|o| !o.is_empty());
        let mut failed = StepResult::failure(
            &step.name,
            result.duration,
            format!("'{}' exited with {}", command, code),
            output,
        )
        .with_command(command);
        failed.exit_code = result.exit_code;
        return Ok(failed);
    }

    Ok(StepResult::success(
        &step.name,
        result.duration,
        result.exit_code,
        if context.capture_output {
            Some(result.stdout)
        } else {
            None
        },
    )
    .with_command(command))
}

/// Where a step goes when it is its turn to run.
pub enum Dispatch<'a> {
    /// Run the step through this executor.
    Execute(&'a dyn StepExecutor),
    /// Ask the choice resolver, then run the selected branch.
    Choose {
        prompt: &'a str,
        default: Option<&'a str>,
        choices: &'a [Choice],
    },
}

/// Maps step kinds to their executors.
pub struct ExecutorRegistry {
    executors: HashMap<StepType, Box<dyn StepExecutor>>,
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExecutorRegistry {
    /// A registry with no executors.
    pub fn empty() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    /// The registry used by the CLI: one subprocess executor per kind.
    pub fn standard() -> Self {
        Self::empty()
            .with(StepType::Shell, ShellExecutor)
            .with(StepType::PackageManager, PackageManagerExecutor)
            .with(StepType::DockerCompose, DockerComposeExecutor)
            .with(StepType::Docker, DockerExecutor)
            .with(StepType::Database, DatabaseExecutor)
            .with(StepType::Service, ServiceExecutor)
    }

    /// Bind an executor to a step type, replacing any previous binding.
    ///
    /// Bindings for [`StepType::Choice`] are never used.
    pub fn with(mut self, step_type: StepType, executor: impl StepExecutor + 'static) -> Self {
        self.executors.insert(step_type, Box::new(executor));
        self
    }

    /// Get the executor bound to a step type.
    pub fn get(&self, step_type: StepType) -> Option<&dyn StepExecutor> {
        self.executors.get(&step_type).map(|e| e.as_ref())
    }

    /// Resolve where a step should be dispatched.
    pub fn dispatch<'a>(&'a self, step: &'a Step) -> Result<Dispatch<'a>> {
        if let StepKind::Choice {
            prompt,
            default,
            choices,
        } = &step.kind
        {
            return Ok(Dispatch::Choose {
                prompt,
                default: default.as_deref(),
                choices,
            });
        }

        self.get(step.step_type())
            .map(Dispatch::Execute)
            .ok_or_else(|| RigupError::StepExecutionError {
                step: step.name.clone(),
                message: format!("no executor registered for {} steps", step.step_type()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::StepConfig;
    use tempfile::TempDir;

    fn shell_step(name: &str, command: &str) -> Step {
        Step::from_config(&StepConfig {
            name: name.to_string(),
            step_type: StepType::Shell,
            command: Some(command.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn config_step(config: StepConfig) -> Step {
        Step::from_config(&config).unwrap()
    }

    #[test]
    fn results_map_to_finished_statuses() {
        let ok = StepResult::success("a", Duration::ZERO, None, None);
        let failed = StepResult::failure("b", Duration::ZERO, "boom".to_string(), None);

        assert_eq!(ok.status(), StepStatus::Completed);
        assert_eq!(failed.status(), StepStatus::Failed);
        assert_eq!(StepStatus::Pending.to_string(), "pending");
        assert_eq!(StepStatus::Pending.display_char(), '○');
    }

    #[test]
    fn shell_executor_runs_command_in_workdir() {
        let temp = TempDir::new().unwrap();
        let step = shell_step("write", "echo hello > out.txt && echo done");
        let context = ExecutionContext::new(temp.path());

        let result = ShellExecutor.execute(&step, &context).unwrap();

        assert!(result.success);
        assert_eq!(result.status(), StepStatus::Completed);
        assert!(temp.path().join("out.txt").exists());
        assert!(result.output.unwrap().contains("done"));
    }

    #[test]
    fn shell_executor_reports_failure() {
        let temp = TempDir::new().unwrap();
        let step = shell_step("broken", "echo boom >&2; exit 3");
        let context = ExecutionContext::new(temp.path());

        let result = ShellExecutor.execute(&step, &context).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert!(result.error.as_deref().unwrap().contains("exited with 3"));
        assert!(result.failure_message().contains("boom"));
    }

    #[test]
    fn step_env_overrides_context_env() {
        let temp = TempDir::new().unwrap();
        let mut step = shell_step("env", "echo $GREETING-$TARGET");
        step.env.insert("GREETING".to_string(), "hi".to_string());
        let mut context = ExecutionContext::new(temp.path());
        context.env.insert("GREETING".to_string(), "bye".to_string());
        context.env.insert("TARGET".to_string(), "world".to_string());

        let result = ShellExecutor.execute(&step, &context).unwrap();

        assert!(result.output.unwrap().contains("hi-world"));
    }

    #[test]
    fn dry_run_does_not_execute() {
        let temp = TempDir::new().unwrap();
        let step = shell_step("write", "touch should-not-exist");
        let context = ExecutionContext {
            dry_run: true,
            ..ExecutionContext::new(temp.path())
        };

        let result = ShellExecutor.execute(&step, &context).unwrap();

        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("Would run: touch should-not-exist"));
        assert!(!temp.path().join("should-not-exist").exists());
    }

    #[test]
    fn package_manager_missing_tool_fails_before_spawning() {
        let temp = TempDir::new().unwrap();
        let step = config_step(StepConfig {
            name: "deps".to_string(),
            step_type: StepType::PackageManager,
            manager: Some("rigup-no-such-manager".to_string()),
            ..Default::default()
        });

        let result = PackageManagerExecutor
            .execute(&step, &ExecutionContext::new(temp.path()))
            .unwrap();

        assert!(!result.success);
        assert!(result.error.unwrap().contains("not found on PATH"));
        assert_eq!(
            result.command.as_deref(),
            Some("rigup-no-such-manager install")
        );
    }

    #[test]
    fn docker_dry_run_builds_command_line() {
        let temp = TempDir::new().unwrap();
        let step = config_step(StepConfig {
            name: "pull".to_string(),
            step_type: StepType::Docker,
            command: Some("pull redis:7".to_string()),
            ..Default::default()
        });
        let context = ExecutionContext {
            dry_run: true,
            ..ExecutionContext::new(temp.path())
        };

        let result = DockerExecutor.execute(&step, &context).unwrap();
        assert_eq!(result.command.as_deref(), Some("docker pull redis:7"));
    }

    #[test]
    fn database_without_manager_runs_through_shell() {
        let temp = TempDir::new().unwrap();
        let step = config_step(StepConfig {
            name: "seed".to_string(),
            step_type: StepType::Database,
            command: Some("echo seeded".to_string()),
            ..Default::default()
        });

        let result = DatabaseExecutor
            .execute(&step, &ExecutionContext::new(temp.path()))
            .unwrap();

        assert!(result.success);
        assert!(result.output.unwrap().contains("seeded"));
    }

    #[test]
    fn executor_rejects_other_kinds() {
        let temp = TempDir::new().unwrap();
        let step = shell_step("s", "true");
        let err = DockerExecutor
            .execute(&step, &ExecutionContext::new(temp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("docker executor cannot run a shell step"));
    }

    #[test]
    fn standard_registry_covers_every_executable_kind() {
        let registry = ExecutorRegistry::standard();
        for step_type in StepType::ALL {
            let bound = registry.get(step_type).is_some();
            assert_eq!(bound, step_type != StepType::Choice, "{}", step_type);
        }
    }

    #[test]
    fn dispatch_routes_choice_to_resolver() {
        let step = config_step(StepConfig {
            name: "pick".to_string(),
            step_type: StepType::Choice,
            prompt: Some("Which?".to_string()),
            choices: vec![crate::config::schema::ChoiceConfig {
                name: "One".to_string(),
                value: "one".to_string(),
                actions: vec![StepConfig {
                    name: "a".to_string(),
                    command: Some("true".to_string()),
                    ..Default::default()
                }],
            }],
            ..Default::default()
        });

        let registry = ExecutorRegistry::standard();
        match registry.dispatch(&step).unwrap() {
            Dispatch::Choose {
                prompt, choices, ..
            } => {
                assert_eq!(prompt, "Which?");
                assert_eq!(choices.len(), 1);
            }
            Dispatch::Execute(_) => panic!("choice steps must not be executed"),
        }
    }

    #[test]
    fn dispatch_without_executor_fails() {
        let registry = ExecutorRegistry::empty();
        let step = shell_step("s", "true");
        let err = registry.dispatch(&step).err().unwrap();
        assert!(err.to_string().contains("no executor registered for shell steps"));
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn summary_line_shows_error() {
        let result = StepResult::failure("deps", Duration::ZERO, "npm exploded".into(), None);
        assert_eq!(result.summary_line(), "✗ deps - npm exploded");
    }
}
