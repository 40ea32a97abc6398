//! Setup command implementation.
//!
//! The `rigup setup` command clones the configured repository and runs
//! the setup steps in it.

use std::cell::RefCell;
use std::path::PathBuf;

use tracing::warn;

use crate::cli::args::SetupArgs;
use crate::config::{validate_config, RigupConfig};
use crate::error::{Result, RigupError};
use crate::git::{clone_repository, is_git_checkout, repo_dir_name};
use crate::runner::{
    parse_presets, PresetChoiceResolver, RunProgress, RunReport, RunState, SetupEngine,
    UiChoiceResolver,
};
use crate::steps::{format_duration, ExecutionContext, ExecutorRegistry, Step, StepStatus};
use crate::ui::{RunSummary, SpinnerHandle, SummaryLine, UserInterface};

use super::dispatcher::{Command, CommandResult, ProjectPaths, EXIT_FAILURE, EXIT_NO_CONFIG};
use super::display::{first_line, report_validation_errors};

/// The setup command implementation.
pub struct SetupCommand {
    paths: ProjectPaths,
    args: SetupArgs,
}

/// A top-level step as it finished.
struct Finished {
    status: StepStatus,
    duration: std::time::Duration,
    error: Option<String>,
}

impl SetupCommand {
    /// Create a new setup command.
    pub fn new(paths: ProjectPaths, args: SetupArgs) -> Self {
        Self { paths, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &SetupArgs {
        &self.args
    }

    /// Directory the steps run in, cloning first when a repository is set.
    fn prepare_workdir(
        &self,
        config: &RigupConfig,
        ui: &mut dyn UserInterface,
    ) -> Result<PathBuf> {
        let repository = match config.repository.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() && !self.args.no_clone => url,
            _ => return Ok(self.paths.root.clone()),
        };

        let target = match &self.args.target {
            Some(target) => self.paths.root.join(target),
            None => {
                let name =
                    repo_dir_name(repository).ok_or_else(|| RigupError::ConfigValidationError {
                        message: format!(
                            "cannot derive a directory name from '{}'; pass --target",
                            repository
                        ),
                    })?;
                self.paths.root.join(name)
            }
        };

        if is_git_checkout(&target) {
            ui.message(&format!("Using existing checkout at {}", target.display()));
            return Ok(target);
        }

        if self.args.dry_run {
            ui.message(&format!(
                "Would clone {} into {}",
                repository,
                target.display()
            ));
            return Ok(target);
        }

        let mut spinner = ui.start_spinner(&format!("Cloning {}", repository), 0);
        match clone_repository(repository, &target, config.branch.as_deref()) {
            Ok(()) => {
                spinner.finish_success(&format!("Cloned into {}", target.display()));
                Ok(target)
            }
            Err(e) => {
                spinner.finish_error(&format!("Clone of {} failed", repository));
                Err(e)
            }
        }
    }

    fn run_steps(
        &self,
        steps: &[Step],
        context: ExecutionContext,
        ui: &mut dyn UserInterface,
    ) -> Result<(RunReport, Vec<Finished>)> {
        let presets = parse_presets(&self.args.choose)?;
        let verbose = ui.output_mode().streams_step_output();
        let registry = ExecutorRegistry::standard();
        let engine = SetupEngine::new(&registry, context);

        let shared: RefCell<&mut dyn UserInterface> = RefCell::new(ui);
        let mut resolver = PresetChoiceResolver::new(presets, UiChoiceResolver::new(&shared));
        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let mut finished = Vec::new();

        let report = engine.run_with_progress(steps, &mut resolver, |event| {
            let mut ui = shared.borrow_mut();
            match event {
                RunProgress::PlanReady { plan } => {
                    if verbose {
                        ui.message(&format!("Plan: {}", plan.join(" → ")));
                    }
                }
                RunProgress::StepStarting {
                    step,
                    index,
                    total,
                    depth,
                    ..
                } => {
                    let label = if depth == 0 {
                        format!("[{}/{}] {}", index + 1, total, step.label())
                    } else {
                        step.label().to_string()
                    };
                    if step.is_choice() {
                        ui.message(&format!("{}{}", indent(depth), label));
                    } else {
                        spinner = Some(ui.start_spinner(&label, depth * 2));
                    }
                }
                RunProgress::ChoiceSelected {
                    label,
                    actions,
                    depth,
                    ..
                } => {
                    let noun = if actions == 1 { "action" } else { "actions" };
                    ui.message(&format!(
                        "{}  → {} ({} {})",
                        indent(depth),
                        label,
                        actions,
                        noun
                    ));
                }
                RunProgress::StepFinished {
                    name,
                    result,
                    depth,
                } => {
                    let duration = format_duration(result.duration);
                    match spinner.take() {
                        Some(mut s) if result.success => {
                            s.finish_success(&format!("{} ({})", name, duration))
                        }
                        Some(mut s) => s.finish_error(&format!("{} failed ({})", name, duration)),
                        None if result.success => ui.success(&format!(
                            "{}{} ({})",
                            indent(depth),
                            name,
                            duration
                        )),
                        None => ui.error(&format!(
                            "{}{}: {}",
                            indent(depth),
                            name,
                            result.error.as_deref().unwrap_or("failed")
                        )),
                    }

                    if result.success {
                        if let Some(output) = result.output.as_deref().map(str::trim) {
                            if verbose && !output.is_empty() {
                                ui.message(output);
                            } else if output.starts_with("Would run:") {
                                ui.message(&format!("{}  {}", indent(depth), output));
                            }
                        }
                    } else if let Some(command) = result.command.as_deref() {
                        ui.show_error_block(command, result.output.as_deref().unwrap_or(""));
                    }

                    if depth == 0 {
                        finished.push(Finished {
                            status: result.status(),
                            duration: result.duration,
                            error: result.error.clone(),
                        });
                    }
                }
            }
        })?;

        let unused = resolver.unused();
        if !unused.is_empty() {
            warn!("--choose answers never used: {}", unused.join(", "));
            shared.borrow_mut().warning(&format!(
                "No choice step asked for: {} (check --choose)",
                unused.join(", ")
            ));
        }

        Ok((report, finished))
    }
}

impl Command for SetupCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Load configuration
        let (config_path, config) = match self.paths.load() {
            Ok(loaded) => loaded,
            Err(RigupError::ConfigNotFound { .. }) => {
                ui.error("No configuration found. Run 'rigup init' first.");
                return Ok(CommandResult::failure(EXIT_NO_CONFIG));
            }
            Err(e) => return Err(e),
        };

        let errors = validate_config(&config);
        if !errors.is_empty() {
            report_validation_errors(&config_path, &errors, ui);
            return Ok(CommandResult::failure(EXIT_FAILURE));
        }
        let steps = Step::from_configs(&config.setup_steps)?;

        // Show header
        let name = config.name.as_deref().unwrap_or("project");
        ui.show_header(&format!("Setting up {}", name));

        if self.args.dry_run || ui.output_mode().streams_step_output() {
            ui.message(&format!("Config: {}", config_path.display()));
        }
        if self.args.dry_run {
            ui.message("Running in dry-run mode - no commands will be executed");
        }

        let workdir = self.prepare_workdir(&config, ui)?;

        let mut context = ExecutionContext::new(&workdir);
        context.dry_run = self.args.dry_run;
        context.capture_output = !ui.output_mode().streams_step_output();

        let (report, finished) = self.run_steps(&steps, context, ui)?;

        ui.show_run_summary(&build_summary(&report, &finished, &steps));

        match &report.state {
            RunState::Succeeded => {
                let count = report.plan.len();
                let label = if count == 1 { "step" } else { "steps" };
                if self.args.dry_run {
                    ui.success(&format!("Dry run complete ({} {})", count, label));
                } else {
                    ui.success(&format!("Setup complete! ({} {} run)", count, label));
                }
                Ok(CommandResult::success())
            }
            RunState::Failed { step, cause } => {
                ui.error(&format!("Setup failed at '{}': {}", step, first_line(cause)));
                let not_run = report.not_run();
                if !not_run.is_empty() {
                    ui.warning(&format!("Not run: {}", not_run.join(", ")));
                }
                Ok(CommandResult::failure(EXIT_FAILURE))
            }
            other => Err(RigupError::Other(anyhow::anyhow!(
                "run ended in non-terminal state {:?}",
                other
            ))),
        }
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(depth * 2)
}

/// One summary row per plan step; steps that never started are pending.
fn build_summary(report: &RunReport, finished: &[Finished], steps: &[Step]) -> RunSummary {
    let lines = report
        .plan
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let is_choice = steps.iter().any(|s| &s.name == name && s.is_choice());
            match finished.get(i) {
                Some(done) => SummaryLine {
                    name: name.clone(),
                    status: done.status,
                    duration: Some(done.duration),
                    detail: match (&done.error, is_choice) {
                        (Some(error), _) => Some(first_line(error).to_string()),
                        (None, true) => report.selection(name).map(|v| format!("→ {}", v)),
                        (None, false) => None,
                    },
                },
                None => SummaryLine {
                    name: name.clone(),
                    status: StepStatus::Pending,
                    duration: None,
                    detail: Some("not run".to_string()),
                },
            }
        })
        .collect();

    RunSummary {
        lines,
        total_duration: report.duration,
    }
}
