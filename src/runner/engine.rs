//! Setup step execution.
//!
//! [`SetupEngine`] turns a list of steps into an execution plan and runs
//! it: the dependency graph is built and ordered first, then every step is
//! dispatched in plan order. Choice steps ask a [`ChoiceResolver`] and run
//! the selected branch's actions in place as a strict sequence. The first
//! failure anywhere stops the whole run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, RigupError};
use crate::steps::{Choice, Dispatch, ExecutionContext, ExecutorRegistry, Step, StepResult};

use super::choice::{ChoiceOption, ChoiceResolver};
use super::dependency::DependencyGraph;

/// Lifecycle of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Dependency graph constructed and known to be acyclic.
    Built,
    /// Execution plan computed.
    Scheduled,
    /// Steps are being dispatched.
    Running,
    /// Every step in the plan completed.
    Succeeded,
    /// A step failed; nothing after it ran.
    Failed { step: String, cause: String },
}

impl RunState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed { .. })
    }
}

/// Progress events emitted during a run.
///
/// `depth` is 0 for plan steps and grows by one for each choice the event
/// is nested in.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// The plan has been computed; nothing has run yet.
    PlanReady { plan: &'a [String] },
    /// A step is about to start.
    StepStarting {
        name: &'a str,
        step: &'a Step,
        index: usize,
        total: usize,
        depth: usize,
    },
    /// A step finished, successfully or not.
    StepFinished {
        name: &'a str,
        result: &'a StepResult,
        depth: usize,
    },
    /// A choice step's option was selected; its actions run next.
    ChoiceSelected {
        name: &'a str,
        value: &'a str,
        label: &'a str,
        actions: usize,
        depth: usize,
    },
}

/// Outcome of a run.
#[derive(Debug)]
pub struct RunReport {
    /// Top-level step names in execution order.
    pub plan: Vec<String>,
    /// Results in the order steps finished, choice actions included.
    pub results: Vec<StepResult>,
    /// Final state.
    pub state: RunState,
    /// `(choice step, selected value)` pairs in selection order.
    pub selections: Vec<(String, String)>,
    /// Total duration.
    pub duration: Duration,
    started: usize,
}

impl RunReport {
    fn new() -> Self {
        Self {
            plan: Vec::new(),
            results: Vec::new(),
            state: RunState::Built,
            selections: Vec::new(),
            duration: Duration::ZERO,
            started: 0,
        }
    }

    /// Whether every step succeeded.
    pub fn success(&self) -> bool {
        self.state == RunState::Succeeded
    }

    /// Name of the step that failed, if any.
    pub fn failed_step(&self) -> Option<&str> {
        match &self.state {
            RunState::Failed { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Plan steps that never started.
    pub fn not_run(&self) -> &[String] {
        &self.plan[self.started.min(self.plan.len())..]
    }

    /// Value selected for a choice step, if it ran.
    pub fn selection(&self, step: &str) -> Option<&str> {
        self.selections
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, value)| value.as_str())
    }

    /// Convert a failed run into the error that describes it.
    pub fn into_result(self) -> Result<Self> {
        match &self.state {
            RunState::Failed { step, cause } => Err(RigupError::StepExecutionError {
                step: step.clone(),
                message: cause.clone(),
            }),
            _ => Ok(self),
        }
    }
}

/// The step that stopped a sequence, and why.
#[derive(Debug)]
struct StepFailure {
    step: String,
    cause: String,
}

/// Runs setup steps in dependency order.
pub struct SetupEngine<'a> {
    registry: &'a ExecutorRegistry,
    context: ExecutionContext,
}

impl<'a> SetupEngine<'a> {
    /// Create an engine that dispatches through `registry`.
    pub fn new(registry: &'a ExecutorRegistry, context: ExecutionContext) -> Self {
        Self { registry, context }
    }

    /// Get the execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Compute the execution plan without running anything.
    pub fn plan(steps: &[Step]) -> Result<Vec<String>> {
        DependencyGraph::from_steps(steps)?.topological_order()
    }

    /// Run all steps.
    pub fn run(&self, steps: &[Step], resolver: &mut dyn ChoiceResolver) -> Result<RunReport> {
        self.run_with_progress(steps, resolver, |_| {})
    }

    /// Run all steps with a progress callback.
    ///
    /// Configuration problems (unknown dependency, duplicate name, cycle)
    /// are returned as `Err` before any step runs. Step failures end the
    /// run in [`RunState::Failed`] and are reported through the returned
    /// [`RunReport`].
    pub fn run_with_progress(
        &self,
        steps: &[Step],
        resolver: &mut dyn ChoiceResolver,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new();

        let graph = DependencyGraph::from_steps(steps)?;
        report.plan = graph.topological_order()?;
        report.state = RunState::Scheduled;
        debug!("Execution plan: {}", report.plan.join(" -> "));

        on_progress(RunProgress::PlanReady { plan: &report.plan });

        let by_name: HashMap<&str, &Step> = steps.iter().map(|s| (s.name.as_str(), s)).collect();
        let ordered: Vec<&Step> = report
            .plan
            .iter()
            .filter_map(|name| by_name.get(name.as_str()).copied())
            .collect();

        report.state = RunState::Running;
        let outcome = self.run_sequence(&ordered, 0, resolver, &mut on_progress, &mut report);

        report.state = match outcome {
            Ok(()) => {
                info!("Setup finished: {} steps", report.plan.len());
                RunState::Succeeded
            }
            Err(failure) => {
                warn!("Setup stopped at '{}': {}", failure.step, failure.cause);
                RunState::Failed {
                    step: failure.step,
                    cause: failure.cause,
                }
            }
        };
        report.duration = start.elapsed();

        Ok(report)
    }

    /// Run `steps` strictly in order, stopping at the first failure.
    ///
    /// Used for the plan (depth 0) and for the actions of a selected
    /// choice, without any dependency resolution.
    fn run_sequence(
        &self,
        steps: &[&Step],
        depth: usize,
        resolver: &mut dyn ChoiceResolver,
        on_progress: &mut dyn FnMut(RunProgress<'_>),
        report: &mut RunReport,
    ) -> std::result::Result<(), StepFailure> {
        let total = steps.len();

        for (index, step) in steps.iter().copied().enumerate() {
            if depth == 0 {
                report.started += 1;
            }

            on_progress(RunProgress::StepStarting {
                name: &step.name,
                step,
                index,
                total,
                depth,
            });
            info!("Running step '{}' ({})", step.name, step.step_type());

            let step_start = Instant::now();
            let result = match self.registry.dispatch(step) {
                Ok(Dispatch::Execute(executor)) => {
                    match executor.execute(step, &self.context) {
                        Ok(result) => result,
                        Err(e) => {
                            warn!("Step '{}' errored: {}", step.name, e);
                            StepResult::failure(&step.name, step_start.elapsed(), e.to_string(), None)
                        }
                    }
                }
                Ok(Dispatch::Choose {
                    prompt,
                    default,
                    choices,
                }) => {
                    let choice = ChoiceStep {
                        step,
                        prompt,
                        default,
                        choices,
                        depth,
                        started: step_start,
                    };
                    self.run_choice(choice, resolver, on_progress, report)?;
                    continue;
                }
                Err(e) => {
                    warn!("Step '{}' cannot be dispatched: {}", step.name, e);
                    StepResult::failure(&step.name, step_start.elapsed(), e.to_string(), None)
                }
            };

            finish(result, depth, on_progress, report)?;
        }

        Ok(())
    }

    /// Resolve a choice step and run the selected actions.
    ///
    /// A resolver error or an unknown value fails the choice step itself.
    /// A failing action fails the run under the action's name; the choice
    /// step is then recorded as failed too.
    fn run_choice(
        &self,
        choice: ChoiceStep<'_>,
        resolver: &mut dyn ChoiceResolver,
        on_progress: &mut dyn FnMut(RunProgress<'_>),
        report: &mut RunReport,
    ) -> std::result::Result<(), StepFailure> {
        let ChoiceStep {
            step,
            prompt,
            default,
            choices,
            depth,
            started,
        } = choice;

        let options = ChoiceOption::from_choices(choices);
        let selected = resolver
            .resolve(&step.name, prompt, &options, default)
            .map_err(|e| e.to_string())
            .and_then(|value| {
                choices
                    .iter()
                    .find(|c| c.value == value)
                    .ok_or_else(|| format!("'{}' is not an option of this choice", value))
            });

        let selected: &Choice = match selected {
            Ok(choice) => choice,
            Err(cause) => {
                warn!("Choice '{}' failed: {}", step.name, cause);
                let result = StepResult::failure(&step.name, started.elapsed(), cause, None);
                return finish(result, depth, on_progress, report);
            }
        };

        info!(
            "Choice '{}' selected '{}' ({} actions)",
            step.name,
            selected.value,
            selected.actions.len()
        );
        report
            .selections
            .push((step.name.clone(), selected.value.clone()));
        on_progress(RunProgress::ChoiceSelected {
            name: &step.name,
            value: &selected.value,
            label: &selected.name,
            actions: selected.actions.len(),
            depth,
        });

        let actions: Vec<&Step> = selected.actions.iter().collect();
        match self.run_sequence(&actions, depth + 1, resolver, on_progress, report) {
            Ok(()) => {
                let result = StepResult::success(&step.name, started.elapsed(), None, None);
                finish(result, depth, on_progress, report)
            }
            Err(failure) => {
                let result = StepResult::failure(
                    &step.name,
                    started.elapsed(),
                    format!("action '{}' failed", failure.step),
                    None,
                );
                on_progress(RunProgress::StepFinished {
                    name: &step.name,
                    result: &result,
                    depth,
                });
                report.results.push(result);
                Err(failure)
            }
        }
    }
}

/// A choice step being resolved.
struct ChoiceStep<'s> {
    step: &'s Step,
    prompt: &'s str,
    default: Option<&'s str>,
    choices: &'s [Choice],
    depth: usize,
    started: Instant,
}

/// Report a finished step and turn a failed result into a [`StepFailure`].
fn finish(
    result: StepResult,
    depth: usize,
    on_progress: &mut dyn FnMut(RunProgress<'_>),
    report: &mut RunReport,
) -> std::result::Result<(), StepFailure> {
    on_progress(RunProgress::StepFinished {
        name: &result.name,
        result: &result,
        depth,
    });

    let failure = (!result.success).then(|| StepFailure {
        step: result.name.clone(),
        cause: result.failure_message(),
    });
    report.results.push(result);

    match failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}
