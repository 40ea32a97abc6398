//! Step model and execution.
//!
//! - [`Step`] - A validated step with a closed set of kinds ([`StepKind`])
//! - [`StepExecutor`] - Carries out one kind of step
//! - [`ExecutorRegistry`] - Maps step kinds to executors
//! - [`StepResult`] - Captures execution results
//!
//! # Example
//!
//! ```no_run
//! use rigup::config::{StepConfig, StepType};
//! use rigup::steps::{Dispatch, ExecutionContext, ExecutorRegistry, Step};
//!
//! let step = Step::from_config(&StepConfig {
//!     name: "hello".to_string(),
//!     step_type: StepType::Shell,
//!     command: Some("echo hello".to_string()),
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let registry = ExecutorRegistry::standard();
//! let context = ExecutionContext::new(".");
//! if let Dispatch::Execute(executor) = registry.dispatch(&step).unwrap() {
//!     let result = executor.execute(&step, &context).unwrap();
//!     println!("{}", result.summary_line());
//! }
//! ```

pub mod executor;
pub mod model;

pub use executor::{
    format_duration, DatabaseExecutor, Dispatch, DockerComposeExecutor, DockerExecutor,
    ExecutionContext, ExecutorRegistry, PackageManagerExecutor, ServiceExecutor, ShellExecutor,
    StepExecutor, StepResult, StepStatus,
};
pub use model::{check_fields, Choice, FieldProblem, Step, StepKind};
