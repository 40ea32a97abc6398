//! Step execution orchestration.

pub mod choice;
pub mod dependency;
pub mod engine;

pub use choice::{
    parse_presets, ChoiceOption, ChoiceResolver, PresetChoiceResolver, UiChoiceResolver,
};
pub use dependency::{DependencyGraph, DependencyGraphBuilder};
pub use engine::{RunProgress, RunReport, RunState, SetupEngine};
