//! Choice resolution.
//!
//! A [`ChoiceResolver`] picks one option of a choice step. The engine
//! never prompts on its own; the CLI hands it a [`UiChoiceResolver`],
//! optionally wrapped in a [`PresetChoiceResolver`] for `--choose`.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, RigupError};
use crate::steps::Choice;
use crate::ui::{Prompt, PromptOption, UserInterface};

/// One option offered to a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOption<'a> {
    /// Display label.
    pub label: &'a str,
    /// Value to return when selected.
    pub value: &'a str,
}

impl<'a> ChoiceOption<'a> {
    /// Options for a list of choices, in declaration order.
    pub fn from_choices(choices: &'a [Choice]) -> Vec<Self> {
        choices
            .iter()
            .map(|c| ChoiceOption {
                label: &c.name,
                value: &c.value,
            })
            .collect()
    }
}

/// Selects one option of a choice step.
pub trait ChoiceResolver {
    /// Return the `value` of the selected option.
    ///
    /// `step` is the choice step's name, `prompt` its question. Returning a
    /// value that matches no option fails the choice step.
    fn resolve(
        &mut self,
        step: &str,
        prompt: &str,
        options: &[ChoiceOption<'_>],
        default: Option<&str>,
    ) -> Result<String>;
}

/// Asks a [`UserInterface`] with a select prompt keyed by the step name.
///
/// The UI sits behind a `RefCell` so the caller can keep drawing progress
/// with it between prompts.
pub struct UiChoiceResolver<'a, 'u> {
    ui: &'a RefCell<&'u mut dyn UserInterface>,
}

impl<'a, 'u> UiChoiceResolver<'a, 'u> {
    /// Create a resolver over a shared UI.
    pub fn new(ui: &'a RefCell<&'u mut dyn UserInterface>) -> Self {
        Self { ui }
    }
}

impl ChoiceResolver for UiChoiceResolver<'_, '_> {
    fn resolve(
        &mut self,
        step: &str,
        prompt: &str,
        options: &[ChoiceOption<'_>],
        default: Option<&str>,
    ) -> Result<String> {
        let prompt = Prompt {
            key: step.to_string(),
            question: prompt.to_string(),
            options: options
                .iter()
                .map(|o| PromptOption {
                    label: o.label.to_string(),
                    value: o.value.to_string(),
                })
                .collect(),
            default: default.map(String::from),
        };

        self.ui.borrow_mut().prompt(&prompt)
    }
}

/// Answers from a fixed `step -> value` map, deferring to `inner` otherwise.
///
/// A preset answers every choice step with that name, nested ones included.
pub struct PresetChoiceResolver<R> {
    presets: HashMap<String, String>,
    used: BTreeSet<String>,
    inner: R,
}

impl<R: ChoiceResolver> PresetChoiceResolver<R> {
    /// Wrap a resolver with preset answers.
    pub fn new(presets: HashMap<String, String>, inner: R) -> Self {
        Self {
            presets,
            used: BTreeSet::new(),
            inner,
        }
    }

    /// Preset keys no choice step has asked for, sorted.
    pub fn unused(&self) -> Vec<&str> {
        let mut unused: Vec<&str> = self
            .presets
            .keys()
            .filter(|key| !self.used.contains(*key))
            .map(String::as_str)
            .collect();
        unused.sort_unstable();
        unused
    }
}

/// Parse `step=value` pairs as given on the command line.
pub fn parse_presets(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((step, value)) if !step.trim().is_empty() && !value.trim().is_empty() => {
                Ok((step.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(RigupError::ConfigValidationError {
                message: format!("expected STEP=VALUE, got '{}'", pair),
            }),
        })
        .collect()
}

impl<R: ChoiceResolver> ChoiceResolver for PresetChoiceResolver<R> {
    fn resolve(
        &mut self,
        step: &str,
        prompt: &str,
        options: &[ChoiceOption<'_>],
        default: Option<&str>,
    ) -> Result<String> {
        match self.presets.get(step) {
            Some(value) => {
                self.used.insert(step.to_string());
                Ok(value.clone())
            }
            None => self.inner.resolve(step, prompt, options, default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    const OPTIONS: [ChoiceOption<'static>; 2] = [
        ChoiceOption {
            label: "PostgreSQL",
            value: "postgres",
        },
        ChoiceOption {
            label: "SQLite",
            value: "sqlite",
        },
    ];

    struct Fixed(&'static str);

    impl ChoiceResolver for Fixed {
        fn resolve(
            &mut self,
            _step: &str,
            _prompt: &str,
            _options: &[ChoiceOption<'_>],
            _default: Option<&str>,
        ) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn ui_resolver_prompts_with_step_key() {
        let mut mock = MockUI::new();
        mock.set_prompt_response("database", "sqlite");
        {
            let shared: RefCell<&mut dyn UserInterface> = RefCell::new(&mut mock);
            let mut resolver = UiChoiceResolver::new(&shared);
            let value = resolver
                .resolve("database", "Which database?", &OPTIONS, None)
                .unwrap();
            assert_eq!(value, "sqlite");
        }
        let shown = &mock.prompts_shown()[0];
        assert_eq!(shown.key, "database");
        assert_eq!(shown.question, "Which database?");
        assert_eq!(shown.options.len(), 2);
        assert_eq!(shown.options[0].label, "PostgreSQL");
    }

    #[test]
    fn ui_resolver_passes_default() {
        let mut mock = MockUI::new();
        let shared: RefCell<&mut dyn UserInterface> = RefCell::new(&mut mock);
        let mut resolver = UiChoiceResolver::new(&shared);
        let value = resolver
            .resolve("database", "Which database?", &OPTIONS, Some("postgres"))
            .unwrap();
        assert_eq!(value, "postgres");
    }

    #[test]
    fn ui_resolver_propagates_prompt_failure() {
        let mut mock = MockUI::new();
        let shared: RefCell<&mut dyn UserInterface> = RefCell::new(&mut mock);
        let mut resolver = UiChoiceResolver::new(&shared);
        assert!(resolver
            .resolve("database", "Which database?", &OPTIONS, None)
            .is_err());
    }

    #[test]
    fn presets_take_priority() {
        let presets = HashMap::from([("database".to_string(), "sqlite".to_string())]);
        let mut resolver = PresetChoiceResolver::new(presets, Fixed("postgres"));
        assert_eq!(
            resolver.resolve("database", "?", &OPTIONS, None).unwrap(),
            "sqlite"
        );
        assert_eq!(
            resolver.resolve("cache", "?", &OPTIONS, None).unwrap(),
            "postgres"
        );
    }

    #[test]
    fn unused_presets_are_reported() {
        let presets = HashMap::from([
            ("database".to_string(), "sqlite".to_string()),
            ("databse".to_string(), "postgres".to_string()),
            ("cache".to_string(), "redis".to_string()),
        ]);
        let mut resolver = PresetChoiceResolver::new(presets, Fixed("postgres"));
        assert_eq!(resolver.unused(), vec!["cache", "database", "databse"]);

        resolver.resolve("database", "?", &OPTIONS, None).unwrap();
        resolver.resolve("other", "?", &OPTIONS, None).unwrap();

        assert_eq!(resolver.unused(), vec!["cache", "databse"]);
    }

    #[test]
    fn parse_presets_accepts_pairs() {
        let presets = parse_presets(&["database = sqlite".to_string()]).unwrap();
        assert_eq!(presets.get("database").map(String::as_str), Some("sqlite"));
    }

    #[test]
    fn parse_presets_rejects_malformed_pairs() {
        for bad in ["database", "=sqlite", "database="] {
            let result = parse_presets(&[bad.to_string()]);
            assert!(result.is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn options_follow_declaration_order() {
        let choices = vec![
            Choice {
                name: "B".to_string(),
                value: "b".to_string(),
                actions: vec![],
            },
            Choice {
                name: "A".to_string(),
                value: "a".to_string(),
                actions: vec![],
            },
        ];
        let options = ChoiceOption::from_choices(&choices);
        assert_eq!(options[0].value, "b");
        assert_eq!(options[1].label, "A");
    }
}
