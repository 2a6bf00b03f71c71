//! Built-in scenarios embedded in the binary.
//!
//! Each one is a self-contained YAML scenario under `scenarios/` that pins
//! down one behaviour of the navigation engine.

use crate::error::ScenarioError;
use crate::scenario::schema::Scenario;
use crate::scenario::suggest;

/// A scenario compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinScenario {
    /// Unique kebab-case name.
    pub name: &'static str,

    /// Short human-readable description.
    pub description: &'static str,

    /// Raw YAML.
    pub yaml: &'static str,
}

impl BuiltinScenario {
    /// Parses the embedded YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] if the YAML is malformed.
    pub fn load(&self) -> Result<Scenario, ScenarioError> {
        Scenario::from_yaml(self.yaml, self.name)
    }
}

static BUILTIN_SCENARIOS: &[BuiltinScenario] = &[
    BuiltinScenario {
        name: "three-sections",
        description: "Builds entries for sections with and without headings, skips one without id",
        yaml: include_str!("../../scenarios/three-sections.yaml"),
    },
    BuiltinScenario {
        name: "back-to-top",
        description: "Back-to-top control follows the 300px scroll threshold",
        yaml: include_str!("../../scenarios/back-to-top.yaml"),
    },
    BuiltinScenario {
        name: "stale-target",
        description: "Clicking an entry whose section was removed does nothing",
        yaml: include_str!("../../scenarios/stale-target.yaml"),
    },
    BuiltinScenario {
        name: "tie-break-topmost",
        description: "Topmost section wins when a batch arrives in reverse order",
        yaml: include_str!("../../scenarios/tie-break-topmost.yaml"),
    },
    BuiltinScenario {
        name: "tie-break-last-delivered",
        description: "Last delivered section wins under the inherited policy",
        yaml: include_str!("../../scenarios/tie-break-last-delivered.yaml"),
    },
    BuiltinScenario {
        name: "rebuild",
        description: "Rebuilding after a re-render never duplicates entries",
        yaml: include_str!("../../scenarios/rebuild.yaml"),
    },
];

/// All built-in scenarios in registry order.
#[must_use]
pub fn list_scenarios() -> &'static [BuiltinScenario] {
    BUILTIN_SCENARIOS
}

/// Looks up a built-in scenario by name.
#[must_use]
pub fn find_scenario(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().find(|s| s.name == name)
}

/// Closest built-in name to a misspelt `input`.
#[must_use]
pub fn suggest_scenario(input: &str) -> Option<String> {
    suggest(input, BUILTIN_SCENARIOS.iter().map(|s| s.name))
}

/// Loads a built-in scenario by name.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownBuiltin`] with a suggestion when no
/// scenario has this name.
pub fn load_builtin(name: &str) -> Result<Scenario, ScenarioError> {
    find_scenario(name)
        .ok_or_else(|| ScenarioError::UnknownBuiltin {
            name: name.to_string(),
            suggestion: suggest_scenario(name),
        })?
        .load()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::config::NavConfig;
    use crate::scenario::ScenarioRunner;

    #[test]
    fn all_builtin_scenarios_parse() {
        for builtin in list_scenarios() {
            let scenario = builtin
                .load()
                .unwrap_or_else(|e| panic!("{} failed to parse: {e}", builtin.name));
            assert_eq!(scenario.name, builtin.name);
            assert!(scenario.page.document.is_none(), "{} must be self-contained", builtin.name);
        }
    }

    #[test]
    fn all_builtin_scenarios_pass() {
        for builtin in list_scenarios() {
            let scenario = builtin.load().unwrap();
            let report = ScenarioRunner::new(scenario, NavConfig::default())
                .run_blocking()
                .unwrap();
            assert!(
                report.passed(),
                "{}: {:?}",
                builtin.name,
                report.failures().map(ToString::to_string).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn no_duplicate_names() {
        let names: HashSet<_> = list_scenarios().iter().map(|s| s.name).collect();
        assert_eq!(names.len(), list_scenarios().len());
    }

    #[test]
    fn suggest_close_and_far() {
        assert_eq!(suggest_scenario("back-to-tp").as_deref(), Some("back-to-top"));
        assert!(suggest_scenario("zzzzzzzzzzzz").is_none());
    }

    #[test]
    fn unknown_builtin_error_carries_suggestion() {
        match load_builtin("rebuld") {
            Err(ScenarioError::UnknownBuiltin { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("rebuild"));
            }
            other => panic!("expected UnknownBuiltin, got {other:?}"),
        }
    }
}
