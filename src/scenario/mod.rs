//! Scenario-driven simulation of a page with navigation attached.

pub mod builtin;
pub mod runner;
pub mod schema;

pub use builtin::{BuiltinScenario, find_scenario, list_scenarios, load_builtin, suggest_scenario};
pub use runner::{ExpectationFailure, ScenarioRunner, SimulationReport, StepReport};
pub use schema::{Action, Expectation, PageSpec, Scenario, SectionSpec, Step, Viewport};

/// Maximum edit distance for "did you mean" suggestions.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Closest candidate to `input` within a small edit distance.
pub fn suggest<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| (c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}
