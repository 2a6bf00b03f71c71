//! Scenario file format.
//!
//! A scenario describes a page (geometry plus, optionally, a rendered
//! document) and a sequence of user actions, each with optional
//! expectations about the resulting navigation state.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{NavConfig, Validator};
use crate::error::ScenarioError;
use crate::nav::Visibility;
use crate::page::DeliveryOrder;

const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;
const DEFAULT_SECTION_HEIGHT: f64 = 400.0;

/// A complete simulation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Scenario name, used in reports and errors.
    pub name: String,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Viewport dimensions.
    #[serde(default)]
    pub viewport: Viewport,

    /// The simulated page.
    #[serde(default)]
    pub page: PageSpec,

    /// Order in which intersection batches are delivered.
    #[serde(default)]
    pub delivery: DeliveryOrder,

    /// Navigation settings; replaces the caller's settings when present.
    #[serde(default)]
    pub config: Option<NavConfig>,

    /// Actions to perform, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Viewport {
    /// Viewport height in pixels.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

/// Page description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageSpec {
    /// Rendered HTML document, relative to the scenario file.
    pub document: Option<PathBuf>,

    /// Sections in document order. With a document, only entries with an
    /// id are used, as geometry for the document's element of that id.
    pub sections: Vec<SectionSpec>,

    /// Height given to sections without an explicit height.
    pub default_height: f64,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            document: None,
            sections: Vec::new(),
            default_height: DEFAULT_SECTION_HEIGHT,
        }
    }
}

/// One section of a page described inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionSpec {
    /// Element id.
    pub id: Option<String>,
    /// Text of the first heading inside the section.
    pub heading: Option<String>,
    /// Class list; defaults to the configured marker class.
    pub classes: Option<Vec<String>>,
    /// Top edge in document coordinates; defaults to the end of the
    /// previous section.
    pub top: Option<f64>,
    /// Rendered height.
    pub height: Option<f64>,
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Scroll the page to an absolute offset.
    Scroll {
        /// Target offset.
        offset: f64,
    },
    /// Click the navigation entry targeting a section id.
    Click {
        /// Target section id.
        target: String,
    },
    /// Click the back-to-top control.
    BackToTop,
    /// Remove a section from the document.
    Remove {
        /// Section id.
        id: String,
    },
    /// Re-render: rebuild the navigation list.
    Rebuild,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scroll { offset } => write!(f, "scroll to {offset}"),
            Self::Click { target } => write!(f, "click '{target}'"),
            Self::BackToTop => f.write_str("back to top"),
            Self::Remove { id } => write!(f, "remove '{id}'"),
            Self::Rebuild => f.write_str("rebuild"),
        }
    }
}

/// One step: exactly one action plus optional expectations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStep")]
pub struct Step {
    /// What to do.
    pub action: Action,
    /// What must hold afterwards.
    pub expect: Option<Expectation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawStep {
    scroll: Option<f64>,
    click: Option<String>,
    back_to_top: Option<bool>,
    remove: Option<String>,
    rebuild: Option<bool>,
    expect: Option<Expectation>,
}

impl TryFrom<RawStep> for Step {
    type Error = String;

    fn try_from(raw: RawStep) -> Result<Self, Self::Error> {
        let mut actions = Vec::new();
        if let Some(offset) = raw.scroll {
            actions.push(Action::Scroll { offset });
        }
        if let Some(target) = raw.click {
            actions.push(Action::Click { target });
        }
        if raw.back_to_top == Some(true) {
            actions.push(Action::BackToTop);
        }
        if let Some(id) = raw.remove {
            actions.push(Action::Remove { id });
        }
        if raw.rebuild == Some(true) {
            actions.push(Action::Rebuild);
        }

        let count = actions.len();
        let action = actions
            .pop()
            .filter(|_| count == 1)
            .ok_or_else(|| format!("a step needs exactly one action, found {count}"))?;
        Ok(Self {
            action,
            expect: raw.expect,
        })
    }
}

/// Conditions checked after a step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectation {
    /// Target id of the active entry; `~` requires that none is active.
    #[serde(deserialize_with = "explicit_null")]
    pub active: Option<Option<String>>,
    /// Back-to-top visibility.
    pub back_to_top: Option<Visibility>,
    /// Entry labels in list order.
    pub entries: Option<Vec<String>>,
    /// Scroll offset after the step.
    pub scroll_offset: Option<f64>,
}

/// Distinguishes an absent field from an explicit `null`.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl Scenario {
    /// Parses a scenario from YAML; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] for malformed YAML or geometry.
    pub fn from_yaml(yaml: &str, origin: &str) -> Result<Self, ScenarioError> {
        let yaml = yaml.strip_prefix('\u{feff}').unwrap_or(yaml);
        let scenario: Self = serde_yaml::from_str(yaml).map_err(|e| ScenarioError::Invalid {
            name: origin.to_string(),
            message: e.to_string(),
        })?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] when the file cannot be read, otherwise
    /// as [`from_yaml`](Self::from_yaml).
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text, &path.display().to_string())
    }

    fn check(&self) -> Result<(), ScenarioError> {
        let invalid = |message: String| ScenarioError::Invalid {
            name: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name must not be empty".to_string()));
        }
        if !(self.viewport.height.is_finite() && self.viewport.height > 0.0) {
            return Err(invalid(format!(
                "viewport.height must be positive, got {}",
                self.viewport.height
            )));
        }
        if self.page.default_height < 0.0 {
            return Err(invalid("page.default_height must not be negative".to_string()));
        }
        for (i, section) in self.page.sections.iter().enumerate() {
            if section.height.is_some_and(|h| h < 0.0) {
                return Err(invalid(format!("page.sections[{i}].height must not be negative")));
            }
        }
        if let Some(config) = &self.config {
            check_settings(&self.name, config)?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if let Action::Scroll { offset } = step.action {
                if !offset.is_finite() {
                    return Err(invalid(format!("steps[{i}]: scroll offset must be finite")));
                }
            }
        }
        Ok(())
    }
}

/// Rejects navigation settings that [`Validator`] reports errors for.
pub(crate) fn check_settings(name: &str, config: &NavConfig) -> Result<(), ScenarioError> {
    let validation = Validator::new().validate(config);
    if validation.is_valid() {
        return Ok(());
    }
    let issues: Vec<String> = validation
        .errors
        .iter()
        .map(|issue| format!("config.{}: {}", issue.path, issue.message))
        .collect();
    Err(ScenarioError::Invalid {
        name: name.to_string(),
        message: issues.join("; "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
name: sample
viewport:
  height: 600
page:
  sections:
    - id: a
    - id: b
      heading: Overview
      height: 300
delivery: reverse
steps:
  - scroll: 350
    expect:
      back_to_top: visible
  - click: b
    expect:
      active: b
  - back_to_top: true
    expect:
      active: ~
  - rebuild: true
";

    #[test]
    fn parses_steps_and_expectations() {
        let scenario = Scenario::from_yaml(SAMPLE, "inline").unwrap();
        assert_eq!(scenario.delivery, DeliveryOrder::Reverse);
        assert!((scenario.viewport.height - 600.0).abs() < f64::EPSILON);
        assert_eq!(scenario.page.sections.len(), 2);
        assert_eq!(scenario.steps.len(), 4);

        assert_eq!(scenario.steps[0].action, Action::Scroll { offset: 350.0 });
        let expect = scenario.steps[0].expect.as_ref().unwrap();
        assert_eq!(expect.back_to_top, Some(Visibility::Visible));
        assert_eq!(expect.active, None);

        assert_eq!(
            scenario.steps[1].expect.as_ref().unwrap().active,
            Some(Some("b".to_string()))
        );
        assert_eq!(scenario.steps[2].action, Action::BackToTop);
        assert_eq!(scenario.steps[2].expect.as_ref().unwrap().active, Some(None));
        assert_eq!(scenario.steps[3].action, Action::Rebuild);
    }

    #[test]
    fn step_with_two_actions_is_rejected() {
        let yaml = "name: x\nsteps:\n  - scroll: 10\n    click: a\n";
        let err = Scenario::from_yaml(yaml, "inline").unwrap_err();
        assert!(err.to_string().contains("exactly one action"), "{err}");
    }

    #[test]
    fn step_without_action_is_rejected() {
        let yaml = "name: x\nsteps:\n  - expect:\n      active: a\n";
        assert!(Scenario::from_yaml(yaml, "inline").is_err());
    }

    #[test]
    fn bad_viewport_is_rejected() {
        let yaml = "name: x\nviewport:\n  height: 0\n";
        let err = Scenario::from_yaml(yaml, "inline").unwrap_err();
        assert!(matches!(err, ScenarioError::Invalid { .. }));
    }

    #[test]
    fn inline_config_is_validated() {
        let yaml = "name: x\nconfig:\n  detection:\n    bottom_margin: 1.5\n    threshold: 0.0\n";
        let err = Scenario::from_yaml(yaml, "inline").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("config.detection.bottom_margin"), "{message}");
        assert!(message.contains("config.detection.threshold"), "{message}");
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Scroll { offset: 350.0 }.to_string(), "scroll to 350");
        assert_eq!(Action::Click { target: "b".into() }.to_string(), "click 'b'");
        assert_eq!(Action::BackToTop.to_string(), "back to top");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Scenario::from_file(Path::new("/nonexistent/scenario.yaml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }
}
