//! Configuration validation
//!
//! Runs on the fully deserialized [`NavConfig`] and collects every issue
//! instead of stopping at the first one.

use crate::config::schema::NavConfig;
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `config`, consuming the validator.
    #[must_use]
    pub fn validate(mut self, config: &NavConfig) -> ValidationResult {
        self.check_selectors(config);
        self.check_detection(config);
        self.check_highlight(config);
        self.check_back_to_top(config);

        ValidationResult {
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn check_selectors(&mut self, config: &NavConfig) {
        let selectors = &config.selectors;
        for (path, value) in [
            ("selectors.marker_class", &selectors.marker_class),
            ("selectors.nav_container", &selectors.nav_container),
            ("selectors.back_to_top", &selectors.back_to_top),
        ] {
            if value.trim().is_empty() {
                self.error(path, "must not be empty");
            } else if value.chars().any(char::is_whitespace) {
                self.error(path, "must be a single name without whitespace");
            }
        }
        if selectors.nav_container == selectors.back_to_top {
            self.error(
                "selectors.back_to_top",
                "must differ from selectors.nav_container",
            );
        }
    }

    fn check_detection(&mut self, config: &NavConfig) {
        let detection = &config.detection;
        if !(0.0..1.0).contains(&detection.bottom_margin) {
            self.error(
                "detection.bottom_margin",
                &format!("must be within [0, 1), got {}", detection.bottom_margin),
            );
        }
        if !(detection.threshold > 0.0 && detection.threshold <= 1.0) {
            self.error(
                "detection.threshold",
                &format!("must be within (0, 1], got {}", detection.threshold),
            );
        }
    }

    fn check_highlight(&mut self, config: &NavConfig) {
        if config.highlight.active_class.trim().is_empty() {
            self.error("highlight.active_class", "must not be empty");
        }
        if config.highlight.decoration.is_empty() {
            self.warning(
                "highlight.decoration",
                "empty decoration: the active entry is only marked by its class",
            );
        }
    }

    fn check_back_to_top(&mut self, config: &NavConfig) {
        let show_after = config.back_to_top.show_after;
        if !show_after.is_finite() || show_after < 0.0 {
            self.error(
                "back_to_top.show_after",
                &format!("must be a non-negative number, got {show_after}"),
            );
        }
    }

    fn error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let result = Validator::new().validate(&NavConfig::default());
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = NavConfig::default();
        config.selectors.marker_class = String::new();
        config.detection.threshold = 0.0;
        config.detection.bottom_margin = 1.5;
        config.back_to_top.show_after = -1.0;

        let result = Validator::new().validate(&config);
        let paths: Vec<_> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "selectors.marker_class",
                "detection.bottom_margin",
                "detection.threshold",
                "back_to_top.show_after",
            ]
        );
        assert!(result.has_errors());
    }

    #[test]
    fn whitespace_in_selector_is_an_error() {
        let mut config = NavConfig::default();
        config.selectors.marker_class = "menu anchor".into();
        let result = Validator::new().validate(&config);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn container_and_button_must_differ() {
        let mut config = NavConfig::default();
        config.selectors.back_to_top = config.selectors.nav_container.clone();
        let result = Validator::new().validate(&config);
        assert_eq!(result.errors[0].path, "selectors.back_to_top");
    }

    #[test]
    fn empty_decoration_is_only_a_warning() {
        let mut config = NavConfig::default();
        config.highlight.decoration = String::new();
        let result = Validator::new().validate(&config);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
    }
}
