//! Configuration loader
//!
//! Pipeline: size check, BOM strip, environment substitution on the raw
//! text, YAML parse, typed deserialization, validation. An empty document
//! yields [`NavConfig::default`].

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::schema::NavConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Size limits.
    pub config_limits: ConfigLimits,
}

/// Limits guarding against oversized configuration files.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("ANCHORNAV_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: NavConfig,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Loads [`NavConfig`] from YAML.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or too large, a required
    /// environment variable is unset, the YAML is malformed or validation
    /// reports errors.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let missing = || ConfigError::MissingFile {
            path: path.to_path_buf(),
        };

        let limit = self.options.config_limits.max_config_size;
        let size = std::fs::metadata(path).map_err(|_| missing())?.len();
        if usize::try_from(size).map_or(true, |size| size > limit) {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {limit} bytes"),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| missing())?;
        self.load_source(&raw, path)
    }

    /// Loads and validates configuration text; `origin` names it in errors.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file checks.
    pub fn load_str(&self, raw: &str, origin: &str) -> Result<LoadResult, ConfigError> {
        self.load_source(raw, Path::new(origin))
    }

    #[allow(clippy::unused_self)]
    fn load_source(&self, raw: &str, origin: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        let mut env_sub = EnvSubstitution::new(origin);
        let substituted = env_sub.substitute(raw)?;
        let mut warnings = env_sub.warnings;

        let root: Value =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        let config = if root.is_null() {
            NavConfig::default()
        } else {
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: origin.to_path_buf(),
                line: None,
                message: e.to_string(),
            })?
        };

        let validation = Validator::new().validate(&config);
        if validation.has_errors() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors: validation.errors,
            });
        }
        warnings.extend(validation.warnings.into_iter().map(|issue| LoadWarning {
            message: issue.message,
            location: Some(issue.path),
        }));

        Ok(LoadResult { config, warnings })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Expands environment references in raw YAML text before parsing.
///
/// - `${VAR}` expands to the value, or to nothing with a warning
/// - `${VAR:-default}` falls back to `default`
/// - `${VAR:?message}` fails when unset
/// - `$$` is a literal `$`
struct EnvSubstitution<'a> {
    origin: &'a Path,
    warnings: Vec<LoadWarning>,
}

impl<'a> EnvSubstitution<'a> {
    const fn new(origin: &'a Path) -> Self {
        Self {
            origin,
            warnings: Vec::new(),
        }
    }

    fn substitute(&mut self, raw: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if let Some(after) = tail.strip_prefix('$') {
                out.push('$');
                rest = after;
            } else if let Some(body) = tail.strip_prefix('{') {
                let end = closing_brace(body).ok_or_else(|| ConfigError::ParseError {
                    path: self.origin.to_path_buf(),
                    line: line_of(raw, raw.len() - rest.len() + pos),
                    message: "unclosed environment variable reference".to_string(),
                })?;
                out.push_str(&self.expand(&body[..end])?);
                rest = &body[end + 1..];
            } else {
                out.push('$');
                rest = tail;
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn expand(&mut self, spec: &str) -> Result<String, ConfigError> {
        let (name, fallback) = match spec.split_once(':') {
            Some((name, rest)) if rest.starts_with(['-', '?']) => (name, Some(rest)),
            _ => (spec, None),
        };

        if let Ok(value) = std::env::var(name) {
            return Ok(value);
        }

        match fallback {
            Some(fallback) => match fallback.split_at(1) {
                ("-", default) => Ok(default.to_string()),
                (_, message) => Err(ConfigError::EnvVarNotSet {
                    var: name.to_string(),
                    location: format!("{}: {message}", self.origin.display()),
                }),
            },
            None => {
                self.warnings.push(LoadWarning {
                    message: format!(
                        "environment variable '{name}' is not set, using empty string"
                    ),
                    location: Some(self.origin.display().to_string()),
                });
                Ok(String::new())
            }
        }
    }
}

/// Byte index of the `}` closing a reference body, honouring nested braces.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 1_usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn line_of(text: &str, byte: usize) -> Option<usize> {
    text.get(..byte).map(|prefix| prefix.matches('\n').count() + 1)
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Locates the configuration file to use.
///
/// An explicit path wins; otherwise `anchornav.yaml` in the working
/// directory is used when present.
#[must_use]
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(|| {
        let local = PathBuf::from("anchornav.yaml");
        local.is_file().then_some(local)
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::nav::TieBreak;

    fn substitute(raw: &str) -> (Result<String, ConfigError>, Vec<LoadWarning>) {
        let mut sub = EnvSubstitution::new(Path::new("nav.yaml"));
        let result = sub.substitute(raw);
        (result, sub.warnings)
    }

    #[test]
    fn test_env_substitution_simple() {
        let (result, warnings) = substitute("path: ${PATH}");
        let result = result.unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.len() > "path: ".len());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_env_substitution_default() {
        let (result, _) = substitute("marker: ${ANCHORNAV_TEST_UNSET_VAR_Q81:-menu-anchor}");
        assert_eq!(result.unwrap(), "marker: menu-anchor");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let (result, _) = substitute("marker: ${ANCHORNAV_TEST_REQUIRED_Q81:?set the marker}");
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "ANCHORNAV_TEST_REQUIRED_Q81");
                assert!(location.contains("set the marker"));
            }
            other => panic!("expected EnvVarNotSet, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let (result, _) = substitute("decoration: \"$$ \"");
        assert_eq!(result.unwrap(), "decoration: \"$ \"");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let (result, warnings) = substitute("marker: ${ANCHORNAV_TEST_WARN_Q81}");
        assert_eq!(result.unwrap(), "marker: ");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("ANCHORNAV_TEST_WARN_Q81"));
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let (result, _) = substitute("a: 1\nmarker: ${OOPS");
        match result {
            Err(ConfigError::ParseError { line, .. }) => assert_eq!(line, Some(2)),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_lone_dollar_is_kept() {
        let (result, _) = substitute("decoration: \"$ \"");
        assert_eq!(result.unwrap(), "decoration: \"$ \"");
    }

    #[test]
    fn test_load_str_overrides_defaults() {
        let yaml = "detection:\n  threshold: 0.5\n  tie_break: last-delivered\n";
        let result = ConfigLoader::with_defaults().load_str(yaml, "inline").unwrap();
        assert!((result.config.detection.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(result.config.detection.tie_break, TieBreak::LastDelivered);
        assert_eq!(result.config.selectors.marker_class, "menu-anchor");
    }

    #[test]
    fn test_empty_document_is_default() {
        let result = ConfigLoader::with_defaults().load_str("\u{feff}", "empty").unwrap();
        assert_eq!(result.config, NavConfig::default());
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = ConfigLoader::with_defaults()
            .load_str("selectors:\n  marker: x\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = ConfigLoader::with_defaults()
            .load_str("detection:\n  threshold: 0\n", "inline")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_validation_warnings_become_load_warnings() {
        let result = ConfigLoader::with_defaults()
            .load_str("highlight:\n  decoration: \"\"\n", "inline")
            .unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(
            result.warnings[0].location.as_deref(),
            Some("highlight.decoration")
        );
    }

    #[test]
    fn test_file_size_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "selectors:\n  marker_class: anchor").unwrap();
        let loader = ConfigLoader::new(LoaderOptions {
            config_limits: ConfigLimits { max_config_size: 4 },
        });
        let err = loader.load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let loaded = ConfigLoader::with_defaults().load(file.path()).unwrap();
        assert_eq!(loaded.config.selectors.marker_class, "anchor");
    }

    #[test]
    fn test_json_settings_are_validated() {
        let loader = ConfigLoader::with_defaults();
        let ok = loader
            .load_str(r#"{"selectors": {"marker_class": "doc"}}"#, "attach")
            .unwrap();
        assert_eq!(ok.config.selectors.marker_class, "doc");

        let err = loader
            .load_str(r#"{"detection": {"bottom_margin": 1.5, "threshold": 0.0}}"#, "attach")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("detection.bottom_margin"), "{message}");
        assert!(message.contains("detection.threshold"), "{message}");
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::with_defaults()
            .load(Path::new("/nonexistent/anchornav.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_discover_prefers_explicit() {
        assert_eq!(
            discover(Some(Path::new("custom.yaml"))),
            Some(PathBuf::from("custom.yaml"))
        );
    }
}
