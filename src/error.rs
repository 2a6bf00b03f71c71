//! Error types for `anchornav`
//!
//! The navigation engine itself never fails: missing ids and vanished click
//! targets degrade silently. Errors only originate at the edges, when
//! loading configuration, scanning documents or running scenarios.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `anchornav` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Document could not be scanned
    pub const DOCUMENT_ERROR: i32 = 4;

    /// Scenario invalid or an expectation failed
    pub const SCENARIO_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `anchornav` operations.
#[derive(Debug, Error)]
pub enum AnchorNavError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rendered document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Scenario loading or execution error
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AnchorNavError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Document(DocumentError::Io { .. }) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Document(_) => ExitCode::DOCUMENT_ERROR,
            Self::Scenario(ScenarioError::Io { .. }) => ExitCode::IO_ERROR,
            Self::Scenario(_) => ExitCode::SCENARIO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(.errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "detection.threshold")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Document Errors
// ============================================================================

/// Errors reading or scanning a rendered document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document file could not be read
    #[error("cannot read document {path}: {source}")]
    Io {
        /// Path to the document
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The markup could not be tokenised
    #[error("malformed markup at byte {position}: {message}")]
    Malformed {
        /// Byte offset of the error
        position: u64,
        /// Parser message
        message: String,
    },
}

// ============================================================================
// Scenario Errors
// ============================================================================

/// Scenario loading and execution errors.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// Scenario file could not be read
    #[error("cannot read scenario {path}: {source}")]
    Io {
        /// Path to the scenario file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Scenario YAML is invalid
    #[error("invalid scenario {name}: {message}")]
    Invalid {
        /// Scenario name or path
        name: String,
        /// What is wrong
        message: String,
    },

    /// A step refers to a section that has no navigation entry
    #[error("step {step}: no navigation entry targets '{target}'{}", did_you_mean(.suggestion))]
    UnknownEntry {
        /// Zero-based step index
        step: usize,
        /// Requested target id
        target: String,
        /// Closest known target id
        suggestion: Option<String>,
    },

    /// No built-in scenario has this name
    #[error("unknown built-in scenario '{name}'{}", did_you_mean(.suggestion))]
    UnknownBuiltin {
        /// Requested name
        name: String,
        /// Closest built-in name
        suggestion: Option<String>,
    },

    /// One or more expectations did not hold
    #[error("{failed} expectation(s) failed in scenario {name}")]
    ExpectationFailed {
        /// Scenario name
        name: String,
        /// Number of failed expectations
        failed: usize,
    },

    /// The event loop stopped before the scenario finished
    #[error("event loop stopped: {0}")]
    EventLoop(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `anchornav` operations.
pub type Result<T> = std::result::Result<T, AnchorNavError>;

// ============================================================================
// Tests
// ============================================================================
