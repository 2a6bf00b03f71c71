//! `config validate` and `config show`.

use serde::Serialize;

use crate::cli::args::{ConfigShowArgs, ConfigValidateArgs, OutputFormat};
use crate::config::{ConfigLoader, NavConfig};
use crate::error::{ConfigError, Result, Severity, ValidationIssue};

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validates each file, reporting every result before failing.
///
/// # Errors
///
/// Returns the first file's error when any file is invalid, or a
/// validation error for warnings under `--strict`.
pub fn validate(args: &ConfigValidateArgs) -> Result<()> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        let display = path.display().to_string();
        match loader.load(path) {
            Ok(loaded) => {
                let warnings: Vec<String> = loaded.warnings.iter().map(ToString::to_string).collect();
                let valid = !(args.strict && !warnings.is_empty());
                if !valid && first_error.is_none() {
                    first_error = Some(ConfigError::ValidationError {
                        path: display.clone(),
                        errors: loaded
                            .warnings
                            .iter()
                            .map(|w| ValidationIssue {
                                path: w.location.clone().unwrap_or_default(),
                                message: w.message.clone(),
                                severity: Severity::Warning,
                            })
                            .collect(),
                    });
                }
                reports.push(FileReport {
                    path: display,
                    valid,
                    errors: Vec::new(),
                    warnings,
                });
            }
            Err(e) => {
                reports.push(FileReport {
                    path: display,
                    valid: false,
                    errors: vec![e.to_string()],
                    warnings: Vec::new(),
                });
                first_error.get_or_insert(e);
            }
        }
    }

    match args.format {
        OutputFormat::Human => {
            for report in &reports {
                let mark = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {mark}", report.path);
                for line in report.errors.iter().chain(&report.warnings) {
                    println!("  {line}");
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

/// Prints the effective settings.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn show(args: &ConfigShowArgs, settings: &NavConfig) -> Result<()> {
    match args.format {
        OutputFormat::Human => print!("{}", serde_yaml::to_string(settings)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(settings)?),
    }
    Ok(())
}
