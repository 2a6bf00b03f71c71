//! `simulate`: run a scenario against a simulated page.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::config::NavConfig;
use crate::error::{Result, ScenarioError};
use crate::observability::{EventEmitter, init_metrics};
use crate::scenario::{Scenario, ScenarioRunner, SimulationReport, load_builtin};

/// Runs the selected scenario and prints its report.
///
/// # Errors
///
/// Returns [`ScenarioError::ExpectationFailed`] when any expectation did
/// not hold, or the error that stopped the scenario.
pub async fn run(args: &SimulateArgs, settings: NavConfig) -> Result<()> {
    let (mut scenario, base_dir) = select(args)?;

    if let Some(delivery) = args.delivery {
        scenario.delivery = delivery;
    }
    if let Some(tie_break) = args.tie_break {
        scenario
            .config
            .get_or_insert_with(|| settings.clone())
            .detection
            .tie_break = tie_break;
    }

    let metrics = args.metrics_file.as_ref().and_then(|_| init_metrics());

    let mut runner = ScenarioRunner::new(scenario, settings).with_base_dir(base_dir);
    if let Some(path) = &args.events_file {
        let emitter = if path.as_os_str() == "-" {
            EventEmitter::stdout()
        } else {
            EventEmitter::from_file(path)?
        };
        runner = runner.with_events(Arc::new(emitter));
    }

    let report = runner.run().await?;

    if let (Some(path), Some(handle)) = (&args.metrics_file, metrics) {
        std::fs::write(path, handle.render())?;
    }

    match args.format {
        OutputFormat::Human => print_human(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.passed() {
        Ok(())
    } else {
        Err(ScenarioError::ExpectationFailed {
            name: report.name.clone(),
            failed: report.failure_count(),
        }
        .into())
    }
}

fn select(args: &SimulateArgs) -> std::result::Result<(Scenario, PathBuf), ScenarioError> {
    match (&args.scenario, &args.builtin) {
        (Some(path), _) => {
            let base = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
            Ok((Scenario::from_file(path)?, base))
        }
        (None, Some(name)) => Ok((load_builtin(name)?, PathBuf::from("."))),
        (None, None) => Err(ScenarioError::Invalid {
            name: String::new(),
            message: "no scenario given".to_string(),
        }),
    }
}

fn print_human(report: &SimulationReport) {
    let labels: Vec<&str> = report.entries.iter().map(|e| e.label.as_str()).collect();
    println!("scenario {}", report.name);
    println!("  entries: {}", labels.join(", "));
    println!(
        "  initially active: {}",
        report.initial_active.as_deref().unwrap_or("none")
    );

    for step in &report.steps {
        println!(
            "  [{}] {:<20} active={:<12} back-to-top={:<8} offset={}",
            step.index,
            step.action.to_string(),
            step.active.as_deref().unwrap_or("none"),
            step.back_to_top.to_string(),
            step.scroll_offset,
        );
        for failure in &step.failures {
            println!("      FAIL {failure}");
        }
    }

    let failed = report.failure_count();
    if failed == 0 {
        println!("passed ({} steps)", report.steps.len());
    } else {
        println!("FAILED ({failed} expectation(s))");
    }
}
