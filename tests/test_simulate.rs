#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::{fixture_path, run, stderr, stdout, stdout_json};

fn guide_scenario() -> String {
    fixture_path("guide_scenario.yaml").to_str().unwrap().to_string()
}

#[test]
fn scenario_with_document_passes() {
    let output = run(&["simulate", &guide_scenario()]);
    assert!(
        output.status.success(),
        "{}{}",
        stdout(&output),
        stderr(&output)
    );
    let text = stdout(&output);
    assert!(text.contains("entries: Installation, Usage, faq"), "{text}");
    assert!(text.contains("initially active: install"), "{text}");
}

#[test]
fn json_report_tracks_each_step() {
    let output = run(&["simulate", &guide_scenario(), "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let report = stdout_json(&output);
    assert_eq!(report["name"], "guide");
    let steps = report["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[1]["active"], "usage");
    assert_eq!(steps[2]["active"], "faq");
    assert_eq!(steps[3]["active"], "install");
    assert!(steps.iter().all(|s| s["failures"].as_array().unwrap().is_empty()));
}

#[test]
fn events_file_records_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let output = run(&[
        "simulate",
        &guide_scenario(),
        "--events-file",
        events.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = std::fs::read_to_string(&events).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0]["type"], "NavigationBuilt");
    assert_eq!(lines[0]["entries"], 3);
    assert!(lines.iter().all(|l| l["timestamp"].is_string()));

    let kinds: Vec<&str> = lines.iter().filter_map(|l| l["type"].as_str()).collect();
    assert!(kinds.contains(&"SectionActivated"), "{kinds:?}");
    assert!(kinds.contains(&"ScrollRequested"), "{kinds:?}");
    assert!(kinds.contains(&"BackToTopToggled"), "{kinds:?}");
}

#[test]
fn metrics_file_has_prometheus_text() {
    let dir = tempfile::tempdir().unwrap();
    let metrics = dir.path().join("metrics.prom");
    let output = run(&[
        "simulate",
        "--builtin",
        "three-sections",
        "--metrics-file",
        metrics.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = std::fs::read_to_string(&metrics).unwrap();
    assert!(text.contains("anchornav_entries_built_total"), "{text}");
    assert!(text.contains("anchornav_clicks_total"), "{text}");
}

#[test]
fn tie_break_override_changes_outcome() {
    // Delivered top-down, last-delivered picks `c` where the scenario expects `a`.
    let output = run(&[
        "simulate",
        "--builtin",
        "tie-break-topmost",
        "--delivery",
        "document-order",
        "--tie-break",
        "last-delivered",
        "--format",
        "json",
    ]);
    assert_eq!(output.status.code(), Some(5), "{}", stderr(&output));
}
