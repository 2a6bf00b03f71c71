#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::{fixture_path, run, stderr, stdout, stdout_json};

fn guide() -> String {
    fixture_path("guide.html").to_str().unwrap().to_string()
}

#[test]
fn outline_human_lists_navigable_sections() {
    let output = run(&["outline", &guide()]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3, "stdout: {text}");
    assert!(lines[0].contains("Installation") && lines[0].contains("#install"));
    assert!(lines[1].contains("Usage") && lines[1].contains("#usage"));
    assert!(lines[2].contains("faq") && lines[2].contains("#faq"));
    assert!(!text.contains("Changelog"), "sections without an id get no entry");
    assert!(!text.contains("not a heading"), "script bodies are skipped");
}

#[test]
fn outline_json_has_labels_and_targets() {
    let output = run(&["outline", &guide(), "--format", "json"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let parsed = stdout_json(&output);
    let text = parsed.to_string();
    for expected in ["Installation", "install", "Usage", "usage", "faq"] {
        assert!(text.contains(expected), "missing {expected}: {text}");
    }
    assert!(!text.contains("Changelog"));
}

#[test]
fn outline_html_renders_list_items() {
    let output = run(&["outline", &guide(), "--format", "html"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert_eq!(text.matches("<li class=\"nav-item\">").count(), 3);
    assert!(text.contains(r#"data-scroll-target="install">Installation</a>"#), "{text}");
    assert!(!text.contains("nav-link active"), "nothing is active before observing");
}

#[test]
fn outline_honours_marker_class_from_settings() {
    let output = run(&[
        "outline",
        &guide(),
        "--config",
        fixture_path("nav.yaml").to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("no navigable sections"));
}

#[test]
fn outline_missing_document_is_io_error() {
    let output = run(&["outline", "/nonexistent/anchornav/page.html"]);
    assert_eq!(output.status.code(), Some(3));
}
