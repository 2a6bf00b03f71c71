//! Navigation metrics.
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! a recorder is installed. On native targets [`init_metrics`] installs a
//! Prometheus recorder whose text rendering the CLI can write out.

use metrics::{counter, describe_counter};

/// Click outcomes used as the `outcome` label.
const KNOWN_OUTCOMES: [&str; 2] = ["scrolled", "missing"];

/// Buckets an outcome label, keeping cardinality bounded.
#[must_use]
pub fn sanitize_outcome_label(outcome: &str) -> &str {
    if KNOWN_OUTCOMES.contains(&outcome) {
        outcome
    } else {
        "__unknown__"
    }
}

/// Installs the global Prometheus recorder without an HTTP listener.
///
/// Returns a handle that renders the exposition text. Repeated calls return
/// `None`.
#[cfg(not(target_arch = "wasm32"))]
#[must_use]
pub fn init_metrics() -> Option<metrics_exporter_prometheus::PrometheusHandle> {
    use std::sync::atomic::{AtomicBool, Ordering};

    static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return None;
    }

    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to install metrics recorder");
            None
        }
    }
}

/// Registers metric descriptions with the current recorder.
pub fn describe_metrics() {
    describe_counter!(
        "anchornav_entries_built_total",
        "Navigation entries created by the builder"
    );
    describe_counter!(
        "anchornav_activations_total",
        "Times a different entry became active"
    );
    describe_counter!(
        "anchornav_clicks_total",
        "Navigation item clicks by outcome"
    );
    describe_counter!(
        "anchornav_back_to_top_toggles_total",
        "Back-to-top visibility changes"
    );
}

/// Records a completed build of `entries` items.
pub fn record_entries_built(entries: usize) {
    counter!("anchornav_entries_built_total").increment(entries as u64);
}

/// Records a change of the active entry.
pub fn record_activation() {
    counter!("anchornav_activations_total").increment(1);
}

/// Records a navigation click.
pub fn record_click(outcome: &str) {
    let label = sanitize_outcome_label(outcome);
    counter!("anchornav_clicks_total", "outcome" => label.to_owned()).increment(1);
}

/// Records a back-to-top visibility change.
pub fn record_back_to_top_toggle(visible: bool) {
    let state = if visible { "visible" } else { "hidden" };
    counter!("anchornav_back_to_top_toggles_total", "state" => state).increment(1);
}
