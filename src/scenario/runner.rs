//! Scenario execution.
//!
//! Steps are fed through a `tokio` channel to a single consumer that owns
//! the page, mirroring a browser's single-threaded event loop. Each step
//! turns into the host events the action would cause: a scroll yields a
//! scroll event followed by whatever intersection batch the new position
//! produces; a click yields the click followed by the scroll it caused.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::config::NavConfig;
use crate::error::ScenarioError;
use crate::nav::{ClickOutcome, EventOutcome, NavSync, PageEvent, SectionNode, Visibility};
use crate::observability::EventEmitter;
use crate::page::{DeliveryOrder, HtmlDocument, IntersectionWatch, NavItem, PageModel, PageSetup};
use crate::scenario::schema::{Action, Expectation, Scenario, Step, check_settings};
use crate::scenario::suggest;

const STEP_QUEUE_DEPTH: usize = 16;
const OFFSET_TOLERANCE: f64 = 0.5;

// ============================================================================
// Reports
// ============================================================================

/// An expectation that did not hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationFailure {
    /// Zero-based step index.
    pub step: usize,
    /// Expectation field.
    pub field: &'static str,
    /// Expected value, rendered.
    pub expected: String,
    /// Observed value, rendered.
    pub actual: String,
}

impl fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {}: expected {} = {}, got {}",
            self.step, self.field, self.expected, self.actual
        )
    }
}

/// State after one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Zero-based step index.
    pub index: usize,
    /// Action performed.
    pub action: Action,
    /// Outcome of every host event the action caused.
    pub outcomes: Vec<EventOutcome>,
    /// Target id of the active entry.
    pub active: Option<String>,
    /// Back-to-top visibility.
    pub back_to_top: Visibility,
    /// Scroll offset.
    pub scroll_offset: f64,
    /// Expectations that failed.
    pub failures: Vec<ExpectationFailure>,
}

/// Result of running a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Scenario name.
    pub name: String,
    /// Navigation items right after attaching.
    pub entries: Vec<NavItem>,
    /// Active entry after the initial intersection batch.
    pub initial_active: Option<String>,
    /// Per-step results.
    pub steps: Vec<StepReport>,
    /// Navigation items when the scenario ended.
    pub final_nav: Vec<NavItem>,
}

impl SimulationReport {
    /// Every failed expectation, in step order.
    pub fn failures(&self) -> impl Iterator<Item = &ExpectationFailure> {
        self.steps.iter().flat_map(|s| s.failures.iter())
    }

    /// Number of failed expectations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Returns `true` when every expectation held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Drives a [`PageModel`] through a [`Scenario`].
#[derive(Debug)]
pub struct ScenarioRunner {
    scenario: Scenario,
    config: NavConfig,
    base_dir: PathBuf,
    emitter: Option<Arc<EventEmitter>>,
}

impl ScenarioRunner {
    /// Creates a runner. Settings embedded in the scenario replace `config`.
    #[must_use]
    pub fn new(scenario: Scenario, config: NavConfig) -> Self {
        let config = scenario.config.clone().unwrap_or(config);
        Self {
            scenario,
            config,
            base_dir: PathBuf::from("."),
            emitter: None,
        }
    }

    /// Directory the scenario's document path is relative to.
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Emits structured events while running.
    #[must_use]
    pub fn with_events(mut self, emitter: Arc<EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Settings in effect.
    #[must_use]
    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Runs every step on the current `tokio` runtime.
    ///
    /// Failed expectations are reported, not returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error when the page cannot be built, a step refers to an
    /// unknown entry or section, or the event loop stops early.
    pub async fn run(self) -> Result<SimulationReport, ScenarioError> {
        let span = info_span!("scenario", name = %self.scenario.name);
        self.run_inner().instrument(span).await
    }

    /// Runs on a fresh single-threaded runtime.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run), plus runtime construction failures.
    pub fn run_blocking(self) -> Result<SimulationReport, ScenarioError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ScenarioError::EventLoop(e.to_string()))?
            .block_on(self.run())
    }

    async fn run_inner(self) -> Result<SimulationReport, ScenarioError> {
        check_settings(&self.scenario.name, &self.config)?;
        let page = build_page(&self.scenario, &self.config, &self.base_dir)?;
        let mut sim = Simulation::attach(
            page,
            &self.config,
            self.emitter.clone(),
            self.scenario.delivery,
            &self.scenario.name,
        )?;

        let entries = sim.page.nav_items().to_vec();
        sim.deliver(&mut Vec::new());
        let initial_active = sim.active_target();
        info!(
            entries = entries.len(),
            active = initial_active.as_deref().unwrap_or("none"),
            "page attached"
        );

        let (tx, mut rx) = mpsc::channel::<(usize, Step)>(STEP_QUEUE_DEPTH);
        let steps = self.scenario.steps.clone();
        let feeder = tokio::spawn(async move {
            for item in steps.into_iter().enumerate() {
                if tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        let mut reports = Vec::with_capacity(self.scenario.steps.len());
        while let Some((index, step)) = rx.recv().await {
            reports.push(sim.apply(index, step)?);
        }
        feeder
            .await
            .map_err(|e| ScenarioError::EventLoop(e.to_string()))?;

        let report = SimulationReport {
            name: self.scenario.name.clone(),
            entries,
            initial_active,
            steps: reports,
            final_nav: sim.page.nav_items().to_vec(),
        };
        if report.passed() {
            info!(steps = report.steps.len(), "scenario passed");
        } else {
            warn!(failed = report.failure_count(), "scenario expectations failed");
        }
        Ok(report)
    }
}

// ============================================================================
// Page construction
// ============================================================================

fn build_page(
    scenario: &Scenario,
    config: &NavConfig,
    base_dir: &Path,
) -> Result<PageModel, ScenarioError> {
    let spec = &scenario.page;
    let viewport = scenario.viewport.height;

    if let Some(document) = &spec.document {
        let path = base_dir.join(document);
        let html = std::fs::read_to_string(&path)
            .map_err(|source| ScenarioError::Io { path: path.clone(), source })?;
        let doc = HtmlDocument::parse(&html).map_err(|e| ScenarioError::Invalid {
            name: scenario.name.clone(),
            message: format!("{}: {e}", path.display()),
        })?;
        return Ok(PageModel::from_document(
            &doc,
            viewport,
            spec.default_height,
            |id| {
                let section = spec.sections.iter().find(|s| s.id.as_deref() == Some(id))?;
                Some((section.top?, section.height.unwrap_or(spec.default_height)))
            },
        ));
    }

    let mut builder = PageModel::builder(viewport);
    let mut cursor = 0.0_f64;
    for section in &spec.sections {
        let top = section.top.unwrap_or(cursor);
        let height = section.height.unwrap_or(spec.default_height);
        cursor = cursor.max(top + height);
        let classes = section
            .classes
            .clone()
            .unwrap_or_else(|| vec![config.selectors.marker_class.clone()]);
        let node = SectionNode {
            id: section.id.clone(),
            first_heading: section.heading.clone(),
        };
        builder = builder.section_with_classes(node, classes, top, height);
    }
    Ok(builder.build())
}

// ============================================================================
// Simulation state
// ============================================================================

struct Simulation {
    name: String,
    page: PageModel,
    sync: NavSync,
    watch: IntersectionWatch,
    delivery: DeliveryOrder,
}

struct Session {
    page: PageModel,
    sync: Option<NavSync>,
}

impl Simulation {
    fn attach(
        page: PageModel,
        config: &NavConfig,
        emitter: Option<Arc<EventEmitter>>,
        delivery: DeliveryOrder,
        name: &str,
    ) -> Result<Self, ScenarioError> {
        let mut session = Session { page, sync: None };
        let mut setup = PageSetup::new();
        let attach_config = config.clone();
        setup.on_ready(&mut session, move |s: &mut Session| {
            s.sync = Some(NavSync::attach_with_events(&mut s.page, &attach_config, emitter));
        });
        setup.notify_ready(&mut session);

        let Session { page, sync } = session;
        let sync = sync.ok_or_else(|| ScenarioError::EventLoop("page setup did not run".into()))?;
        let watch = Self::watch_for(&page, &sync, delivery);
        Ok(Self {
            name: name.to_string(),
            page,
            sync,
            watch,
            delivery,
        })
    }

    fn watch_for(page: &PageModel, sync: &NavSync, delivery: DeliveryOrder) -> IntersectionWatch {
        let config = sync.config();
        IntersectionWatch::for_page(
            page,
            &config.selectors.marker_class,
            config.detection.zone(),
            delivery,
        )
    }

    fn active_target(&self) -> Option<String> {
        self.sync
            .list()
            .active()
            .map(|e| e.scroll_target_id().to_string())
    }

    fn deliver(&mut self, outcomes: &mut Vec<EventOutcome>) {
        let batch = self.watch.poll(&self.page);
        if !batch.is_empty() {
            outcomes.push(self.sync.handle(&mut self.page, PageEvent::Intersections(batch)));
        }
    }

    fn after_scroll(&mut self, outcomes: &mut Vec<EventOutcome>) {
        let offset = self.page.scroll_offset();
        outcomes.push(self.sync.handle(&mut self.page, PageEvent::Scroll { offset }));
        self.deliver(outcomes);
    }

    fn apply(&mut self, index: usize, step: Step) -> Result<StepReport, ScenarioError> {
        debug!(step = index, action = %step.action, "applying step");
        let mut outcomes = Vec::new();

        match &step.action {
            Action::Scroll { offset } => {
                self.page.set_scroll_offset(*offset);
                self.after_scroll(&mut outcomes);
            }
            Action::Click { target } => {
                let list = self.sync.list();
                let position = list.position(target).ok_or_else(|| ScenarioError::UnknownEntry {
                    step: index,
                    target: target.clone(),
                    suggestion: suggest(target, list.iter().map(|e| e.scroll_target_id())),
                })?;
                let outcome = self
                    .sync
                    .handle(&mut self.page, PageEvent::ClickEntry { index: position });
                let scrolled = matches!(
                    outcome,
                    EventOutcome::Clicked {
                        outcome: ClickOutcome::Scrolled { .. }
                    }
                );
                outcomes.push(outcome);
                if scrolled {
                    self.after_scroll(&mut outcomes);
                }
            }
            Action::BackToTop => {
                outcomes.push(self.sync.handle(&mut self.page, PageEvent::ClickBackToTop));
                self.after_scroll(&mut outcomes);
            }
            Action::Remove { id } => {
                if !self.page.remove_section(id) {
                    let known = self.page.sections().iter().filter_map(|s| s.node.id.as_deref());
                    let hint = suggest(id, known)
                        .map(|s| format!(" (did you mean '{s}'?)"))
                        .unwrap_or_default();
                    return Err(ScenarioError::Invalid {
                        name: self.name.clone(),
                        message: format!("step {index}: no section '{id}' to remove{hint}"),
                    });
                }
            }
            Action::Rebuild => {
                outcomes.push(self.sync.handle(&mut self.page, PageEvent::Rebuild));
                self.watch = Self::watch_for(&self.page, &self.sync, self.delivery);
                self.deliver(&mut outcomes);
            }
        }

        let failures = step
            .expect
            .as_ref()
            .map(|expect| self.check(index, expect))
            .unwrap_or_default();
        for failure in &failures {
            warn!(%failure, "expectation failed");
        }

        Ok(StepReport {
            index,
            action: step.action,
            outcomes,
            active: self.active_target(),
            back_to_top: self.sync.back_to_top(),
            scroll_offset: self.page.scroll_offset(),
            failures,
        })
    }

    fn check(&self, step: usize, expect: &Expectation) -> Vec<ExpectationFailure> {
        let mut failures = Vec::new();
        let mut fail = |field, expected: String, actual: String| {
            failures.push(ExpectationFailure {
                step,
                field,
                expected,
                actual,
            });
        };

        if let Some(expected) = &expect.active {
            let actual = self.active_target();
            if &actual != expected {
                fail("active", or_none(expected.as_deref()), or_none(actual.as_deref()));
            }
        }
        if let Some(expected) = expect.back_to_top {
            let actual = self.sync.back_to_top();
            if actual != expected {
                fail("back_to_top", expected.to_string(), actual.to_string());
            }
        }
        if let Some(expected) = &expect.entries {
            let actual: Vec<&str> = self.page.nav_items().iter().map(|i| i.label.as_str()).collect();
            if actual != *expected {
                fail("entries", format!("{expected:?}"), format!("{actual:?}"));
            }
        }
        if let Some(expected) = expect.scroll_offset {
            let actual = self.page.scroll_offset();
            if (actual - expected).abs() > OFFSET_TOLERANCE {
                fail("scroll_offset", expected.to_string(), actual.to_string());
            }
        }
        failures
    }
}

fn or_none(value: Option<&str>) -> String {
    value.map_or_else(|| "none".to_string(), |v| format!("'{v}'"))
}
