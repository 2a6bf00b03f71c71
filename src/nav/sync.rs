//! Per-page navigation synchronisation.
//!
//! [`NavSync`] bundles the builder, the tracker and the back-to-top control
//! into one instance that is attached once per rendered page and then fed
//! every page event for the life of the view.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::config::NavConfig;
use crate::host::PageHost;
use crate::nav::back_to_top::{BackToTop, Visibility};
use crate::nav::builder::{self, ClickOutcome, NavigationBuilder};
use crate::nav::entry::NavigationList;
use crate::nav::tracker::{ActiveChange, ActiveSectionTracker, IntersectionEntry};
use crate::observability::{Event, EventEmitter};

/// Events delivered by the host's event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The page scrolled to `offset`.
    Scroll {
        /// Vertical scroll offset.
        offset: f64,
    },
    /// A batch of visibility observations.
    Intersections(Vec<IntersectionEntry>),
    /// A navigation item was clicked.
    ClickEntry {
        /// Index of the clicked item.
        index: usize,
    },
    /// The back-to-top control was clicked.
    ClickBackToTop,
    /// The document was re-rendered; rebuild the list.
    Rebuild,
}

/// What handling a [`PageEvent`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Back-to-top visibility was re-derived.
    Scrolled {
        /// Resulting visibility.
        visibility: Visibility,
    },
    /// An intersection batch was processed.
    Observed {
        /// Change of the active entry, if any.
        change: Option<ActiveChange>,
    },
    /// A navigation item was clicked.
    Clicked {
        /// Click result.
        outcome: ClickOutcome,
    },
    /// A smooth scroll to the top was requested.
    ReturnedToTop,
    /// The list was rebuilt.
    Rebuilt {
        /// Number of entries after rebuilding.
        entries: usize,
    },
}

/// Navigation behaviour attached to one rendered page.
#[derive(Debug)]
pub struct NavSync {
    config: NavConfig,
    builder: NavigationBuilder,
    list: NavigationList,
    tracker: ActiveSectionTracker,
    back_to_top: BackToTop,
    emitter: Option<Arc<EventEmitter>>,
}

impl NavSync {
    /// Builds the navigation list for the page and prepares the tracker.
    pub fn attach<H: PageHost + ?Sized>(host: &mut H, config: &NavConfig) -> Self {
        Self::attach_with_events(host, config, None)
    }

    /// Like [`attach`](Self::attach), also emitting structured events.
    pub fn attach_with_events<H: PageHost + ?Sized>(
        host: &mut H,
        config: &NavConfig,
        emitter: Option<Arc<EventEmitter>>,
    ) -> Self {
        let _span = info_span!("attach", marker = %config.selectors.marker_class).entered();
        let builder = NavigationBuilder::new(&config.selectors.marker_class);
        let list = builder.build(host);
        let tracker = Self::tracker_for(&list, config);
        let back_to_top = BackToTop::new(config.back_to_top.show_after);
        host.set_back_to_top_visible(back_to_top.visibility().is_visible());
        let sync = Self {
            config: config.clone(),
            builder,
            list,
            tracker,
            back_to_top,
            emitter,
        };
        sync.emit_built();
        sync
    }

    fn tracker_for(list: &NavigationList, config: &NavConfig) -> ActiveSectionTracker {
        ActiveSectionTracker::new(
            list,
            config.detection.zone(),
            config.detection.tie_break,
            config.highlight.decoration.clone(),
        )
    }

    /// Current navigation list.
    #[must_use]
    pub const fn list(&self) -> &NavigationList {
        &self.list
    }

    /// Tracker in use.
    #[must_use]
    pub const fn tracker(&self) -> &ActiveSectionTracker {
        &self.tracker
    }

    /// Current back-to-top visibility.
    #[must_use]
    pub const fn back_to_top(&self) -> Visibility {
        self.back_to_top.visibility()
    }

    /// Settings this instance was attached with.
    #[must_use]
    pub const fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Handles one page event.
    pub fn handle<H: PageHost + ?Sized>(&mut self, host: &mut H, event: PageEvent) -> EventOutcome {
        match event {
            PageEvent::Scroll { offset } => {
                let before = self.back_to_top.visibility();
                let visibility = self.back_to_top.on_scroll(host, offset);
                if visibility != before {
                    self.emit(Event::back_to_top_toggled(offset, visibility.is_visible()));
                }
                EventOutcome::Scrolled { visibility }
            }
            PageEvent::Intersections(batch) => {
                let change = self.tracker.observe(&mut self.list, host, &batch);
                if let Some(ref c) = change {
                    if let Some(entry) = self.list.get(c.current) {
                        self.emit(Event::section_activated(
                            &c.target_id,
                            entry.label(),
                            c.previous,
                        ));
                    }
                }
                EventOutcome::Observed { change }
            }
            PageEvent::ClickEntry { index } => {
                let outcome = builder::activate(&self.list, host, index);
                match &outcome {
                    ClickOutcome::Scrolled { target_id } => {
                        self.emit(Event::scroll_requested(Some(target_id.as_str())));
                    }
                    ClickOutcome::Missing { target_id } => {
                        self.emit(Event::click_ignored(index, target_id.as_deref()));
                    }
                }
                EventOutcome::Clicked { outcome }
            }
            PageEvent::ClickBackToTop => {
                self.back_to_top.activate(host);
                self.emit(Event::scroll_requested(None));
                EventOutcome::ReturnedToTop
            }
            PageEvent::Rebuild => {
                self.list = self.builder.build(host);
                self.tracker = Self::tracker_for(&self.list, &self.config);
                debug!(entries = self.list.len(), "navigation rebuilt");
                self.emit_built();
                EventOutcome::Rebuilt {
                    entries: self.list.len(),
                }
            }
        }
    }

    fn emit_built(&self) {
        self.emit(Event::navigation_built(
            self.list.iter().map(|e| e.scroll_target_id().to_string()).collect(),
        ));
    }

    fn emit(&self, event: Event) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::SectionNode;
    use crate::page::PageModel;

    fn page() -> PageModel {
        PageModel::builder(1000.0)
            .section(SectionNode::with_id("intro").heading("Intro"), 0.0, 300.0)
            .section(SectionNode::with_id("usage").heading("Usage"), 300.0, 1200.0)
            .build()
    }

    #[test]
    fn attach_builds_list_without_active_entry() {
        let mut host = page();
        let sync = NavSync::attach(&mut host, &NavConfig::default());
        assert_eq!(sync.list().len(), 2);
        assert!(sync.list().active().is_none());
        assert_eq!(sync.back_to_top(), Visibility::Hidden);
    }

    #[test]
    fn handles_scroll_and_intersections() {
        let mut host = page();
        let mut sync = NavSync::attach(&mut host, &NavConfig::default());

        let outcome = sync.handle(&mut host, PageEvent::Scroll { offset: 500.0 });
        assert_eq!(
            outcome,
            EventOutcome::Scrolled {
                visibility: Visibility::Visible
            }
        );

        let batch = vec![IntersectionEntry {
            target_id: "usage".into(),
            ratio: 0.45,
            is_intersecting: true,
            top: -200.0,
        }];
        let EventOutcome::Observed { change } = sync.handle(&mut host, PageEvent::Intersections(batch))
        else {
            panic!("expected an observation outcome");
        };
        assert_eq!(change.unwrap().target_id, "usage");
        assert_eq!(sync.list().active().unwrap().label(), "Usage");
    }

    #[test]
    fn back_to_top_click_returns_to_zero() {
        let mut host = page();
        let mut sync = NavSync::attach(&mut host, &NavConfig::default());
        host.set_scroll_offset(900.0);
        assert_eq!(
            sync.handle(&mut host, PageEvent::ClickBackToTop),
            EventOutcome::ReturnedToTop
        );
        assert!(host.scroll_offset().abs() < f64::EPSILON);
    }

    #[test]
    fn rebuild_resets_active_marker() {
        let mut host = page();
        let mut sync = NavSync::attach(&mut host, &NavConfig::default());
        sync.handle(
            &mut host,
            PageEvent::Intersections(vec![IntersectionEntry {
                target_id: "intro".into(),
                ratio: 1.0,
                is_intersecting: true,
                top: 0.0,
            }]),
        );
        host.remove_section("intro");

        let outcome = sync.handle(&mut host, PageEvent::Rebuild);
        assert_eq!(outcome, EventOutcome::Rebuilt { entries: 1 });
        assert!(sync.list().active().is_none());
        assert_eq!(host.nav_items().len(), 1);
    }

    #[test]
    fn emits_events_when_configured() {
        let (emitter, buffer) = EventEmitter::in_memory();
        let mut host = page();
        let mut sync =
            NavSync::attach_with_events(&mut host, &NavConfig::default(), Some(Arc::new(emitter)));
        sync.handle(&mut host, PageEvent::ClickEntry { index: 1 });

        let text = buffer.contents();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["type"], "NavigationBuilt");
        assert_eq!(lines[1]["type"], "ScrollRequested");
        assert_eq!(lines[1]["target_id"], "usage");
    }
}
