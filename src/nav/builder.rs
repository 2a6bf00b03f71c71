//! Navigation Builder.
//!
//! Scans the host for marker-class sections, produces the ordered
//! [`NavigationList`] and populates the visual container. Also owns the
//! click-to-scroll behaviour of the generated items.

use serde::Serialize;
use tracing::{debug, trace};

use crate::host::PageHost;
use crate::nav::entry::{NavigationEntry, NavigationList};
use crate::observability::metrics;

/// Builds the table of contents for one page.
#[derive(Debug, Clone)]
pub struct NavigationBuilder {
    marker_class: String,
}

impl NavigationBuilder {
    /// Creates a builder that looks for elements carrying `marker_class`.
    #[must_use]
    pub fn new(marker_class: impl Into<String>) -> Self {
        Self {
            marker_class: marker_class.into(),
        }
    }

    /// Marker class this builder scans for.
    #[must_use]
    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    /// Builds the navigation list and repopulates the host's container.
    ///
    /// The container is cleared first, so calling this again on the same
    /// page yields the same items instead of duplicating them. Sections
    /// without an id are skipped.
    pub fn build<H: PageHost + ?Sized>(&self, host: &mut H) -> NavigationList {
        let sections = host.anchor_sections(&self.marker_class);
        let mut list = NavigationList::new();

        host.clear_nav();
        for section in &sections {
            let (Some(id), Some(label)) = (section.navigable_id(), section.label()) else {
                trace!(marker = %self.marker_class, "skipping anchor section without id");
                continue;
            };
            let entry = NavigationEntry::new(label, id);
            host.append_nav_item(&entry);
            list.push(entry);
        }

        debug!(
            sections = sections.len(),
            entries = list.len(),
            "navigation list built"
        );
        metrics::record_entries_built(list.len());
        list
    }
}

/// Result of activating a navigation item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// The target exists and a smooth scroll was requested.
    Scrolled {
        /// Section that was scrolled into view.
        target_id: String,
    },
    /// The item or its target no longer exists; nothing happened.
    Missing {
        /// Target id of the item, when the item itself exists.
        target_id: Option<String>,
    },
}

impl ClickOutcome {
    /// Label used for metrics and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scrolled { .. } => "scrolled",
            Self::Missing { .. } => "missing",
        }
    }
}

/// Handles a click on the item at `index`.
///
/// The target is resolved at click time. A target that has disappeared since
/// the list was built is a silent no-op.
pub fn activate<H: PageHost + ?Sized>(
    list: &NavigationList,
    host: &mut H,
    index: usize,
) -> ClickOutcome {
    let Some(entry) = list.get(index) else {
        return ClickOutcome::Missing { target_id: None };
    };
    let target_id = entry.scroll_target_id();

    let outcome = if host.section_exists(target_id) {
        host.scroll_into_view(target_id);
        ClickOutcome::Scrolled {
            target_id: target_id.to_string(),
        }
    } else {
        debug!(target = target_id, "click target no longer exists");
        ClickOutcome::Missing {
            target_id: Some(target_id.to_string()),
        }
    };
    metrics::record_click(outcome.as_str());
    outcome
}
