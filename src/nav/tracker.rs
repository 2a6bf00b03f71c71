//! Active-Section Tracker.
//!
//! Consumes batches of viewport-intersection observations and keeps exactly
//! one navigation entry marked active once the first section has qualified.
//! Sections leaving the detection zone never clear the marker; only another
//! section qualifying moves it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::host::PageHost;
use crate::nav::entry::NavigationList;
use crate::observability::metrics;

// ============================================================================
// Detection zone
// ============================================================================

/// Viewport sub-region and coverage ratio that decide when a section counts
/// as "in focus".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionZone {
    /// Fraction of the viewport height excluded from the bottom of the zone.
    pub bottom_margin: f64,
    /// Fraction of a section that must lie inside the zone.
    pub threshold: f64,
}

impl Default for DetectionZone {
    fn default() -> Self {
        Self {
            bottom_margin: 0.6,
            threshold: 0.4,
        }
    }
}

impl DetectionZone {
    /// Height of the zone for a viewport of `viewport_height`.
    #[must_use]
    pub fn height(&self, viewport_height: f64) -> f64 {
        (viewport_height * (1.0 - self.bottom_margin)).max(0.0)
    }

    /// CSS-style root margin understood by browser intersection observers.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("0px 0px -{}% 0px", round_percent(self.bottom_margin))
    }

    /// Returns `true` if the observation counts as visible.
    #[must_use]
    pub fn qualifies(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.threshold
    }
}

fn round_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 1000.0).round() / 1000.0
}

// ============================================================================
// Observations
// ============================================================================

/// One visibility observation for a section, as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEntry {
    /// Id of the observed section.
    pub target_id: String,
    /// Fraction of the section inside the detection zone.
    pub ratio: f64,
    /// Whether the section intersects the detection zone at all.
    pub is_intersecting: bool,
    /// Top edge of the section relative to the viewport.
    pub top: f64,
}

/// Policy for choosing among several sections qualifying in the same batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum TieBreak {
    /// The section whose top edge is highest on screen wins.
    #[default]
    Topmost,
    /// Whichever observation the host delivered last wins.
    LastDelivered,
}

/// A change of the active entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveChange {
    /// Previously active entry index.
    pub previous: Option<usize>,
    /// Newly active entry index.
    pub current: usize,
    /// Section id of the newly active entry.
    pub target_id: String,
}

// ============================================================================
// Tracker
// ============================================================================

/// Keeps a single navigation entry highlighted.
#[derive(Debug, Clone)]
pub struct ActiveSectionTracker {
    zone: DetectionZone,
    tie_break: TieBreak,
    decoration: String,
    index_by_id: HashMap<String, usize>,
}

impl ActiveSectionTracker {
    /// Creates a tracker for the entries of `list`.
    #[must_use]
    pub fn new(
        list: &NavigationList,
        zone: DetectionZone,
        tie_break: TieBreak,
        decoration: impl Into<String>,
    ) -> Self {
        let mut index_by_id = HashMap::with_capacity(list.len());
        for (index, entry) in list.iter().enumerate() {
            index_by_id
                .entry(entry.scroll_target_id().to_string())
                .or_insert(index);
        }
        Self {
            zone,
            tie_break,
            decoration: decoration.into(),
            index_by_id,
        }
    }

    /// Detection zone in use.
    #[must_use]
    pub const fn zone(&self) -> &DetectionZone {
        &self.zone
    }

    /// Tie-break policy in use.
    #[must_use]
    pub const fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Ids of every tracked section, in entry order.
    #[must_use]
    pub fn observed_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self
            .index_by_id
            .iter()
            .map(|(id, index)| (*index, id.as_str()))
            .collect();
        ids.sort_unstable_by_key(|(index, _)| *index);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Picks the winning entry index for a batch without mutating anything.
    #[must_use]
    pub fn select(&self, batch: &[IntersectionEntry]) -> Option<usize> {
        let candidates = batch.iter().filter(|e| self.zone.qualifies(e)).filter_map(|e| {
            let index = self.index_by_id.get(&e.target_id);
            if index.is_none() {
                trace!(target = %e.target_id, "visible section has no navigation entry");
            }
            index.map(|i| (*i, e.top))
        });

        match self.tie_break {
            TieBreak::LastDelivered => candidates.last().map(|(i, _)| i),
            TieBreak::Topmost => candidates
                .reduce(|best, next| if next.1 < best.1 { next } else { best })
                .map(|(i, _)| i),
        }
    }

    /// Applies one observation batch.
    ///
    /// Clears the marker and decoration from every entry, then sets it on the
    /// winner. Returns `None` when nothing qualified or the winner was
    /// already active.
    pub fn observe<H: PageHost + ?Sized>(
        &self,
        list: &mut NavigationList,
        host: &mut H,
        batch: &[IntersectionEntry],
    ) -> Option<ActiveChange> {
        trace!(observations = batch.len(), "intersection batch");
        let winner = self.select(batch)?;
        let previous = list.active_index();
        if previous == Some(winner) {
            return None;
        }

        for (index, entry) in list.iter_mut().enumerate() {
            entry.set_active(false);
            host.set_nav_item_state(index, false, None);
        }
        let entry = list.iter_mut().nth(winner)?;
        entry.set_active(true);
        let target_id = entry.scroll_target_id().to_string();
        host.set_nav_item_state(winner, true, Some(&self.decoration));

        debug!(target = %target_id, index = winner, ?previous, "section activated");
        metrics::record_activation();
        Some(ActiveChange {
            previous,
            current: winner,
            target_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::{NavigationBuilder, SectionNode};
    use crate::page::PageModel;

    fn seen(id: &str, ratio: f64, top: f64) -> IntersectionEntry {
        IntersectionEntry {
            target_id: id.into(),
            ratio,
            is_intersecting: ratio > 0.0,
            top,
        }
    }

    fn setup(tie_break: TieBreak) -> (PageModel, NavigationList, ActiveSectionTracker) {
        let mut page = PageModel::builder(800.0)
            .section(SectionNode::with_id("a"), 0.0, 400.0)
            .section(SectionNode::with_id("b"), 400.0, 400.0)
            .section(SectionNode::with_id("c"), 800.0, 400.0)
            .build();
        let list = NavigationBuilder::new("menu-anchor").build(&mut page);
        let tracker = ActiveSectionTracker::new(&list, DetectionZone::default(), tie_break, "» ");
        (page, list, tracker)
    }

    #[test]
    fn default_zone_matches_observer_settings() {
        let zone = DetectionZone::default();
        assert_eq!(zone.root_margin(), "0px 0px -60% 0px");
        assert!((zone.height(1000.0) - 400.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_active_before_first_qualifying_batch() {
        let (mut page, mut list, tracker) = setup(TieBreak::Topmost);
        assert!(tracker.observe(&mut list, &mut page, &[seen("a", 0.2, 0.0)]).is_none());
        assert!(list.active().is_none());
    }

    #[test]
    fn qualifying_section_becomes_active() {
        let (mut page, mut list, tracker) = setup(TieBreak::Topmost);
        let change = tracker
            .observe(&mut list, &mut page, &[seen("b", 0.5, 10.0)])
            .unwrap();
        assert_eq!(change.current, 1);
        assert_eq!(change.previous, None);
        assert_eq!(list.active().unwrap().scroll_target_id(), "b");
        assert_eq!(page.nav_items()[1].decoration.as_deref(), Some("» "));
    }

    #[test]
    fn exactly_one_entry_stays_active() {
        let (mut page, mut list, tracker) = setup(TieBreak::Topmost);
        tracker.observe(&mut list, &mut page, &[seen("a", 1.0, 0.0)]);
        tracker.observe(&mut list, &mut page, &[seen("c", 0.9, 5.0)]);
        // leaving visibility does not clear the marker
        tracker.observe(&mut list, &mut page, &[seen("c", 0.0, 900.0)]);

        assert_eq!(list.iter().filter(|e| e.is_active()).count(), 1);
        assert_eq!(list.active().unwrap().scroll_target_id(), "c");
        let decorated = page.nav_items().iter().filter(|i| i.active).count();
        assert_eq!(decorated, 1);
        assert!(page.nav_items()[0].decoration.is_none());
    }

    #[test]
    fn same_winner_reports_no_change() {
        let (mut page, mut list, tracker) = setup(TieBreak::Topmost);
        assert!(tracker.observe(&mut list, &mut page, &[seen("a", 1.0, 0.0)]).is_some());
        assert!(tracker.observe(&mut list, &mut page, &[seen("a", 0.8, -20.0)]).is_none());
    }

    #[test]
    fn topmost_wins_regardless_of_delivery_order() {
        let (mut page, mut list, tracker) = setup(TieBreak::Topmost);
        let batch = [seen("c", 0.5, 200.0), seen("b", 0.6, 20.0)];
        let change = tracker.observe(&mut list, &mut page, &batch).unwrap();
        assert_eq!(change.target_id, "b");
    }

    #[test]
    fn last_delivered_wins_when_configured() {
        let (mut page, mut list, tracker) = setup(TieBreak::LastDelivered);
        let batch = [seen("b", 0.6, 20.0), seen("c", 0.5, 200.0)];
        let change = tracker.observe(&mut list, &mut page, &batch).unwrap();
        assert_eq!(change.target_id, "c");
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let (mut page, mut list, tracker) = setup(TieBreak::LastDelivered);
        let batch = [seen("a", 0.6, 0.0), seen("footer", 1.0, 50.0)];
        let change = tracker.observe(&mut list, &mut page, &batch).unwrap();
        assert_eq!(change.target_id, "a");
    }

    #[test]
    fn threshold_is_inclusive() {
        let (_, _, tracker) = setup(TieBreak::Topmost);
        assert_eq!(tracker.select(&[seen("a", 0.4, 0.0)]), Some(0));
        assert_eq!(tracker.select(&[seen("a", 0.399, 0.0)]), None);
    }

    #[test]
    fn observed_ids_follow_entry_order() {
        let (_, _, tracker) = setup(TieBreak::Topmost);
        assert_eq!(tracker.observed_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn tie_break_parses_kebab_case() {
        let t: TieBreak = serde_yaml::from_str("last-delivered").unwrap();
        assert_eq!(t, TieBreak::LastDelivered);
    }
}
