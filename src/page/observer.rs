//! Viewport-intersection observation for [`PageModel`].
//!
//! Mirrors how a browser intersection observer reports: the first poll after
//! observing delivers one entry per target, later polls deliver only targets
//! whose threshold side or intersecting flag changed. The ratio is the share
//! of the target's height that lies inside the detection zone, which spans
//! the top of the viewport down to the excluded bottom margin.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nav::{DetectionZone, IntersectionEntry};
use crate::page::model::PageModel;

/// Order in which a batch is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(not(target_arch = "wasm32"), derive(clap::ValueEnum))]
pub enum DeliveryOrder {
    /// Targets in document order.
    #[default]
    DocumentOrder,
    /// Targets in reverse document order.
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Crossing {
    intersecting: bool,
    above_threshold: bool,
}

/// Watches a fixed set of sections on a [`PageModel`].
#[derive(Debug, Clone)]
pub struct IntersectionWatch {
    zone: DetectionZone,
    order: DeliveryOrder,
    targets: Vec<String>,
    last: HashMap<String, Crossing>,
    primed: bool,
}

impl IntersectionWatch {
    /// Observes `targets` (section ids) against `zone`.
    pub fn new<I, S>(zone: DetectionZone, targets: I, order: DeliveryOrder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            zone,
            order,
            targets: targets.into_iter().map(Into::into).collect(),
            last: HashMap::new(),
            primed: false,
        }
    }

    /// Observes every marker-class section of `page` that has an id.
    #[must_use]
    pub fn for_page(page: &PageModel, marker_class: &str, zone: DetectionZone, order: DeliveryOrder) -> Self {
        let targets = page
            .sections()
            .iter()
            .filter(|s| s.classes.iter().any(|c| c == marker_class))
            .filter_map(|s| s.node.navigable_id().map(str::to_string));
        Self::new(zone, targets, order)
    }

    /// Observed section ids.
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Measures one target against the current scroll position.
    ///
    /// Returns `None` when the section no longer exists.
    #[must_use]
    pub fn measure(&self, page: &PageModel, id: &str) -> Option<IntersectionEntry> {
        let section = page.section(id)?;
        let zone_bottom = self.zone.height(page.viewport_height());
        let top = section.top - page.scroll_offset();
        let bottom = top + section.height;

        let overlap = bottom.min(zone_bottom) - top.max(0.0);
        let (is_intersecting, ratio) = if section.height > 0.0 {
            (overlap > 0.0, (overlap.max(0.0) / section.height).min(1.0))
        } else {
            let inside = (0.0..=zone_bottom).contains(&top);
            (inside, if inside { 1.0 } else { 0.0 })
        };

        Some(IntersectionEntry {
            target_id: id.to_string(),
            ratio,
            is_intersecting,
            top,
        })
    }

    /// Produces the next batch of observations.
    pub fn poll(&mut self, page: &PageModel) -> Vec<IntersectionEntry> {
        let mut batch = Vec::new();
        for id in &self.targets {
            let Some(entry) = self.measure(page, id) else {
                continue;
            };
            let crossing = Crossing {
                intersecting: entry.is_intersecting,
                above_threshold: entry.ratio >= self.zone.threshold,
            };
            let changed = self.last.insert(id.clone(), crossing) != Some(crossing);
            if !self.primed || changed {
                batch.push(entry);
            }
        }
        self.primed = true;
        if self.order == DeliveryOrder::Reverse {
            batch.reverse();
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::SectionNode;
    use crate::page::model::DEFAULT_MARKER_CLASS;

    fn page() -> PageModel {
        // viewport 1000 => detection zone covers offsets 0..400
        PageModel::builder(1000.0)
            .section(SectionNode::with_id("a"), 0.0, 500.0)
            .section(SectionNode::with_id("b"), 500.0, 500.0)
            .section(SectionNode::default(), 1000.0, 100.0)
            .build()
    }

    fn watch(page: &PageModel, order: DeliveryOrder) -> IntersectionWatch {
        IntersectionWatch::for_page(page, DEFAULT_MARKER_CLASS, DetectionZone::default(), order)
    }

    #[test]
    fn only_navigable_sections_are_observed() {
        let page = page();
        assert_eq!(watch(&page, DeliveryOrder::DocumentOrder).targets(), &["a", "b"]);
    }

    #[test]
    fn ratio_is_share_of_target_inside_zone() {
        let page = page();
        let w = watch(&page, DeliveryOrder::DocumentOrder);
        let a = w.measure(&page, "a").unwrap();
        assert!((a.ratio - 0.8).abs() < 1e-9);
        assert!(a.is_intersecting);
        let b = w.measure(&page, "b").unwrap();
        assert!(!b.is_intersecting);
        assert!(b.ratio.abs() < 1e-9);
    }

    #[test]
    fn first_poll_reports_everything_then_only_changes() {
        let mut page = page();
        let mut w = watch(&page, DeliveryOrder::DocumentOrder);
        assert_eq!(w.poll(&page).len(), 2);
        assert!(w.poll(&page).is_empty());

        page.set_scroll_offset(450.0);
        let batch = w.poll(&page);
        let ids: Vec<_> = batch.iter().map(|e| e.target_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!batch[0].is_intersecting || batch[0].ratio < 0.4);
        assert!(batch[1].ratio >= 0.4);
    }

    #[test]
    fn reverse_delivery() {
        let page = page();
        let mut w = watch(&page, DeliveryOrder::Reverse);
        let ids: Vec<_> = w.poll(&page).into_iter().map(|e| e.target_id).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn removed_sections_are_skipped() {
        let mut page = page();
        let mut w = watch(&page, DeliveryOrder::DocumentOrder);
        page.remove_section("a");
        let ids: Vec<_> = w.poll(&page).into_iter().map(|e| e.target_id).collect();
        assert_eq!(ids, vec!["b"]);
    }
}
