//! In-memory page host.
//!
//! [`PageModel`] lays sections out on a vertical axis, tracks the viewport
//! scroll offset and records every side effect the navigation engine asks
//! for. Smooth scrolls settle immediately.

use serde::Serialize;
use tracing::trace;

use crate::host::PageHost;
use crate::nav::{NavigationEntry, SectionNode};
use crate::page::html::HtmlDocument;

/// Default marker class given to sections added without explicit classes.
pub const DEFAULT_MARKER_CLASS: &str = "menu-anchor";

/// A section with its position in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSection {
    /// Engine view of the section.
    pub node: SectionNode,
    /// Class list of the element.
    pub classes: Vec<String>,
    /// Distance of the top edge from the top of the document.
    pub top: f64,
    /// Rendered height.
    pub height: f64,
}

impl PlacedSection {
    /// Bottom edge in document coordinates.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// One item in the navigation container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Label text.
    pub label: String,
    /// Section the item scrolls to.
    pub target_id: String,
    /// Whether the item carries the active marker.
    pub active: bool,
    /// Decoration shown in front of the label while active.
    pub decoration: Option<String>,
}

impl NavItem {
    /// Label as displayed, decoration included.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.decoration {
            Some(prefix) => format!("{prefix}{}", self.label),
            None => self.label.clone(),
        }
    }
}

/// A scroll the engine requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollRequest {
    /// Section brought into view with its top edge aligned to the viewport.
    IntoView {
        /// Target section id.
        id: String,
        /// Offset the page settled at.
        offset: f64,
    },
    /// Return to offset 0.
    Top,
}

/// Builder for [`PageModel`].
#[derive(Debug, Clone)]
pub struct PageModelBuilder {
    viewport_height: f64,
    sections: Vec<PlacedSection>,
}

impl PageModelBuilder {
    /// Adds a section carrying the default marker class.
    #[must_use]
    pub fn section(self, node: SectionNode, top: f64, height: f64) -> Self {
        self.section_with_classes(node, [DEFAULT_MARKER_CLASS], top, height)
    }

    /// Adds a section with an explicit class list.
    #[must_use]
    pub fn section_with_classes<I, S>(mut self, node: SectionNode, classes: I, top: f64, height: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.push(PlacedSection {
            node,
            classes: classes.into_iter().map(Into::into).collect(),
            top,
            height: height.max(0.0),
        });
        self
    }

    /// Finishes the page, scrolled to the top.
    #[must_use]
    pub fn build(self) -> PageModel {
        PageModel {
            viewport_height: self.viewport_height,
            scroll_offset: 0.0,
            sections: self.sections,
            nav_items: Vec::new(),
            back_to_top_visible: false,
            scroll_log: Vec::new(),
        }
    }
}

/// Simulated rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageModel {
    viewport_height: f64,
    scroll_offset: f64,
    sections: Vec<PlacedSection>,
    nav_items: Vec<NavItem>,
    back_to_top_visible: bool,
    scroll_log: Vec<ScrollRequest>,
}

impl PageModel {
    /// Starts a page with the given viewport height.
    #[must_use]
    pub const fn builder(viewport_height: f64) -> PageModelBuilder {
        PageModelBuilder {
            viewport_height,
            sections: Vec::new(),
        }
    }

    /// Lays out every id/class-carrying element of `doc` using `layout`.
    ///
    /// `layout` maps a section id to `(top, height)`. Elements without a
    /// layout entry are stacked after the last placed one with
    /// `default_height`.
    pub fn from_document<F>(
        doc: &HtmlDocument,
        viewport_height: f64,
        default_height: f64,
        mut layout: F,
    ) -> Self
    where
        F: FnMut(&str) -> Option<(f64, f64)>,
    {
        let mut builder = Self::builder(viewport_height);
        let mut cursor = 0.0_f64;
        for element in doc.elements() {
            let placed = element.id.as_deref().and_then(&mut layout);
            let (top, height) = placed.unwrap_or((cursor, default_height));
            cursor = cursor.max(top + height);
            builder = builder.section_with_classes(
                element.to_section(),
                element.classes.iter().cloned(),
                top,
                height,
            );
        }
        builder.build()
    }

    /// Viewport height.
    #[must_use]
    pub const fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Current vertical scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Scrolls the page; negative offsets clamp to 0.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll_offset = offset.max(0.0);
    }

    /// Every placed section in document order.
    #[must_use]
    pub fn sections(&self) -> &[PlacedSection] {
        &self.sections
    }

    /// Placed section with `id`.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&PlacedSection> {
        self.sections.iter().find(|s| s.node.id.as_deref() == Some(id))
    }

    /// Removes the section with `id` from the document.
    ///
    /// Navigation items pointing at it are left stale.
    pub fn remove_section(&mut self, id: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.node.id.as_deref() != Some(id));
        before != self.sections.len()
    }

    /// Items currently in the navigation container.
    #[must_use]
    pub fn nav_items(&self) -> &[NavItem] {
        &self.nav_items
    }

    /// Whether the back-to-top control is shown.
    #[must_use]
    pub const fn back_to_top_visible(&self) -> bool {
        self.back_to_top_visible
    }

    /// Scrolls requested so far, oldest first.
    #[must_use]
    pub fn scroll_log(&self) -> &[ScrollRequest] {
        &self.scroll_log
    }
}

impl PageHost for PageModel {
    fn anchor_sections(&self, marker_class: &str) -> Vec<SectionNode> {
        self.sections
            .iter()
            .filter(|s| s.classes.iter().any(|c| c == marker_class))
            .map(|s| s.node.clone())
            .collect()
    }

    fn section_exists(&self, id: &str) -> bool {
        self.section(id).is_some()
    }

    fn clear_nav(&mut self) {
        self.nav_items.clear();
    }

    fn append_nav_item(&mut self, entry: &NavigationEntry) {
        self.nav_items.push(NavItem {
            label: entry.label().to_string(),
            target_id: entry.scroll_target_id().to_string(),
            active: entry.is_active(),
            decoration: None,
        });
    }

    fn set_nav_item_state(&mut self, index: usize, active: bool, decoration: Option<&str>) {
        if let Some(item) = self.nav_items.get_mut(index) {
            item.active = active;
            item.decoration = decoration.map(str::to_string);
        }
    }

    fn scroll_into_view(&mut self, id: &str) {
        if let Some(top) = self.section(id).map(|s| s.top) {
            trace!(id, top, "scrolling section into view");
            self.set_scroll_offset(top);
            self.scroll_log.push(ScrollRequest::IntoView {
                id: id.to_string(),
                offset: self.scroll_offset,
            });
        }
    }

    fn scroll_to_top(&mut self) {
        self.set_scroll_offset(0.0);
        self.scroll_log.push(ScrollRequest::Top);
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        self.back_to_top_visible = visible;
    }
}
