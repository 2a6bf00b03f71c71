//! Seam between the navigation engine and the environment that renders the
//! page.
//!
//! The engine never touches a document directly. Everything it reads or
//! mutates goes through [`PageHost`], which lets the same engine drive a live
//! browser DOM (see the `web` module) or the in-memory
//! [`PageModel`](crate::page::PageModel) used by the simulator and tests.

use crate::nav::{NavigationEntry, SectionNode};

/// Operations the navigation engine needs from a rendered page.
///
/// All calls happen on the page's single event-loop thread.
pub trait PageHost {
    /// Marker-class elements in document order.
    fn anchor_sections(&self, marker_class: &str) -> Vec<SectionNode>;

    /// Returns `true` if an anchor section with `id` currently exists.
    fn section_exists(&self, id: &str) -> bool;

    /// Removes every item from the navigation container.
    fn clear_nav(&mut self);

    /// Appends one visual item for `entry` to the navigation container.
    fn append_nav_item(&mut self, entry: &NavigationEntry);

    /// Sets or clears the active marker on the item at `index`.
    ///
    /// `decoration` is the prefix shown in front of the label while the item
    /// is active; it is `None` when clearing.
    fn set_nav_item_state(&mut self, index: usize, active: bool, decoration: Option<&str>);

    /// Smoothly scrolls the section `id` into view, aligned to the top edge.
    fn scroll_into_view(&mut self, id: &str);

    /// Smoothly scrolls the page back to offset 0.
    fn scroll_to_top(&mut self);

    /// Shows or hides the back-to-top control.
    fn set_back_to_top_visible(&mut self, visible: bool);
}
