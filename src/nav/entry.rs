//! Navigation data model.
//!
//! A [`NavigationList`] mirrors the anchor sections of a rendered document in
//! document order. Entries refer to their section by id only; the section
//! itself stays owned by the host.

use serde::Serialize;

/// The host's raw view of one marker-class element.
///
/// `first_heading` is the untrimmed text of the first `h1`..`h6` element found
/// inside the section, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionNode {
    /// Element id, if the element carries one.
    pub id: Option<String>,
    /// Text content of the first heading inside the element.
    pub first_heading: Option<String>,
}

impl SectionNode {
    /// Creates a section with an id and no heading.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            first_heading: None,
        }
    }

    /// Sets the first heading text.
    #[must_use]
    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.first_heading = Some(text.into());
        self
    }

    /// Returns the id when it is present and non-empty.
    #[must_use]
    pub fn navigable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Derives the navigation label for this section.
    ///
    /// The trimmed heading text wins whenever a heading exists, even if it
    /// trims to nothing; otherwise the id is used verbatim.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let id = self.navigable_id()?;
        Some(
            self.first_heading
                .as_deref()
                .map_or_else(|| id.to_string(), |h| h.trim().to_string()),
        )
    }
}

/// One item of the generated table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    label: String,
    scroll_target_id: String,
    is_active: bool,
}

impl NavigationEntry {
    /// Creates an inactive entry.
    #[must_use]
    pub fn new(label: impl Into<String>, scroll_target_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            scroll_target_id: scroll_target_id.into(),
            is_active: false,
        }
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Id of the anchor section this entry scrolls to.
    #[must_use]
    pub fn scroll_target_id(&self) -> &str {
        &self.scroll_target_id
    }

    /// Whether this entry currently carries the active marker.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) const fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

/// Ordered table of contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationList {
    entries: Vec<NavigationEntry>,
}

impl NavigationList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: NavigationEntry) {
        self.entries.push(entry);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the document had no navigable sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&NavigationEntry> {
        self.entries.get(index)
    }

    /// Index of the entry targeting `id`.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.scroll_target_id == id)
    }

    /// Index of the active entry, if any.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.entries.iter().position(NavigationEntry::is_active)
    }

    /// The active entry, if any.
    #[must_use]
    pub fn active(&self) -> Option<&NavigationEntry> {
        self.entries.iter().find(|e| e.is_active)
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, NavigationEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, NavigationEntry> {
        self.entries.iter_mut()
    }
}

impl<'a> IntoIterator for &'a NavigationList {
    type Item = &'a NavigationEntry;
    type IntoIter = std::slice::Iter<'a, NavigationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_trimmed_heading() {
        let section = SectionNode::with_id("b").heading("  Overview \n");
        assert_eq!(section.label().as_deref(), Some("Overview"));
    }

    #[test]
    fn label_falls_back_to_id() {
        let section = SectionNode::with_id("install-notes");
        assert_eq!(section.label().as_deref(), Some("install-notes"));
    }

    #[test]
    fn blank_heading_yields_blank_label() {
        let section = SectionNode::with_id("x").heading("   ");
        assert_eq!(section.label().as_deref(), Some(""));
    }

    #[test]
    fn missing_or_empty_id_is_not_navigable() {
        assert!(SectionNode::default().label().is_none());
        let empty = SectionNode {
            id: Some(String::new()),
            first_heading: Some("Heading".into()),
        };
        assert!(empty.label().is_none());
    }

    #[test]
    fn list_lookups() {
        let mut list = NavigationList::new();
        list.push(NavigationEntry::new("A", "a"));
        list.push(NavigationEntry::new("B", "b"));
        assert_eq!(list.position("b"), Some(1));
        assert_eq!(list.position("zzz"), None);
        assert!(list.active().is_none());

        list.iter_mut().nth(1).unwrap().set_active(true);
        assert_eq!(list.active_index(), Some(1));
        assert_eq!(list.active().unwrap().label(), "B");
    }

    #[test]
    fn list_serializes_as_array() {
        let mut list = NavigationList::new();
        list.push(NavigationEntry::new("Overview", "b"));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json[0]["label"], "Overview");
        assert_eq!(json[0]["scroll_target_id"], "b");
        assert_eq!(json[0]["is_active"], false);
    }
}
