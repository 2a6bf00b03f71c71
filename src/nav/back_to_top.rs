//! Back-to-top control.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::PageHost;
use crate::observability::metrics;

/// Scroll offset above which the control is shown.
pub const DEFAULT_SHOW_AFTER: f64 = 300.0;

/// Visibility of the back-to-top control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Shown.
    Visible,
    /// Hidden.
    #[default]
    Hidden,
}

impl Visibility {
    /// Returns `true` for [`Visibility::Visible`].
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden => f.write_str("hidden"),
        }
    }
}

/// Scroll-offset driven toggle with a smooth return to the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackToTop {
    show_after: f64,
    visibility: Visibility,
}

impl Default for BackToTop {
    fn default() -> Self {
        Self::new(DEFAULT_SHOW_AFTER)
    }
}

impl BackToTop {
    /// Creates a hidden control shown once the offset exceeds `show_after`.
    #[must_use]
    pub const fn new(show_after: f64) -> Self {
        Self {
            show_after,
            visibility: Visibility::Hidden,
        }
    }

    /// Current visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Visibility for a given scroll offset.
    #[must_use]
    pub fn visibility_at(&self, offset: f64) -> Visibility {
        if offset > self.show_after {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }

    /// Re-derives visibility for a scroll event and pushes it to the host.
    ///
    /// The host is told on every event; repeated offsets produce the same
    /// state.
    pub fn on_scroll<H: PageHost + ?Sized>(&mut self, host: &mut H, offset: f64) -> Visibility {
        let next = self.visibility_at(offset);
        if next != self.visibility {
            debug!(offset, visibility = %next, "back-to-top toggled");
            metrics::record_back_to_top_toggle(next.is_visible());
        }
        self.visibility = next;
        host.set_back_to_top_visible(next.is_visible());
        next
    }

    /// Handles activation of the control.
    pub fn activate<H: PageHost + ?Sized>(&self, host: &mut H) {
        host.scroll_to_top();
    }
}
