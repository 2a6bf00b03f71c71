//! Navigation settings schema.
//!
//! Every field has a default matching the stock page layout, so an empty
//! file (or no file at all) yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::nav::back_to_top::DEFAULT_SHOW_AFTER;
use crate::nav::{DetectionZone, TieBreak};

/// Complete navigation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Names of the page elements the engine binds to.
    pub selectors: Selectors,
    /// Visibility detection settings.
    pub detection: Detection,
    /// Active-entry highlighting.
    pub highlight: Highlight,
    /// Back-to-top control.
    pub back_to_top: BackToTopSettings,
}

/// Names of the page elements the engine binds to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selectors {
    /// Class carried by every anchor section.
    pub marker_class: String,
    /// Id of the list container that receives navigation items.
    pub nav_container: String,
    /// Id of the back-to-top button.
    pub back_to_top: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            marker_class: "menu-anchor".to_string(),
            nav_container: "sticky-right-anchor-nav".to_string(),
            back_to_top: "backToTopBtn".to_string(),
        }
    }
}

/// Visibility detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Detection {
    /// Fraction of the viewport excluded from the bottom of the zone.
    pub bottom_margin: f64,
    /// Fraction of a section that must be inside the zone.
    pub threshold: f64,
    /// Winner when several sections qualify in one batch.
    pub tie_break: TieBreak,
}

impl Default for Detection {
    fn default() -> Self {
        let zone = DetectionZone::default();
        Self {
            bottom_margin: zone.bottom_margin,
            threshold: zone.threshold,
            tie_break: TieBreak::default(),
        }
    }
}

impl Detection {
    /// Detection zone described by these settings.
    #[must_use]
    pub const fn zone(&self) -> DetectionZone {
        DetectionZone {
            bottom_margin: self.bottom_margin,
            threshold: self.threshold,
        }
    }
}

/// Active-entry highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Highlight {
    /// Class added to the active item's link.
    pub active_class: String,
    /// Prefix shown in front of the active item's label.
    pub decoration: String,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            active_class: "active".to_string(),
            decoration: "» ".to_string(),
        }
    }
}

/// Back-to-top control settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackToTopSettings {
    /// Scroll offset above which the control is shown.
    pub show_after: f64,
}

impl Default for BackToTopSettings {
    fn default() -> Self {
        Self {
            show_after: DEFAULT_SHOW_AFTER,
        }
    }
}
