//! Table-of-contents synchronisation engine.
//!
//! - [`builder`] turns anchor sections into a [`NavigationList`]
//! - [`tracker`] keeps one entry highlighted from visibility observations
//! - [`back_to_top`] toggles the return-to-top control
//! - [`sync`] wires the three together for one page

pub mod back_to_top;
pub mod builder;
pub mod entry;
pub mod sync;
pub mod tracker;

pub use back_to_top::{BackToTop, Visibility};
pub use builder::{ClickOutcome, NavigationBuilder, activate};
pub use entry::{NavigationEntry, NavigationList, SectionNode};
pub use sync::{EventOutcome, NavSync, PageEvent};
pub use tracker::{ActiveChange, ActiveSectionTracker, DetectionZone, IntersectionEntry, TieBreak};
