//! Pages the navigation engine can run against outside a browser.

pub mod html;
pub mod model;
pub mod observer;
pub mod setup;

pub use html::{HtmlDocument, ScannedElement, render_nav_items};
pub use model::{DEFAULT_MARKER_CLASS, NavItem, PageModel, PageModelBuilder, PlacedSection, ScrollRequest};
pub use observer::{DeliveryOrder, IntersectionWatch};
pub use setup::PageSetup;
