//! `anchornav` - table-of-contents navigation for long documentation pages
//!
//! Builds a navigation list from anchor sections, highlights the section in
//! view and toggles a back-to-top control. The engine talks to the page
//! through [`host::PageHost`], so the same code drives the browser binding
//! and the in-memory page used by the scenario runner.

pub mod config;
pub mod error;
pub mod host;
pub mod nav;
pub mod observability;
pub mod page;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod scenario;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;
