//! Navigation configuration: schema, loading and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions, discover};
pub use schema::{BackToTopSettings, Detection, Highlight, NavConfig, Selectors};
pub use validation::{ValidationResult, Validator};
