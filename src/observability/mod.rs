//! Logging, metrics and the structured event stream.

pub mod events;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod metrics;

pub use events::{Event, EventEmitter, SharedBuffer};
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{LogFormat, init_logging};
#[cfg(not(target_arch = "wasm32"))]
pub use self::metrics::init_metrics;
