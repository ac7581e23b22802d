//! Observability for rosterdb
//!
//! Structured logging through `tracing`, plus the lifecycle event names
//! used on boot and shutdown lines.
//!
//! ```ignore
//! use rosterdb::observability::{init_logging, Event, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//! tracing::info!(event = %Event::BootStart, "starting");
//! ```

mod events;
pub mod logging;

pub use events::Event;
pub use logging::{init_logging, LogFormat, LOG_LEVELS};
