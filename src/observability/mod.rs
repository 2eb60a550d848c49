//! Observability for insightql
//!
//! - Structured logging (one JSON object per line, on stderr)
//! - Typed lifecycle events
//! - Query counters
//!
//! Everything here is synchronous and has no effect on query results.
//!
//! # Usage
//!
//! ```ignore
//! use insightql::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::QueryComplete, &[("rows", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.record_query(42);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
