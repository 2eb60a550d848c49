//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in insightql
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,

    // Dataset lifecycle
    /// Dataset added to the cache
    DatasetAdded,
    /// Dataset evicted from the cache
    DatasetRemoved,
    /// Nonconforming entries dropped while building a dataset
    DatasetEntriesDropped,

    // Query operations
    /// Query performed successfully
    QueryComplete,
    /// Query rejected (invalid or too large)
    QueryRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatasetAdded => "DATASET_ADDED",
            Event::DatasetRemoved => "DATASET_REMOVED",
            Event::DatasetEntriesDropped => "DATASET_ENTRIES_DROPPED",
            Event::QueryComplete => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DatasetEntriesDropped | Event::QueryRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
