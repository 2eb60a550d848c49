//! Dataset registry plus query entry point

use std::sync::Arc;

use serde_json::Value;

use crate::dataset::{Dataset, DatasetCache, DatasetResult, DatasetSummary};
use crate::executor::{QueryPerformer, ResultRow};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot};
use crate::query::{QueryDeserializer, QueryError, QueryResult};

/// Owns the loaded datasets and answers queries against them.
///
/// All methods take `&self`; the service can be shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct QueryService {
    cache: DatasetCache,
    performer: QueryPerformer,
    metrics: MetricsRegistry,
}

impl QueryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom performer (row cap)
    pub fn with_performer(performer: QueryPerformer) -> Self {
        Self {
            performer,
            ..Self::default()
        }
    }

    /// Registers a dataset and returns the ids of all loaded datasets
    pub fn add_dataset(&self, dataset: Dataset) -> DatasetResult<Vec<String>> {
        let dataset = self.cache.insert(dataset)?;
        self.metrics.increment_datasets_added();
        log_event_with_fields(
            Event::DatasetAdded,
            &[
                ("dataset", dataset.id()),
                ("kind", dataset.kind().as_str()),
                ("rows", &dataset.len().to_string()),
            ],
        );
        Ok(self.cache.ids())
    }

    /// Evicts a dataset and returns its id.
    ///
    /// Queries already holding the dataset finish against their snapshot.
    pub fn remove_dataset(&self, id: &str) -> DatasetResult<String> {
        let removed = self.cache.remove(id)?;
        self.metrics.increment_datasets_removed();
        log_event_with_fields(Event::DatasetRemoved, &[("dataset", removed.id())]);
        Ok(removed.id().to_string())
    }

    pub fn list_datasets(&self) -> Vec<DatasetSummary> {
        self.cache.summaries()
    }

    /// Read-only snapshot of a loaded dataset
    pub fn dataset(&self, id: &str) -> Option<Arc<Dataset>> {
        self.cache.get(id)
    }

    /// Validates and runs a raw JSON query.
    ///
    /// The dataset is the one every key in the query refers to.
    pub fn perform_query(&self, raw: &Value) -> QueryResult<Vec<ResultRow>> {
        match self.run(raw) {
            Ok(rows) => Ok(rows),
            Err(e) => {
                self.metrics.increment_queries_rejected();
                let mut fields = vec![("code", e.code().code()), ("message", e.message())];
                if let Some(key) = e.key() {
                    fields.push(("key", key));
                }
                log_event_with_fields(Event::QueryRejected, &fields);
                Err(e)
            }
        }
    }

    fn run(&self, raw: &Value) -> QueryResult<Vec<ResultRow>> {
        let query = QueryDeserializer::deserialize(raw)?;

        let dataset = self.cache.get(query.dataset_id()).ok_or_else(|| {
            QueryError::invalid_key(query.dataset_id(), "Referenced dataset not added")
        })?;

        let output = self.performer.perform(&query, &dataset)?;

        self.metrics.record_query(output.len());
        log_event_with_fields(
            Event::QueryComplete,
            &[
                ("dataset", dataset.id()),
                ("grouped", if output.grouped { "true" } else { "false" }),
                ("matched", &output.matched_count.to_string()),
                ("rows", &output.len().to_string()),
                ("scanned", &output.scanned_count.to_string()),
            ],
        );

        Ok(output.into_rows())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
