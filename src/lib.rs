//! insightql - a JSON query engine over course and room datasets
//!
//! A query is a JSON object with `WHERE`, `OPTIONS` and an optional
//! `TRANSFORMATIONS` block. It is validated into a typed [`query::Query`],
//! then performed against one in-memory [`dataset::Dataset`]:
//! filter, group and aggregate, project, sort.
//!
//! ```ignore
//! use insightql::dataset::{Dataset, DatasetKind};
//! use insightql::service::QueryService;
//!
//! let service = QueryService::new();
//! service.add_dataset(Dataset::new("sections", DatasetKind::Courses, records)?)?;
//! let rows = service.perform_query(&serde_json::json!({
//!     "WHERE": {"GT": {"sections_avg": 97}},
//!     "OPTIONS": {"COLUMNS": ["sections_dept", "sections_avg"]}
//! }))?;
//! ```

pub mod cli;
pub mod dataset;
pub mod executor;
pub mod observability;
pub mod query;
pub mod service;
