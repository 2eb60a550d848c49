//! Dataset model for insightql
//!
//! A dataset is an id, a kind and an ordered list of records. Records are
//! open field-name to scalar mappings; the kind fixes which field names a
//! query may reference and which scalar type each one carries.
//!
//! Datasets are immutable once built. The [`DatasetCache`] hands out
//! `Arc<Dataset>` snapshots, so a running query never observes an add or a
//! remove that happens after it started.

mod cache;
mod dataset;
mod errors;
mod kind;
mod value;

pub use cache::{DatasetCache, DatasetSummary};
pub use dataset::Dataset;
pub use errors::{DatasetError, DatasetResult};
pub use kind::{DatasetKind, FieldType, FIELD_SEPARATOR};
pub use value::{record_from_json, FieldValue, Record};
