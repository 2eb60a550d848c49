//! Query execution for insightql
//!
//! # Execution Flow (strict order)
//!
//! 1. Reject if the query's dataset kind differs from the dataset's kind
//! 2. Filter records in dataset order
//! 3. Group by the GROUP value tuple (first-occurrence order) and aggregate
//! 4. Enforce the result row cap (no truncation)
//! 5. Project each row onto COLUMNS
//! 6. Stable sort by ORDER (if specified)
//!
//! Execution is synchronous and read-only: the dataset is never mutated and
//! every allocation belongs to the single call.

mod aggregate;
mod filters;
mod performer;
mod result;
mod sorter;

pub use aggregate::{group_records, Aggregator, GroupKey};
pub use filters::{wildcard_match, FilterEvaluator};
pub use performer::{QueryPerformer, MAX_RESULT_ROWS};
pub use result::{QueryOutput, ResultRow};
pub use sorter::RowSorter;
