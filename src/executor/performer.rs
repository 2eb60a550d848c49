//! Query performer
//!
//! Runs a validated query against one dataset:
//!
//! 1. kind check
//! 2. WHERE, in dataset order
//! 3. GROUP/APPLY, groups in first-occurrence order
//! 4. row cap
//! 5. projection onto COLUMNS
//! 6. ORDER (stable)
//!
//! The cap is enforced before projection; projection is one row in, one row
//! out, so the count is the same as on the final rows.

use super::aggregate::{field_value, group_records, Aggregator};
use super::filters::FilterEvaluator;
use super::result::{QueryOutput, ResultRow};
use super::sorter::RowSorter;
use crate::dataset::{Dataset, FieldValue, Record};
use crate::query::{Column, ColumnSource, Query, QueryError, QueryResult, Transformations};

/// Largest number of rows a query may return
pub const MAX_RESULT_ROWS: usize = 5000;

/// A row after grouping: the group's first record plus APPLY results
struct GroupRow<'a> {
    representative: &'a Record,
    applied: Vec<(&'a str, FieldValue)>,
}

/// Executes queries
#[derive(Debug, Clone)]
pub struct QueryPerformer {
    max_rows: usize,
}

impl Default for QueryPerformer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryPerformer {
    pub fn new() -> Self {
        Self {
            max_rows: MAX_RESULT_ROWS,
        }
    }

    /// Overrides the row cap
    pub fn with_max_rows(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Performs `query` against `dataset`.
    ///
    /// Fails without partial results.
    pub fn perform(&self, query: &Query, dataset: &Dataset) -> QueryResult<QueryOutput> {
        if query.kind() != dataset.kind() {
            return Err(QueryError::invalid(format!(
                "Query targets {} fields but dataset '{}' holds {}",
                query.kind(),
                dataset.id(),
                dataset.kind()
            )));
        }

        let matched: Vec<&Record> = dataset
            .entries()
            .iter()
            .filter(|record| FilterEvaluator::matches(&query.filter, record))
            .collect();
        let matched_count = matched.len();

        let mut rows = match &query.transformations {
            Some(transformations) => {
                let grouped = self.group(&matched, transformations)?;
                self.check_cap(grouped.len())?;
                grouped
                    .iter()
                    .map(|row| project_group(row, &query.options.columns))
                    .collect::<QueryResult<Vec<_>>>()?
            }
            None => {
                self.check_cap(matched.len())?;
                matched
                    .iter()
                    .map(|record| project_record(record, &query.options.columns))
                    .collect::<QueryResult<Vec<_>>>()?
            }
        };

        if let Some(order) = &query.options.order {
            RowSorter::sort(&mut rows, &order.sort_keys());
        }

        Ok(QueryOutput {
            rows,
            scanned_count: dataset.len(),
            matched_count,
            grouped: query.transformations.is_some(),
        })
    }

    fn group<'a>(
        &self,
        records: &[&'a Record],
        transformations: &'a Transformations,
    ) -> QueryResult<Vec<GroupRow<'a>>> {
        group_records(records, &transformations.group)?
            .into_iter()
            .map(|group| {
                let applied = transformations
                    .apply
                    .iter()
                    .map(|rule| Ok((rule.name.as_str(), Aggregator::apply(rule, &group)?)))
                    .collect::<QueryResult<Vec<_>>>()?;
                Ok(GroupRow {
                    representative: group[0],
                    applied,
                })
            })
            .collect()
    }

    fn check_cap(&self, rows: usize) -> QueryResult<()> {
        if rows > self.max_rows {
            return Err(QueryError::result_too_large(rows, self.max_rows));
        }
        Ok(())
    }
}

fn project_record(record: &Record, columns: &[Column]) -> QueryResult<ResultRow> {
    let mut row = ResultRow::new();
    for column in columns {
        let value = match &column.source {
            ColumnSource::Field(field) => field_value(record, field)?.clone(),
            ColumnSource::Apply(name) => {
                return Err(QueryError::invalid_key(
                    name.as_str(),
                    "APPLY column without TRANSFORMATIONS",
                ))
            }
        };
        row.push(column.name.as_str(), value);
    }
    Ok(row)
}

fn project_group(group: &GroupRow<'_>, columns: &[Column]) -> QueryResult<ResultRow> {
    let mut row = ResultRow::new();
    for column in columns {
        let value = match &column.source {
            ColumnSource::Field(field) => field_value(group.representative, field)?.clone(),
            ColumnSource::Apply(name) => group
                .applied
                .iter()
                .find(|(applied, _)| *applied == name.as_str())
                .map(|(_, value)| value.clone())
                .ok_or_else(|| QueryError::invalid_key(name.as_str(), "Unknown APPLY column"))?,
        };
        row.push(column.name.as_str(), value);
    }
    Ok(row)
}
