//! Result types for query execution

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::dataset::FieldValue;

/// One output row, keyed by COLUMNS strings in COLUMNS order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    values: Vec<(String, FieldValue)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column. Columns are emitted in the order they first appear;
    /// setting an existing column replaces its value in place.
    pub fn push(&mut self, column: impl Into<String>, value: FieldValue) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.values.push((column, value)),
        }
    }

    /// Returns the value of an output column
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Output column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of query execution
#[derive(Debug, Clone)]
pub struct QueryOutput {
    /// Rows in result order
    pub rows: Vec<ResultRow>,
    /// Number of records in the dataset
    pub scanned_count: usize,
    /// Number of records that passed WHERE
    pub matched_count: usize,
    /// Whether GROUP/APPLY ran
    pub grouped: bool,
}

impl QueryOutput {
    /// Returns true if no rows were produced
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }
}
