//! Dataset: an id, a kind and an ordered list of records

use super::errors::{DatasetError, DatasetResult};
use super::kind::{DatasetKind, FIELD_SEPARATOR};
use super::value::Record;
use crate::observability::{log_event_with_fields, Event};

/// An immutable, kind-tagged collection of records
#[derive(Debug, Clone)]
pub struct Dataset {
    id: String,
    kind: DatasetKind,
    entries: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset.
    ///
    /// Entries missing a declared field of `kind`, or holding a value of the
    /// wrong scalar type, are dropped. If entries were supplied and none of
    /// them conform, the dataset is rejected.
    pub fn new(
        id: impl Into<String>,
        kind: DatasetKind,
        entries: Vec<Record>,
    ) -> DatasetResult<Self> {
        let id = id.into();
        validate_id(&id)?;

        let supplied = entries.len();
        let entries: Vec<Record> = entries
            .into_iter()
            .filter(|record| conforms(record, kind))
            .collect();

        let dropped = supplied - entries.len();
        if dropped > 0 {
            log_event_with_fields(
                Event::DatasetEntriesDropped,
                &[
                    ("dataset", id.as_str()),
                    ("dropped", &dropped.to_string()),
                    ("kept", &entries.len().to_string()),
                ],
            );
        }
        if supplied > 0 && entries.is_empty() {
            return Err(DatasetError::NoValidEntries(id));
        }

        Ok(Self { id, kind, entries })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn entries(&self) -> &[Record] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Checks an id is usable as the prefix of `id_field` keys
pub(crate) fn validate_id(id: &str) -> DatasetResult<()> {
    if id.trim().is_empty() || id.contains(FIELD_SEPARATOR) {
        return Err(DatasetError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn conforms(record: &Record, kind: DatasetKind) -> bool {
    kind.fields().all(|(field, field_type)| {
        record
            .get(field)
            .map(|v| v.field_type() == field_type)
            .unwrap_or(false)
    })
}
