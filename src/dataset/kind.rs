//! Dataset kinds and their fixed field vocabularies

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the dataset id and the field name in a query key
pub const FIELD_SEPARATOR: char = '_';

const COURSE_NUMERIC_FIELDS: &[&str] = &["avg", "pass", "fail", "audit", "year"];
const COURSE_STRING_FIELDS: &[&str] = &["dept", "id", "instructor", "title", "uuid"];
const ROOM_NUMERIC_FIELDS: &[&str] = &["lat", "lon", "seats"];
const ROOM_STRING_FIELDS: &[&str] = &[
    "fullname",
    "shortname",
    "number",
    "name",
    "address",
    "type",
    "furniture",
    "href",
];

/// Declared scalar type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    String,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::String => "string",
        }
    }
}

/// The two record kinds a dataset can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Courses,
    Rooms,
}

impl DatasetKind {
    /// All kinds, in inference priority order
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Courses, DatasetKind::Rooms];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Courses => "courses",
            DatasetKind::Rooms => "rooms",
        }
    }

    /// Fields holding numbers for this kind
    pub fn numeric_fields(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Courses => COURSE_NUMERIC_FIELDS,
            DatasetKind::Rooms => ROOM_NUMERIC_FIELDS,
        }
    }

    /// Fields holding strings for this kind
    pub fn string_fields(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Courses => COURSE_STRING_FIELDS,
            DatasetKind::Rooms => ROOM_STRING_FIELDS,
        }
    }

    /// Iterates over every declared field with its type
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, FieldType)> {
        self.numeric_fields()
            .iter()
            .map(|f| (*f, FieldType::Number))
            .chain(self.string_fields().iter().map(|f| (*f, FieldType::String)))
    }

    /// Returns the declared type of `field`, or None if the kind does not declare it
    pub fn field_type(&self, field: &str) -> Option<FieldType> {
        if self.numeric_fields().contains(&field) {
            Some(FieldType::Number)
        } else if self.string_fields().contains(&field) {
            Some(FieldType::String)
        } else {
            None
        }
    }

    pub fn declares(&self, field: &str) -> bool {
        self.field_type(field).is_some()
    }

    /// Infers the kind that declares `field`. The vocabularies are disjoint.
    pub fn infer(field: &str) -> Option<DatasetKind> {
        Self::ALL.into_iter().find(|kind| kind.declares(field))
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
