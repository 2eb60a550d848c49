//! Shared validation primitives for the deserializers
//!
//! Key format: `<datasetId>_<field>`, exactly one separator.

use serde_json::{Map, Value};

use super::errors::{QueryError, QueryResult};
use crate::dataset::{DatasetKind, FieldType, FIELD_SEPARATOR};

/// Splits `id_field` into its two parts
pub fn split_key(raw: &str) -> QueryResult<(&str, &str)> {
    let mut parts = raw.split(FIELD_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(id), Some(field), None) if !id.is_empty() => Ok((id, field)),
        _ => Err(QueryError::invalid_key(raw, "Invalid key")),
    }
}

/// Requires a JSON string
pub fn as_key<'a>(raw: &'a Value, name: &str) -> QueryResult<&'a str> {
    raw.as_str()
        .ok_or_else(|| QueryError::invalid(format!("{} must be a string key", name)))
}

/// Resolves `id_field` to `field`, checking the id matches the query's
/// bound dataset and the field is declared for its kind
pub fn resolve_field(raw: &str, dataset_id: &str, kind: DatasetKind) -> QueryResult<String> {
    let (id, field) = split_key(raw)?;
    if id != dataset_id {
        return Err(QueryError::invalid_key(raw, "Mismatching dataset ids within query"));
    }
    if !kind.declares(field) {
        return Err(QueryError::invalid_key(
            raw,
            format!("Field not declared for {} datasets", kind),
        ));
    }
    Ok(field.to_string())
}

/// Like [`resolve_field`], additionally requiring the declared type
pub fn resolve_typed_field(
    raw: &str,
    dataset_id: &str,
    kind: DatasetKind,
    expected: FieldType,
) -> QueryResult<String> {
    let field = resolve_field(raw, dataset_id, kind)?;
    if kind.field_type(&field) != Some(expected) {
        return Err(QueryError::invalid_key(
            raw,
            format!("Expected a {} field", expected.as_str()),
        ));
    }
    Ok(field)
}

/// Infers the dataset kind from the field part of `id_field`
pub fn infer_kind(raw: &str) -> QueryResult<DatasetKind> {
    let (_, field) = split_key(raw)?;
    DatasetKind::infer(field).ok_or_else(|| QueryError::invalid_key(raw, "Unrecognized key"))
}

/// Requires a JSON object (never an array) with exactly `n` keys
pub fn object_with_n_keys<'a>(
    raw: &'a Value,
    n: usize,
    name: &str,
) -> QueryResult<&'a Map<String, Value>> {
    match raw.as_object() {
        Some(map) if map.len() == n => Ok(map),
        _ => Err(QueryError::invalid(format!(
            "{} is not an object containing exactly {} keys",
            name, n
        ))),
    }
}

/// Requires a JSON object with exactly one key and returns that entry
pub fn single_entry<'a>(raw: &'a Value, name: &str) -> QueryResult<(&'a str, &'a Value)> {
    let map = object_with_n_keys(raw, 1, name)?;
    map.iter()
        .next()
        .map(|(k, v)| (k.as_str(), v))
        .ok_or_else(|| QueryError::invalid(format!("{} is empty", name)))
}

/// Requires a non-empty JSON array
pub fn non_empty_array<'a>(raw: &'a Value, name: &str) -> QueryResult<&'a [Value]> {
    match raw.as_array() {
        Some(items) if !items.is_empty() => Ok(items.as_slice()),
        _ => Err(QueryError::invalid(format!("{} is not a non-empty array", name))),
    }
}

/// Requires a non-empty JSON array of strings
pub fn non_empty_string_array<'a>(raw: &'a Value, name: &str) -> QueryResult<Vec<&'a str>> {
    non_empty_array(raw, name)?
        .iter()
        .map(|item| as_key(item, name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("courses_avg").unwrap(), ("courses", "avg"));
        assert!(split_key("test").is_err());
        assert!(split_key("test_test_test").is_err());
        assert!(split_key("_avg").is_err());
    }

    #[test]
    fn test_resolve_field() {
        let kind = DatasetKind::Courses;
        assert_eq!(resolve_field("courses_dept", "courses", kind).unwrap(), "dept");
        assert!(resolve_field("other_dept", "courses", kind).is_err());
        assert!(resolve_field("courses_seats", "courses", kind).is_err());
        assert!(resolve_field("courses_", "courses", kind).is_err());
    }

    #[test]
    fn test_resolve_typed_field() {
        let kind = DatasetKind::Rooms;
        assert_eq!(
            resolve_typed_field("rooms_seats", "rooms", kind, FieldType::Number).unwrap(),
            "seats"
        );
        let err = resolve_typed_field("rooms_name", "rooms", kind, FieldType::Number).unwrap_err();
        assert_eq!(err.key(), Some("rooms_name"));
    }

    #[test]
    fn test_infer_kind() {
        assert!(infer_kind("test").is_err());
        assert!(infer_kind("test_test_test").is_err());
        assert!(infer_kind("courses_boo").is_err());
        assert_eq!(infer_kind("courses_avg").unwrap(), DatasetKind::Courses);
        assert_eq!(infer_kind("rooms_lat").unwrap(), DatasetKind::Rooms);
    }

    #[test]
    fn test_object_with_n_keys() {
        assert!(object_with_n_keys(&json!(["a"]), 1, "X").is_err());
        assert!(object_with_n_keys(&json!("a"), 1, "X").is_err());
        assert!(object_with_n_keys(&json!({}), 2, "X").is_err());
        assert!(object_with_n_keys(&json!({}), 0, "X").is_ok());
        assert!(object_with_n_keys(&json!({"CAT": {}, "DOG": {}}), 2, "X").is_ok());
    }

    #[test]
    fn test_non_empty_array() {
        assert!(non_empty_array(&json!([]), "X").is_err());
        assert!(non_empty_array(&json!("a"), "X").is_err());
        assert!(non_empty_array(&json!({}), "X").is_err());
        assert_eq!(non_empty_array(&json!(["a"]), "X").unwrap().len(), 1);
        assert!(non_empty_string_array(&json!(["a", 1]), "X").is_err());
    }
}
