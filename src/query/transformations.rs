//! TRANSFORMATIONS deserialization
//!
//! ```text
//! {"GROUP": ["id_field", ...], "APPLY": [{"name": {"TOKEN": "id_field"}}, ...]}
//! ```
//!
//! The first GROUP key fixes the dataset id and kind for the whole query.

use std::collections::HashSet;

use serde_json::Value;

use super::ast::{ApplyOp, ApplyRule, Transformations};
use super::errors::{QueryError, QueryResult};
use super::keys::{
    as_key, infer_kind, non_empty_array, non_empty_string_array, object_with_n_keys,
    resolve_field, single_entry, split_key,
};
use crate::dataset::{DatasetKind, FieldType, FIELD_SEPARATOR};

/// Deserializes GROUP/APPLY
pub struct TransformationsDeserializer;

impl TransformationsDeserializer {
    pub fn deserialize(raw: &Value) -> QueryResult<Transformations> {
        let map = object_with_n_keys(raw, 2, "TRANSFORMATIONS")?;
        let group = map
            .get("GROUP")
            .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS did not contain key GROUP"))?;
        let apply = map
            .get("APPLY")
            .ok_or_else(|| QueryError::invalid("TRANSFORMATIONS did not contain key APPLY"))?;

        let (dataset_id, kind, group) = Self::deserialize_group(group)?;
        let apply = Self::deserialize_apply(apply, &dataset_id, kind)?;

        Ok(Transformations {
            group,
            apply,
            dataset_id,
            kind,
        })
    }

    fn deserialize_group(raw: &Value) -> QueryResult<(String, DatasetKind, Vec<String>)> {
        let keys = non_empty_string_array(raw, "GROUP")?;
        let (dataset_id, _) = split_key(keys[0])?;
        let kind = infer_kind(keys[0])?;

        let group = keys
            .iter()
            .map(|key| resolve_field(key, dataset_id, kind))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok((dataset_id.to_string(), kind, group))
    }

    fn deserialize_apply(
        raw: &Value,
        dataset_id: &str,
        kind: DatasetKind,
    ) -> QueryResult<Vec<ApplyRule>> {
        let mut seen = HashSet::new();
        let mut rules = Vec::new();

        for item in non_empty_array(raw, "APPLY")? {
            let (name, body) = single_entry(item, "APPLYRULE")?;
            if name.is_empty() {
                return Err(QueryError::invalid("Apply name must not be empty"));
            }
            if name.contains(FIELD_SEPARATOR) {
                return Err(QueryError::invalid_key(
                    name,
                    "Apply name must not contain the field separator",
                ));
            }
            if !seen.insert(name) {
                return Err(QueryError::invalid_key(name, "Repeated apply name"));
            }

            let (token, target) = single_entry(body, name)?;
            let op = ApplyOp::from_token(token)
                .ok_or_else(|| QueryError::invalid_key(token, "Invalid apply token"))?;

            let key = as_key(target, token)?;
            let field = resolve_field(key, dataset_id, kind)?;
            if op.requires_numeric() && kind.field_type(&field) != Some(FieldType::Number) {
                return Err(QueryError::invalid_key(
                    key,
                    format!("{} requires a numeric field", op.as_str()),
                ));
            }

            rules.push(ApplyRule::new(name, op, field));
        }

        Ok(rules)
    }
}
