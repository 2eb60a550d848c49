//! WHERE deserialization
//!
//! Grammar (one key per node):
//!
//! ```text
//! FILTER := {} (top level only)
//!         | {"AND" | "OR": [FILTER, ...]}          (at least one)
//!         | {"LT" | "GT" | "EQ": {"id_mfield": number}}
//!         | {"IS": {"id_sfield": "[*]?chars[*]?"}}
//!         | {"NOT": FILTER}                         (not empty)
//! ```

use serde_json::Value;

use super::ast::{Filter, LogicOp, MathOp};
use super::errors::{QueryError, QueryResult};
use super::keys::{non_empty_array, resolve_typed_field, single_entry};
use crate::dataset::{DatasetKind, FieldType};

const WILDCARD: char = '*';

/// Deserializes a WHERE clause bound to one dataset id and kind
pub struct FilterDeserializer<'a> {
    dataset_id: &'a str,
    kind: DatasetKind,
}

impl<'a> FilterDeserializer<'a> {
    pub fn new(dataset_id: &'a str, kind: DatasetKind) -> Self {
        Self { dataset_id, kind }
    }

    /// Deserializes a top-level filter. `{}` yields [`Filter::Empty`].
    pub fn deserialize(&self, raw: &Value) -> QueryResult<Filter> {
        self.deserialize_node(raw, true)
    }

    fn deserialize_node(&self, raw: &Value, allow_empty: bool) -> QueryResult<Filter> {
        let map = raw
            .as_object()
            .ok_or_else(|| QueryError::invalid("Malformed filter: expected an object"))?;

        if map.is_empty() {
            return if allow_empty {
                Ok(Filter::Empty)
            } else {
                Err(QueryError::invalid("Nested filter is empty"))
            };
        }

        let (key, body) = single_entry(raw, "Filter")?;
        match key {
            "AND" => self.deserialize_logic(LogicOp::And, body),
            "OR" => self.deserialize_logic(LogicOp::Or, body),
            "LT" => self.deserialize_math(MathOp::Lt, body),
            "GT" => self.deserialize_math(MathOp::Gt, body),
            "EQ" => self.deserialize_math(MathOp::Eq, body),
            "IS" => self.deserialize_is(body),
            "NOT" => Ok(Filter::not(self.deserialize_node(body, false)?)),
            other => Err(QueryError::invalid_key(other, "Invalid filter key")),
        }
    }

    fn deserialize_logic(&self, op: LogicOp, body: &Value) -> QueryResult<Filter> {
        let filters = non_empty_array(body, op.as_str())?
            .iter()
            .map(|inner| self.deserialize_node(inner, false))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Filter::Logic { op, filters })
    }

    fn deserialize_math(&self, op: MathOp, body: &Value) -> QueryResult<Filter> {
        let (key, value) = single_entry(body, op.as_str())?;
        let field = resolve_typed_field(key, self.dataset_id, self.kind, FieldType::Number)?;
        let value = value.as_f64().ok_or_else(|| {
            QueryError::invalid(format!("{} must compare against a number", op.as_str()))
        })?;
        Ok(Filter::Math { op, field, value })
    }

    fn deserialize_is(&self, body: &Value) -> QueryResult<Filter> {
        let (key, value) = single_entry(body, "IS")?;
        let field = resolve_typed_field(key, self.dataset_id, self.kind, FieldType::String)?;
        let pattern = value
            .as_str()
            .ok_or_else(|| QueryError::invalid("IS must compare against a string"))?;
        validate_wildcards(pattern)?;
        Ok(Filter::is(field, pattern))
    }
}

/// Rejects patterns with a `*` anywhere but the first or last character
pub fn validate_wildcards(pattern: &str) -> QueryResult<()> {
    let chars: Vec<char> = pattern.chars().collect();
    if chars.len() > 2 && chars[1..chars.len() - 1].contains(&WILDCARD) {
        return Err(QueryError::invalid_key(
            pattern,
            "Invalid wildcard placement in IS pattern",
        ));
    }
    Ok(())
}
