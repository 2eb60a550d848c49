//! Top-level query deserialization

use serde_json::Value;

use super::ast::Query;
use super::errors::{QueryError, QueryResult};
use super::filter::FilterDeserializer;
use super::options::OptionsDeserializer;
use super::transformations::TransformationsDeserializer;

const WHERE: &str = "WHERE";
const OPTIONS: &str = "OPTIONS";
const TRANSFORMATIONS: &str = "TRANSFORMATIONS";

/// Builds a validated [`Query`] from raw JSON
pub struct QueryDeserializer;

impl QueryDeserializer {
    /// Accepts exactly `{WHERE, OPTIONS}` or `{WHERE, OPTIONS, TRANSFORMATIONS}`.
    pub fn deserialize(raw: &Value) -> QueryResult<Query> {
        let map = raw
            .as_object()
            .ok_or_else(|| QueryError::invalid("Query is not an object"))?;

        let has_transformations = map.contains_key(TRANSFORMATIONS);
        let expected_keys = if has_transformations { 3 } else { 2 };
        if !map.contains_key(WHERE) || !map.contains_key(OPTIONS) || map.len() != expected_keys {
            return Err(QueryError::invalid(
                "Query must contain exactly WHERE, OPTIONS and optionally TRANSFORMATIONS",
            ));
        }

        let transformations = map
            .get(TRANSFORMATIONS)
            .map(TransformationsDeserializer::deserialize)
            .transpose()?;

        let options = OptionsDeserializer::new(transformations.as_ref()).deserialize(&map[OPTIONS])?;

        let filter =
            FilterDeserializer::new(&options.dataset_id, options.kind).deserialize(&map[WHERE])?;

        Ok(Query {
            filter,
            options,
            transformations,
        })
    }
}
