//! OPTIONS deserialization
//!
//! ```text
//! {"COLUMNS": [column, ...], "ORDER"?: column | {"dir": "UP"|"DOWN", "keys": [column, ...]}}
//! ```
//!
//! Without transformations every column is an `id_field` key and the columns
//! fix the dataset id and kind. With transformations every column is either an
//! APPLY name or a GROUP field qualified with the transformation's id.

use serde_json::{Map, Value};

use super::ast::{Column, ColumnSource, Options, Order, SortDirection, Transformations};
use super::errors::{QueryError, QueryResult};
use super::keys::{as_key, non_empty_string_array, object_with_n_keys, resolve_field, split_key};
use crate::dataset::DatasetKind;

const COLUMNS: &str = "COLUMNS";
const ORDER: &str = "ORDER";

/// Deserializes OPTIONS, optionally in the context of TRANSFORMATIONS
pub struct OptionsDeserializer<'a> {
    transformations: Option<&'a Transformations>,
}

impl<'a> OptionsDeserializer<'a> {
    pub fn new(transformations: Option<&'a Transformations>) -> Self {
        Self { transformations }
    }

    pub fn deserialize(&self, raw: &Value) -> QueryResult<Options> {
        let map = raw
            .as_object()
            .ok_or_else(|| QueryError::invalid("OPTIONS is not an object"))?;
        if let Some(extra) = map.keys().find(|k| *k != COLUMNS && *k != ORDER) {
            return Err(QueryError::invalid_key(extra.as_str(), "Invalid key in OPTIONS"));
        }

        let raw_columns = map
            .get(COLUMNS)
            .ok_or_else(|| QueryError::invalid("OPTIONS did not contain key COLUMNS"))?;
        let column_names = non_empty_string_array(raw_columns, COLUMNS)?;

        let (columns, dataset_id, kind) = match self.transformations {
            None => Self::plain_columns(&column_names)?,
            Some(t) => (
                Self::transformed_columns(&column_names, t)?,
                t.dataset_id.clone(),
                t.kind,
            ),
        };

        let order = Self::deserialize_order(map, &column_names)?;

        Ok(Options {
            columns,
            order,
            dataset_id,
            kind,
        })
    }

    fn plain_columns(names: &[&str]) -> QueryResult<(Vec<Column>, String, DatasetKind)> {
        let mut split = Vec::with_capacity(names.len());
        for name in names {
            split.push(split_key(name)?);
        }

        let dataset_id = split[0].0;
        if let Some((name, _)) = names
            .iter()
            .zip(&split)
            .find(|(_, (id, _))| *id != dataset_id)
        {
            return Err(QueryError::invalid_key(*name, "Mismatching dataset ids in COLUMNS"));
        }

        let kind = DatasetKind::ALL
            .into_iter()
            .find(|kind| split.iter().all(|(_, field)| kind.declares(field)))
            .ok_or_else(|| {
                QueryError::invalid("COLUMNS contains invalid or mismatching column keys")
            })?;

        let columns = names
            .iter()
            .zip(&split)
            .map(|(name, (_, field))| Column {
                name: name.to_string(),
                source: ColumnSource::Field(field.to_string()),
            })
            .collect();

        Ok((columns, dataset_id.to_string(), kind))
    }

    fn transformed_columns(names: &[&str], t: &Transformations) -> QueryResult<Vec<Column>> {
        names
            .iter()
            .map(|name| {
                if t.apply_rule(name).is_some() {
                    return Ok(Column {
                        name: name.to_string(),
                        source: ColumnSource::Apply(name.to_string()),
                    });
                }
                let field = resolve_field(name, &t.dataset_id, t.kind)?;
                if !t.groups_by(&field) {
                    return Err(QueryError::invalid_key(
                        *name,
                        "Column is neither a GROUP key nor an APPLY name",
                    ));
                }
                Ok(Column {
                    name: name.to_string(),
                    source: ColumnSource::Field(field),
                })
            })
            .collect()
    }

    fn deserialize_order(map: &Map<String, Value>, columns: &[&str]) -> QueryResult<Option<Order>> {
        let raw = match map.get(ORDER) {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let check_column = |key: &str| {
            if columns.contains(&key) {
                Ok(())
            } else {
                Err(QueryError::invalid_key(key, "ORDER key not in COLUMNS"))
            }
        };

        if let Some(key) = raw.as_str() {
            check_column(key)?;
            return Ok(Some(Order {
                direction: SortDirection::Up,
                keys: vec![key.to_string()],
            }));
        }

        let order = object_with_n_keys(raw, 2, ORDER)?;
        let dir = order
            .get("dir")
            .ok_or_else(|| QueryError::invalid("ORDER did not contain key dir"))?;
        let keys = order
            .get("keys")
            .ok_or_else(|| QueryError::invalid("ORDER did not contain key keys"))?;

        let dir = as_key(dir, "dir")?;
        let direction = SortDirection::from_token(dir)
            .ok_or_else(|| QueryError::invalid_key(dir, "Invalid sort direction"))?;

        let keys = non_empty_string_array(keys, "keys")?;
        for key in &keys {
            check_column(*key)?;
        }

        Ok(Some(Order {
            direction,
            keys: keys.into_iter().map(str::to_string).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{ApplyOp, ApplyRule};
    use serde_json::json;

    fn transformations() -> Transformations {
        Transformations {
            group: vec!["shortname".into()],
            apply: vec![ApplyRule::new("maxSeats", ApplyOp::Max, "seats")],
            dataset_id: "rooms".into(),
            kind: DatasetKind::Rooms,
        }
    }

    #[test]
    fn test_plain_columns() {
        let raw = json!({"COLUMNS": ["courses_dept", "courses_avg"], "ORDER": "courses_avg"});
        let options = OptionsDeserializer::new(None).deserialize(&raw).unwrap();
        assert_eq!(options.dataset_id, "courses");
        assert_eq!(options.kind, DatasetKind::Courses);
        assert_eq!(options.columns[1].name, "courses_avg");
        assert_eq!(options.columns[1].source, ColumnSource::Field("avg".into()));
        assert_eq!(
            options.order,
            Some(Order {
                direction: SortDirection::Up,
                keys: vec!["courses_avg".into()]
            })
        );
    }

    #[test]
    fn test_kind_inferred_for_rooms() {
        let raw = json!({"COLUMNS": ["r_seats", "r_name"]});
        let options = OptionsDeserializer::new(None).deserialize(&raw).unwrap();
        assert_eq!(options.kind, DatasetKind::Rooms);
        assert_eq!(options.dataset_id, "r");
        assert!(options.order.is_none());
    }

    #[test]
    fn test_plain_column_errors() {
        let bad = [
            json!({}),
            json!({"COLUMNS": []}),
            json!({"COLUMNS": "courses_avg"}),
            json!({"COLUMNS": ["courses_avg", "other_dept"]}),
            json!({"COLUMNS": ["courses_avg", "courses_seats"]}),
            json!({"COLUMNS": ["courses_avg_x"]}),
            json!({"COLUMNS": ["courses_boo"]}),
            json!({"COLUMNS": ["courses_avg"], "FORM": "TABLE"}),
            json!(["courses_avg"]),
        ];
        for raw in bad {
            assert!(OptionsDeserializer::new(None).deserialize(&raw).is_err(), "{}", raw);
        }
    }

    #[test]
    fn test_order_object() {
        let raw = json!({
            "COLUMNS": ["courses_dept", "courses_avg"],
            "ORDER": {"dir": "DOWN", "keys": ["courses_dept", "courses_avg"]}
        });
        let order = OptionsDeserializer::new(None).deserialize(&raw).unwrap().order.unwrap();
        assert_eq!(order.direction, SortDirection::Down);
        assert_eq!(order.keys, vec!["courses_dept", "courses_avg"]);
    }

    #[test]
    fn test_order_errors() {
        let bad_orders = [
            json!("courses_pass"),
            json!({"dir": "SIDEWAYS", "keys": ["courses_avg"]}),
            json!({"dir": "UP", "keys": []}),
            json!({"dir": "UP", "keys": ["courses_pass"]}),
            json!({"dir": "UP"}),
            json!({"dir": "UP", "keys": ["courses_avg"], "extra": 1}),
            json!({"direction": "UP", "keys": ["courses_avg"]}),
            json!(5),
        ];
        for order in bad_orders {
            let raw = json!({"COLUMNS": ["courses_dept", "courses_avg"], "ORDER": order});
            assert!(OptionsDeserializer::new(None).deserialize(&raw).is_err(), "{}", raw);
        }
    }

    #[test]
    fn test_transformed_columns() {
        let t = transformations();
        let raw = json!({"COLUMNS": ["rooms_shortname", "maxSeats"], "ORDER": "maxSeats"});
        let options = OptionsDeserializer::new(Some(&t)).deserialize(&raw).unwrap();
        assert_eq!(options.dataset_id, "rooms");
        assert_eq!(options.kind, DatasetKind::Rooms);
        assert_eq!(options.columns[0].source, ColumnSource::Field("shortname".into()));
        assert_eq!(options.columns[1].source, ColumnSource::Apply("maxSeats".into()));
    }

    #[test]
    fn test_transformed_column_errors() {
        let t = transformations();
        let bad = [
            json!({"COLUMNS": ["rooms_seats"]}),
            json!({"COLUMNS": ["minSeats"]}),
            json!({"COLUMNS": ["other_shortname"]}),
        ];
        for raw in bad {
            assert!(OptionsDeserializer::new(Some(&t)).deserialize(&raw).is_err(), "{}", raw);
        }
    }
}
