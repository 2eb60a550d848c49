//! GROUP and APPLY evaluation
//!
//! Groups are keyed by the typed tuple of GROUP values, so the number `1`
//! and the string `"1"` never share a group. Group order is the order in
//! which each distinct key is first seen.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::dataset::{FieldValue, Record};
use crate::query::{ApplyOp, ApplyRule, QueryError, QueryResult};

const ROUND_DP: u32 = 2;

/// One component of a group key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    /// f64 bits, with -0.0 folded into 0.0
    Num(u64),
    Str(String),
}

impl From<&FieldValue> for KeyPart {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Num(n) if *n == 0.0 => KeyPart::Num(0f64.to_bits()),
            FieldValue::Num(n) => KeyPart::Num(n.to_bits()),
            FieldValue::Str(s) => KeyPart::Str(s.clone()),
        }
    }
}

/// Typed value tuple identifying a group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(Vec<KeyPart>);

impl GroupKey {
    fn of(record: &Record, fields: &[String]) -> QueryResult<Self> {
        fields
            .iter()
            .map(|field| field_value(record, field).map(KeyPart::from))
            .collect::<QueryResult<Vec<_>>>()
            .map(GroupKey)
    }
}

/// Looks up a field the query was validated to reference
pub(crate) fn field_value<'a>(record: &'a Record, field: &str) -> QueryResult<&'a FieldValue> {
    record
        .get(field)
        .ok_or_else(|| QueryError::invalid_key(field, "Record is missing queried field"))
}

/// Partitions records into groups sharing identical values for `fields`
pub fn group_records<'a>(
    records: &[&'a Record],
    fields: &[String],
) -> QueryResult<Vec<Vec<&'a Record>>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&'a Record>> = Vec::new();

    for record in records {
        let key = GroupKey::of(record, fields)?;
        match index.get(&key) {
            Some(&slot) => groups[slot].push(record),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![record]);
            }
        }
    }

    Ok(groups)
}

/// Computes APPLY rules over a group
pub struct Aggregator;

impl Aggregator {
    /// Applies one rule to a non-empty group
    pub fn apply(rule: &ApplyRule, group: &[&Record]) -> QueryResult<FieldValue> {
        if group.is_empty() {
            return Err(QueryError::invalid("Cannot aggregate an empty group"));
        }

        let result = match rule.op {
            ApplyOp::Count => Self::count_distinct(&rule.field, group)?,
            ApplyOp::Max => Self::numbers(&rule.field, group)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max),
            ApplyOp::Min => Self::numbers(&rule.field, group)?
                .into_iter()
                .fold(f64::INFINITY, f64::min),
            ApplyOp::Sum => round_f64(Self::numbers(&rule.field, group)?.iter().sum()),
            ApplyOp::Avg => Self::average(&Self::numbers(&rule.field, group)?)?,
        };

        Ok(FieldValue::Num(result))
    }

    fn count_distinct(field: &str, group: &[&Record]) -> QueryResult<f64> {
        let distinct: HashSet<KeyPart> = group
            .iter()
            .map(|r| field_value(r, field).map(KeyPart::from))
            .collect::<QueryResult<_>>()?;
        Ok(distinct.len() as f64)
    }

    fn numbers(field: &str, group: &[&Record]) -> QueryResult<Vec<f64>> {
        group
            .iter()
            .map(|r| {
                field_value(r, field)?
                    .as_number()
                    .ok_or_else(|| QueryError::invalid_key(field, "Field is not numeric"))
            })
            .collect()
    }

    /// Decimal sum and mean, rounded to two places half away from zero
    fn average(numbers: &[f64]) -> QueryResult<f64> {
        let overflow = || QueryError::invalid("AVG overflowed decimal range");

        let mut total = Decimal::ZERO;
        for n in numbers {
            total = total.checked_add(to_decimal(*n)?).ok_or_else(overflow)?;
        }

        total
            .checked_div(Decimal::from(numbers.len() as u64))
            .ok_or_else(overflow)?
            .round_dp_with_strategy(ROUND_DP, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .ok_or_else(overflow)
    }
}

/// Converts through the shortest decimal representation of the f64
fn to_decimal(n: f64) -> QueryResult<Decimal> {
    Decimal::from_str(&n.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(n))
        .ok_or_else(|| QueryError::invalid(format!("Value {} cannot be averaged", n)))
}

fn round_f64(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}
