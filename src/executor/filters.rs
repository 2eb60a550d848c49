//! Filter evaluation
//!
//! A record missing the field, or holding the other scalar type, does not
//! match a leaf. No coercion between numbers and strings.

use crate::dataset::Record;
use crate::query::{Filter, LogicOp, MathOp};

const WILDCARD: char = '*';

/// Evaluates filter trees against records
pub struct FilterEvaluator;

impl FilterEvaluator {
    /// Checks if a record satisfies the filter
    pub fn matches(filter: &Filter, record: &Record) -> bool {
        match filter {
            Filter::Empty => true,
            Filter::Not(inner) => !Self::matches(inner, record),
            Filter::Logic {
                op: LogicOp::And,
                filters,
            } => filters.iter().all(|f| Self::matches(f, record)),
            Filter::Logic {
                op: LogicOp::Or,
                filters,
            } => filters.iter().any(|f| Self::matches(f, record)),
            Filter::Math { op, field, value } => Self::matches_math(*op, field, *value, record),
            Filter::Is { field, pattern } => Self::matches_is(field, pattern, record),
        }
    }

    fn matches_math(op: MathOp, field: &str, threshold: f64, record: &Record) -> bool {
        record
            .get(field)
            .and_then(|v| v.as_number())
            .map(|n| op.compare(n, threshold))
            .unwrap_or(false)
    }

    fn matches_is(field: &str, pattern: &str, record: &Record) -> bool {
        record
            .get(field)
            .and_then(|v| v.as_str())
            .map(|s| wildcard_match(pattern, s))
            .unwrap_or(false)
    }
}

/// Matches `value` against an IS pattern whose `*` sit only at the ends
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    let leading = pattern.starts_with(WILDCARD);
    let trailing = pattern.ends_with(WILDCARD);
    let text = pattern.replace(WILDCARD, "");

    match (leading, trailing) {
        (false, false) => value == text,
        (false, true) => value.starts_with(&text),
        (true, false) => value.ends_with(&text),
        (true, true) => value.contains(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldValue;

    fn section(dept: &str, avg: f64) -> Record {
        let mut r = Record::new();
        r.insert("dept".into(), FieldValue::from(dept));
        r.insert("avg".into(), FieldValue::Num(avg));
        r
    }

    #[test]
    fn test_empty_matches_everything() {
        assert!(FilterEvaluator::matches(&Filter::Empty, &section("cpsc", 50.0)));
        assert!(FilterEvaluator::matches(&Filter::Empty, &Record::new()));
    }

    #[test]
    fn test_math_comparators() {
        let r = section("cpsc", 85.0);
        assert!(FilterEvaluator::matches(&Filter::math(MathOp::Gt, "avg", 80.0), &r));
        assert!(!FilterEvaluator::matches(&Filter::math(MathOp::Lt, "avg", 85.0), &r));
        assert!(FilterEvaluator::matches(&Filter::math(MathOp::Eq, "avg", 85.0), &r));
    }

    #[test]
    fn test_negation_inverts() {
        let records = [section("cpsc", 50.0), section("math", 95.0), Record::new()];
        let filters = [
            Filter::math(MathOp::Gt, "avg", 60.0),
            Filter::is("dept", "cp*"),
            Filter::Empty,
            Filter::or(vec![Filter::is("dept", "math"), Filter::math(MathOp::Lt, "avg", 10.0)]),
        ];
        for f in &filters {
            for r in &records {
                assert_eq!(
                    FilterEvaluator::matches(&Filter::not(f.clone()), r),
                    !FilterEvaluator::matches(f, r)
                );
            }
        }
    }

    #[test]
    fn test_and_or_semantics() {
        let inner = vec![
            Filter::math(MathOp::Gt, "avg", 60.0),
            Filter::is("dept", "*s*"),
        ];
        let and = Filter::and(inner.clone());
        let or = Filter::or(inner.clone());
        for r in [section("cpsc", 50.0), section("math", 95.0), section("chem", 99.0)] {
            assert_eq!(
                FilterEvaluator::matches(&and, &r),
                inner.iter().all(|f| FilterEvaluator::matches(f, &r))
            );
            assert_eq!(
                FilterEvaluator::matches(&or, &r),
                inner.iter().any(|f| FilterEvaluator::matches(f, &r))
            );
        }
    }

    #[test]
    fn test_wildcards() {
        assert!(wildcard_match("abc", "abc"));
        assert!(!wildcard_match("abc", "abcd"));
        assert!(wildcard_match("*bc", "xyzbc"));
        assert!(!wildcard_match("*bc", "bcx"));
        assert!(wildcard_match("ab*", "abxyz"));
        assert!(!wildcard_match("ab*", "xab"));
        assert!(wildcard_match("*b*", "abc"));
        assert!(!wildcard_match("*b*", "acd"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("**", "anything"));
        assert!(wildcard_match("", ""));
        assert!(!wildcard_match("", "a"));
    }

    #[test]
    fn test_missing_or_mistyped_field_no_match() {
        let mut r = section("cpsc", 50.0);
        r.insert("title".into(), FieldValue::Num(1.0));
        assert!(!FilterEvaluator::matches(&Filter::math(MathOp::Gt, "pass", 0.0), &r));
        assert!(!FilterEvaluator::matches(&Filter::is("title", "*"), &r));
        assert!(!FilterEvaluator::matches(&Filter::math(MathOp::Eq, "dept", 0.0), &r));
    }
}
