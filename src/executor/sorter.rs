//! Result sorting for query execution
//!
//! Multi-key, stable: rows equal on every key keep their prior order.

use std::cmp::Ordering;

use super::result::ResultRow;
use crate::dataset::FieldValue;
use crate::query::{SortDirection, SortKey};

/// Sorts result rows
pub struct RowSorter;

impl RowSorter {
    /// Sorts rows by `keys`, the first key most significant.
    pub fn sort(rows: &mut [ResultRow], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }

        rows.sort_by(|a, b| {
            for key in keys {
                let ordering = Self::compare_values(a.get(&key.column), b.get(&key.column));
                let ordering = match key.direction {
                    SortDirection::Up => ordering,
                    SortDirection::Down => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Numbers compare numerically, strings lexicographically by UTF-16 code
    /// unit, so characters above U+FFFF sort before U+E000..=U+FFFF.
    ///
    /// A column holds one scalar type across rows; mixed or absent values
    /// compare equal so the stable sort leaves them in place.
    fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
        match (a, b) {
            (Some(FieldValue::Num(x)), Some(FieldValue::Num(y))) => {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (Some(FieldValue::Str(x)), Some(FieldValue::Str(y))) => {
                x.encode_utf16().cmp(y.encode_utf16())
            }
            _ => Ordering::Equal,
        }
    }
}
