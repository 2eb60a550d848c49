//! Query deserialization for insightql
//!
//! Turns an untrusted JSON query into a validated [`Query`]. Nothing in a
//! validated query can reference a field the bound dataset kind does not
//! declare, or compare a field against a value of the wrong type.
//!
//! # Deserialization Order (strict)
//!
//! 1. TRANSFORMATIONS (if present): fixes dataset id and kind from GROUP
//! 2. OPTIONS: fixes dataset id and kind from COLUMNS when no
//!    transformations are present
//! 3. WHERE: validated against the fixed id and kind
//!
//! The first violation aborts the whole query.

mod ast;
mod deserializer;
mod errors;
mod filter;
mod keys;
mod options;
mod transformations;

pub use ast::{
    ApplyOp, ApplyRule, Column, ColumnSource, Filter, LogicOp, MathOp, Options, Order, Query,
    SortDirection, SortKey, Transformations,
};
pub use deserializer::QueryDeserializer;
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use filter::FilterDeserializer;
pub use options::OptionsDeserializer;
pub use transformations::TransformationsDeserializer;
