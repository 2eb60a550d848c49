//! Validated query structures
//!
//! Everything here is built once per request by the deserializers and is
//! never mutated afterwards.

use crate::dataset::DatasetKind;

/// Logic combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicOp::And => "AND",
            LogicOp::Or => "OR",
        }
    }
}

/// Numeric comparators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Lt,
    Gt,
    Eq,
}

impl MathOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MathOp::Lt => "LT",
            MathOp::Gt => "GT",
            MathOp::Eq => "EQ",
        }
    }

    /// Applies the comparator as `value <op> threshold`
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            MathOp::Lt => value < threshold,
            MathOp::Gt => value > threshold,
            MathOp::Eq => value == threshold,
        }
    }
}

/// Predicate tree over a single record
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Empty WHERE: matches everything
    Empty,
    /// NOT
    Not(Box<Filter>),
    /// AND / OR over at least one inner filter
    Logic { op: LogicOp, filters: Vec<Filter> },
    /// LT / GT / EQ on a numeric field
    Math { op: MathOp, field: String, value: f64 },
    /// IS on a string field, with `*` allowed only at either end of the pattern
    Is { field: String, pattern: String },
}

impl Filter {
    pub fn not(inner: Filter) -> Self {
        Filter::Not(Box::new(inner))
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::Logic {
            op: LogicOp::And,
            filters,
        }
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Logic {
            op: LogicOp::Or,
            filters,
        }
    }

    pub fn math(op: MathOp, field: impl Into<String>, value: f64) -> Self {
        Filter::Math {
            op,
            field: field.into(),
            value,
        }
    }

    pub fn is(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Is {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Filter::Empty)
    }
}

/// Aggregation operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOp {
    Max,
    Min,
    Avg,
    Count,
    Sum,
}

impl ApplyOp {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "MAX" => Some(ApplyOp::Max),
            "MIN" => Some(ApplyOp::Min),
            "AVG" => Some(ApplyOp::Avg),
            "COUNT" => Some(ApplyOp::Count),
            "SUM" => Some(ApplyOp::Sum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyOp::Max => "MAX",
            ApplyOp::Min => "MIN",
            ApplyOp::Avg => "AVG",
            ApplyOp::Count => "COUNT",
            ApplyOp::Sum => "SUM",
        }
    }

    /// COUNT works on any declared field; everything else needs numbers
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyOp::Count)
    }
}

/// One named aggregation, e.g. `{"overallAvg": {"AVG": "courses_avg"}}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    pub name: String,
    pub op: ApplyOp,
    pub field: String,
}

impl ApplyRule {
    pub fn new(name: impl Into<String>, op: ApplyOp, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            field: field.into(),
        }
    }
}

/// GROUP + APPLY
#[derive(Debug, Clone, PartialEq)]
pub struct Transformations {
    /// Unqualified field names to group by
    pub group: Vec<String>,
    /// Aggregations, in declaration order
    pub apply: Vec<ApplyRule>,
    pub dataset_id: String,
    pub kind: DatasetKind,
}

impl Transformations {
    pub fn apply_rule(&self, name: &str) -> Option<&ApplyRule> {
        self.apply.iter().find(|rule| rule.name == name)
    }

    pub fn groups_by(&self, field: &str) -> bool {
        self.group.iter().any(|g| g == field)
    }
}

/// Where a projected column takes its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A dataset field (raw record or GROUP value)
    Field(String),
    /// An APPLY result
    Apply(String),
}

/// One output column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Output key, exactly as written in COLUMNS
    pub name: String,
    pub source: ColumnSource,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Up,
    Down,
}

impl SortDirection {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "UP" => Some(SortDirection::Up),
            "DOWN" => Some(SortDirection::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Up => "UP",
            SortDirection::Down => "DOWN",
        }
    }
}

/// One sort key over output column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn up(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Up,
        }
    }

    pub fn down(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Down,
        }
    }
}

/// ORDER: one direction shared by every key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub direction: SortDirection,
    pub keys: Vec<String>,
}

impl Order {
    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.keys
            .iter()
            .map(|column| SortKey {
                column: column.clone(),
                direction: self.direction,
            })
            .collect()
    }
}

/// OPTIONS
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub columns: Vec<Column>,
    pub order: Option<Order>,
    pub dataset_id: String,
    pub kind: DatasetKind,
}

/// A fully validated query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub options: Options,
    pub transformations: Option<Transformations>,
}

impl Query {
    /// Id of the dataset every key in the query refers to
    pub fn dataset_id(&self) -> &str {
        &self.options.dataset_id
    }

    pub fn kind(&self) -> DatasetKind {
        self.options.kind
    }
}
