//! Query vocabulary for collections: comparable scalar values, typed
//! column names, ordering and bounds.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A column of a record type. Implemented by each record's field enum.
pub trait Column: Copy + fmt::Debug {
    /// Name of the column in the stored JSON.
    fn name(&self) -> &'static str;
}

/// A single field value as seen by filters and orderings.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    /// Equality used by `select_eq` / `update_eq`.
    ///
    /// Integers and floats compare numerically. A timestamp equals text
    /// that parses to the same instant.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => a == b,
            (Scalar::Timestamp(t), Scalar::Text(s)) | (Scalar::Text(s), Scalar::Timestamp(t)) => {
                parse_timestamp(s).is_some_and(|p| p == *t)
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Natural ordering between two values, if they are comparable.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Text(a), Scalar::Text(b)) => {
                match (parse_timestamp(a), parse_timestamp(b)) {
                    (Some(x), Some(y)) => Some(x.cmp(&y)),
                    _ => Some(a.cmp(b)),
                }
            }
            (Scalar::Timestamp(a), Scalar::Timestamp(b)) => Some(a.cmp(b)),
            (Scalar::Timestamp(t), Scalar::Text(s)) => parse_timestamp(s).map(|p| t.cmp(&p)),
            (Scalar::Text(s), Scalar::Timestamp(t)) => parse_timestamp(s).map(|p| p.cmp(t)),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }

    /// Interpret the value as an instant, parsing text when needed.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Scalar::Timestamp(t) => Some(*t),
            Scalar::Text(s) => parse_timestamp(s),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => write!(f, "{s}"),
            Scalar::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&String> for Scalar {
    fn from(value: &String) -> Self {
        Scalar::Text(value.clone())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(value: DateTime<Utc>) -> Self {
        Scalar::Timestamp(value)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Timestamp(value.and_time(chrono::NaiveTime::MIN).and_utc())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// Parse RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` (as UTC) or a bare date
/// (as UTC midnight).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc())
}

// ═══════════════════════════════════════════
// Ordering, limits, bounds
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy)]
pub struct Order<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F: Column> Order<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: Direction::Descending,
        }
    }
}

/// Ordering and limit applied after filtering.
#[derive(Debug, Clone, Copy)]
pub struct Select<F> {
    pub order: Option<Order<F>>,
    pub limit: Option<usize>,
}

impl<F> Default for Select<F> {
    fn default() -> Self {
        Self {
            order: None,
            limit: None,
        }
    }
}

impl<F: Column> Select<F> {
    pub fn ordered(order: Order<F>) -> Self {
        Self {
            order: Some(order),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One inclusive bound of a range filter.
#[derive(Debug, Clone)]
pub struct Bound<F> {
    pub field: F,
    pub value: Scalar,
}

impl<F: Column> Bound<F> {
    pub fn new(field: F, value: impl Into<Scalar>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Compare two sort keys as timestamps where possible. Keys that are
/// neither timestamps nor comparable sort after everything else.
pub(crate) fn order_keys(a: &Scalar, b: &Scalar, direction: Direction) -> Ordering {
    let natural = match (a.as_timestamp(), b.as_timestamp()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.compare(b),
    };
    match natural {
        Some(ord) => match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        },
        None => rank_incomparable(a).cmp(&rank_incomparable(b)),
    }
}

fn rank_incomparable(value: &Scalar) -> u8 {
    match value {
        Scalar::Null => 1,
        _ => 0,
    }
}
