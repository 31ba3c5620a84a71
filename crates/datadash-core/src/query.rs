//! Immutable query specification.
//!
//! A [`Query`] records what a caller wants from a table (filter, search
//! term, ordering, window) without touching any store. Every builder method
//! borrows `self` and returns a new value, so a specification shared between
//! requests can never be changed underneath one of them.

use crate::schema::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

/// A column ordering, encoded on the wire as `column` or `-column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Descending,
        }
    }

    /// Parse the signed-string form. A single leading `-` marks descending.
    /// Returns `None` when no column name remains.
    pub fn parse(spec: &str) -> Option<Self> {
        let (column, direction) = match spec.strip_prefix('-') {
            Some(rest) => (rest, Direction::Descending),
            None => (spec, Direction::Ascending),
        };
        if column.is_empty() {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            direction,
        })
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Descending
    }

    /// The same column in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            column: self.column.clone(),
            direction: match self.direction {
                Direction::Ascending => Direction::Descending,
                Direction::Descending => Direction::Ascending,
            },
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => write!(f, "{}", self.column),
            Direction::Descending => write!(f, "-{}", self.column),
        }
    }
}

/// What to read from a table.
///
/// Absent parts mean "no constraint": no filter, no text search, the store's
/// natural order, from the first row, without a cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filter: Option<Record>,
    search: Option<String>,
    order_by: Option<OrderBy>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the equality filter. Earlier criteria are discarded, not merged.
    pub fn filter(&self, criteria: Record) -> Self {
        Self {
            filter: Some(criteria),
            ..self.clone()
        }
    }

    pub fn search(&self, term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..self.clone()
        }
    }

    pub fn order_by(&self, order: OrderBy) -> Self {
        Self {
            order_by: Some(order),
            ..self.clone()
        }
    }

    pub fn offset(&self, offset: usize) -> Self {
        Self {
            offset: Some(offset),
            ..self.clone()
        }
    }

    pub fn limit(&self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }

    /// Drop ordering and window; what `count()` evaluates.
    pub fn unwindowed(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            search: self.search.clone(),
            order_by: None,
            offset: None,
            limit: None,
        }
    }

    pub fn filter_criteria(&self) -> Option<&Record> {
        self.filter.as_ref()
    }

    /// The raw search term, including an explicitly empty one.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// The search term that actually filters: `None` when absent or empty.
    pub fn effective_search(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn ordering(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria(key: &str, value: serde_json::Value) -> Record {
        let mut r = Record::new();
        r.insert(key.to_string(), value);
        r
    }

    #[test]
    fn test_parse_order_by() {
        assert_eq!(OrderBy::parse("name"), Some(OrderBy::ascending("name")));
        assert_eq!(OrderBy::parse("-name"), Some(OrderBy::descending("name")));
        assert_eq!(OrderBy::parse("-"), None);
        assert_eq!(OrderBy::parse(""), None);
    }

    #[test]
    fn test_order_by_display_round_trips_sign() {
        assert_eq!(OrderBy::descending("joined").to_string(), "-joined");
        assert_eq!(OrderBy::ascending("joined").to_string(), "joined");
        assert_eq!(OrderBy::ascending("joined").reversed(), OrderBy::descending("joined"));
    }

    #[test]
    fn test_builders_do_not_mutate_original() {
        let base = Query::new();
        let derived = base.search("tom").offset(10).limit(5);

        assert_eq!(base, Query::new());
        assert_eq!(derived.search_term(), Some("tom"));
        assert_eq!(derived.offset_value(), Some(10));
        assert_eq!(derived.limit_value(), Some(5));
    }

    #[test]
    fn test_filter_replaces_previous_filter() {
        let q = Query::new()
            .filter(criteria("pk", json!(1)))
            .filter(criteria("username", json!("tom")));
        let f = q.filter_criteria().unwrap();
        assert_eq!(f.len(), 1);
        assert_eq!(f["username"], json!("tom"));
    }

    #[test]
    fn test_empty_search_is_distinct_but_ineffective() {
        let q = Query::new().search("");
        assert_eq!(q.search_term(), Some(""));
        assert_eq!(q.effective_search(), None);
        assert_eq!(Query::new().search_term(), None);
    }

    #[test]
    fn test_unwindowed_keeps_predicates_only() {
        let q = Query::new()
            .search("x")
            .order_by(OrderBy::ascending("pk"))
            .offset(3)
            .limit(4)
            .unwindowed();
        assert_eq!(q.search_term(), Some("x"));
        assert!(q.ordering().is_none());
        assert!(q.offset_value().is_none());
        assert!(q.limit_value().is_none());
    }
}
