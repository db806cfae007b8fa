//! Attribute search and sort language for project and task listings
//!
//! A filter string is free text containing zero or more `key=<value>` pairs:
//!
//! ```text
//! title_contains=<Launch> status=<OPEN>, priority_sort=<DESC>
//! ```
//!
//! Parsing never fails. Text that does not match the pair pattern is ignored,
//! unknown keys are ignored, and values outside a key's accepted domain skip
//! that one pair. What survives is compiled into a typed [`Query`]: a list of
//! filters plus an ordered list of sort keys.
//!
//! A [`Query`] is not bound to a storage backend. It can be applied to an
//! in-memory collection with [`Query::apply`], or pushed into a Postgres
//! statement with [`Query::push_where`] and [`Query::push_order_by`]. Both
//! paths select and order rows the same way.
//!
//! # Sort composition
//!
//! Sort keys compose like chained `ORDER BY` clauses: the first sort key found
//! in the string is the primary order, each later key only breaks ties of the
//! ones before it. Rows still tied keep their input order.
//!
//! # Example
//!
//! ```
//! use gouvernement_shared::search::parse_pairs;
//!
//! let pairs = parse_pairs("priority=<3> junk status=<OPEN> priority=<4>");
//! assert_eq!(
//!     pairs,
//!     vec![
//!         ("priority".to_string(), "4".to_string()),
//!         ("status".to_string(), "OPEN".to_string()),
//!     ]
//! );
//! ```

pub mod project;
pub mod task;

use std::cmp::Ordering;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::resolver::{resolve_emails, ResolveError, UserDirectory};

pub use project::{ProjectFilter, ProjectQuery, ProjectRecord, ProjectSortKey};
pub use task::{TaskFilter, TaskQuery, TaskRecord, TaskSortKey};

/// Filter applied to the task listing when the client supplies none
pub const DEFAULT_FILTERS: &str = "status=<OPEN>, priority_sort=<DESC>";

const PAIR_PATTERN: &str = r"\b(?P<name>\w*)=<(?P<value>[^>]*)>";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn pair_regex() -> &'static Regex {
    static PAIR_REGEX: OnceLock<Regex> = OnceLock::new();
    PAIR_REGEX.get_or_init(|| Regex::new(PAIR_PATTERN).expect("pair pattern is valid"))
}

/// Errors raised while interpreting a single `key=<value>` pair
///
/// Only [`SearchError::Database`] escapes compilation; the other variants are
/// caught where the pair is applied and the pair is skipped.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Value outside the key's domain or not parseable
    #[error("Invalid value {value:?} for filter {key}")]
    InvalidFilterValue { key: String, value: String },

    /// An email in a people filter is not registered
    #[error("Unregistered email {email:?} in filter {key}")]
    UnresolvedPeople { key: String, email: String },

    /// The user directory could not be queried
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SearchError {
    pub(crate) fn invalid(key: &str, value: &str) -> Self {
        SearchError::InvalidFilterValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// True if the failing pair should be skipped rather than failing the search
    pub fn is_skippable(&self) -> bool {
        !matches!(self, SearchError::Database(_))
    }
}

/// Extracts `key=<value>` pairs from a filter string
///
/// Pairs keep the position of the first occurrence of their key; a repeated
/// key takes the value of its last occurrence.
pub fn parse_pairs(input: &str) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for captures in pair_regex().captures_iter(input) {
        let name = &captures["name"];
        let value = &captures["value"];

        match pairs.iter_mut().find(|(existing, _)| existing == name) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((name.to_string(), value.to_string())),
        }
    }

    pairs
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }

    fn orient(&self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// A row predicate evaluated in memory
pub trait Filter<T: ?Sized> {
    fn matches(&self, row: &T) -> bool;
}

/// A sortable key evaluated in memory
pub trait SortKey<T: ?Sized> {
    /// Compares two rows by this key in ascending order
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// A filter that can be rendered as a boolean SQL expression over listing columns
pub trait PushSql {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>);
}

/// A sort key backed by a listing column
pub trait SqlColumn {
    fn column(&self) -> &'static str;
}

/// One sort clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    pub key: K,
    pub direction: Direction,
}

/// One interpreted `key=<value>` pair
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOp<F, K> {
    Filter(F),
    Sort(K, Direction),
}

/// A compiled search: filters plus sort clauses in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct Query<F, K> {
    pub filters: Vec<F>,
    pub sorts: Vec<Sort<K>>,
}

impl<F, K> Default for Query<F, K> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
        }
    }
}

impl<F, K> Query<F, K> {
    /// True if the query neither filters nor sorts
    pub fn is_identity(&self) -> bool {
        self.filters.is_empty() && self.sorts.is_empty()
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a sort clause that ranks below every clause already present
    pub fn order_by(mut self, key: K, direction: Direction) -> Self {
        self.sorts.push(Sort { key, direction });
        self
    }

    /// Folds one interpreted pair into the query
    pub fn push(self, op: SearchOp<F, K>) -> Self {
        match op {
            SearchOp::Filter(filter) => self.filter(filter),
            SearchOp::Sort(key, direction) => self.order_by(key, direction),
        }
    }

    /// Narrows and orders an in-memory collection
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T>
    where
        F: Filter<T>,
        K: SortKey<T>,
    {
        let mut rows: Vec<T> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .collect();

        if !self.sorts.is_empty() {
            rows.sort_by(|a, b| {
                self.sorts.iter().fold(Ordering::Equal, |ordering, sort| {
                    ordering.then_with(|| sort.direction.orient(sort.key.compare(a, b)))
                })
            });
        }

        rows
    }

    /// Appends ` AND (<filter>)` for every filter
    ///
    /// The builder must already hold a `WHERE` clause.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>)
    where
        F: PushSql,
    {
        for filter in &self.filters {
            builder.push(" AND (");
            filter.push_sql(builder);
            builder.push(")");
        }
    }

    /// Appends ` ORDER BY ...` if the query sorts
    pub fn push_order_by(&self, builder: &mut QueryBuilder<'_, Postgres>)
    where
        K: SqlColumn,
    {
        for (i, sort) in self.sorts.iter().enumerate() {
            builder.push(if i == 0 { " ORDER BY " } else { ", " });
            builder.push(sort.key.column());
            builder.push(" ");
            builder.push(sort.direction.as_sql());
        }
    }

    /// Like [`Query::push_order_by`], always ordering last by `fallback`
    ///
    /// `fallback` must make the order total, so that rows tied on every sort
    /// key come back in a deterministic order.
    pub fn push_order_by_then(&self, builder: &mut QueryBuilder<'_, Postgres>, fallback: &str)
    where
        K: SqlColumn,
    {
        self.push_order_by(builder);
        builder.push(if self.sorts.is_empty() { " ORDER BY " } else { ", " });
        builder.push(fallback);
    }
}

pub(crate) fn parse_priority(key: &str, value: &str) -> Result<i32, SearchError> {
    match value {
        "1" | "2" | "3" | "4" | "5" => value.parse().map_err(|_| SearchError::invalid(key, value)),
        _ => Err(SearchError::invalid(key, value)),
    }
}

pub(crate) fn parse_status(key: &str, value: &str) -> Result<bool, SearchError> {
    match value {
        "OPEN" => Ok(true),
        "CLOSED" => Ok(false),
        _ => Err(SearchError::invalid(key, value)),
    }
}

pub(crate) fn parse_direction(key: &str, value: &str) -> Result<Direction, SearchError> {
    match value {
        "ASC" => Ok(Direction::Asc),
        "DESC" => Ok(Direction::Desc),
        _ => Err(SearchError::invalid(key, value)),
    }
}

/// OPEN is `true`, so open-first is a descending status sort
pub(crate) fn parse_status_order(key: &str, value: &str) -> Result<Direction, SearchError> {
    match value {
        "OPEN_FIRST" => Ok(Direction::Desc),
        "CLOSED_FIRST" => Ok(Direction::Asc),
        _ => Err(SearchError::invalid(key, value)),
    }
}

/// Parses `YYYY-MM-DD` into midnight UTC of that day
pub(crate) fn parse_date(key: &str, value: &str) -> Result<DateTime<Utc>, SearchError> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| SearchError::invalid(key, value))?;

    Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Resolves a people filter value into user ids
///
/// An empty list resolves to `None`: it names nobody and adds no constraint.
pub(crate) async fn resolve_people<D>(
    directory: &D,
    key: &str,
    value: &str,
) -> Result<Option<Vec<Uuid>>, SearchError>
where
    D: UserDirectory + ?Sized,
{
    match resolve_emails(directory, value).await {
        Ok(users) if users.is_empty() => Ok(None),
        Ok(users) => Ok(Some(users.into_iter().map(|user| user.id).collect())),
        Err(ResolveError::UnknownEmail(email)) => Err(SearchError::UnresolvedPeople {
            key: key.to_string(),
            email,
        }),
        Err(ResolveError::Database(e)) => Err(SearchError::Database(e)),
    }
}

pub(crate) fn parse_integer(key: &str, value: &str) -> Result<i32, SearchError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| SearchError::invalid(key, value))
}

/// Records the outcome of interpreting one pair
///
/// Skippable failures are logged and dropped; database failures propagate.
pub(crate) fn settle<T>(
    key: &str,
    outcome: Result<Option<T>, SearchError>,
) -> Result<Option<T>, SearchError> {
    match outcome {
        Ok(op) => Ok(op),
        Err(e) if e.is_skippable() => {
            tracing::debug!(filter = key, reason = %e, "Skipping filter");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
