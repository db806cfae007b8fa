//! Project progress aggregation
//!
//! Progress is a read-time percentage derived from a project's tasks:
//!
//! - a project without tasks has progress 100;
//! - otherwise progress is `floor(100 * open / total)`, where `open` counts the
//!   tasks whose status is OPEN.
//!
//! Note that the numerator counts *open* tasks, so the value measures the
//! share of unfinished work.
//!
//! The same number is available two ways: [`from_statuses`] over a
//! materialized task list, and [`PROGRESS_SQL`] as a correlated subquery that
//! Postgres evaluates per project row. Both use integer division on
//! non-negative operands, so they agree exactly.
//!
//! # Example
//!
//! ```
//! use gouvernement_shared::progress::{from_counts, from_statuses};
//!
//! assert_eq!(from_counts(0, 0), 100);
//! assert_eq!(from_statuses([true, false, false, false]), 25);
//! ```

/// Progress of a project with no tasks
pub const EMPTY_PROJECT_PROGRESS: i32 = 100;

/// SQL expression computing the progress of the project aliased `p`
///
/// `COUNT(*)` yields BIGINT, so `* 100 / total` truncates like the in-memory
/// path. `NULLIF` turns the empty case into NULL, which `COALESCE` maps to 100.
pub const PROGRESS_SQL: &str = "COALESCE(\
    (SELECT COUNT(*) FILTER (WHERE t.status) * 100 / NULLIF(COUNT(*), 0) \
     FROM tasks t WHERE t.project_id = p.id), \
    100)::INT4";

/// Computes progress from open and total task counts
pub fn from_counts(open: i64, total: i64) -> i32 {
    if total <= 0 {
        return EMPTY_PROJECT_PROGRESS;
    }

    (open * 100 / total) as i32
}

/// Computes progress from task statuses (`true` = OPEN)
pub fn from_statuses<I>(statuses: I) -> i32
where
    I: IntoIterator<Item = bool>,
{
    let (open, total) = statuses
        .into_iter()
        .fold((0i64, 0i64), |(open, total), status| {
            (open + i64::from(status), total + 1)
        });

    from_counts(open, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tasks_is_full() {
        assert_eq!(from_statuses(Vec::<bool>::new()), 100);
        assert_eq!(from_counts(0, 0), 100);
    }

    #[test]
    fn test_one_of_four_open() {
        assert_eq!(from_statuses([false, true, false, false]), 25);
    }

    #[test]
    fn test_rounds_down() {
        // 1/3 and 2/3 truncate
        assert_eq!(from_statuses([true, false, false]), 33);
        assert_eq!(from_statuses([true, true, false]), 66);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(from_statuses([true, true]), 100);
        assert_eq!(from_statuses([false, false]), 0);
    }

    #[test]
    fn test_counts_match_statuses() {
        for total in 1..=12i64 {
            for open in 0..=total {
                let statuses: Vec<bool> = (0..total).map(|i| i < open).collect();
                assert_eq!(from_counts(open, total), from_statuses(statuses));
            }
        }
    }

    #[test]
    fn test_sql_expression_shape() {
        assert!(PROGRESS_SQL.contains("t.project_id = p.id"));
        assert!(PROGRESS_SQL.contains("NULLIF(COUNT(*), 0)"));
        assert!(PROGRESS_SQL.contains("100)::INT4"));
    }
}
