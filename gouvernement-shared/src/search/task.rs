//! Task scope of the search language
//!
//! Same grammar as the project scope, with the assigner in place of the
//! supervisor, assignees in place of collaborators, and no progress keys.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    parse_date, parse_direction, parse_pairs, parse_priority, parse_status, parse_status_order,
    resolve_people, settle, Filter, PushSql, Query, SearchError, SearchOp, SortKey, SqlColumn,
};
use crate::resolver::UserDirectory;

/// Keys understood by the task search
pub const TASK_KEYS: &[&str] = &[
    "title_contains",
    "priority",
    "description_contains",
    "are_assigners_or",
    "assigner_email",
    "assigner_first_name",
    "creation_date_start",
    "creation_date_end",
    "deadline_start",
    "deadline_end",
    "are_assignees_or",
    "are_assignees_and",
    "status",
    "priority_sort",
    "creation_date_sort",
    "deadline_sort",
    "status_sort",
];

/// Read access to the searchable fields of a task listing row
pub trait TaskRecord {
    fn title(&self) -> &str;
    fn priority(&self) -> i32;
    fn description(&self) -> &str;
    fn assigner_id(&self) -> Uuid;
    fn assigner_email(&self) -> &str;
    fn assigner_first_name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn deadline(&self) -> DateTime<Utc>;
    fn assignee_ids(&self) -> &[Uuid];
    fn status(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskFilter {
    TitleContains(String),
    Priority(i32),
    DescriptionContains(String),
    AssignerIn(Vec<Uuid>),
    AssignerEmail(String),
    AssignerFirstName(String),
    CreatedFrom(DateTime<Utc>),
    CreatedUntil(DateTime<Utc>),
    DeadlineFrom(DateTime<Utc>),
    DeadlineUntil(DateTime<Utc>),
    AssigneesAny(Vec<Uuid>),
    AssigneesAll(Vec<Uuid>),
    Status(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    Priority,
    CreatedAt,
    Deadline,
    Status,
}

pub type TaskQuery = Query<TaskFilter, TaskSortKey>;

type TaskOp = SearchOp<TaskFilter, TaskSortKey>;

impl<T: TaskRecord + ?Sized> Filter<T> for TaskFilter {
    fn matches(&self, row: &T) -> bool {
        match self {
            TaskFilter::TitleContains(text) => row.title().contains(text.as_str()),
            TaskFilter::Priority(priority) => row.priority() == *priority,
            TaskFilter::DescriptionContains(text) => row.description().contains(text.as_str()),
            TaskFilter::AssignerIn(ids) => ids.contains(&row.assigner_id()),
            TaskFilter::AssignerEmail(email) => row.assigner_email() == email,
            TaskFilter::AssignerFirstName(name) => row.assigner_first_name() == name,
            TaskFilter::CreatedFrom(bound) => row.created_at() >= *bound,
            TaskFilter::CreatedUntil(bound) => row.created_at() <= *bound,
            TaskFilter::DeadlineFrom(bound) => row.deadline() >= *bound,
            TaskFilter::DeadlineUntil(bound) => row.deadline() <= *bound,
            TaskFilter::AssigneesAny(ids) => ids.iter().any(|id| row.assignee_ids().contains(id)),
            TaskFilter::AssigneesAll(ids) => ids.iter().all(|id| row.assignee_ids().contains(id)),
            TaskFilter::Status(status) => row.status() == *status,
        }
    }
}

impl PushSql for TaskFilter {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            TaskFilter::TitleContains(text) => {
                builder.push("strpos(title, ").push_bind(text.clone()).push(") > 0");
            }
            TaskFilter::Priority(priority) => {
                builder.push("priority = ").push_bind(*priority);
            }
            TaskFilter::DescriptionContains(text) => {
                builder.push("strpos(description, ").push_bind(text.clone()).push(") > 0");
            }
            TaskFilter::AssignerIn(ids) => {
                builder.push("assigner_id = ANY(").push_bind(ids.clone()).push(")");
            }
            TaskFilter::AssignerEmail(email) => {
                builder.push("assigner_email = ").push_bind(email.clone());
            }
            TaskFilter::AssignerFirstName(name) => {
                builder.push("assigner_first_name = ").push_bind(name.clone());
            }
            TaskFilter::CreatedFrom(bound) => {
                builder.push("created_at >= ").push_bind(*bound);
            }
            TaskFilter::CreatedUntil(bound) => {
                builder.push("created_at <= ").push_bind(*bound);
            }
            TaskFilter::DeadlineFrom(bound) => {
                builder.push("deadline >= ").push_bind(*bound);
            }
            TaskFilter::DeadlineUntil(bound) => {
                builder.push("deadline <= ").push_bind(*bound);
            }
            TaskFilter::AssigneesAny(ids) => {
                builder.push("assignee_ids && ").push_bind(ids.clone());
            }
            TaskFilter::AssigneesAll(ids) => {
                builder.push("assignee_ids @> ").push_bind(ids.clone());
            }
            TaskFilter::Status(status) => {
                builder.push("status = ").push_bind(*status);
            }
        }
    }
}

impl<T: TaskRecord + ?Sized> SortKey<T> for TaskSortKey {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self {
            TaskSortKey::Priority => a.priority().cmp(&b.priority()),
            TaskSortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
            TaskSortKey::Deadline => a.deadline().cmp(&b.deadline()),
            TaskSortKey::Status => a.status().cmp(&b.status()),
        }
    }
}

impl SqlColumn for TaskSortKey {
    fn column(&self) -> &'static str {
        match self {
            TaskSortKey::Priority => "priority",
            TaskSortKey::CreatedAt => "created_at",
            TaskSortKey::Deadline => "deadline",
            TaskSortKey::Status => "status",
        }
    }
}

/// Compiles a filter string into a task query
///
/// # Errors
///
/// Returns `SearchError::Database` if the directory cannot be queried.
pub async fn compile<D>(input: &str, directory: &D) -> Result<TaskQuery, SearchError>
where
    D: UserDirectory + ?Sized,
{
    let mut query = TaskQuery::default();

    for (key, value) in parse_pairs(input) {
        if !TASK_KEYS.contains(&key.as_str()) {
            tracing::debug!(filter = %key, "Ignoring unknown task filter");
            continue;
        }

        let outcome = interpret(&key, &value, directory).await;
        if let Some(op) = settle(&key, outcome)? {
            query = query.push(op);
        }
    }

    Ok(query)
}

async fn interpret<D>(key: &str, value: &str, directory: &D) -> Result<Option<TaskOp>, SearchError>
where
    D: UserDirectory + ?Sized,
{
    let op = match key {
        "title_contains" => SearchOp::Filter(TaskFilter::TitleContains(value.to_string())),
        "priority" => SearchOp::Filter(TaskFilter::Priority(parse_priority(key, value)?)),
        "description_contains" => {
            SearchOp::Filter(TaskFilter::DescriptionContains(value.to_string()))
        }
        "are_assigners_or" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(TaskFilter::AssignerIn(ids)),
            None => return Ok(None),
        },
        "assigner_email" => SearchOp::Filter(TaskFilter::AssignerEmail(value.to_string())),
        "assigner_first_name" => SearchOp::Filter(TaskFilter::AssignerFirstName(value.to_string())),
        "creation_date_start" => SearchOp::Filter(TaskFilter::CreatedFrom(parse_date(key, value)?)),
        "creation_date_end" => SearchOp::Filter(TaskFilter::CreatedUntil(parse_date(key, value)?)),
        "deadline_start" => SearchOp::Filter(TaskFilter::DeadlineFrom(parse_date(key, value)?)),
        "deadline_end" => SearchOp::Filter(TaskFilter::DeadlineUntil(parse_date(key, value)?)),
        "are_assignees_or" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(TaskFilter::AssigneesAny(ids)),
            None => return Ok(None),
        },
        "are_assignees_and" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(TaskFilter::AssigneesAll(ids)),
            None => return Ok(None),
        },
        "status" => SearchOp::Filter(TaskFilter::Status(parse_status(key, value)?)),
        "priority_sort" => SearchOp::Sort(TaskSortKey::Priority, parse_direction(key, value)?),
        "creation_date_sort" => SearchOp::Sort(TaskSortKey::CreatedAt, parse_direction(key, value)?),
        "deadline_sort" => SearchOp::Sort(TaskSortKey::Deadline, parse_direction(key, value)?),
        "status_sort" => SearchOp::Sort(TaskSortKey::Status, parse_status_order(key, value)?),
        _ => return Ok(None),
    };

    Ok(Some(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::MemoryDirectory;
    use crate::search::Direction;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        priority: i32,
        assigner_id: Uuid,
        created_at: DateTime<Utc>,
        assignee_ids: Vec<Uuid>,
        status: bool,
    }

    impl TaskRecord for Row {
        fn title(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
        fn description(&self) -> &str {
            ""
        }
        fn assigner_id(&self) -> Uuid {
            self.assigner_id
        }
        fn assigner_email(&self) -> &str {
            "ada@example.com"
        }
        fn assigner_first_name(&self) -> &str {
            "ada"
        }
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn deadline(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn assignee_ids(&self) -> &[Uuid] {
            &self.assignee_ids
        }
        fn status(&self) -> bool {
            self.status
        }
    }

    fn rows(directory: &MemoryDirectory) -> Vec<Row> {
        let ada = directory.id_of("ada@example.com");
        let grace = directory.id_of("grace@example.com");
        let at = |d| Utc.with_ymd_and_hms(2025, 4, d, 12, 30, 0).unwrap();

        vec![
            Row {
                name: "Write brief",
                priority: 2,
                assigner_id: ada,
                created_at: at(1),
                assignee_ids: vec![grace],
                status: true,
            },
            Row {
                name: "Review brief",
                priority: 4,
                assigner_id: ada,
                created_at: at(2),
                assignee_ids: vec![grace, ada],
                status: false,
            },
            Row {
                name: "Ship",
                priority: 4,
                assigner_id: grace,
                created_at: at(3),
                assignee_ids: vec![],
                status: true,
            },
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[tokio::test]
    async fn test_bogus_key_and_bad_priority_are_identity() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);
        let all = rows(&directory);

        for input in [
            "",
            "bogus_key=<x>",
            "priority=<9>",
            "progress_sort=<ASC>",
            "are_collaborators_or=<ada@example.com>",
        ] {
            let query = compile(input, &directory).await.unwrap();
            assert!(query.is_identity(), "{input:?} compiled to {query:?}");
            assert_eq!(query.apply(all.clone()), all);
        }
    }

    #[tokio::test]
    async fn test_priority_desc_then_open_first() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);
        let query = compile("priority_sort=<DESC>, status_sort=<OPEN_FIRST>", &directory)
            .await
            .unwrap();

        assert_eq!(
            names(&query.apply(rows(&directory))),
            vec!["Ship", "Review brief", "Write brief"]
        );
    }

    #[tokio::test]
    async fn test_assignees_any_and_all() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);

        let any = compile("are_assignees_or=<grace@example.com>", &directory).await.unwrap();
        assert_eq!(names(&any.apply(rows(&directory))), vec!["Write brief", "Review brief"]);

        let all = compile("are_assignees_and=<ada@example.com, grace@example.com>", &directory)
            .await
            .unwrap();
        assert_eq!(names(&all.apply(rows(&directory))), vec!["Review brief"]);
    }

    #[tokio::test]
    async fn test_assigners_or() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);
        let query = compile("are_assigners_or=<grace@example.com>", &directory).await.unwrap();

        assert_eq!(names(&query.apply(rows(&directory))), vec!["Ship"]);
    }

    #[tokio::test]
    async fn test_creation_end_bound_is_midnight() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);

        // created at 12:30 on the 2nd, so an end bound of the 2nd excludes it
        let query = compile("creation_date_end=<2025-04-02>", &directory).await.unwrap();
        assert_eq!(names(&query.apply(rows(&directory))), vec!["Write brief"]);
    }

    #[tokio::test]
    async fn test_creation_date_sort_desc() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);
        let query = compile("creation_date_sort=<DESC>", &directory).await.unwrap();

        assert_eq!(query.sorts[0].direction, Direction::Desc);
        assert_eq!(
            names(&query.apply(rows(&directory))),
            vec!["Ship", "Review brief", "Write brief"]
        );
    }

    #[tokio::test]
    async fn test_every_listed_key_is_recognized() {
        let directory = MemoryDirectory::with(&["ada@example.com", "grace@example.com"]);
        let samples = [
            "x",
            "1",
            "x",
            "ada@example.com",
            "ada@example.com",
            "ada",
            "2025-04-01",
            "2025-04-01",
            "2025-04-01",
            "2025-04-01",
            "grace@example.com",
            "grace@example.com",
            "CLOSED",
            "DESC",
            "ASC",
            "ASC",
            "OPEN_FIRST",
        ];
        assert_eq!(samples.len(), TASK_KEYS.len());

        for (key, value) in TASK_KEYS.iter().zip(samples) {
            let query = compile(&format!("{key}=<{value}>"), &directory).await.unwrap();
            assert!(!query.is_identity(), "{key} was ignored");
        }
    }

    #[test]
    fn test_push_sql_binds_in_order() {
        let query = TaskQuery::default()
            .filter(TaskFilter::Status(true))
            .filter(TaskFilter::AssignerIn(vec![Uuid::nil()]))
            .order_by(TaskSortKey::Deadline, Direction::Asc);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM listing WHERE TRUE");
        query.push_where(&mut builder);
        query.push_order_by(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM listing WHERE TRUE AND (status = $1) \
             AND (assigner_id = ANY($2)) ORDER BY deadline ASC"
        );
    }
}
