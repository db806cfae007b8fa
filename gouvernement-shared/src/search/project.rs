//! Project scope of the search language
//!
//! Recognized keys:
//!
//! | Key | Effect |
//! |---|---|
//! | `title_contains`, `description_contains` | substring, case-sensitive |
//! | `priority` | equals `1`..`5` |
//! | `status` | `OPEN` or `CLOSED` |
//! | `are_supervisors_or` | supervised by any listed email |
//! | `supervisor_email`, `supervisor_first_name` | exact match on the supervisor |
//! | `creation_date_start`, `creation_date_end` | inclusive `YYYY-MM-DD` bounds |
//! | `deadline_start`, `deadline_end` | inclusive `YYYY-MM-DD` bounds |
//! | `are_collaborators_or`, `are_collaborators_and` | any / all listed emails collaborate |
//! | `progress_start`, `progress_end` | inclusive integer bounds |
//! | `priority_sort`, `creation_date_sort`, `deadline_sort`, `progress_sort` | `ASC` or `DESC` |
//! | `status_sort` | `OPEN_FIRST` or `CLOSED_FIRST` |

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    parse_date, parse_direction, parse_integer, parse_pairs, parse_priority, parse_status,
    parse_status_order, resolve_people, settle, Filter, PushSql, Query, SearchError, SearchOp,
    SortKey, SqlColumn,
};
use crate::resolver::UserDirectory;

/// Keys understood by the project search
pub const PROJECT_KEYS: &[&str] = &[
    "title_contains",
    "priority",
    "description_contains",
    "are_supervisors_or",
    "supervisor_email",
    "supervisor_first_name",
    "creation_date_start",
    "creation_date_end",
    "deadline_start",
    "deadline_end",
    "are_collaborators_or",
    "are_collaborators_and",
    "status",
    "progress_start",
    "progress_end",
    "priority_sort",
    "creation_date_sort",
    "deadline_sort",
    "status_sort",
    "progress_sort",
];

/// Read access to the searchable fields of a project listing row
pub trait ProjectRecord {
    fn title(&self) -> &str;
    fn priority(&self) -> i32;
    fn description(&self) -> &str;
    fn supervisor_id(&self) -> Uuid;
    fn supervisor_email(&self) -> &str;
    fn supervisor_first_name(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn deadline(&self) -> DateTime<Utc>;
    fn collaborator_ids(&self) -> &[Uuid];
    /// `true` while the project is open
    fn status(&self) -> bool;
    fn progress(&self) -> i32;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectFilter {
    TitleContains(String),
    Priority(i32),
    DescriptionContains(String),
    SupervisorIn(Vec<Uuid>),
    SupervisorEmail(String),
    SupervisorFirstName(String),
    CreatedFrom(DateTime<Utc>),
    CreatedUntil(DateTime<Utc>),
    DeadlineFrom(DateTime<Utc>),
    DeadlineUntil(DateTime<Utc>),
    CollaboratorsAny(Vec<Uuid>),
    CollaboratorsAll(Vec<Uuid>),
    Status(bool),
    ProgressFrom(i32),
    ProgressUntil(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortKey {
    Priority,
    CreatedAt,
    Deadline,
    Status,
    Progress,
}

pub type ProjectQuery = Query<ProjectFilter, ProjectSortKey>;

type ProjectOp = SearchOp<ProjectFilter, ProjectSortKey>;

impl<T: ProjectRecord + ?Sized> Filter<T> for ProjectFilter {
    fn matches(&self, row: &T) -> bool {
        match self {
            ProjectFilter::TitleContains(text) => row.title().contains(text.as_str()),
            ProjectFilter::Priority(priority) => row.priority() == *priority,
            ProjectFilter::DescriptionContains(text) => row.description().contains(text.as_str()),
            ProjectFilter::SupervisorIn(ids) => ids.contains(&row.supervisor_id()),
            ProjectFilter::SupervisorEmail(email) => row.supervisor_email() == email,
            ProjectFilter::SupervisorFirstName(name) => row.supervisor_first_name() == name,
            ProjectFilter::CreatedFrom(bound) => row.created_at() >= *bound,
            ProjectFilter::CreatedUntil(bound) => row.created_at() <= *bound,
            ProjectFilter::DeadlineFrom(bound) => row.deadline() >= *bound,
            ProjectFilter::DeadlineUntil(bound) => row.deadline() <= *bound,
            ProjectFilter::CollaboratorsAny(ids) => {
                ids.iter().any(|id| row.collaborator_ids().contains(id))
            }
            ProjectFilter::CollaboratorsAll(ids) => {
                ids.iter().all(|id| row.collaborator_ids().contains(id))
            }
            ProjectFilter::Status(status) => row.status() == *status,
            ProjectFilter::ProgressFrom(bound) => row.progress() >= *bound,
            ProjectFilter::ProgressUntil(bound) => row.progress() <= *bound,
        }
    }
}

impl PushSql for ProjectFilter {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ProjectFilter::TitleContains(text) => {
                builder.push("strpos(title, ").push_bind(text.clone()).push(") > 0");
            }
            ProjectFilter::Priority(priority) => {
                builder.push("priority = ").push_bind(*priority);
            }
            ProjectFilter::DescriptionContains(text) => {
                builder.push("strpos(description, ").push_bind(text.clone()).push(") > 0");
            }
            ProjectFilter::SupervisorIn(ids) => {
                builder.push("supervisor_id = ANY(").push_bind(ids.clone()).push(")");
            }
            ProjectFilter::SupervisorEmail(email) => {
                builder.push("supervisor_email = ").push_bind(email.clone());
            }
            ProjectFilter::SupervisorFirstName(name) => {
                builder.push("supervisor_first_name = ").push_bind(name.clone());
            }
            ProjectFilter::CreatedFrom(bound) => {
                builder.push("created_at >= ").push_bind(*bound);
            }
            ProjectFilter::CreatedUntil(bound) => {
                builder.push("created_at <= ").push_bind(*bound);
            }
            ProjectFilter::DeadlineFrom(bound) => {
                builder.push("deadline >= ").push_bind(*bound);
            }
            ProjectFilter::DeadlineUntil(bound) => {
                builder.push("deadline <= ").push_bind(*bound);
            }
            ProjectFilter::CollaboratorsAny(ids) => {
                builder.push("collaborator_ids && ").push_bind(ids.clone());
            }
            ProjectFilter::CollaboratorsAll(ids) => {
                builder.push("collaborator_ids @> ").push_bind(ids.clone());
            }
            ProjectFilter::Status(status) => {
                builder.push("status = ").push_bind(*status);
            }
            ProjectFilter::ProgressFrom(bound) => {
                builder.push("progress >= ").push_bind(*bound);
            }
            ProjectFilter::ProgressUntil(bound) => {
                builder.push("progress <= ").push_bind(*bound);
            }
        }
    }
}

impl<T: ProjectRecord + ?Sized> SortKey<T> for ProjectSortKey {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        match self {
            ProjectSortKey::Priority => a.priority().cmp(&b.priority()),
            ProjectSortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
            ProjectSortKey::Deadline => a.deadline().cmp(&b.deadline()),
            ProjectSortKey::Status => a.status().cmp(&b.status()),
            ProjectSortKey::Progress => a.progress().cmp(&b.progress()),
        }
    }
}

impl SqlColumn for ProjectSortKey {
    fn column(&self) -> &'static str {
        match self {
            ProjectSortKey::Priority => "priority",
            ProjectSortKey::CreatedAt => "created_at",
            ProjectSortKey::Deadline => "deadline",
            ProjectSortKey::Status => "status",
            ProjectSortKey::Progress => "progress",
        }
    }
}

/// Compiles a filter string into a project query
///
/// People filters are resolved through `directory`. Pairs that fail
/// validation or resolution are skipped.
///
/// # Errors
///
/// Returns `SearchError::Database` only, when the directory cannot be queried.
pub async fn compile<D>(input: &str, directory: &D) -> Result<ProjectQuery, SearchError>
where
    D: UserDirectory + ?Sized,
{
    let mut query = ProjectQuery::default();

    for (key, value) in parse_pairs(input) {
        if !PROJECT_KEYS.contains(&key.as_str()) {
            tracing::debug!(filter = %key, "Ignoring unknown project filter");
            continue;
        }

        let outcome = interpret(&key, &value, directory).await;
        if let Some(op) = settle(&key, outcome)? {
            query = query.push(op);
        }
    }

    Ok(query)
}

async fn interpret<D>(key: &str, value: &str, directory: &D) -> Result<Option<ProjectOp>, SearchError>
where
    D: UserDirectory + ?Sized,
{
    let op = match key {
        "title_contains" => SearchOp::Filter(ProjectFilter::TitleContains(value.to_string())),
        "priority" => SearchOp::Filter(ProjectFilter::Priority(parse_priority(key, value)?)),
        "description_contains" => {
            SearchOp::Filter(ProjectFilter::DescriptionContains(value.to_string()))
        }
        "are_supervisors_or" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(ProjectFilter::SupervisorIn(ids)),
            None => return Ok(None),
        },
        "supervisor_email" => SearchOp::Filter(ProjectFilter::SupervisorEmail(value.to_string())),
        "supervisor_first_name" => {
            SearchOp::Filter(ProjectFilter::SupervisorFirstName(value.to_string()))
        }
        "creation_date_start" => SearchOp::Filter(ProjectFilter::CreatedFrom(parse_date(key, value)?)),
        "creation_date_end" => SearchOp::Filter(ProjectFilter::CreatedUntil(parse_date(key, value)?)),
        "deadline_start" => SearchOp::Filter(ProjectFilter::DeadlineFrom(parse_date(key, value)?)),
        "deadline_end" => SearchOp::Filter(ProjectFilter::DeadlineUntil(parse_date(key, value)?)),
        "are_collaborators_or" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(ProjectFilter::CollaboratorsAny(ids)),
            None => return Ok(None),
        },
        "are_collaborators_and" => match resolve_people(directory, key, value).await? {
            Some(ids) => SearchOp::Filter(ProjectFilter::CollaboratorsAll(ids)),
            None => return Ok(None),
        },
        "status" => SearchOp::Filter(ProjectFilter::Status(parse_status(key, value)?)),
        "progress_start" => SearchOp::Filter(ProjectFilter::ProgressFrom(parse_integer(key, value)?)),
        "progress_end" => SearchOp::Filter(ProjectFilter::ProgressUntil(parse_integer(key, value)?)),
        "priority_sort" => SearchOp::Sort(ProjectSortKey::Priority, parse_direction(key, value)?),
        "creation_date_sort" => {
            SearchOp::Sort(ProjectSortKey::CreatedAt, parse_direction(key, value)?)
        }
        "deadline_sort" => SearchOp::Sort(ProjectSortKey::Deadline, parse_direction(key, value)?),
        "status_sort" => SearchOp::Sort(ProjectSortKey::Status, parse_status_order(key, value)?),
        "progress_sort" => SearchOp::Sort(ProjectSortKey::Progress, parse_direction(key, value)?),
        _ => return Ok(None),
    };

    Ok(Some(op))
}
