/// Task model and database operations
///
/// A task belongs to one project, is owned by the assigner who created it, and
/// is worked on by any number of assignees. Like projects, tasks are either
/// OPEN (`status = true`) or CLOSED.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
///     description VARCHAR(1200) NOT NULL,
///     assigner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deadline TIMESTAMPTZ NOT NULL,
///     status BOOLEAN NOT NULL DEFAULT TRUE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::{Duration, Utc};
/// use gouvernement_shared::models::task::{CreateTask, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, ada: Uuid, grace: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// let task = Task::create(&mut tx, CreateTask {
///     project_id,
///     title: "Draft the brief".to_string(),
///     priority: 3,
///     description: "One page, no appendix".to_string(),
///     assigner_id: ada,
///     deadline: Utc::now() + Duration::days(7),
///     status: true,
/// }, &[grace]).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::membership::Assignee;
use crate::search::{TaskQuery, TaskRecord};

const LISTING_TIEBREAK: &str = "created_at ASC, id ASC";

const LISTING_SELECT: &str = r#"
    SELECT t.id, t.project_id, t.title, t.priority, t.description, t.assigner_id,
           u.email AS assigner_email, u.first_name AS assigner_first_name,
           t.created_at, t.deadline, t.status,
           COALESCE(
               (SELECT array_agg(ta.user_id ORDER BY ta.user_id)
                FROM task_assignees ta WHERE ta.task_id = t.id),
               '{}'::uuid[]
           ) AS assignee_ids
    FROM tasks t
    JOIN users u ON u.id = t.assigner_id
"#;

/// A stored task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// Parent project
    pub project_id: Uuid,

    pub title: String,

    /// 1 (lowest) to 5 (highest)
    pub priority: i32,

    pub description: String,

    /// User who created the task
    pub assigner_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub deadline: DateTime<Utc>,

    /// `true` while the task is open
    pub status: bool,
}

/// A task as shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskSummary {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub assigner_id: Uuid,
    pub assigner_email: String,
    pub assigner_first_name: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: bool,
    pub assignee_ids: Vec<Uuid>,
}

/// Input for initiating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub assigner_id: Uuid,
    pub deadline: DateTime<Utc>,
    pub status: bool,
}

/// Input for editing a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub status: bool,
}

impl Task {
    /// Creates a task and its assignee list
    pub async fn create(
        conn: &mut PgConnection,
        data: CreateTask,
        assignee_ids: &[Uuid],
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, priority, description, assigner_id, deadline, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, project_id, title, priority, description, assigner_id,
                      created_at, deadline, status
            "#,
        )
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.priority)
        .bind(data.description)
        .bind(data.assigner_id)
        .bind(data.deadline)
        .bind(data.status)
        .fetch_one(&mut *conn)
        .await?;

        Assignee::replace_all(conn, task.id, assignee_ids).await?;

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, project_id, title, priority, description, assigner_id,
                   created_at, deadline, status
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Edits a task and replaces its assignee list
    ///
    /// Returns `None` if the task does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: UpdateTask,
        assignee_ids: &[Uuid],
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2, priority = $3, description = $4, deadline = $5, status = $6
            WHERE id = $1
            RETURNING id, project_id, title, priority, description, assigner_id,
                      created_at, deadline, status
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.priority)
        .bind(data.description)
        .bind(data.deadline)
        .bind(data.status)
        .fetch_optional(&mut *conn)
        .await?;

        if task.is_some() {
            Assignee::replace_all(conn, id, assignee_ids).await?;
        }

        Ok(task)
    }

    /// Deletes a task after detaching its assignees
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        Assignee::detach_all(conn, id).await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts open and total tasks of a project
    pub async fn count_by_status(pool: &PgPool, project_id: Uuid) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT COUNT(*) FILTER (WHERE status), COUNT(*)
            FROM tasks
            WHERE project_id = $1
            "#,
        )
        .bind(project_id)
        .fetch_one(pool)
        .await
    }
}

impl TaskSummary {
    /// Lists the tasks an actor assigned or is assigned to, across projects
    pub async fn list_visible(
        pool: &PgPool,
        actor_id: Uuid,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        Self::list(pool, actor_id, None, query).await
    }

    /// Lists an actor's tasks inside one project
    pub async fn list_in_project(
        pool: &PgPool,
        project_id: Uuid,
        actor_id: Uuid,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        Self::list(pool, actor_id, Some(project_id), query).await
    }

    async fn list(
        pool: &PgPool,
        actor_id: Uuid,
        project_id: Option<Uuid>,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM (");
        builder.push(LISTING_SELECT);
        builder
            .push(" WHERE (t.assigner_id = ")
            .push_bind(actor_id)
            .push(
                " OR EXISTS (SELECT 1 FROM task_assignees m \
                 WHERE m.task_id = t.id AND m.user_id = ",
            )
            .push_bind(actor_id)
            .push("))");

        if let Some(project_id) = project_id {
            builder.push(" AND t.project_id = ").push_bind(project_id);
        }

        builder.push(") AS listing WHERE TRUE");

        query.push_where(&mut builder);
        query.push_order_by_then(&mut builder, LISTING_TIEBREAK);

        builder.build_query_as::<TaskSummary>().fetch_all(pool).await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        builder.push(" WHERE t.id = ").push_bind(id);

        builder.build_query_as::<TaskSummary>().fetch_optional(pool).await
    }
}

impl TaskRecord for TaskSummary {
    fn title(&self) -> &str {
        &self.title
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn assigner_id(&self) -> Uuid {
        self.assigner_id
    }

    fn assigner_email(&self) -> &str {
        &self.assigner_email
    }

    fn assigner_first_name(&self) -> &str {
        &self.assigner_first_name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    fn assignee_ids(&self) -> &[Uuid] {
        &self.assignee_ids
    }

    fn status(&self) -> bool {
        self.status
    }
}
