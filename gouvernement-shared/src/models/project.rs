/// Project model and database operations
///
/// A project is owned by exactly one supervisor and shared with any number of
/// collaborators. Its progress is derived from its tasks at read time and is
/// never stored.
///
/// Two row shapes exist:
///
/// - [`Project`]: the stored columns, returned by writes and point lookups
/// - [`ProjectSummary`]: a listing row joined with the supervisor's identity,
///   the collaborator ids and the progress. It implements [`ProjectRecord`],
///   so a [`ProjectQuery`] can filter and sort it either in SQL or in memory.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
///     description VARCHAR(1200) NOT NULL,
///     supervisor_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deadline TIMESTAMPTZ NOT NULL,
///     status BOOLEAN NOT NULL DEFAULT TRUE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use gouvernement_shared::models::project::ProjectSummary;
/// use gouvernement_shared::search::project::compile;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, actor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let query = compile("status=<OPEN>, priority_sort=<DESC>", &pool).await?;
/// let projects = ProjectSummary::list_visible(&pool, actor, &query).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::membership::Collaborator;
use crate::progress::PROGRESS_SQL;
use crate::search::{ProjectQuery, ProjectRecord};

/// Order of listing rows no sort key separates
const LISTING_TIEBREAK: &str = "created_at ASC, id ASC";

/// A stored project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,

    pub title: String,

    /// 1 (lowest) to 5 (highest)
    pub priority: i32,

    pub description: String,

    pub supervisor_id: Uuid,

    pub created_at: DateTime<Utc>,

    pub deadline: DateTime<Utc>,

    /// `true` while the project is open
    pub status: bool,
}

/// A project as shown in listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub supervisor_id: Uuid,
    pub supervisor_email: String,
    pub supervisor_first_name: String,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: bool,
    pub collaborator_ids: Vec<Uuid>,
    /// Share of open tasks, 0 to 100
    pub progress: i32,
}

/// Input for initiating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub supervisor_id: Uuid,
    pub deadline: DateTime<Utc>,
    pub status: bool,
}

/// Input for editing a project
///
/// Every field is replaced; the supervisor never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProject {
    pub title: String,
    pub priority: i32,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub status: bool,
}

impl Project {
    /// Creates a project and its collaborator list
    ///
    /// Runs on the caller's connection so that the project and its memberships
    /// commit together.
    pub async fn create(
        conn: &mut PgConnection,
        data: CreateProject,
        collaborator_ids: &[Uuid],
    ) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, priority, description, supervisor_id, deadline, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, priority, description, supervisor_id, created_at, deadline, status
            "#,
        )
        .bind(data.title)
        .bind(data.priority)
        .bind(data.description)
        .bind(data.supervisor_id)
        .bind(data.deadline)
        .bind(data.status)
        .fetch_one(&mut *conn)
        .await?;

        Collaborator::replace_all(conn, project.id, collaborator_ids).await?;

        Ok(project)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, title, priority, description, supervisor_id, created_at, deadline, status
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Edits a project and replaces its collaborator list
    ///
    /// Returns `None` if the project does not exist. Concurrent edits are
    /// last-write-wins.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: UpdateProject,
        collaborator_ids: &[Uuid],
    ) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $2, priority = $3, description = $4, deadline = $5, status = $6
            WHERE id = $1
            RETURNING id, title, priority, description, supervisor_id, created_at, deadline, status
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

        if project.is_some() {
            Collaborator::replace_all(conn, id, collaborator_ids).await?;
        }

        Ok(project)
    }

    /// Deletes a project
    ///
    /// Collaborators are detached first; tasks and their assignees go with the
    /// project through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        Collaborator::detach_all(conn, id).await?;

        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ProjectSummary {
    fn listing_select() -> String {
        format!(
            r#"
            SELECT p.id, p.title, p.priority, p.description, p.supervisor_id,
                   u.email AS supervisor_email, u.first_name AS supervisor_first_name,
                   p.created_at, p.deadline, p.status,
                   COALESCE(
                       (SELECT array_agg(pc.user_id ORDER BY pc.user_id)
                        FROM project_collaborators pc WHERE pc.project_id = p.id),
                       '{{}}'::uuid[]
                   ) AS collaborator_ids,
                   {PROGRESS_SQL} AS progress
            FROM projects p
            JOIN users u ON u.id = p.supervisor_id
            "#
        )
    }

    /// Lists the projects an actor supervises or collaborates on
    ///
    /// The query's filters and sorts are evaluated by Postgres. Rows tied on
    /// every sort key come back oldest first.
    pub async fn list_visible(
        pool: &PgPool,
        actor_id: Uuid,
        query: &ProjectQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM (");
        builder.push(Self::listing_select());
        builder
            .push(" WHERE p.supervisor_id = ")
            .push_bind(actor_id)
            .push(
                " OR EXISTS (SELECT 1 FROM project_collaborators m \
                 WHERE m.project_id = p.id AND m.user_id = ",
            )
            .push_bind(actor_id)
            .push(")) AS listing WHERE TRUE");

        query.push_where(&mut builder);
        query.push_order_by_then(&mut builder, LISTING_TIEBREAK);

        builder.build_query_as::<ProjectSummary>().fetch_all(pool).await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(Self::listing_select());
        builder.push(" WHERE p.id = ").push_bind(id);

        builder.build_query_as::<ProjectSummary>().fetch_optional(pool).await
    }
}

impl ProjectRecord for ProjectSummary {
    fn title(&self) -> &str {
        &self.title
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn supervisor_id(&self) -> Uuid {
        self.supervisor_id
    }

    fn supervisor_email(&self) -> &str {
        &self.supervisor_email
    }

    fn supervisor_first_name(&self) -> &str {
        &self.supervisor_first_name
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    fn collaborator_ids(&self) -> &[Uuid] {
        &self.collaborator_ids
    }

    fn status(&self) -> bool {
        self.status
    }

    fn progress(&self) -> i32 {
        self.progress
    }
}
