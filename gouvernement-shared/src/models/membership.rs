/// Project collaborator and task assignee relations
///
/// Both relations are plain `(entity, user)` join tables. They are never edited
/// row by row: an edit replaces the whole list, inside the transaction of the
/// owning entity's update.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_collaborators (
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (project_id, user_id)
/// );
///
/// CREATE TABLE task_assignees (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     PRIMARY KEY (task_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use gouvernement_shared::models::membership::Collaborator;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, ada: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
/// Collaborator::replace_all(&mut tx, project_id, &[ada]).await?;
/// tx.commit().await?;
///
/// assert_eq!(Collaborator::user_ids(&pool, project_id).await?, vec![ada]);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// A user's membership on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collaborator {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

/// A user's assignment to a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignee {
    pub task_id: Uuid,
    pub user_id: Uuid,
}

impl Collaborator {
    /// Replaces the collaborator list of a project
    ///
    /// Duplicate ids collapse into one membership.
    pub async fn replace_all(
        conn: &mut PgConnection,
        project_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM project_collaborators WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO project_collaborators (project_id, user_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Removes every collaborator of a project
    pub async fn detach_all(conn: &mut PgConnection, project_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_collaborators WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn user_ids(pool: &PgPool, project_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id FROM project_collaborators
            WHERE project_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}

impl Assignee {
    /// Replaces the assignee list of a task
    pub async fn replace_all(
        conn: &mut PgConnection,
        task_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        if user_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO task_assignees (task_id, user_id)
            SELECT $1, UNNEST($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(user_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn detach_all(conn: &mut PgConnection, task_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignees WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn user_ids(pool: &PgPool, task_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT user_id FROM task_assignees
            WHERE task_id = $1
            ORDER BY user_id
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
