/// Task endpoints
///
/// - `GET /v1/tasks?filters=` - tasks I assigned or am assigned to
/// - `POST /v1/projects/:project_id/tasks` - initiate a task
/// - `GET /v1/projects/:project_id/tasks/:task_id` - task info
/// - `PUT /v1/projects/:project_id/tasks/:task_id` - edit a task and its assignees
/// - `DELETE /v1/projects/:project_id/tasks/:task_id` - delete a task
/// - `GET /v1/tasks/:task_id` - task info without project context
///
/// Routes nested under a project answer 404 when the task belongs to a
/// different project.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gouvernement_shared::{
    auth::middleware::Actor,
    models::{
        project::Project,
        task::{CreateTask, Task, TaskSummary, UpdateTask},
        user::User,
    },
    resolver::{resolve_emails, ResolveError},
    search,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{projects::unique_ids, Listing, Notice};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

const PRIORITY_UNSET: &str = "The task priority within the project has not been set.";
const DEADLINE_UNSET: &str = "The task deadline has not been set.";
const STATUS_UNSET: &str = "The task status has not been set.";
const ASSIGNEES_INVALID: &str =
    "The assignees field is either improperly filled out, or some email is unregistered.";

/// Body of task initiation and editing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(
        min = 1,
        max = 200,
        message = "The task title length must be between 1 and 200 characters."
    ))]
    pub title: String,

    #[validate(
        required(message = "The task priority within the project has not been set."),
        range(min = 1, max = 5, message = "The task priority must be between 1 and 5.")
    )]
    pub priority: Option<i32>,

    #[validate(length(
        min = 1,
        max = 1200,
        message = "The task description length must be between 1 and 1200 characters."
    ))]
    pub description: String,

    #[validate(required(message = "The task deadline has not been set."))]
    pub deadline: Option<DateTime<Utc>>,

    /// Comma-separated assignee emails
    #[serde(default)]
    pub assignees: String,

    #[validate(required(message = "The task status has not been set."))]
    pub status: Option<bool>,
}

struct CheckedTask {
    title: String,
    priority: i32,
    description: String,
    deadline: DateTime<Utc>,
    status: bool,
    assignee_ids: Vec<Uuid>,
}

impl TaskForm {
    async fn check(self, state: &AppState) -> ApiResult<CheckedTask> {
        self.validate()?;

        let assignees = resolve_emails(&state.db, &self.assignees)
            .await
            .map_err(|e| match e {
                ResolveError::UnknownEmail(_) => ApiError::field("assignees", ASSIGNEES_INVALID),
                other => ApiError::from(other),
            })?;

        Ok(CheckedTask {
            title: self.title,
            priority: self.priority.ok_or_else(|| ApiError::field("priority", PRIORITY_UNSET))?,
            description: self.description,
            deadline: self.deadline.ok_or_else(|| ApiError::field("deadline", DEADLINE_UNSET))?,
            status: self.status.ok_or_else(|| ApiError::field("status", STATUS_UNSET))?,
            assignee_ids: unique_ids(assignees.iter().map(|user| user.id)),
        })
    }
}

/// A task with its assignees' emails
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task: TaskSummary,

    pub assignee_emails: Vec<String>,
}

async fn find_summary(state: &AppState, task_id: Uuid) -> ApiResult<TaskSummary> {
    TaskSummary::find(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))
}

/// Rejects a task reached through a project it does not belong to
fn ensure_in_project(task_project_id: Uuid, project_id: Uuid, task_id: Uuid) -> ApiResult<()> {
    if task_project_id != project_id {
        return Err(ApiError::NotFound(format!(
            "Task {task_id} not found in project {project_id}"
        )));
    }

    Ok(())
}

async fn info(state: &AppState, task: TaskSummary) -> ApiResult<TaskInfo> {
    let assignee_emails = User::emails_of(&state.db, &task.assignee_ids).await?;

    Ok(TaskInfo {
        task,
        assignee_emails,
    })
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(listing): Query<Listing>,
) -> ApiResult<Json<Vec<TaskSummary>>> {
    let query = search::task::compile(listing.task_filters(), &state.db).await?;
    let tasks = TaskSummary::list_visible(&state.db, actor.user_id, &query).await?;

    Ok(Json(tasks))
}

/// Initiates a task assigned by the actor
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(form): Json<TaskForm>,
) -> ApiResult<(StatusCode, Json<Notice<Task>>)> {
    let checked = form.check(&state).await?;

    let mut tx = state.db.begin().await?;
    let task = Task::create(
        &mut tx,
        CreateTask {
            project_id,
            title: checked.title,
            priority: checked.priority,
            description: checked.description,
            assigner_id: actor.user_id,
            deadline: checked.deadline,
            status: checked.status,
        },
        &checked.assignee_ids,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        task_id = %task.id,
        project_id = %project_id,
        assigner_id = %actor.user_id,
        assignees = checked.assignee_ids.len(),
        "Task initiated"
    );

    Ok((
        StatusCode::CREATED,
        Json(Notice::success("Task initiated successfully!", task)),
    ))
}

/// Task info reached through its project
pub async fn task_info(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<TaskInfo>> {
    let task = find_summary(&state, task_id).await?;
    ensure_in_project(task.project_id, project_id, task_id)?;

    info(&state, task).await.map(Json)
}

/// Task info reached from the tasks list
pub async fn task_disjoint_info(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskInfo>> {
    let task = find_summary(&state, task_id).await?;

    info(&state, task).await.map(Json)
}

/// Edits a task and replaces its assignees
pub async fn update_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
    Json(form): Json<TaskForm>,
) -> ApiResult<Json<Notice<Task>>> {
    let existing = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))?;
    ensure_in_project(existing.project_id, project_id, task_id)?;

    let checked = form.check(&state).await?;

    let mut tx = state.db.begin().await?;
    let task = Task::update(
        &mut tx,
        task_id,
        UpdateTask {
            title: checked.title,
            priority: checked.priority,
            description: checked.description,
            deadline: checked.deadline,
            status: checked.status,
        },
        &checked.assignee_ids,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))?;
    tx.commit().await?;

    tracing::info!(task_id = %task.id, status = task.status, "Task updated");

    Ok(Json(Notice::success("Task info updated successfully!", task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Notice<()>>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found")))?;
    ensure_in_project(task.project_id, project_id, task_id)?;

    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

    let mut tx = state.db.begin().await?;
    Task::delete(&mut tx, task_id).await?;
    tx.commit().await?;

    tracing::info!(task_id = %task_id, project_id = %project_id, "Task deleted");

    Ok(Json(Notice::done(format!(
        "Task {} has been deleted from project {}.",
        task.title, project.title
    ))))
}
