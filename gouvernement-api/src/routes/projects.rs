/// Project endpoints
///
/// - `GET /v1/projects?filters=` - projects I supervise or collaborate on
/// - `POST /v1/projects` - initiate a project; the actor supervises it
/// - `GET /v1/projects/:project_id?filters=` - project info and my tasks in it
/// - `PUT /v1/projects/:project_id` - edit a project and its collaborators
/// - `DELETE /v1/projects/:project_id` - delete a project
/// - `GET /v1/tasks/:task_id/project/:project_id?filters=` - project info
///   reached from one of its tasks
///
/// Authorization for the `:project_id` routes is done by the guards in
/// [`crate::guard`] before these handlers run.

use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use gouvernement_shared::{
    auth::middleware::Actor,
    models::{
        project::{CreateProject, Project, ProjectSummary, UpdateProject},
        task::{Task, TaskSummary},
        user::User,
    },
    resolver::{resolve_emails, ResolveError},
    search,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Listing, Notice};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};

const PRIORITY_UNSET: &str = "The project priority has not been set.";
const DEADLINE_UNSET: &str = "The project deadline has not been set.";
const STATUS_UNSET: &str = "The project status has not been set.";
const COLLABORATORS_INVALID: &str =
    "The collaborators field is either improperly filled out, or some email is unregistered.";

/// Body of project initiation and editing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProjectForm {
    #[validate(length(
        min = 1,
        max = 200,
        message = "The project title length must be between 1 and 200 characters."
    ))]
    pub title: String,

    #[validate(
        required(message = "The project priority has not been set."),
        range(min = 1, max = 5, message = "The project priority must be between 1 and 5.")
    )]
    pub priority: Option<i32>,

    #[validate(length(
        min = 1,
        max = 1200,
        message = "The project description length must be between 1 and 1200 characters."
    ))]
    pub description: String,

    #[validate(required(message = "The project deadline has not been set."))]
    pub deadline: Option<DateTime<Utc>>,

    /// Comma-separated collaborator emails
    #[serde(default)]
    pub collaborators: String,

    #[validate(required(message = "The project status has not been set."))]
    pub status: Option<bool>,
}

/// A validated form with its collaborators resolved
struct CheckedProject {
    title: String,
    priority: i32,
    description: String,
    deadline: DateTime<Utc>,
    status: bool,
    collaborator_ids: Vec<Uuid>,
}

impl ProjectForm {
    async fn check(self, state: &AppState) -> ApiResult<CheckedProject> {
        self.validate()?;

        let collaborators = resolve_emails(&state.db, &self.collaborators)
            .await
            .map_err(|e| match e {
                ResolveError::UnknownEmail(_) => ApiError::field("collaborators", COLLABORATORS_INVALID),
                other => ApiError::from(other),
            })?;

        let collaborator_ids = unique_ids(collaborators.iter().map(|user| user.id));

        Ok(CheckedProject {
            title: self.title,
            priority: self.priority.ok_or_else(|| ApiError::field("priority", PRIORITY_UNSET))?,
            description: self.description,
            deadline: self.deadline.ok_or_else(|| ApiError::field("deadline", DEADLINE_UNSET))?,
            status: self.status.ok_or_else(|| ApiError::field("status", STATUS_UNSET))?,
            collaborator_ids,
        })
    }
}

/// Ids in first-seen order without repeats
pub(crate) fn unique_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// A project with its collaborators and the actor's tasks in it
#[derive(Debug, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project: ProjectSummary,

    pub collaborator_emails: Vec<String>,

    pub tasks: Vec<TaskSummary>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(listing): Query<Listing>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let query = search::project::compile(listing.filters(), &state.db).await?;
    let projects = ProjectSummary::list_visible(&state.db, actor.user_id, &query).await?;

    Ok(Json(projects))
}

/// Initiates a project supervised by the actor
pub async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<(StatusCode, Json<Notice<Project>>)> {
    let checked = form.check(&state).await?;

    let mut tx = state.db.begin().await?;
    let project = Project::create(
        &mut tx,
        CreateProject {
            title: checked.title,
            priority: checked.priority,
            description: checked.description,
            supervisor_id: actor.user_id,
            deadline: checked.deadline,
            status: checked.status,
        },
        &checked.collaborator_ids,
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        project_id = %project.id,
        supervisor_id = %actor.user_id,
        collaborators = checked.collaborator_ids.len(),
        "Project initiated"
    );

    Ok((
        StatusCode::CREATED,
        Json(Notice::success("Project initiated successfully!", project)),
    ))
}

/// Project info reached from the projects list
pub async fn project_info(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Query(listing): Query<Listing>,
) -> ApiResult<Json<ProjectInfo>> {
    load_info(&state, actor, project_id, &listing).await.map(Json)
}

/// Project info reached from one of its tasks
pub async fn project_from_task(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((task_id, project_id)): Path<(Uuid, Uuid)>,
    Query(listing): Query<Listing>,
) -> ApiResult<Json<ProjectInfo>> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .filter(|task| task.project_id == project_id)
        .ok_or_else(|| ApiError::NotFound(format!("Task {task_id} not found in project {project_id}")))?;

    tracing::debug!(task_id = %task.id, project_id = %project_id, "Project reached from task");

    load_info(&state, actor, project_id, &listing).await.map(Json)
}

async fn load_info(
    state: &AppState,
    actor: Actor,
    project_id: Uuid,
    listing: &Listing,
) -> ApiResult<ProjectInfo> {
    let project = ProjectSummary::find(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

    let collaborator_emails = User::emails_of(&state.db, &project.collaborator_ids).await?;

    let query = search::task::compile(listing.filters(), &state.db).await?;
    let tasks = TaskSummary::list_in_project(&state.db, project_id, actor.user_id, &query).await?;

    Ok(ProjectInfo {
        project,
        collaborator_emails,
        tasks,
    })
}

/// Edits a project and replaces its collaborators
pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(form): Json<ProjectForm>,
) -> ApiResult<Json<Notice<Project>>> {
    let checked = form.check(&state).await?;

    let mut tx = state.db.begin().await?;
    let project = Project::update(
        &mut tx,
        project_id,
        UpdateProject {
            title: checked.title,
            priority: checked.priority,
            description: checked.description,
            deadline: checked.deadline,
            status: checked.status,
        },
        &checked.collaborator_ids,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;
    tx.commit().await?;

    tracing::info!(project_id = %project.id, status = project.status, "Project updated");

    Ok(Json(Notice::success("Project info updated successfully!", project)))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Notice<()>>> {
    let project = Project::find_by_id(&state.db, project_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

    let mut tx = state.db.begin().await?;
    Project::delete(&mut tx, project_id).await?;
    tx.commit().await?;

    tracing::info!(project_id = %project_id, "Project deleted");

    Ok(Json(Notice::done(format!("Project {} has been deleted.", project.title))))
}
