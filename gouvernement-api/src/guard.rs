/// Authorization gates applied to routes
///
/// Each protected route carries a [`Guard`]: a gate chain plus the access
/// store it reads from. The guard runs as a `route_layer`, after routing (so
/// path parameters are known) and after the JWT layer (so the actor is known).
///
/// ```text
/// PUT /v1/projects/:project_id/tasks/:task_id
///   1. IsTaskAssigner   -> 303 /v1/projects
///   2. ProjectIsOpen    -> 303 /v1/projects/{project_id}
///   3. handler
/// ```
///
/// The chain constructors below name the checks and messages of every route.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use gouvernement_shared::auth::{
    gate::{
        AccessStore, Gate, GateChain, IsProjectCollaborator, IsProjectSupervisor,
        IsProjectSupervisorOrCollaborator, IsTaskAssigner, IsTaskAssignerOrAssignee, ProjectIsOpen,
    },
    middleware::Actor,
};

use crate::error::{ApiError, ApiResult};

const PROJECTS: &str = "/v1/projects";
const PROJECT: &str = "/v1/projects/{project_id}";
const TASKS: &str = "/v1/tasks";

const VIEW_PROJECT: &str =
    "You have to supervise this project or be its current collaborator to be able to view its info.";
const PROJECT_CLOSED: &str =
    "The project supervisor has closed this project. Tasks can no longer be initiated or edited.";
const VIEW_TASK: &str =
    "You have to have assigned this task or be an assignee to be able to view its info.";

/// A gate chain bound to its access store
#[derive(Clone)]
pub struct Guard {
    store: Arc<dyn AccessStore>,
    chain: Arc<GateChain>,
}

impl Guard {
    pub fn new(store: Arc<dyn AccessStore>, chain: GateChain) -> Self {
        Self {
            store,
            chain: Arc::new(chain),
        }
    }
}

/// Runs the guard's chain before the wrapped handler
pub async fn guard_middleware(
    State(guard): State<Guard>,
    params: Option<Path<HashMap<String, String>>>,
    actor: Option<Extension<Actor>>,
    headers: HeaderMap,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(Extension(actor)) = actor else {
        return Err(ApiError::Unauthorized("Missing credentials".to_string()));
    };

    let params = params.map(|Path(params)| params).unwrap_or_default();
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    guard
        .chain
        .enforce(guard.store.as_ref(), actor.user_id, &params, referer)
        .await?;

    Ok(next.run(req).await)
}

/// `GET /v1/projects/:project_id`
pub fn view_project() -> GateChain {
    GateChain::new().then(Gate::role(IsProjectSupervisorOrCollaborator, VIEW_PROJECT, PROJECTS))
}

/// `PUT /v1/projects/:project_id`
pub fn edit_project() -> GateChain {
    GateChain::new().then(Gate::role(
        IsProjectSupervisor,
        "You have to supervise this project to be able to edit its info.",
        PROJECT,
    ))
}

/// `DELETE /v1/projects/:project_id`
pub fn delete_project() -> GateChain {
    GateChain::new().then(Gate::role(
        IsProjectSupervisor,
        "You have to supervise this project to be able to delete it.",
        PROJECT,
    ))
}

/// `POST /v1/projects/:project_id/tasks`
pub fn initiate_task() -> GateChain {
    GateChain::new()
        .then(Gate::role(
            IsProjectCollaborator,
            "You have to be a current collaborator to this project to be able to initiate a task.",
            PROJECTS,
        ))
        .then(Gate::attr(ProjectIsOpen, PROJECT_CLOSED, PROJECT))
}

/// `GET /v1/projects/:project_id/tasks/:task_id` and `GET /v1/tasks/:task_id`
pub fn view_task() -> GateChain {
    GateChain::new().then(Gate::role(IsTaskAssignerOrAssignee, VIEW_TASK, PROJECTS))
}

/// `PUT /v1/projects/:project_id/tasks/:task_id`
pub fn edit_task() -> GateChain {
    GateChain::new()
        .then(Gate::role(
            IsTaskAssigner,
            "You have to have assigned this task to be able to edit its info.",
            PROJECTS,
        ))
        .then(Gate::attr(ProjectIsOpen, PROJECT_CLOSED, PROJECT))
}

/// `DELETE /v1/projects/:project_id/tasks/:task_id`
pub fn delete_task() -> GateChain {
    GateChain::new().then(Gate::role(
        IsTaskAssigner,
        "You have to have assigned this task to be able to delete it.",
        PROJECTS,
    ))
}

/// `GET /v1/tasks/:task_id/project/:project_id`
pub fn view_project_from_task() -> GateChain {
    GateChain::new().then(Gate::role(IsProjectSupervisorOrCollaborator, VIEW_PROJECT, TASKS))
}
