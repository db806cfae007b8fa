//! Role and attribute authorization gates
//!
//! A gate runs a predicate before a route handler. Two kinds exist:
//!
//! - a **role check** ([`RoleCheck`]) looks at the actor and the route, e.g.
//!   "the actor supervises project `{project_id}`";
//! - an **attribute check** ([`AttrCheck`]) looks at the route only, e.g.
//!   "project `{project_id}` is open".
//!
//! Each check declares the route parameters it needs as a typed bundle
//! implementing [`FromRouteParams`]. A gate whose route lacks a declared
//! parameter is mis-configured and fails like a denial, with the fixed
//! message [`MISCONFIGURED`]. A parameter that is present but does not parse
//! comes from the client, not the route table, and fails with
//! [`GateError::MalformedParam`].
//!
//! A failing gate yields [`GateError::Denied`] carrying the gate's message and
//! where to send the user next: the request's `Referer` if there is one,
//! otherwise the gate's fallback location with `{param}` placeholders filled
//! from the route.
//!
//! Gates are grouped into a [`GateChain`]. The chain evaluates gates in the
//! order they were added and stops at the first failure.
//!
//! Ownership and membership data is read through the [`AccessStore`] trait,
//! implemented for `PgPool` and by [`MemoryAccessStore`].
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use gouvernement_shared::auth::gate::{Gate, GateChain, IsProjectCollaborator, ProjectIsOpen};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, actor: Uuid, project_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let chain = GateChain::new()
//!     .then(Gate::role(IsProjectCollaborator, "Collaborators only.", "/v1/projects"))
//!     .then(Gate::attr(ProjectIsOpen, "The project is closed.", "/v1/projects/{project_id}"));
//!
//! let params = HashMap::from([("project_id".to_string(), project_id.to_string())]);
//! chain.enforce(&pool, actor, &params, None).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Message of a gate whose route parameters are missing
pub const MISCONFIGURED: &str = "Permission check mis-configured.";

/// Raw route parameters by name, as matched by the router
pub type RouteParams = HashMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A gate refused the request
    #[error("{message}")]
    Denied { message: String, redirect_to: String },

    /// The route names an entity that does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    /// A route parameter holds a value no entity can have
    #[error("No {name} matches {value:?}")]
    MalformedParam { name: &'static str, value: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Why a parameter bundle could not be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The matched route does not declare the parameter
    Missing(&'static str),

    /// The parameter is there but does not parse
    Malformed { name: &'static str, value: String },
}

/// A typed bundle of route parameters a check declares
pub trait FromRouteParams: Sized + Send + Sync {
    fn from_route_params(params: &RouteParams) -> Result<Self, ParamError>;
}

fn uuid_param(params: &RouteParams, name: &'static str) -> Result<Uuid, ParamError> {
    let value = params.get(name).ok_or(ParamError::Missing(name))?;
    value.parse().map_err(|_| ParamError::Malformed {
        name,
        value: value.clone(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectRoute {
    pub project_id: Uuid,
}

impl FromRouteParams for ProjectRoute {
    fn from_route_params(params: &RouteParams) -> Result<Self, ParamError> {
        Ok(Self {
            project_id: uuid_param(params, "project_id")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRoute {
    pub task_id: Uuid,
}

impl FromRouteParams for TaskRoute {
    fn from_route_params(params: &RouteParams) -> Result<Self, ParamError> {
        Ok(Self {
            task_id: uuid_param(params, "task_id")?,
        })
    }
}

/// Ownership, membership and status of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectAccess {
    pub supervisor_id: Uuid,
    pub collaborator_ids: Vec<Uuid>,
    pub status: bool,
}

/// Ownership and membership of a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskAccess {
    pub project_id: Uuid,
    pub assigner_id: Uuid,
    pub assignee_ids: Vec<Uuid>,
}

/// Loads what gates need to know about projects and tasks
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn project_access(&self, project_id: Uuid) -> Result<Option<ProjectAccess>, sqlx::Error>;

    async fn task_access(&self, task_id: Uuid) -> Result<Option<TaskAccess>, sqlx::Error>;
}

#[async_trait]
impl AccessStore for PgPool {
    async fn project_access(&self, project_id: Uuid) -> Result<Option<ProjectAccess>, sqlx::Error> {
        sqlx::query_as::<_, ProjectAccess>(
            r#"
            SELECT p.supervisor_id, p.status,
                   COALESCE(
                       (SELECT array_agg(pc.user_id) FROM project_collaborators pc
                        WHERE pc.project_id = p.id),
                       '{}'::uuid[]
                   ) AS collaborator_ids
            FROM projects p
            WHERE p.id = $1
            "#,
        )
        .bind(project_id)
        .fetch_optional(self)
        .await
    }

    async fn task_access(&self, task_id: Uuid) -> Result<Option<TaskAccess>, sqlx::Error> {
        sqlx::query_as::<_, TaskAccess>(
            r#"
            SELECT t.project_id, t.assigner_id,
                   COALESCE(
                       (SELECT array_agg(ta.user_id) FROM task_assignees ta
                        WHERE ta.task_id = t.id),
                       '{}'::uuid[]
                   ) AS assignee_ids
            FROM tasks t
            WHERE t.id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(self)
        .await
    }
}

#[async_trait]
impl<S: AccessStore + ?Sized> AccessStore for Arc<S> {
    async fn project_access(&self, project_id: Uuid) -> Result<Option<ProjectAccess>, sqlx::Error> {
        (**self).project_access(project_id).await
    }

    async fn task_access(&self, task_id: Uuid) -> Result<Option<TaskAccess>, sqlx::Error> {
        (**self).task_access(task_id).await
    }
}

/// Access data held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryAccessStore {
    pub projects: HashMap<Uuid, ProjectAccess>,
    pub tasks: HashMap<Uuid, TaskAccess>,
}

impl MemoryAccessStore {
    pub fn with_project(mut self, id: Uuid, access: ProjectAccess) -> Self {
        self.projects.insert(id, access);
        self
    }

    pub fn with_task(mut self, id: Uuid, access: TaskAccess) -> Self {
        self.tasks.insert(id, access);
        self
    }
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn project_access(&self, project_id: Uuid) -> Result<Option<ProjectAccess>, sqlx::Error> {
        Ok(self.projects.get(&project_id).cloned())
    }

    async fn task_access(&self, task_id: Uuid) -> Result<Option<TaskAccess>, sqlx::Error> {
        Ok(self.tasks.get(&task_id).cloned())
    }
}

async fn load_project(store: &dyn AccessStore, id: Uuid) -> Result<ProjectAccess, GateError> {
    store
        .project_access(id)
        .await?
        .ok_or(GateError::NotFound { kind: "Project", id })
}

async fn load_task(store: &dyn AccessStore, id: Uuid) -> Result<TaskAccess, GateError> {
    store
        .task_access(id)
        .await?
        .ok_or(GateError::NotFound { kind: "Task", id })
}

/// A predicate on the actor and the route
#[async_trait]
pub trait RoleCheck: Send + Sync + 'static {
    type Params: FromRouteParams;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &Self::Params,
    ) -> Result<bool, GateError>;
}

/// A predicate on the route alone
#[async_trait]
pub trait AttrCheck: Send + Sync + 'static {
    type Params: FromRouteParams;

    async fn check(&self, store: &dyn AccessStore, params: &Self::Params) -> Result<bool, GateError>;
}

#[derive(Debug, Clone, Copy)]
pub struct IsProjectSupervisor;

#[async_trait]
impl RoleCheck for IsProjectSupervisor {
    type Params = ProjectRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &ProjectRoute,
    ) -> Result<bool, GateError> {
        Ok(load_project(store, params.project_id).await?.supervisor_id == actor)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IsProjectCollaborator;

#[async_trait]
impl RoleCheck for IsProjectCollaborator {
    type Params = ProjectRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &ProjectRoute,
    ) -> Result<bool, GateError> {
        let project = load_project(store, params.project_id).await?;
        Ok(project.collaborator_ids.contains(&actor))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IsProjectSupervisorOrCollaborator;

#[async_trait]
impl RoleCheck for IsProjectSupervisorOrCollaborator {
    type Params = ProjectRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &ProjectRoute,
    ) -> Result<bool, GateError> {
        let project = load_project(store, params.project_id).await?;
        Ok(project.supervisor_id == actor || project.collaborator_ids.contains(&actor))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IsTaskAssigner;

#[async_trait]
impl RoleCheck for IsTaskAssigner {
    type Params = TaskRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &TaskRoute,
    ) -> Result<bool, GateError> {
        Ok(load_task(store, params.task_id).await?.assigner_id == actor)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IsTaskAssignee;

#[async_trait]
impl RoleCheck for IsTaskAssignee {
    type Params = TaskRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &TaskRoute,
    ) -> Result<bool, GateError> {
        Ok(load_task(store, params.task_id).await?.assignee_ids.contains(&actor))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IsTaskAssignerOrAssignee;

#[async_trait]
impl RoleCheck for IsTaskAssignerOrAssignee {
    type Params = TaskRoute;

    async fn check(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &TaskRoute,
    ) -> Result<bool, GateError> {
        let task = load_task(store, params.task_id).await?;
        Ok(task.assigner_id == actor || task.assignee_ids.contains(&actor))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectIsOpen;

#[async_trait]
impl AttrCheck for ProjectIsOpen {
    type Params = ProjectRoute;

    async fn check(&self, store: &dyn AccessStore, params: &ProjectRoute) -> Result<bool, GateError> {
        Ok(load_project(store, params.project_id).await?.status)
    }
}

enum Verdict {
    Allow,
    Deny,
    Misconfigured,
}

/// `None` when the route lacks a declared parameter
fn params_bundle<P: FromRouteParams>(params: &RouteParams) -> Result<Option<P>, GateError> {
    match P::from_route_params(params) {
        Ok(bundle) => Ok(Some(bundle)),
        Err(ParamError::Missing(_)) => Ok(None),
        Err(ParamError::Malformed { name, value }) => Err(GateError::MalformedParam { name, value }),
    }
}

#[async_trait]
trait Predicate: Send + Sync {
    async fn evaluate(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &RouteParams,
    ) -> Result<Verdict, GateError>;
}

struct Role<C>(C);

#[async_trait]
impl<C: RoleCheck> Predicate for Role<C> {
    async fn evaluate(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &RouteParams,
    ) -> Result<Verdict, GateError> {
        let Some(bundle) = params_bundle::<C::Params>(params)? else {
            return Ok(Verdict::Misconfigured);
        };

        Ok(if self.0.check(store, actor, &bundle).await? {
            Verdict::Allow
        } else {
            Verdict::Deny
        })
    }
}

struct Attr<C>(C);

#[async_trait]
impl<C: AttrCheck> Predicate for Attr<C> {
    async fn evaluate(
        &self,
        store: &dyn AccessStore,
        _actor: Uuid,
        params: &RouteParams,
    ) -> Result<Verdict, GateError> {
        let Some(bundle) = params_bundle::<C::Params>(params)? else {
            return Ok(Verdict::Misconfigured);
        };

        Ok(if self.0.check(store, &bundle).await? {
            Verdict::Allow
        } else {
            Verdict::Deny
        })
    }
}

/// A check paired with its denial message and fallback location
pub struct Gate {
    predicate: Box<dyn Predicate>,
    message: String,
    fallback: String,
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("message", &self.message)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl Gate {
    pub fn role<C: RoleCheck>(
        check: C,
        message: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Box::new(Role(check)),
            message: message.into(),
            fallback: fallback.into(),
        }
    }

    pub fn attr<C: AttrCheck>(
        check: C,
        message: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            predicate: Box::new(Attr(check)),
            message: message.into(),
            fallback: fallback.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Runs the check
    ///
    /// # Errors
    ///
    /// - `GateError::Denied` if the check fails or is mis-configured
    /// - `GateError::NotFound` if the route names a missing entity
    /// - `GateError::MalformedParam` if a route parameter does not parse
    /// - `GateError::Database` if access data cannot be loaded
    pub async fn enforce(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &RouteParams,
        referer: Option<&str>,
    ) -> Result<(), GateError> {
        let message = match self.predicate.evaluate(store, actor, params).await? {
            Verdict::Allow => return Ok(()),
            Verdict::Deny => self.message.clone(),
            Verdict::Misconfigured => {
                tracing::error!(gate = %self.message, "Gate parameters missing from route");
                MISCONFIGURED.to_string()
            }
        };

        let redirect_to = match referer {
            Some(referer) if !referer.is_empty() => referer.to_string(),
            _ => fill_placeholders(&self.fallback, params),
        };

        tracing::warn!(
            actor = %actor,
            message = %message,
            redirect_to = %redirect_to,
            "Request denied by gate"
        );

        Err(GateError::Denied {
            message,
            redirect_to,
        })
    }
}

/// Substitutes `{name}` with the route parameter `name`
///
/// Placeholders without a matching parameter are left as they are.
pub fn fill_placeholders(template: &str, params: &RouteParams) -> String {
    params.iter().fold(template.to_string(), |filled, (name, value)| {
        filled.replace(&format!("{{{name}}}"), value)
    })
}

/// Gates evaluated in order, stopping at the first failure
#[derive(Debug, Default)]
pub struct GateChain {
    gates: Vec<Gate>,
}

impl GateChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, gate: Gate) -> Self {
        self.gates.push(gate);
        self
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub async fn enforce(
        &self,
        store: &dyn AccessStore,
        actor: Uuid,
        params: &RouteParams,
        referer: Option<&str>,
    ) -> Result<(), GateError> {
        for gate in &self.gates {
            gate.enforce(store, actor, params, referer).await?;
        }

        tracing::debug!(actor = %actor, gates = self.gates.len(), "Gates passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct World {
        store: MemoryAccessStore,
        supervisor: Uuid,
        collaborator: Uuid,
        outsider: Uuid,
        open_project: Uuid,
        closed_project: Uuid,
        task: Uuid,
    }

    fn world() -> World {
        let supervisor = Uuid::new_v4();
        let collaborator = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let open_project = Uuid::new_v4();
        let closed_project = Uuid::new_v4();
        let task = Uuid::new_v4();

        let store = MemoryAccessStore::default()
            .with_project(
                open_project,
                ProjectAccess {
                    supervisor_id: supervisor,
                    collaborator_ids: vec![collaborator],
                    status: true,
                },
            )
            .with_project(
                closed_project,
                ProjectAccess {
                    supervisor_id: supervisor,
                    collaborator_ids: vec![collaborator],
                    status: false,
                },
            )
            .with_task(
                task,
                TaskAccess {
                    project_id: open_project,
                    assigner_id: collaborator,
                    assignee_ids: vec![supervisor],
                },
            );

        World {
            store,
            supervisor,
            collaborator,
            outsider,
            open_project,
            closed_project,
            task,
        }
    }

    fn project_params(id: Uuid) -> RouteParams {
        HashMap::from([("project_id".to_string(), id.to_string())])
    }

    fn task_params(id: Uuid) -> RouteParams {
        HashMap::from([("task_id".to_string(), id.to_string())])
    }

    fn view_gate() -> Gate {
        Gate::role(
            IsProjectSupervisorOrCollaborator,
            "You have to supervise this project or be its current collaborator to be able to view its info.",
            "/v1/projects",
        )
    }

    #[tokio::test]
    async fn test_supervisor_and_collaborators_may_view() {
        let w = world();
        let params = project_params(w.open_project);

        for actor in [w.supervisor, w.collaborator] {
            assert!(view_gate().enforce(&w.store, actor, &params, None).await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_outsider_is_denied_to_fallback() {
        let w = world();
        let params = project_params(w.open_project);

        match view_gate().enforce(&w.store, w.outsider, &params, None).await {
            Err(GateError::Denied { message, redirect_to }) => {
                assert!(message.starts_with("You have to supervise this project"));
                assert_eq!(redirect_to, "/v1/projects");
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_denial_prefers_referer() {
        let w = world();
        let params = project_params(w.open_project);

        let err = view_gate()
            .enforce(&w.store, w.outsider, &params, Some("https://app.example/tasks"))
            .await
            .unwrap_err();

        assert!(matches!(err, GateError::Denied { redirect_to, .. } if redirect_to == "https://app.example/tasks"));
    }

    #[tokio::test]
    async fn test_fallback_placeholders_are_filled() {
        let w = world();
        let params = project_params(w.open_project);
        let gate = Gate::role(IsProjectSupervisor, "Supervisors only.", "/v1/projects/{project_id}");

        let err = gate.enforce(&w.store, w.collaborator, &params, None).await.unwrap_err();
        match err {
            GateError::Denied { redirect_to, .. } => {
                assert_eq!(redirect_to, format!("/v1/projects/{}", w.open_project));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_param_is_misconfigured() {
        let w = world();
        let gate = Gate::role(IsTaskAssigner, "Assigners only.", "/v1/projects");

        let err = gate
            .enforce(&w.store, w.collaborator, &project_params(w.open_project), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISCONFIGURED);
    }

    #[tokio::test]
    async fn test_unparseable_param_is_not_misconfigured() {
        let w = world();
        let gate = Gate::role(IsTaskAssigner, "Assigners only.", "/v1/projects");

        let garbled = HashMap::from([("task_id".to_string(), "seven".to_string())]);
        let err = gate.enforce(&w.store, w.collaborator, &garbled, None).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::MalformedParam { name: "task_id", ref value } if value == "seven"
        ));
    }

    #[test]
    fn test_route_params_tell_missing_from_malformed() {
        assert_eq!(
            ProjectRoute::from_route_params(&RouteParams::new()),
            Err(ParamError::Missing("project_id"))
        );

        let garbled = HashMap::from([("project_id".to_string(), "not-a-uuid".to_string())]);
        assert_eq!(
            ProjectRoute::from_route_params(&garbled),
            Err(ParamError::Malformed {
                name: "project_id",
                value: "not-a-uuid".to_string()
            })
        );

        let id = Uuid::new_v4();
        assert_eq!(
            ProjectRoute::from_route_params(&HashMap::from([("project_id".to_string(), id.to_string())])),
            Ok(ProjectRoute { project_id: id })
        );
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found() {
        let w = world();
        let ghost = Uuid::new_v4();

        let err = view_gate()
            .enforce(&w.store, w.supervisor, &project_params(ghost), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::NotFound { kind: "Project", id } if id == ghost));
    }

    #[tokio::test]
    async fn test_task_roles() {
        let w = world();
        let params = task_params(w.task);

        let assigner = Gate::role(IsTaskAssigner, "a", "/");
        let assignee = Gate::role(IsTaskAssignee, "b", "/");
        let either = Gate::role(IsTaskAssignerOrAssignee, "c", "/");

        assert!(assigner.enforce(&w.store, w.collaborator, &params, None).await.is_ok());
        assert!(assigner.enforce(&w.store, w.supervisor, &params, None).await.is_err());

        assert!(assignee.enforce(&w.store, w.supervisor, &params, None).await.is_ok());
        assert!(assignee.enforce(&w.store, w.collaborator, &params, None).await.is_err());

        for actor in [w.supervisor, w.collaborator] {
            assert!(either.enforce(&w.store, actor, &params, None).await.is_ok());
        }
        assert!(either.enforce(&w.store, w.outsider, &params, None).await.is_err());
    }

    #[tokio::test]
    async fn test_chain_short_circuits_in_order() {
        let w = world();
        let chain = GateChain::new()
            .then(Gate::role(IsProjectCollaborator, "first", "/v1/projects"))
            .then(Gate::attr(ProjectIsOpen, "second", "/v1/projects/{project_id}"));

        // outsider on a closed project fails the first gate, not the second
        let err = chain
            .enforce(&w.store, w.outsider, &project_params(w.closed_project), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "first");

        let err = chain
            .enforce(&w.store, w.collaborator, &project_params(w.closed_project), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "second");

        assert!(chain
            .enforce(&w.store, w.collaborator, &project_params(w.open_project), None)
            .await
            .is_ok());
        assert_eq!(chain.len(), 2);
    }

    #[tokio::test]
    async fn test_supervisor_is_not_a_collaborator() {
        let w = world();
        let gate = Gate::role(IsProjectCollaborator, "Collaborators only.", "/v1/projects");

        assert!(gate
            .enforce(&w.store, w.supervisor, &project_params(w.open_project), None)
            .await
            .is_err());
    }

    #[test]
    fn test_fill_placeholders() {
        let params = HashMap::from([
            ("project_id".to_string(), "p1".to_string()),
            ("task_id".to_string(), "t9".to_string()),
        ]);

        assert_eq!(
            fill_placeholders("/v1/projects/{project_id}/tasks/{task_id}", &params),
            "/v1/projects/p1/tasks/t9"
        );
        assert_eq!(fill_placeholders("/v1/{missing}", &params), "/v1/{missing}");
    }
}
