/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use gouvernement_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = gouvernement_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    guard::{self, guard_middleware, Guard},
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use gouvernement_shared::auth::{
    gate::{AccessStore, GateChain},
    middleware::create_jwt_middleware,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Where guards read project and task access data
    pub access: Arc<dyn AccessStore>,
}

impl AppState {
    /// Creates state whose guards read from the database
    pub fn new(db: PgPool, config: Config) -> Self {
        let access: Arc<dyn AccessStore> = Arc::new(db.clone());
        Self::with_access(db, config, access)
    }

    /// Creates state with a custom access store
    pub fn with_access(db: PgPool, config: Config, access: Arc<dyn AccessStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            access,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Puts a gate chain in front of a method router
    fn guarded(&self, route: MethodRouter<AppState>, chain: GateChain) -> MethodRouter<AppState> {
        let guard = Guard::new(self.access.clone(), chain);
        route.route_layer(from_fn_with_state(guard, guard_middleware))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /v1/
///     ├── /auth/                                  (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── /projects                               (bearer token)
///     │   ├── GET  /                              list
///     │   ├── POST /                              initiate
///     │   ├── GET|PUT|DELETE /:project_id         info, edit, delete
///     │   ├── POST /:project_id/tasks             initiate task
///     │   └── GET|PUT|DELETE /:project_id/tasks/:task_id
///     └── /tasks                                  (bearer token)
///         ├── GET /                               list
///         ├── GET /:task_id                       info
///         └── GET /:task_id/project/:project_id   project info
/// ```
///
/// Gate chains are attached per method with `route_layer`, inside the JWT
/// layer, so they see both the actor and the matched path parameters.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let project_routes = Router::new()
        .route(
            "/",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/:project_id",
            state
                .guarded(get(routes::projects::project_info), guard::view_project())
                .merge(state.guarded(
                    put(routes::projects::update_project),
                    guard::edit_project(),
                ))
                .merge(state.guarded(
                    delete(routes::projects::delete_project),
                    guard::delete_project(),
                )),
        )
        .route(
            "/:project_id/tasks",
            state.guarded(post(routes::tasks::create_task), guard::initiate_task()),
        )
        .route(
            "/:project_id/tasks/:task_id",
            state
                .guarded(get(routes::tasks::task_info), guard::view_task())
                .merge(state.guarded(
                    put(routes::tasks::update_task),
                    guard::edit_task(),
                ))
                .merge(state.guarded(
                    delete(routes::tasks::delete_task),
                    guard::delete_task(),
                )),
        );

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route(
            "/:task_id",
            state.guarded(get(routes::tasks::task_disjoint_info), guard::view_task()),
        )
        .route(
            "/:task_id/project/:project_id",
            state.guarded(
                get(routes::projects::project_from_task),
                guard::view_project_from_task(),
            ),
        );

    let protected_routes = Router::new()
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .layer(from_fn(create_jwt_middleware(state.jwt_secret().to_string())));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
