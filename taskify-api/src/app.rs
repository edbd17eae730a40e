/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use taskify_shared::ordering::OrderingEngine;
use taskify_shared::realtime::{ProjectBroadcast, ProjectSubscriber};

use crate::config::Config;
use crate::help::HelpClient;
use crate::routes;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. All
/// members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Task mutation engine
    pub engine: OrderingEngine,

    /// Outbound project event channel
    pub events: Arc<dyn ProjectBroadcast>,

    /// Inbound project event channels, for WebSocket clients
    pub subscriber: ProjectSubscriber,

    /// AI help assistant; None when unconfigured
    pub help: Option<HelpClient>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The broadcast handle is injected rather than constructed here so
    /// tests can substitute a recording double.
    pub fn new(
        db: PgPool,
        events: Arc<dyn ProjectBroadcast>,
        subscriber: ProjectSubscriber,
        help: Option<HelpClient>,
        config: Config,
    ) -> Self {
        let engine = OrderingEngine::new(db.clone(), events.clone());

        Self {
            db,
            engine,
            events,
            subscriber,
            help,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                # Health check
/// ├── /ws                                    # Real-time event relay
/// └── /api/
///     ├── GET    /projects                   # Projects with task counts
///     ├── GET    /projects/:id               # Single project
///     ├── GET    /projects/:id/tasks         # Board in display order
///     ├── GET    /projects/:id/members       # Project members
///     ├── GET    /users                      # All users
///     ├── GET    /tasks/:id                  # Task with comments
///     ├── PATCH  /tasks/:id                  # The one mutation entry point
///     ├── GET    /comments/task/:taskId      # Comments on a task
///     ├── POST   /comments/task/:taskId      # Add a comment
///     ├── PATCH  /comments/:commentId        # Edit own comment
///     ├── DELETE /comments/:commentId        # Delete own comment
///     ├── GET    /help/session/:sessionId    # Help transcript
///     ├── POST   /help/session/:sessionId/message
///     ├── POST   /help/session/:sessionId/context
///     └── DELETE /help/session/:sessionId    # Clear transcript
/// ```
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects/:id", get(routes::projects::get_project))
        .route("/projects/:id/tasks", get(routes::projects::list_project_tasks))
        .route("/projects/:id/members", get(routes::projects::list_project_members))
        .route("/users", get(routes::users::list_users))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task).patch(routes::tasks::update_task),
        )
        .route(
            "/comments/task/:task_id",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/comments/:comment_id",
            axum::routing::patch(routes::comments::update_comment)
                .delete(routes::comments::delete_comment),
        )
        .route(
            "/help/session/:session_id",
            get(routes::help::get_session).delete(routes::help::clear_session),
        )
        .route(
            "/help/session/:session_id/message",
            axum::routing::post(routes::help::send_message),
        )
        .route(
            "/help/session/:session_id/context",
            axum::routing::post(routes::help::get_context_help),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/ws", get(routes::ws::ws_handler))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
