pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod reducer;
pub mod services;
pub mod types;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::middleware::jwt_auth_middleware;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        // Public
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/users/signup", post(public::signup))
        .route("/users/login", post(public::login))
        .route("/images/:url", get(public::get_image))
        .route("/news", get(public::list_news))
        .route("/news/:id", get(public::get_news))
}

/// Everything behind the JWT middleware. Paths shared with the public router
/// (`/news`, `/news/:id`) merge per method, so the layer only wraps these handlers.
fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::{images, news, projects, teams, users};

    Router::new()
        // Users
        .route("/users/me", get(users::me))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Teams
        .route("/teams", post(teams::create_team).get(teams::list_teams))
        .route(
            "/teams/member",
            post(teams::add_team_member).delete(teams::remove_team_member),
        )
        .route(
            "/teams/project",
            post(teams::add_team_project).delete(teams::remove_team_project),
        )
        .route(
            "/teams/:id",
            get(teams::get_team).put(teams::update_team).delete(teams::delete_team),
        )
        // Projects
        .route("/projects", post(projects::create_project).get(projects::list_projects))
        .route(
            "/projects/member",
            post(projects::add_project_member).delete(projects::remove_project_member),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // Images and news
        .route("/images", post(images::upload_image))
        .route("/news", post(news::create_news))
        .route("/news/:id", delete(news::delete_news))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

    if config.security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(methods).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([axum::http::header::AUTHORIZATION, axum::http::header::CONTENT_TYPE])
}
