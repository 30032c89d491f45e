use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Skylab API",
            "version": version,
            "description": "Lab management backend: users, teams, projects, news and images",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "users": "/users/signup, /users/login (public); /users[/:id], /users/me (protected)",
                "teams": "/teams[/:id], /teams/member, /teams/project (protected)",
                "projects": "/projects[/:id], /projects/member (protected)",
                "images": "GET /images/:url (public); POST /images (protected)",
                "news": "GET /news[/:id] (public); POST /news, DELETE /news/:id (protected)"
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
