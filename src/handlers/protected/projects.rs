use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::access::{can_read, require_lead, Caller};
use crate::database::models::{Membership, Project, ProjectDetails};
use crate::database::repository::{memberships, projects};
use crate::database::PgStore;
use crate::handlers::utils::{positive_id, require_non_empty, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MembershipService;
use crate::types::{MembershipRole, ResourceKind};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectMemberRequest {
    pub project_id: i32,
    pub user_id: i32,
    #[serde(default)]
    pub role: MembershipRole,
}

/// POST /projects - any authenticated user; a non-admin creator becomes its lead
pub async fn create_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    require_non_empty(&payload.name, "name")?;

    let project = projects::create(&state.db, payload.name.trim(), &payload.description).await?;
    if !caller.is_admin() {
        memberships::insert(&state.db, ResourceKind::Project, project.id, caller.id, MembershipRole::Lead).await?;
    }

    info!("User {} created project {}", caller.id, project.id);
    Ok(ApiResponse::created(project).with_message("Project created successfully"))
}

/// GET /projects?page_id=&page_size=
pub async fn list_projects(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<Project>> {
    let page = query.validate(&state.config.api)?;
    let projects = projects::list(&state.db, page.limit, page.offset).await?;
    Ok(ApiResponse::success(projects))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<ProjectDetails> {
    let id = positive_id(id, "id")?;

    let rows = projects::details_rows(&state.db, id).await?;
    let details = ProjectDetails::from_rows(&rows)?;

    let store = PgStore::new(state.db.clone());
    can_read(&store, state.config.security.read_policy, &caller, ResourceKind::Project, id).await?;

    Ok(ApiResponse::success(details))
}

/// PUT /projects/:id - admin or project lead
pub async fn update_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Project> {
    let id = positive_id(id, "id")?;
    require_lead(&PgStore::new(state.db.clone()), &caller, ResourceKind::Project, id).await?;
    if let Some(name) = &payload.name {
        require_non_empty(name, "name")?;
    }

    let project = projects::update(&state.db, id, payload.name.as_deref(), payload.description.as_deref()).await?;
    info!("User {} updated project {}", caller.id, id);

    Ok(ApiResponse::success(project).with_message("Project updated successfully"))
}

/// DELETE /projects/:id - admin or project lead
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    let id = positive_id(id, "id")?;
    require_lead(&PgStore::new(state.db.clone()), &caller, ResourceKind::Project, id).await?;

    projects::soft_delete(&state.db, id).await?;
    info!("User {} deleted project {}", caller.id, id);

    Ok(ApiResponse::success(()).with_message("Project deleted successfully"))
}

/// POST /projects/member
pub async fn add_project_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<ProjectMemberRequest>,
) -> ApiResult<Membership> {
    let project_id = positive_id(payload.project_id, "project_id")?;
    let user_id = positive_id(payload.user_id, "user_id")?;

    let membership = MembershipService::new(PgStore::new(state.db.clone()))
        .add_membership(&caller, ResourceKind::Project, project_id, user_id, payload.role)
        .await?;

    Ok(ApiResponse::created(membership).with_message("Project member added successfully"))
}

/// DELETE /projects/member
pub async fn remove_project_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<ProjectMemberRequest>,
) -> ApiResult<()> {
    let project_id = positive_id(payload.project_id, "project_id")?;
    let user_id = positive_id(payload.user_id, "user_id")?;

    MembershipService::new(PgStore::new(state.db.clone()))
        .remove_membership(&caller, ResourceKind::Project, project_id, user_id)
        .await?;

    Ok(ApiResponse::success(()).with_message("Project member removed successfully"))
}
