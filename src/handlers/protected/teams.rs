use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

use crate::access::{can_read, require_admin, require_lead, Caller};
use crate::database::models::{Membership, Team, TeamDetails, TeamProject};
use crate::database::repository::teams;
use crate::database::PgStore;
use crate::handlers::utils::{positive_id, require_non_empty, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::MembershipService;
use crate::types::{MembershipRole, ResourceKind};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TeamMemberRequest {
    pub team_id: i32,
    pub user_id: i32,
    /// Defaults to `member`; ignored on removal
    #[serde(default)]
    pub role: MembershipRole,
}

#[derive(Debug, Deserialize)]
pub struct TeamProjectRequest {
    pub team_id: i32,
    pub project_id: i32,
}

/// POST /teams - admin only
pub async fn create_team(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    require_admin(&caller)?;
    require_non_empty(&payload.name, "name")?;

    let team = teams::create(&state.db, payload.name.trim(), &payload.description).await?;
    info!("User {} created team {}", caller.id, team.id);

    Ok(ApiResponse::created(team).with_message("Team created successfully"))
}

/// GET /teams?page_id=&page_size=
pub async fn list_teams(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<Team>> {
    let page = query.validate(&state.config.api)?;
    let teams = teams::list(&state.db, page.limit, page.offset).await?;
    Ok(ApiResponse::success(teams))
}

/// GET /teams/:id - leads, members and projects; gated by the read policy
pub async fn get_team(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<TeamDetails> {
    let id = positive_id(id, "id")?;

    let rows = teams::details_rows(&state.db, id).await?;
    let details = TeamDetails::from_rows(&rows)?;

    let store = PgStore::new(state.db.clone());
    can_read(&store, state.config.security.read_policy, &caller, ResourceKind::Team, id).await?;

    Ok(ApiResponse::success(details))
}

/// PUT /teams/:id - admin or team lead
pub async fn update_team(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTeamRequest>,
) -> ApiResult<Team> {
    let id = positive_id(id, "id")?;
    require_lead(&PgStore::new(state.db.clone()), &caller, ResourceKind::Team, id).await?;
    if let Some(name) = &payload.name {
        require_non_empty(name, "name")?;
    }

    let team = teams::update(&state.db, id, payload.name.as_deref(), payload.description.as_deref()).await?;
    info!("User {} updated team {}", caller.id, id);

    Ok(ApiResponse::success(team).with_message("Team updated successfully"))
}

/// DELETE /teams/:id - admin or team lead
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    let id = positive_id(id, "id")?;
    require_lead(&PgStore::new(state.db.clone()), &caller, ResourceKind::Team, id).await?;

    teams::soft_delete(&state.db, id).await?;
    info!("User {} deleted team {}", caller.id, id);

    Ok(ApiResponse::success(()).with_message("Team deleted successfully"))
}

/// POST /teams/member
pub async fn add_team_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<TeamMemberRequest>,
) -> ApiResult<Membership> {
    let team_id = positive_id(payload.team_id, "team_id")?;
    let user_id = positive_id(payload.user_id, "user_id")?;

    let membership = MembershipService::new(PgStore::new(state.db.clone()))
        .add_membership(&caller, ResourceKind::Team, team_id, user_id, payload.role)
        .await?;

    Ok(ApiResponse::created(membership).with_message("Team member added successfully"))
}

/// DELETE /teams/member
pub async fn remove_team_member(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<TeamMemberRequest>,
) -> ApiResult<()> {
    let team_id = positive_id(payload.team_id, "team_id")?;
    let user_id = positive_id(payload.user_id, "user_id")?;

    MembershipService::new(PgStore::new(state.db.clone()))
        .remove_membership(&caller, ResourceKind::Team, team_id, user_id)
        .await?;

    Ok(ApiResponse::success(()).with_message("Team member removed successfully"))
}

/// POST /teams/project
pub async fn add_team_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<TeamProjectRequest>,
) -> ApiResult<TeamProject> {
    let team_id = positive_id(payload.team_id, "team_id")?;
    let project_id = positive_id(payload.project_id, "project_id")?;

    let link = MembershipService::new(PgStore::new(state.db.clone()))
        .link_project(&caller, team_id, project_id)
        .await?;

    Ok(ApiResponse::created(link).with_message("Project added to team successfully"))
}

/// DELETE /teams/project
pub async fn remove_team_project(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<TeamProjectRequest>,
) -> ApiResult<()> {
    let team_id = positive_id(payload.team_id, "team_id")?;
    let project_id = positive_id(payload.project_id, "project_id")?;

    MembershipService::new(PgStore::new(state.db.clone()))
        .unlink_project(&caller, team_id, project_id)
        .await?;

    Ok(ApiResponse::success(()).with_message("Project removed from team successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_request_defaults_to_member_role() {
        let payload: TeamMemberRequest = serde_json::from_str(r#"{"team_id": 1, "user_id": 2}"#).unwrap();
        assert_eq!(payload.role, MembershipRole::Member);

        let payload: TeamMemberRequest =
            serde_json::from_str(r#"{"team_id": 1, "user_id": 2, "role": "lead"}"#).unwrap();
        assert_eq!(payload.role, MembershipRole::Lead);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<TeamMemberRequest>(r#"{"team_id": 1, "user_id": 2, "role": "owner"}"#);
        assert!(parsed.is_err());
    }
}
