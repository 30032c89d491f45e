use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::access::{can_manage_user, Caller};
use crate::auth::password::hash_password;
use crate::database::models::{User, UserChanges, UserDetails};
use crate::database::repository::users;
use crate::error::ApiError;
use crate::handlers::utils::{positive_id, require_non_empty, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::GlobalRole;
use crate::AppState;

/// GET /users/me
pub async fn me(Extension(user): Extension<User>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}

/// GET /users?page_id=&page_size=
pub async fn list_users(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<User>> {
    let page = query.validate(&state.config.api)?;
    let users = users::list(&state.db, page.limit, page.offset).await?;
    Ok(ApiResponse::success(users))
}

/// GET /users/:id - profile with teams and projects; admin or self
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<UserDetails> {
    let id = positive_id(id, "id")?;
    ensure_can_manage(&caller, id, "view")?;

    let rows = users::details_rows(&state.db, id).await?;
    Ok(ApiResponse::success(UserDetails::from_rows(&rows)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub telephone_number: Option<String>,
    pub university: Option<String>,
    pub department: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub role: Option<GlobalRole>,
}

impl UpdateUserRequest {
    /// Hashes a new password; role changes are for admins only
    fn into_changes(self, caller: &Caller) -> Result<UserChanges, ApiError> {
        if self.role.is_some() && !caller.is_admin() {
            return Err(ApiError::forbidden("Only admins can change roles"));
        }
        if let Some(name) = &self.name {
            require_non_empty(name, "name")?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty(last_name, "last_name")?;
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(ApiError::invalid_field("email", "must be a valid email address"));
            }
        }

        let password_hash = match self.password.as_deref() {
            Some(password) if password.is_empty() => {
                return Err(ApiError::invalid_field("password", "must not be empty"));
            }
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        Ok(UserChanges {
            name: self.name,
            last_name: self.last_name,
            email: self.email.map(|email| email.trim().to_lowercase()),
            password_hash,
            telephone_number: self.telephone_number,
            university: self.university,
            department: self.department,
            date_of_birth: self.date_of_birth,
            role: self.role,
        })
    }
}

/// PUT /users/:id - admin or self
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let id = positive_id(id, "id")?;
    ensure_can_manage(&caller, id, "update")?;

    let changes = payload.into_changes(&caller)?;
    let user = users::update(&state.db, id, &changes).await?;

    info!("User {} updated user {}", caller.id, id);
    Ok(ApiResponse::success(user).with_message("User updated successfully"))
}

/// DELETE /users/:id - admin or self; memberships go first
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    let id = positive_id(id, "id")?;
    ensure_can_manage(&caller, id, "delete")?;

    users::soft_delete(&state.db, id).await?;

    info!("User {} deleted user {}", caller.id, id);
    Ok(ApiResponse::success(()).with_message("User deleted successfully"))
}

fn ensure_can_manage(caller: &Caller, user_id: i32, action: &str) -> Result<(), ApiError> {
    if can_manage_user(caller, user_id) {
        return Ok(());
    }
    warn!("User {} may not {} user {}", caller.id, action, user_id);
    Err(ApiError::forbidden(format!("You are not authorized to {} this user", action)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(role: GlobalRole) -> Caller {
        Caller {
            id: 5,
            role,
        }
    }

    #[test]
    fn members_cannot_promote_themselves() {
        let request = UpdateUserRequest {
            role: Some(GlobalRole::Admin),
            ..Default::default()
        };
        let err = request.into_changes(&caller(GlobalRole::Member)).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn admins_may_change_roles() {
        let request = UpdateUserRequest {
            role: Some(GlobalRole::Admin),
            ..Default::default()
        };
        let changes = request.into_changes(&caller(GlobalRole::Admin)).unwrap();
        assert_eq!(changes.role, Some(GlobalRole::Admin));
    }

    #[test]
    fn new_password_is_hashed() {
        let request = UpdateUserRequest {
            password: Some("hunter22".into()),
            ..Default::default()
        };
        let changes = request.into_changes(&caller(GlobalRole::Member)).unwrap();
        let hash = changes.password_hash.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("hunter22"));
    }

    #[test]
    fn required_names_cannot_be_blanked() {
        let request = UpdateUserRequest {
            name: Some("".into()),
            ..Default::default()
        };
        let err = request.into_changes(&caller(GlobalRole::Member)).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["name"], "must not be empty");

        let request = UpdateUserRequest {
            last_name: Some("  ".into()),
            ..Default::default()
        };
        let err = request.into_changes(&caller(GlobalRole::Admin)).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["last_name"], "must not be empty");
    }

    #[test]
    fn email_is_normalized() {
        let request = UpdateUserRequest {
            email: Some(" Ada@Lab.Test ".into()),
            ..Default::default()
        };
        let changes = request.into_changes(&caller(GlobalRole::Member)).unwrap();
        assert_eq!(changes.email.as_deref(), Some("ada@lab.test"));
    }
}
