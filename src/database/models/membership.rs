use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::MembershipRole;

/// Active row of `team_users` or `project_users`.
/// `resource_id` is the team or project id, aliased in the query.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Membership {
    pub id: i32,
    pub resource_id: i32,
    pub user_id: i32,
    #[sqlx(try_from = "String")]
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamProject {
    pub id: i32,
    pub team_id: i32,
    pub project_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
