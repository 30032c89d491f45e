use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{Membership, TeamProject};
use super::repository::{memberships, users};
use super::DatabaseError;
use crate::access::MembershipLookup;
use crate::services::MembershipStore;
use crate::types::{MembershipRole, ResourceKind};

/// Postgres-backed implementation of the guard and service store traits
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipLookup for PgStore {
    async fn active_membership(
        &self,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
    ) -> Result<Option<Membership>, DatabaseError> {
        memberships::find_active(&self.pool, kind, resource_id, user_id).await
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn resource_exists(&self, kind: ResourceKind, id: i32) -> Result<bool, DatabaseError> {
        memberships::resource_exists(&self.pool, kind, id).await
    }

    async fn user_exists(&self, id: i32) -> Result<bool, DatabaseError> {
        users::exists(&self.pool, id).await
    }

    async fn insert_membership(
        &self,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
        role: MembershipRole,
    ) -> Result<Membership, DatabaseError> {
        memberships::insert(&self.pool, kind, resource_id, user_id, role).await
    }

    async fn remove_membership(&self, kind: ResourceKind, resource_id: i32, user_id: i32) -> Result<u64, DatabaseError> {
        memberships::soft_delete(&self.pool, kind, resource_id, user_id).await
    }

    async fn insert_team_project(&self, team_id: i32, project_id: i32) -> Result<TeamProject, DatabaseError> {
        memberships::link_project(&self.pool, team_id, project_id).await
    }

    async fn remove_team_project(&self, team_id: i32, project_id: i32) -> Result<u64, DatabaseError> {
        memberships::unlink_project(&self.pool, team_id, project_id).await
    }
}
