use async_trait::async_trait;
use tracing::info;

use super::ServiceError;
use crate::access::{is_authorized, Caller, MembershipLookup};
use crate::database::models::{Membership, TeamProject};
use crate::database::DatabaseError;
use crate::types::{MembershipRole, ResourceKind};

/// Storage the membership flows need on top of the guard's lookup
#[async_trait]
pub trait MembershipStore: MembershipLookup {
    async fn resource_exists(&self, kind: ResourceKind, id: i32) -> Result<bool, DatabaseError>;
    async fn user_exists(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn insert_membership(
        &self,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
        role: MembershipRole,
    ) -> Result<Membership, DatabaseError>;
    async fn remove_membership(&self, kind: ResourceKind, resource_id: i32, user_id: i32) -> Result<u64, DatabaseError>;
    async fn insert_team_project(&self, team_id: i32, project_id: i32) -> Result<TeamProject, DatabaseError>;
    async fn remove_team_project(&self, team_id: i32, project_id: i32) -> Result<u64, DatabaseError>;
}

/// Adds and removes leads, members and team-project links.
///
/// Each call checks that the resource exists, then the target, then the
/// caller's authority, and only then writes. The steps are separate
/// statements; a concurrent delete between them is not detected.
pub struct MembershipService<S> {
    store: S,
}

impl<S: MembershipStore> MembershipService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn add_membership(
        &self,
        caller: &Caller,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
        role: MembershipRole,
    ) -> Result<Membership, ServiceError> {
        self.ensure_resource(kind, resource_id).await?;
        if !self.store.user_exists(user_id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        self.ensure_authorized(caller, kind, resource_id).await?;

        let membership = self
            .store
            .insert_membership(kind, resource_id, user_id, role)
            .await?;

        info!(
            "User {} added user {} as {} of {} {}",
            caller.id,
            user_id,
            role.as_str(),
            kind.label(),
            resource_id
        );
        Ok(membership)
    }

    pub async fn remove_membership(
        &self,
        caller: &Caller,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        self.ensure_resource(kind, resource_id).await?;
        self.ensure_authorized(caller, kind, resource_id).await?;

        if self.store.remove_membership(kind, resource_id, user_id).await? == 0 {
            return Err(ServiceError::NotFound("Membership not found".to_string()));
        }

        info!("User {} removed user {} from {} {}", caller.id, user_id, kind.label(), resource_id);
        Ok(())
    }

    /// Attach a project to a team; authority comes from the team
    pub async fn link_project(&self, caller: &Caller, team_id: i32, project_id: i32) -> Result<TeamProject, ServiceError> {
        self.ensure_resource(ResourceKind::Team, team_id).await?;
        self.ensure_resource(ResourceKind::Project, project_id).await?;
        self.ensure_authorized(caller, ResourceKind::Team, team_id).await?;

        let link = self.store.insert_team_project(team_id, project_id).await?;
        info!("User {} linked project {} to team {}", caller.id, project_id, team_id);
        Ok(link)
    }

    pub async fn unlink_project(&self, caller: &Caller, team_id: i32, project_id: i32) -> Result<(), ServiceError> {
        self.ensure_resource(ResourceKind::Team, team_id).await?;
        self.ensure_authorized(caller, ResourceKind::Team, team_id).await?;

        if self.store.remove_team_project(team_id, project_id).await? == 0 {
            return Err(ServiceError::NotFound("Project is not linked to this team".to_string()));
        }

        info!("User {} unlinked project {} from team {}", caller.id, project_id, team_id);
        Ok(())
    }

    async fn ensure_resource(&self, kind: ResourceKind, id: i32) -> Result<(), ServiceError> {
        if self.store.resource_exists(kind, id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("{} not found", kind.label())))
        }
    }

    async fn ensure_authorized(&self, caller: &Caller, kind: ResourceKind, id: i32) -> Result<(), ServiceError> {
        if is_authorized(&self.store, Some(caller), kind, id).await {
            Ok(())
        } else {
            tracing::warn!("User {} denied membership change on {} {}", caller.id, kind.label(), id);
            Err(ServiceError::Forbidden(format!(
                "You are not authorized to manage this {}",
                kind.label().to_lowercase()
            )))
        }
    }
}
