//! Authorization checks for team and project operations.
//!
//! The caller is always passed explicitly; the auth middleware builds it once
//! per request from a verified token. Every check fails closed: a missing
//! caller, a missing membership and a store error all deny.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::database::models::Membership;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::types::{GlobalRole, MembershipRole, ReadPolicy, ResourceKind};

/// Verified identity of the user making the request
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: i32,
    pub role: GlobalRole,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Read access to active memberships
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn active_membership(
        &self,
        kind: ResourceKind,
        resource_id: i32,
        user_id: i32,
    ) -> Result<Option<Membership>, DatabaseError>;
}

/// True for admins and for leads of this exact resource
pub async fn is_authorized<L>(lookup: &L, caller: Option<&Caller>, kind: ResourceKind, resource_id: i32) -> bool
where
    L: MembershipLookup + ?Sized,
{
    let Some(caller) = caller else {
        return false;
    };

    if caller.is_admin() {
        return true;
    }

    match lookup.active_membership(kind, resource_id, caller.id).await {
        Ok(Some(membership)) => membership.role == MembershipRole::Lead,
        Ok(None) => false,
        Err(e) => {
            warn!(
                "Membership lookup failed for user {} on {} {}: {}",
                caller.id,
                kind.label(),
                resource_id,
                e
            );
            false
        }
    }
}

/// `is_authorized` as a request guard; denial is always 403
pub async fn require_lead<L>(lookup: &L, caller: &Caller, kind: ResourceKind, resource_id: i32) -> Result<(), ApiError>
where
    L: MembershipLookup + ?Sized,
{
    if is_authorized(lookup, Some(caller), kind, resource_id).await {
        debug!("User {} authorized on {} {}", caller.id, kind.label(), resource_id);
        return Ok(());
    }

    warn!("User {} denied on {} {}", caller.id, kind.label(), resource_id);
    Err(ApiError::forbidden(format!(
        "You are not authorized to manage this {}",
        kind.label().to_lowercase()
    )))
}

pub fn require_admin(caller: &Caller) -> Result<(), ApiError> {
    if caller.is_admin() {
        Ok(())
    } else {
        warn!("User {} denied admin-only operation", caller.id);
        Err(ApiError::forbidden("Admin role required"))
    }
}

/// Admins manage everyone; other users only themselves
pub fn can_manage_user(caller: &Caller, user_id: i32) -> bool {
    caller.is_admin() || caller.id == user_id
}

/// Single-resource read gate selected by configuration
pub async fn can_read<L>(
    lookup: &L,
    policy: ReadPolicy,
    caller: &Caller,
    kind: ResourceKind,
    resource_id: i32,
) -> Result<(), ApiError>
where
    L: MembershipLookup + ?Sized,
{
    match policy {
        ReadPolicy::Public => Ok(()),
        ReadPolicy::Lead => require_lead(lookup, caller, kind, resource_id).await,
    }
}
