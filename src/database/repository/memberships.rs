//! Queries shared by `team_users` and `project_users`. The table and id
//! column come from `ResourceKind`, never from request input.

use sqlx::PgPool;

use crate::database::models::{Membership, TeamProject};
use crate::database::DatabaseError;
use crate::types::{MembershipRole, ResourceKind};

pub async fn resource_exists(pool: &PgPool, kind: ResourceKind, id: i32) -> Result<bool, DatabaseError> {
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND deleted_at IS NULL)",
        kind.table()
    );
    let found: (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(pool).await?;

    Ok(found.0)
}

pub async fn find_active(
    pool: &PgPool,
    kind: ResourceKind,
    resource_id: i32,
    user_id: i32,
) -> Result<Option<Membership>, DatabaseError> {
    let sql = format!(
        r#"
        SELECT id, {column} AS resource_id, user_id, role, created_at, updated_at
        FROM {table}
        WHERE {column} = $1 AND user_id = $2 AND deleted_at IS NULL
        "#,
        column = kind.membership_column(),
        table = kind.membership_table(),
    );

    let membership = sqlx::query_as::<_, Membership>(&sql)
        .bind(resource_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(membership)
}

/// A second active row for the same pair trips the partial unique index
pub async fn insert(
    pool: &PgPool,
    kind: ResourceKind,
    resource_id: i32,
    user_id: i32,
    role: MembershipRole,
) -> Result<Membership, DatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO {table} ({column}, user_id, role)
        VALUES ($1, $2, $3)
        RETURNING id, {column} AS resource_id, user_id, role, created_at, updated_at
        "#,
        column = kind.membership_column(),
        table = kind.membership_table(),
    );

    sqlx::query_as::<_, Membership>(&sql)
        .bind(resource_id)
        .bind(user_id)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
        .map_err(|e| DatabaseError::conflict_on_unique(e, "User is already a member"))
}

/// Soft-delete the active membership; returns how many rows changed
pub async fn soft_delete(
    pool: &PgPool,
    kind: ResourceKind,
    resource_id: i32,
    user_id: i32,
) -> Result<u64, DatabaseError> {
    let sql = format!(
        "UPDATE {table} SET deleted_at = NOW(), updated_at = NOW() \
         WHERE {column} = $1 AND user_id = $2 AND deleted_at IS NULL",
        column = kind.membership_column(),
        table = kind.membership_table(),
    );

    let result = sqlx::query(&sql)
        .bind(resource_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn link_project(pool: &PgPool, team_id: i32, project_id: i32) -> Result<TeamProject, DatabaseError> {
    sqlx::query_as::<_, TeamProject>(
        r#"
        INSERT INTO team_projects (team_id, project_id)
        VALUES ($1, $2)
        RETURNING id, team_id, project_id, created_at, updated_at
        "#,
    )
    .bind(team_id)
    .bind(project_id)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, "Project is already linked to this team"))
}

pub async fn unlink_project(pool: &PgPool, team_id: i32, project_id: i32) -> Result<u64, DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE team_projects SET deleted_at = NOW(), updated_at = NOW()
        WHERE team_id = $1 AND project_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(team_id)
    .bind(project_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
