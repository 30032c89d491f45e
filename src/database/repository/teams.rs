use sqlx::PgPool;

use crate::database::models::{Team, TeamJoinRow};
use crate::database::DatabaseError;

pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Team, DatabaseError> {
    let team = sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(team)
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Team>, DatabaseError> {
    let teams = sqlx::query_as::<_, Team>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM teams
        WHERE deleted_at IS NULL
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(teams)
}

/// Leads, members and projects of one team as a single left-joined result set
pub async fn details_rows(pool: &PgPool, id: i32) -> Result<Vec<TeamJoinRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, TeamJoinRow>(
        r#"
        SELECT t.id, t.name, t.description,
               l.id AS lead_id, l.name AS lead_name, l.last_name AS lead_last_name,
               l.email AS lead_email, l.university AS lead_university, l.department AS lead_department,
               m.id AS member_id, m.name AS member_name, m.last_name AS member_last_name,
               m.email AS member_email, m.university AS member_university, m.department AS member_department,
               p.id AS project_id, p.name AS project_name, p.description AS project_description
        FROM teams t
        LEFT JOIN (team_users tl JOIN users l ON l.id = tl.user_id AND l.deleted_at IS NULL)
            ON tl.team_id = t.id AND tl.role = 'lead' AND tl.deleted_at IS NULL
        LEFT JOIN (team_projects tp JOIN projects p ON p.id = tp.project_id AND p.deleted_at IS NULL)
            ON tp.team_id = t.id AND tp.deleted_at IS NULL
        LEFT JOIN (team_users tm JOIN users m ON m.id = tm.user_id AND m.deleted_at IS NULL)
            ON tm.team_id = t.id AND tm.role = 'member' AND tm.deleted_at IS NULL
        WHERE t.id = $1 AND t.deleted_at IS NULL
        ORDER BY tl.id, tp.id, tm.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn update(
    pool: &PgPool,
    id: i32,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Team, DatabaseError> {
    sqlx::query_as::<_, Team>(
        r#"
        UPDATE teams
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Team not found".to_string()))
}

/// Soft-delete the team together with its memberships and project links
pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE teams SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Team not found".to_string()));
    }

    sqlx::query("UPDATE team_users SET deleted_at = NOW() WHERE team_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE team_projects SET deleted_at = NOW() WHERE team_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
