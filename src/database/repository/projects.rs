use sqlx::PgPool;

use crate::database::models::{Project, ProjectJoinRow};
use crate::database::DatabaseError;

pub async fn create(pool: &PgPool, name: &str, description: &str) -> Result<Project, DatabaseError> {
    let project = sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(project)
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Project>, DatabaseError> {
    let projects = sqlx::query_as::<_, Project>(
        r#"
        SELECT id, name, description, created_at, updated_at
        FROM projects
        WHERE deleted_at IS NULL
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

pub async fn details_rows(pool: &PgPool, id: i32) -> Result<Vec<ProjectJoinRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, ProjectJoinRow>(
        r#"
        SELECT p.id, p.name, p.description,
               l.id AS lead_id, l.name AS lead_name, l.last_name AS lead_last_name,
               l.email AS lead_email, l.university AS lead_university, l.department AS lead_department,
               m.id AS member_id, m.name AS member_name, m.last_name AS member_last_name,
               m.email AS member_email, m.university AS member_university, m.department AS member_department,
               t.id AS team_id, t.name AS team_name, t.description AS team_description
        FROM projects p
        LEFT JOIN (project_users pl JOIN users l ON l.id = pl.user_id AND l.deleted_at IS NULL)
            ON pl.project_id = p.id AND pl.role = 'lead' AND pl.deleted_at IS NULL
        LEFT JOIN (team_projects tp JOIN teams t ON t.id = tp.team_id AND t.deleted_at IS NULL)
            ON tp.project_id = p.id AND tp.deleted_at IS NULL
        LEFT JOIN (project_users pm JOIN users m ON m.id = pm.user_id AND m.deleted_at IS NULL)
            ON pm.project_id = p.id AND pm.role = 'member' AND pm.deleted_at IS NULL
        WHERE p.id = $1 AND p.deleted_at IS NULL
        ORDER BY pl.id, tp.id, pm.id
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
) -> Result<Project, DatabaseError> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
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
    .ok_or_else(|| DatabaseError::NotFound("Project not found".to_string()))
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE projects SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("Project not found".to_string()));
    }

    sqlx::query("UPDATE project_users SET deleted_at = NOW() WHERE project_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE team_projects SET deleted_at = NOW() WHERE project_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
