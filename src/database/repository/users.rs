use sqlx::PgPool;

use crate::database::models::{NewUser, User, UserChanges, UserJoinRow};
use crate::database::DatabaseError;
use crate::types::GlobalRole;

const USER_COLUMNS: &str = "id, name, last_name, email, password, telephone_number, university, \
                            department, date_of_birth, role, created_at, updated_at";

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn exists(pool: &PgPool, id: i32) -> Result<bool, DatabaseError> {
    let found: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)")
            .bind(id)
            .fetch_one(pool)
            .await?;

    Ok(found.0)
}

pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<User>, DatabaseError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE deleted_at IS NULL ORDER BY id LIMIT $1 OFFSET $2",
        USER_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Register a user. A previously deleted account with the same email is
/// brought back with the new data instead of inserting a second row.
pub async fn create(pool: &PgPool, new_user: &NewUser) -> Result<User, DatabaseError> {
    let restored = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET name = $2, last_name = $3, password = $4, telephone_number = $5,
            university = $6, department = $7, date_of_birth = $8, role = $9,
            updated_at = NOW(), deleted_at = NULL
        WHERE id = (
            SELECT id FROM users
            WHERE email = $1 AND deleted_at IS NOT NULL
            ORDER BY deleted_at DESC
            LIMIT 1
        )
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&new_user.email)
    .bind(&new_user.name)
    .bind(&new_user.last_name)
    .bind(&new_user.password_hash)
    .bind(&new_user.telephone_number)
    .bind(&new_user.university)
    .bind(&new_user.department)
    .bind(new_user.date_of_birth)
    .bind(new_user.role.as_str())
    .fetch_optional(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, "User already exists"))?;

    if let Some(user) = restored {
        tracing::info!("Restored deleted user {}", user.id);
        return Ok(user);
    }

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, last_name, email, password, telephone_number,
                           university, department, date_of_birth, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(&new_user.name)
    .bind(&new_user.last_name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.telephone_number)
    .bind(&new_user.university)
    .bind(&new_user.department)
    .bind(new_user.date_of_birth)
    .bind(new_user.role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, "User already exists"))
}

pub async fn update(pool: &PgPool, id: i32, changes: &UserChanges) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            password = COALESCE($5, password),
            telephone_number = COALESCE($6, telephone_number),
            university = COALESCE($7, university),
            department = COALESCE($8, department),
            date_of_birth = COALESCE($9, date_of_birth),
            role = COALESCE($10, role),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(id)
    .bind(&changes.name)
    .bind(&changes.last_name)
    .bind(&changes.email)
    .bind(&changes.password_hash)
    .bind(&changes.telephone_number)
    .bind(&changes.university)
    .bind(&changes.department)
    .bind(changes.date_of_birth)
    .bind(changes.role.map(|role| role.as_str()))
    .fetch_optional(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, "Email already in use"))?
    .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))
}

/// Soft-delete the user's memberships, then the user.
/// Each statement commits on its own; a failure stops the sequence.
pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE project_users SET deleted_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    sqlx::query("UPDATE team_users SET deleted_at = NOW() WHERE user_id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    let result = sqlx::query("UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("User not found".to_string()));
    }
    Ok(())
}

/// `users × teams × projects` for one user, ordered by membership
pub async fn details_rows(pool: &PgPool, id: i32) -> Result<Vec<UserJoinRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, UserJoinRow>(
        r#"
        SELECT u.id, u.name, u.last_name, u.email, u.password, u.telephone_number,
               u.university, u.department, u.date_of_birth, u.role, u.created_at, u.updated_at,
               t.id AS team_id, t.name AS team_name, t.description AS team_description,
               p.id AS project_id, p.name AS project_name, p.description AS project_description
        FROM users u
        LEFT JOIN (team_users tu JOIN teams t ON t.id = tu.team_id AND t.deleted_at IS NULL)
            ON tu.user_id = u.id AND tu.deleted_at IS NULL
        LEFT JOIN (project_users pu JOIN projects p ON p.id = pu.project_id AND p.deleted_at IS NULL)
            ON pu.user_id = u.id AND pu.deleted_at IS NULL
        WHERE u.id = $1 AND u.deleted_at IS NULL
        ORDER BY tu.id, pu.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Create the admin account unless an active user already owns the email.
/// Returns whether a row was written.
pub async fn ensure_admin(pool: &PgPool, new_admin: &NewUser) -> Result<bool, DatabaseError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (name, last_name, email, password, telephone_number,
                           university, department, date_of_birth, role)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (email) WHERE deleted_at IS NULL DO NOTHING
        "#,
    )
    .bind(&new_admin.name)
    .bind(&new_admin.last_name)
    .bind(&new_admin.email)
    .bind(&new_admin.password_hash)
    .bind(&new_admin.telephone_number)
    .bind(&new_admin.university)
    .bind(&new_admin.department)
    .bind(new_admin.date_of_birth)
    .bind(GlobalRole::Admin.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
