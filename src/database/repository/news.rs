use sqlx::PgPool;

use crate::database::models::{News, NewsRow, NewNews};
use crate::database::DatabaseError;

const DETAILS_QUERY: &str = r#"
    SELECT n.id, n.title, n.publish_date, n.description,
           i.id AS image_id, i.url AS image_url, i.type AS image_type,
           u.id AS author_id, u.name AS author_name, u.last_name AS author_last_name,
           u.email AS author_email, u.university AS author_university,
           u.department AS author_department
    FROM news n
    LEFT JOIN images i ON i.id = n.cover_image_id AND i.deleted_at IS NULL
    LEFT JOIN users u ON u.id = n.created_by_id AND u.deleted_at IS NULL
    WHERE n.deleted_at IS NULL
"#;

pub async fn create(pool: &PgPool, news: &NewNews) -> Result<News, DatabaseError> {
    let created = sqlx::query_as::<_, News>(
        r#"
        INSERT INTO news (title, description, cover_image_id, created_by_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, publish_date, description, cover_image_id, created_by_id, created_at
        "#,
    )
    .bind(&news.title)
    .bind(&news.description)
    .bind(news.cover_image_id)
    .bind(news.created_by_id)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Newest first
pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<NewsRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, NewsRow>(&format!(
        "{} ORDER BY n.publish_date DESC, n.id DESC LIMIT $1 OFFSET $2",
        DETAILS_QUERY
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn find(pool: &PgPool, id: i32) -> Result<Option<NewsRow>, DatabaseError> {
    let row = sqlx::query_as::<_, NewsRow>(&format!("{} AND n.id = $1", DETAILS_QUERY))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn soft_delete(pool: &PgPool, id: i32) -> Result<(), DatabaseError> {
    let result = sqlx::query("UPDATE news SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("News not found".to_string()));
    }
    Ok(())
}
