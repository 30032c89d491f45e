use sqlx::PgPool;

use crate::database::models::{Image, ImageBlob, NewImage};
use crate::database::DatabaseError;

pub async fn create(pool: &PgPool, image: &NewImage) -> Result<Image, DatabaseError> {
    sqlx::query_as::<_, Image>(
        r#"
        INSERT INTO images (type, name, data, url, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, type, name, url, created_by, created_at
        "#,
    )
    .bind(&image.content_type)
    .bind(&image.name)
    .bind(&image.data)
    .bind(&image.url)
    .bind(image.created_by)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::conflict_on_unique(e, "Image url already taken"))
}

/// Look up by the url token (the last path segment of the public url)
pub async fn find_blob(pool: &PgPool, url: &str) -> Result<Option<ImageBlob>, DatabaseError> {
    let blob = sqlx::query_as::<_, ImageBlob>(
        "SELECT type, data FROM images WHERE url = $1 AND deleted_at IS NULL",
    )
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(blob)
}
