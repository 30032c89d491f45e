use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::database::repository::images;
use crate::error::ApiError;
use crate::AppState;

/// GET /images/:url - raw image bytes with the stored content type
pub async fn get_image(State(state): State<AppState>, Path(url): Path<String>) -> Result<Response, ApiError> {
    let blob = images::find_blob(&state.db, &url)
        .await?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.data).into_response())
}
