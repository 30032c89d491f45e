use axum::extract::{Path, Query, State};

use crate::database::models::NewsDetails;
use crate::database::repository::news;
use crate::error::ApiError;
use crate::handlers::utils::{positive_id, PageQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// GET /news?page_id=&page_size= - newest first, with cover image and author
pub async fn list_news(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<NewsDetails>> {
    let page = query.validate(&state.config.api)?;

    let rows = news::list(&state.db, page.limit, page.offset).await?;
    let public_url = &state.config.api.public_url;
    Ok(ApiResponse::success(
        rows.into_iter().map(|row| NewsDetails::from_row(row, public_url)).collect(),
    ))
}

/// GET /news/:id
pub async fn get_news(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<NewsDetails> {
    let id = positive_id(id, "id")?;

    let row = news::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("News not found"))?;

    Ok(ApiResponse::success(NewsDetails::from_row(row, &state.config.api.public_url)))
}
