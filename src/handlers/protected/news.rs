use axum::extract::{Multipart, Path, State};
use axum::Extension;
use tracing::info;

use super::images::{read_image_field, save_image};
use crate::access::{require_admin, Caller};
use crate::database::models::{NewImage, NewNews, News};
use crate::database::repository::news;
use crate::error::ApiError;
use crate::handlers::utils::{positive_id, require_non_empty};
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// Validated `POST /news` form; the cover image is held in memory until the news row is written
#[derive(Debug)]
pub(crate) struct NewsForm {
    pub title: String,
    pub description: String,
    pub cover_image: Option<NewImage>,
}

/// Drain the multipart body and check it before anything is persisted
pub(crate) async fn read_news_form(caller: &Caller, mut multipart: Multipart) -> Result<NewsForm, ApiError> {
    let mut title = None;
    let mut description = String::new();
    let mut cover_image = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => title = Some(field.text().await?),
            Some("description") => description = field.text().await?,
            Some("cover_image") => cover_image = Some(read_image_field(caller, field).await?),
            _ => {}
        }
    }

    let title = title.ok_or_else(|| ApiError::invalid_field("title", "is required"))?;
    require_non_empty(&title, "title")?;

    Ok(NewsForm {
        title,
        description,
        cover_image,
    })
}

/// POST /news - multipart `title`, `description` and optional `cover_image` file
pub async fn create_news(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    multipart: Multipart,
) -> ApiResult<News> {
    let form = read_news_form(&caller, multipart).await?;

    let cover_image_id = match &form.cover_image {
        Some(upload) => Some(save_image(&state, upload).await?.id),
        None => None,
    };

    let created = news::create(
        &state.db,
        &NewNews {
            title: form.title,
            description: form.description,
            cover_image_id,
            created_by_id: caller.id,
        },
    )
    .await?;

    info!("User {} published news {}", caller.id, created.id);
    Ok(ApiResponse::created(created).with_message("News created successfully"))
}

/// DELETE /news/:id - admin only
pub async fn delete_news(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    require_admin(&caller)?;
    let id = positive_id(id, "id")?;

    news::soft_delete(&state.db, id).await?;
    info!("User {} deleted news {}", caller.id, id);

    Ok(ApiResponse::success(()).with_message("News deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GlobalRole;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{header, Request};

    const BOUNDARY: &str = "skylab-boundary";

    fn caller() -> Caller {
        Caller {
            id: 7,
            role: GlobalRole::Member,
        }
    }

    async fn multipart(body: String) -> Multipart {
        let request = Request::builder()
            .method("POST")
            .uri("/news")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        )
    }

    fn image_part() -> String {
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"cover_image\"; filename=\"cover.png\"\r\nContent-Type: image/png\r\n\r\nPNGDATA\r\n",
            BOUNDARY
        )
    }

    fn closing() -> String {
        format!("--{}--\r\n", BOUNDARY)
    }

    #[tokio::test]
    async fn missing_title_fails_before_the_cover_is_kept() {
        let body = format!("{}{}{}", image_part(), text_part("description", "Open day"), closing());

        let err = read_news_form(&caller(), multipart(body).await).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["field_errors"]["title"], "is required");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let body = format!("{}{}{}", image_part(), text_part("title", "   "), closing());

        let err = read_news_form(&caller(), multipart(body).await).await.unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["title"], "must not be empty");
    }

    #[tokio::test]
    async fn complete_form_holds_the_cover_in_memory() {
        let body = format!(
            "{}{}{}{}",
            image_part(),
            text_part("title", "Lab open day"),
            text_part("description", "Everyone welcome"),
            closing()
        );

        let form = read_news_form(&caller(), multipart(body).await).await.unwrap();
        let cover = form.cover_image.expect("cover image");

        assert_eq!(form.title, "Lab open day");
        assert_eq!(form.description, "Everyone welcome");
        assert_eq!(cover.content_type, "image/png");
        assert_eq!(cover.data, b"PNGDATA".to_vec());
        assert_eq!(cover.created_by, 7);
    }

    #[tokio::test]
    async fn non_image_cover_is_rejected() {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"cover_image\"; filename=\"notes.txt\"\r\nContent-Type: text/plain\r\n\r\nhello\r\n{}{}",
            text_part("title", "News"),
            closing(),
            b = BOUNDARY
        );

        let err = read_news_form(&caller(), multipart(body).await).await.unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["cover_image"], "must be an image upload");
    }
}
