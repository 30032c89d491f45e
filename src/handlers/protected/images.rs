use axum::extract::{multipart::Field, Multipart, State};
use axum::Extension;
use tracing::info;

use crate::access::Caller;
use crate::database::models::{public_image_url, Image, NewImage};
use crate::database::repository::images;
use crate::error::ApiError;
use crate::handlers::utils::generate_image_token;
use crate::middleware::{ApiResponse, ApiResult};
use crate::AppState;

/// POST /images - multipart field `image`; returns the public url
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    mut multipart: Multipart,
) -> ApiResult<Image> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let upload = read_image_field(&caller, field).await?;
            let image = save_image(&state, &upload).await?;
            return Ok(ApiResponse::created(image).with_message("Image uploaded successfully"));
        }
    }

    Err(ApiError::invalid_field("image", "is required"))
}

/// Read one uploaded file into memory; nothing is stored yet
pub(crate) async fn read_image_field(caller: &Caller, field: Field<'_>) -> Result<NewImage, ApiError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(ApiError::invalid_field(
            field.name().unwrap_or("image"),
            "must be an image upload",
        ));
    }
    let name = field.file_name().unwrap_or("upload").to_string();

    let data = field.bytes().await?;
    if data.is_empty() {
        return Err(ApiError::bad_request("Uploaded image is empty"));
    }

    Ok(NewImage {
        content_type,
        name,
        data: data.to_vec(),
        url: generate_image_token(),
        created_by: caller.id,
    })
}

/// Persist an upload and rewrite its url to the absolute public form
pub(crate) async fn save_image(state: &AppState, new_image: &NewImage) -> Result<Image, ApiError> {
    let mut image = images::create(&state.db, new_image).await?;
    info!(
        "User {} uploaded image {} ({} bytes)",
        new_image.created_by,
        image.id,
        new_image.data.len()
    );

    image.url = public_image_url(&state.config.api.public_url, &image.url);
    Ok(image)
}
