use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Image metadata; the bytes are only loaded when serving
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Image {
    pub id: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    pub url: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ImageBlob {
    #[sqlx(rename = "type")]
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct NewImage {
    pub content_type: String,
    pub name: String,
    pub data: Vec<u8>,
    pub url: String,
    pub created_by: i32,
}

/// Absolute address under which `GET /images/:url` serves a stored token
pub fn public_image_url(public_url: &str, token: &str) -> String {
    format!("{}/images/{}", public_url.trim_end_matches('/'), token)
}
