use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{public_image_url, UserSummary};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct News {
    pub id: i32,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub description: String,
    pub cover_image_id: Option<i32>,
    pub created_by_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNews {
    pub title: String,
    pub description: String,
    pub cover_image_id: Option<i32>,
    pub created_by_id: i32,
}

/// `news` left-joined with its cover image and author
#[derive(Debug, Clone, Default, FromRow)]
pub struct NewsRow {
    pub id: i32,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub description: String,

    pub image_id: Option<i32>,
    pub image_url: Option<String>,
    pub image_type: Option<String>,

    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub author_last_name: Option<String>,
    pub author_email: Option<String>,
    pub author_university: Option<String>,
    pub author_department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverImage {
    pub id: i32,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsDetails {
    pub id: i32,
    pub title: String,
    pub publish_date: DateTime<Utc>,
    pub description: String,
    pub cover_image: Option<CoverImage>,
    pub created_by: Option<UserSummary>,
}

impl NewsDetails {
    /// Cover image urls are stored as bare tokens and served under `public_url`
    pub fn from_row(row: NewsRow, public_url: &str) -> Self {
        let cover_image = row.image_id.map(|id| CoverImage {
            id,
            url: public_image_url(public_url, row.image_url.as_deref().unwrap_or_default()),
            content_type: row.image_type.clone().unwrap_or_default(),
        });
        let created_by = row.author_id.map(|id| UserSummary {
            id,
            name: row.author_name.clone().unwrap_or_default(),
            last_name: row.author_last_name.clone().unwrap_or_default(),
            email: row.author_email.clone().unwrap_or_default(),
            university: row.author_university.clone().unwrap_or_default(),
            department: row.author_department.clone().unwrap_or_default(),
        });

        Self {
            id: row.id,
            title: row.title,
            publish_date: row.publish_date,
            description: row.description,
            cover_image,
            created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_URL: &str = "http://localhost:3000";

    #[test]
    fn news_without_cover_serializes_null_image() {
        let details = NewsDetails::from_row(
            NewsRow {
                id: 9,
                title: "Lab open day".into(),
                author_id: Some(1),
                author_name: Some("Grace".into()),
                ..Default::default()
            },
            PUBLIC_URL,
        );
        let body = serde_json::to_value(&details).unwrap();

        assert!(body["cover_image"].is_null());
        assert_eq!(body["created_by"]["name"], "Grace");
    }

    #[test]
    fn cover_image_url_is_served_under_public_url() {
        let details = NewsDetails::from_row(
            NewsRow {
                id: 1,
                image_id: Some(3),
                image_url: Some("abc".into()),
                image_type: Some("image/png".into()),
                ..Default::default()
            },
            PUBLIC_URL,
        );
        let body = serde_json::to_value(&details).unwrap();

        assert_eq!(body["cover_image"]["url"], "http://localhost:3000/images/abc");
        assert_eq!(body["cover_image"]["type"], "image/png");
    }
}
