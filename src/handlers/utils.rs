use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::RngCore;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// `?page_id=&page_size=` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page_id: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl PageQuery {
    /// Both parameters are required; pages start at 1 and sizes stay within the configured bounds
    pub fn validate(&self, api: &ApiConfig) -> Result<Page, ApiError> {
        let mut field_errors = HashMap::new();

        match self.page_id {
            None => {
                field_errors.insert("page_id".to_string(), "is required".to_string());
            }
            Some(page_id) if page_id < 1 => {
                field_errors.insert("page_id".to_string(), "must be at least 1".to_string());
            }
            Some(_) => {}
        }

        match self.page_size {
            None => {
                field_errors.insert("page_size".to_string(), "is required".to_string());
            }
            Some(size) if size < api.min_page_size || size > api.max_page_size => {
                field_errors.insert(
                    "page_size".to_string(),
                    format!("must be between {} and {}", api.min_page_size, api.max_page_size),
                );
            }
            Some(_) => {}
        }

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Invalid pagination parameters", Some(field_errors)));
        }

        let page_id = self.page_id.unwrap_or(1);
        let limit = self.page_size.unwrap_or(api.min_page_size);
        let offset = (page_id - 1)
            .checked_mul(limit)
            .ok_or_else(|| ApiError::invalid_field("page_id", "is too large"))?;

        Ok(Page { limit, offset })
    }
}

/// Path ids are serial keys and start at 1
pub fn positive_id(id: i32, field: &str) -> Result<i32, ApiError> {
    if id < 1 {
        return Err(ApiError::invalid_field(field, "must be at least 1"));
    }
    Ok(id)
}

/// Random url token for a stored image: 64 random bytes, url-safe base64
pub fn generate_image_token() -> String {
    let mut bytes = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

pub fn require_non_empty(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn api() -> ApiConfig {
        AppConfig::for_tests().api
    }

    #[test]
    fn valid_page_becomes_limit_and_offset() {
        let query = PageQuery {
            page_id: Some(3),
            page_size: Some(5),
        };
        assert_eq!(query.validate(&api()).unwrap(), Page { limit: 5, offset: 10 });
    }

    #[test]
    fn page_size_outside_bounds_is_rejected() {
        for size in [4, 11] {
            let query = PageQuery {
                page_id: Some(1),
                page_size: Some(size),
            };
            let body = query.validate(&api()).unwrap_err().to_json();
            assert_eq!(body["field_errors"]["page_size"], "must be between 5 and 10");
        }
    }

    #[test]
    fn missing_parameters_are_reported_together() {
        let err = PageQuery::default().validate(&api()).unwrap_err();
        let body = err.to_json();

        assert_eq!(err.status_code(), 400);
        assert_eq!(body["field_errors"]["page_id"], "is required");
        assert_eq!(body["field_errors"]["page_size"], "is required");
    }

    #[test]
    fn zero_page_is_rejected() {
        let query = PageQuery {
            page_id: Some(0),
            page_size: Some(10),
        };
        assert!(query.validate(&api()).is_err());
    }

    #[test]
    fn huge_page_is_rejected_instead_of_overflowing() {
        let query = PageQuery {
            page_id: Some(i64::MAX),
            page_size: Some(10),
        };
        let err = query.validate(&api()).unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["field_errors"]["page_id"], "is too large");
    }

    #[test]
    fn image_tokens_are_long_url_safe_and_unique() {
        let a = generate_image_token();
        let b = generate_image_token();

        assert_eq!(a.len(), 88);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
        assert_ne!(a, b);
    }

    #[test]
    fn ids_start_at_one() {
        assert!(positive_id(0, "id").is_err());
        assert_eq!(positive_id(4, "id").unwrap(), 4);
    }
}
