use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::database::models::{NewUser, User};
use crate::database::repository::users;
use crate::error::ApiError;
use crate::handlers::utils::require_non_empty;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::GlobalRole;
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub telephone_number: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub department: String,
    pub date_of_birth: DateTime<Utc>,
}

impl SignupRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_non_empty(&self.name, "name")?;
        require_non_empty(&self.last_name, "last_name")?;
        if !self.email.contains('@') {
            return Err(ApiError::invalid_field("email", "must be a valid email address"));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::invalid_field(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok(())
    }
}

/// POST /users/signup - register a member account
pub async fn signup(State(state): State<AppState>, Json(payload): Json<SignupRequest>) -> ApiResult<User> {
    payload.validate()?;

    let new_user = NewUser {
        name: payload.name,
        last_name: payload.last_name,
        email: payload.email.trim().to_lowercase(),
        password_hash: hash_password(&payload.password)?,
        telephone_number: payload.telephone_number,
        university: payload.university,
        department: payload.department,
        date_of_birth: payload.date_of_birth,
        role: GlobalRole::Member,
    };

    let user = users::create(&state.db, &new_user).await?;
    info!("Registered user {}", user.id);

    Ok(ApiResponse::created(user).with_message("User created successfully"))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
    pub user: User,
}

/// POST /users/login - exchange credentials for a JWT
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let email = payload.email.trim().to_lowercase();

    let Some(user) = users::find_by_email(&state.db, &email).await? else {
        warn!("Login failed: unknown email");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !verify_password(&payload.password, &user.password)? {
        warn!("Login failed for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let security = &state.config.security;
    let claims = Claims::new(user.id, user.role, security.jwt_expiry_hours);
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    info!("User {} logged in", user.id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: security.jwt_expiry_hours * 3600,
        user,
    })
    .with_message("Login successful"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: "Alan".into(),
            last_name: "Turing".into(),
            email: email.into(),
            password: password.into(),
            telephone_number: String::new(),
            university: String::new(),
            department: String::new(),
            date_of_birth: Utc::now(),
        }
    }

    #[test]
    fn signup_validation_checks_email_and_password() {
        assert!(request("alan@lab.test", "enigma42").validate().is_ok());

        let body = request("alan", "enigma42").validate().unwrap_err().to_json();
        assert!(body["field_errors"]["email"].is_string());

        let body = request("alan@lab.test", "abc").validate().unwrap_err().to_json();
        assert_eq!(body["field_errors"]["password"], "must be at least 6 characters");
    }

    #[test]
    fn optional_profile_fields_default_to_empty() {
        let payload: SignupRequest = serde_json::from_value(serde_json::json!({
            "name": "Alan",
            "last_name": "Turing",
            "email": "alan@lab.test",
            "password": "enigma42",
            "date_of_birth": "1912-06-23T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(payload.university, "");
        assert_eq!(payload.date_of_birth.format("%Y").to_string(), "1912");
    }
}
