use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::access::Caller;
use crate::auth::validate_jwt;
use crate::database::repository::users;
use crate::error::ApiError;
use crate::AppState;

/// Validates the bearer token, reloads the user and attaches the `Caller`.
///
/// The user row is re-read on every request so deleted accounts lose access
/// immediately and role changes apply without a new token. The full `User`
/// is attached as well for handlers that echo the profile.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token, &state.config.security.jwt_secret).map_err(|e| {
        debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    let user = users::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    debug!("Authenticated user {} ({})", user.id, user.role.as_str());

    let caller = Caller {
        id: user.id,
        role: user.role,
    };
    request.extensions_mut().insert(caller);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
