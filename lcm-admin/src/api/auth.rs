//! Login endpoint and session middleware

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
    Json,
};
use lcm_common::api::{bearer_token, new_session_token, verify_password, AuthRequest, AuthResponse};
use tracing::{info, warn};

use crate::{ApiError, ApiResult, AppState};

/// POST /api/auth
///
/// Exchanges the shared admin password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<AuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if let Some(expected) = &state.admin_password {
        if !verify_password(&request.password, expected) {
            warn!("Rejected login attempt with wrong password");
            return Err(ApiError::Unauthorized("Wrong password".to_string()));
        }
    }

    let token = new_session_token();
    state.sessions.write().await.insert(token.clone());
    info!("Admin session opened");

    Ok(Json(AuthResponse {
        success: true,
        token,
    }))
}

/// Authentication middleware
///
/// Requires `Authorization: Bearer <token>` with a token issued by [`login`].
/// Applied to protected routes only; a state without password lets every
/// request through.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.admin_password.is_none() {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    let Some(token) = token else {
        return Err(ApiError::Unauthorized(
            "Missing bearer token".to_string(),
        ));
    };

    if !state.sessions.read().await.contains(&token) {
        warn!("Request with unknown session token: {}", request.uri().path());
        return Err(ApiError::Unauthorized("Invalid session".to_string()));
    }

    Ok(next.run(request).await)
}
