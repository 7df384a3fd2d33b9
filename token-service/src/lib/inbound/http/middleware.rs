use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::token::models::UserId;
use crate::inbound::http::router::AppState;
use crate::token::errors::TokenError;

/// Identity attached to requests that carried a valid access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Validates the bearer access token and adds the caller to request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let user_id = state
        .token_service
        .validate_access(token)
        .await
        .map_err(|e| {
            tracing::warn!("Access token validation failed: {}", e);
            let (status, message) = match e {
                TokenError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Access token expired"),
                TokenError::StorageUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable")
                }
                _ => (StatusCode::UNAUTHORIZED, "Invalid access token"),
            };
            error_response(status, message)
        })?;

    req.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(req).await)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| error_response(StatusCode::UNAUTHORIZED, "Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid Authorization header format. Expected: Bearer <token>",
        )
    })
}
