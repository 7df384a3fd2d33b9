use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::client_context;
use super::ApiError;
use super::ApiSuccess;
use super::TokenPairData;
use super::REAUTHENTICATE_MESSAGE;
use crate::domain::token::models::UserId;
use crate::inbound::http::router::AppState;
use crate::token::errors::TokenError;

/// Exchange a refresh token for a new pair.
///
/// Every refusal caused by the token itself yields the same 401 body so the
/// caller cannot tell an unknown token from a reused or expired one.
pub async fn refresh_tokens(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<RefreshTokensHttpRequestBody>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let user_id = UserId::new(body.user_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
    let client = client_context(&headers, peer.map(|ConnectInfo(addr)| addr));

    match state
        .token_service
        .rotate(&user_id, &body.refresh_token, client)
        .await
    {
        Ok(pair) => Ok(ApiSuccess::new(StatusCode::OK, pair.into())),
        Err(TokenError::InvalidToken | TokenError::ExpiredToken | TokenError::TokenNotFound) => {
            Err(ApiError::Unauthorized(REAUTHENTICATE_MESSAGE.to_string()))
        }
        Err(e) => Err(ApiError::from(e)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokensHttpRequestBody {
    user_id: String,
    refresh_token: String,
}
