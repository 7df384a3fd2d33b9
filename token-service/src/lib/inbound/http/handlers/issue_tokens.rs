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
use crate::domain::token::models::UserId;
use crate::inbound::http::router::AppState;

/// Issue a fresh token pair for an already authenticated user.
pub async fn issue_tokens(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<IssueTokensHttpRequestBody>,
) -> Result<ApiSuccess<TokenPairData>, ApiError> {
    let user_id = UserId::new(body.user_id)
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;
    let client = client_context(&headers, peer.map(|ConnectInfo(addr)| addr));

    let pair = state
        .token_service
        .issue(&user_id, client)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %user_id, "Issued token pair");

    Ok(ApiSuccess::new(StatusCode::CREATED, pair.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueTokensHttpRequestBody {
    user_id: String,
}
