/// API request handlers
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::auth::Claims;
use crate::auth::JwtService;
use crate::auth::TokenBlacklist;
use crate::config::AppConfig;
use crate::database::Database;
use crate::models::User;
use crate::rag::ChatPipeline;

// Re-export sub-modules
pub mod auth;
pub mod chat;
pub mod products;

// Re-export handlers
pub use auth::*;
pub use chat::*;
pub use products::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub database: Arc<Database>,
    pub pipeline: Arc<ChatPipeline>,
    pub jwt: Arc<JwtService>,
    pub blacklist: Arc<TokenBlacklist>,
    pub config: Arc<AppConfig>,
}

/// Error half of a handler result: status code plus serialized message
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::error(message)))
}

/// Catch-all mapping for failures the caller can do nothing about
pub fn internal_error(e: impl std::fmt::Display) -> ApiError {
    tracing::error!("Internal server error: {}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Authenticated caller, extracted from the bearer token
///
/// Rejects with 401 when the token is missing, malformed, revoked, or
/// names a missing or deactivated user.
pub struct AuthUser {
    pub user: User,
    pub claims: Claims,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Missing authorization header"))?
            .to_str()
            .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Invalid authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Invalid authorization header"))?;

        let claims = state
            .jwt
            .verify_token(token)
            .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Invalid token"))?;

        if state.blacklist.contains(token) {
            return Err(api_error(StatusCode::UNAUTHORIZED, "Token has been revoked"));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Invalid token"))?;

        let user = state
            .database
            .get_user_by_id(user_id)
            .await
            .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Authentication failed"))?;

        match user {
            Some(user) if user.is_active => Ok(Self {
                claims,
                token: token.to_string(),
                user,
            }),
            _ => Err(api_error(
                StatusCode::UNAUTHORIZED,
                "User not found or inactive",
            )),
        }
    }
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
