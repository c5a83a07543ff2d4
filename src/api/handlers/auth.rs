/// Authentication handlers
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use tracing::warn;

use super::api_error;
use super::internal_error;
use super::ApiError;
use super::AppState;
use super::AuthUser;
use crate::api::types::ApiResponse;
use crate::api::types::LoginRequest;
use crate::api::types::LogoutResponse;
use crate::api::types::RegisterRequest;
use crate::api::types::TokenResponse;
use crate::auth::hash_password;
use crate::auth::verify_password;
use crate::models::UserInfo;

/// Register a new account (POST /api/auth/register)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    info!("POST /api/auth/register: {}", req.email);

    if !is_valid_email(&req.email) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid email address"));
    }

    if req.password.len() < 6 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters",
        ));
    }

    let existing = state
        .database
        .get_user_by_email(&req.email)
        .await
        .map_err(internal_error)?;

    if existing.is_some() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Email already registered",
        ));
    }

    let password_hash = hash_password(&req.password).map_err(internal_error)?;

    let user = state
        .database
        .create_user(&req.email, &password_hash, req.name.as_deref())
        .await
        .map_err(internal_error)?;

    let token = state.jwt.generate_token(&user).map_err(internal_error)?;

    info!("✅ Registered new user: {}", user.email);

    Ok(Json(ApiResponse::success(TokenResponse::new(
        token,
        UserInfo::from(user),
    ))))
}

/// Exchange credentials for an access token (POST /api/auth/login)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    info!("POST /api/auth/login: {}", req.email);

    let user = state
        .database
        .get_user_by_email(&req.email)
        .await
        .map_err(internal_error)?;

    // Missing users, wrong passwords and inactive accounts are
    // indistinguishable to the caller
    let Some(user) = user else {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    };

    if !verify_password(&req.password, &user.password_hash) {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    if !user.is_active {
        warn!("Authentication failed: inactive user - {}", req.email);
        return Err(api_error(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let token = state.jwt.generate_token(&user).map_err(internal_error)?;

    info!("✅ User logged in: {}", user.email);

    Ok(Json(ApiResponse::success(TokenResponse::new(
        token,
        UserInfo::from(user),
    ))))
}

/// Revoke the current token (POST /api/auth/logout)
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<ApiResponse<LogoutResponse>> {
    state.blacklist.revoke(auth.token, auth.claims.exp);

    info!("User logged out: {}", auth.user.email);

    Json(ApiResponse::success(LogoutResponse {
        message: "Successfully logged out".to_string(),
    }))
}

/// Return the authenticated account (GET /api/auth/me)
pub async fn me(auth: AuthUser) -> Json<ApiResponse<UserInfo>> {
    Json(ApiResponse::success(UserInfo::from(auth.user)))
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));

        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("alice@example."));
    }
}
