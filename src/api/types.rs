//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::UserInfo;
use crate::rag::HealthReport;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token issued on successful registration or login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserInfo,
}

impl TokenResponse {
    pub fn new(access_token: String, user: UserInfo) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }
    }
}

/// Logout confirmation
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatAskRequest {
    pub message: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub use_score_filter: bool,
    #[serde(default = "default_max_score")]
    pub max_score: f32,
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_k() -> usize {
    8
}

fn default_max_score() -> f32 {
    1.2
}

/// Chat response
#[derive(Debug, Serialize)]
pub struct ChatAskResponse {
    pub response: String,
}

/// Chat service health response
#[derive(Debug, Serialize)]
pub struct ChatHealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub checks: HealthReport,
    pub features: Vec<String>,
}

/// Product listing query parameters
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    #[serde(default = "default_product_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
}

fn default_product_limit() -> i64 {
    50
}

/// Product search query parameters
#[derive(Debug, Deserialize)]
pub struct ProductSearchQuery {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    20
}

/// Brand listing response
#[derive(Debug, Serialize)]
pub struct BrandsResponse {
    pub brands: Vec<String>,
    pub count: usize,
}
