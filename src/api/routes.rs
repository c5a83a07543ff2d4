//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Auth endpoints
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/me", get(handlers::me))
        // Chat endpoints
        .route("/chat/ask", post(handlers::chat_ask))
        .route("/chat/health", get(handlers::chat_health))
        // Product endpoints
        .route("/products", get(handlers::list_products))
        .route("/products/search", get(handlers::search_products))
        .route("/products/brands/list", get(handlers::list_brands))
        .route("/products/:id", get(handlers::get_product))
        .with_state(state)
}
