/// Product catalog handlers
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use super::api_error;
use super::ApiError;
use super::AppState;
use super::AuthUser;
use crate::api::types::ApiResponse;
use crate::api::types::BrandsResponse;
use crate::api::types::ProductListQuery;
use crate::api::types::ProductSearchQuery;
use crate::models::Product;
use crate::models::ProductQuery;

/// List products with filters and pagination (GET /api/products)
pub async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    info!("GET /api/products");

    let query = ProductQuery {
        brand: params.brand,
        min_price: params.min_price,
        max_price: params.max_price,
        limit: Some(params.limit.clamp(1, 100)),
        offset: Some(params.offset.max(0)),
    };

    match state.database.list_products(query).await {
        Ok(products) => Ok(Json(ApiResponse::success(products))),
        Err(e) => {
            error!("Error fetching products: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching products",
            ))
        }
    }
}

/// Substring search over name, brand and features (GET /api/products/search)
pub async fn search_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<ProductSearchQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    info!("GET /api/products/search: {}", params.query);

    if params.query.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Search query is required"));
    }

    let limit = params.limit.clamp(1, 50);

    match state.database.search_products(&params.query, limit).await {
        Ok(products) => Ok(Json(ApiResponse::success(products))),
        Err(e) => {
            error!("Error searching products: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error searching products",
            ))
        }
    }
}

/// Get a single product (GET /api/products/:id)
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    info!("GET /api/products/{}", product_id);

    match state.database.get_product(product_id).await {
        Ok(Some(product)) => Ok(Json(ApiResponse::success(product))),
        Ok(None) => Err(api_error(StatusCode::NOT_FOUND, "Product not found")),
        Err(e) => {
            error!("Error fetching product {}: {}", product_id, e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching product",
            ))
        }
    }
}

/// List distinct brands (GET /api/products/brands/list)
pub async fn list_brands(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BrandsResponse>>, ApiError> {
    info!("GET /api/products/brands/list");

    match state.database.list_brands().await {
        Ok(brands) => {
            let count = brands.len();
            Ok(Json(ApiResponse::success(BrandsResponse { brands, count })))
        }
        Err(e) => {
            error!("Error fetching brands: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching brands",
            ))
        }
    }
}
