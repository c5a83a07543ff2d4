//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::auth::JwtService;
use crate::auth::TokenBlacklist;
use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;
use crate::rag::ChatPipeline;
use crate::rag::ProductIndex;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting ShopRAG API server...");

    // Initialize services
    let database = Arc::new(Database::from_config(config).await?);

    if !database.is_schema_initialized().await? {
        info!("📦 Initializing database schema");
        database.init_schema(config.embedding_dimension()).await?;
    }

    let embedding_service = Arc::new(EmbeddingService::new(config)?);
    let llm_service = Arc::new(LlmService::new(config)?);
    let index = Arc::new(ProductIndex::new(database.clone(), embedding_service));
    let pipeline = Arc::new(ChatPipeline::from_services(index, llm_service));

    let jwt = Arc::new(JwtService::from_config(config));
    let blacklist = Arc::new(TokenBlacklist::new(
        config.blacklist_cleanup_interval_secs(),
    ));

    let state = AppState {
        database,
        pipeline,
        jwt,
        blacklist,
        config: Arc::new(config.clone()),
    };

    // Build API routes
    let api_router = routes::api_routes(state);

    let mut app = Router::new().nest("/api", api_router);

    // Add middleware layers
    app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("📋 RESTful API available at http://{}/api", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /api/health               - Health check");
    info!("  POST /api/auth/register        - Create an account");
    info!("  POST /api/auth/login           - Log in");
    info!("  POST /api/auth/logout          - Revoke the current token");
    info!("  GET  /api/auth/me              - Current account");
    info!("  POST /api/chat/ask             - Retrieval-augmented chat");
    info!("  GET  /api/chat/health          - Chat pipeline health probe");
    info!("  GET  /api/products             - List products");
    info!("  GET  /api/products/search      - Search products");
    info!("  GET  /api/products/:id         - Get product by id");
    info!("  GET  /api/products/brands/list - List brands");

    axum::serve(listener, app).await?;

    Ok(())
}
