/// Chat handlers
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::api_error;
use super::internal_error;
use super::ApiError;
use super::AppState;
use super::AuthUser;
use crate::api::types::ApiResponse;
use crate::api::types::ChatAskRequest;
use crate::api::types::ChatAskResponse;
use crate::api::types::ChatHealthResponse;
use crate::errors::ShopragError;
use crate::llm::ChatMessage;
use crate::rag::ChatRequest;

/// Answer one chat message with retrieved product context (POST /api/chat/ask)
pub async fn chat_ask(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatAskRequest>,
) -> Result<Json<ApiResponse<ChatAskResponse>>, ApiError> {
    info!("POST /api/chat/ask: user {}", auth.user.id);

    let session_id = req
        .session_id
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| auth.user.id.to_string());

    let business_type = req
        .business_type
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.config.business_type().to_string());

    // Prior turns only; the prompt builder appends the current message itself
    let history: Vec<ChatMessage> = state
        .database
        .recent_history(auth.user.id, &session_id, state.config.history_limit())
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|record| ChatMessage {
            role: record.role,
            content: record.content,
        })
        .collect();

    let request = ChatRequest {
        message: req.message.clone(),
        k: req.k,
        business_type,
        use_score_filter: req.use_score_filter,
        max_score: req.max_score,
    };

    let reply = match state.pipeline.process(&request, &history).await {
        Ok(reply) => reply,
        Err(ShopragError::ValidationError(msg)) => {
            warn!("Validation error: {}", msg);
            return Err(api_error(StatusCode::BAD_REQUEST, msg));
        }
        Err(e @ (ShopragError::RetrievalError(_) | ShopragError::GenerationError(_))) => {
            error!("Processing error: {}", e);
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing chat request",
            ));
        }
        Err(e) => {
            error!("Unexpected error: {}", e);
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ));
        }
    };

    // Persist the exchange only after generation succeeded, so rejected
    // requests never pollute the conversation history
    state
        .database
        .save_chat_message(auth.user.id, &session_id, "user", &req.message)
        .await
        .map_err(internal_error)?;

    state
        .database
        .save_chat_message(auth.user.id, &session_id, "assistant", &reply)
        .await
        .map_err(internal_error)?;

    Ok(Json(ApiResponse::success(ChatAskResponse {
        response: reply,
    })))
}

/// Chat service health (GET /api/chat/health)
///
/// Pushes a synthetic request through the real pipeline, so this costs
/// one embedding call and one completion call per probe.
pub async fn chat_health(State(state): State<AppState>) -> Json<ApiResponse<ChatHealthResponse>> {
    info!("GET /api/chat/health");

    let checks = state.pipeline.health_check().await;

    Json(ApiResponse::success(ChatHealthResponse {
        status: checks.overall.clone(),
        service: "chat".to_string(),
        version: "1.0.0".to_string(),
        checks,
        features: vec![
            "RAG-powered responses".to_string(),
            "Score filtering".to_string(),
            "Business type adaptation".to_string(),
            "Conversation history".to_string(),
        ],
    }))
}
