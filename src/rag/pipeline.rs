//! Complete chat pipeline: Validate -> Retrieve -> Assemble -> Generate

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::errors::ShopragError;
use crate::llm::ChatMessage;
use crate::llm::LlmService;
use crate::rag::build_chat_prompt;
use crate::rag::Completion;
use crate::rag::ProductIndex;
use crate::rag::Retriever;
use crate::rag::VectorSearch;

/// One chat turn to be answered by the pipeline
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub k: usize,
    pub business_type: String,
    pub use_score_filter: bool,
    pub max_score: f32,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            k: 8,
            business_type: "e-commerce".to_string(),
            use_score_filter: false,
            max_score: 1.2,
        }
    }
}

/// Component statuses reported by the health probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall: String,
    pub rag_pipeline: String,
    pub vector_index: String,
    pub llm_service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn uniform(status: &str, error: Option<String>) -> Self {
        Self {
            overall: status.to_string(),
            rag_pipeline: status.to_string(),
            vector_index: status.to_string(),
            llm_service: status.to_string(),
            error,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.overall == "healthy"
    }
}

/// Complete chat service
///
/// Holds no per-request state; concurrent calls are independent.
pub struct ChatPipeline {
    retriever: Retriever,
    completion: Arc<dyn Completion>,
}

impl ChatPipeline {
    /// Create a new pipeline wired to the production collaborators
    ///
    /// # Errors
    /// - Database connection errors
    /// - Embedding service configuration errors (invalid API keys, endpoints)
    /// - LLM service configuration errors (missing or invalid LLM config)
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let database = Arc::new(Database::from_config(config).await?);
        let embedding_service = Arc::new(EmbeddingService::new(config)?);
        let index = Arc::new(ProductIndex::new(database, embedding_service));
        let llm_service = LlmService::new(config)?;

        Ok(Self::from_services(index, Arc::new(llm_service)))
    }

    /// Create from existing collaborators
    #[must_use]
    pub fn from_services(index: Arc<dyn VectorSearch>, completion: Arc<dyn Completion>) -> Self {
        Self {
            retriever: Retriever::new(index),
            completion,
        }
    }

    /// Answer one chat request against the given conversation history
    ///
    /// # Errors
    /// - Validation errors (empty message, k or max_score out of range);
    ///   rejected before any retrieval or generation call is made
    /// - Retrieval errors (vector index unavailable, embedding failures)
    /// - Generation errors (completion API failures, invalid responses)
    pub async fn process(&self, request: &ChatRequest, history: &[ChatMessage]) -> Result<String> {
        info!("Processing chat request: {}", request.message);

        // Step 1: Validate before touching any collaborator
        debug!("Step 1: Validating request");
        validate_request(request)?;

        // Step 2: Retrieve relevant documents
        debug!("Step 2: Retrieving documents");
        let documents = self
            .retriever
            .retrieve(
                &request.message,
                request.k,
                request.use_score_filter,
                request.max_score,
            )
            .await?;
        debug!("Retrieved {} documents", documents.len());

        // Step 3: Assemble the prompt
        debug!("Step 3: Assembling prompt");
        let messages = build_chat_prompt(
            &documents,
            &request.message,
            history,
            &request.business_type,
        );

        // Step 4: Generate the reply
        debug!("Step 4: Generating reply");
        let reply = self
            .completion
            .complete(&messages)
            .await
            .map_err(|e| match e {
                ShopragError::GenerationError(_) => e,
                other => ShopragError::GenerationError(other.to_string()),
            })?;

        info!("Chat request completed successfully");

        Ok(reply)
    }

    /// Run a synthetic request through the full pipeline and report status
    ///
    /// Every component status is `healthy` when the probe produced a
    /// non-empty reply, `unhealthy` when the reply came back empty, and
    /// `failed` (with the error attached) when any stage errored.
    pub async fn health_check(&self) -> HealthReport {
        debug!("Running health probe");

        let request = ChatRequest {
            message: "test".to_string(),
            k: 1,
            use_score_filter: false,
            ..ChatRequest::default()
        };

        match self.process(&request, &[]).await {
            Ok(reply) if reply.trim().is_empty() => HealthReport::uniform("unhealthy", None),
            Ok(_) => HealthReport::uniform("healthy", None),
            Err(e) => HealthReport::uniform("failed", Some(e.to_string())),
        }
    }
}

fn validate_request(request: &ChatRequest) -> Result<()> {
    if request.message.trim().is_empty() {
        return Err(ShopragError::ValidationError(
            "Message is required".to_string(),
        ));
    }

    if !(1..=20).contains(&request.k) {
        return Err(ShopragError::ValidationError(
            "k must be between 1 and 20".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&request.max_score) {
        return Err(ShopragError::ValidationError(
            "max_score must be between 0.0 and 2.0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = ChatRequest::default();
        assert_eq!(request.k, 8);
        assert_eq!(request.business_type, "e-commerce");
        assert!(!request.use_score_filter);
        assert!((request.max_score - 1.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_validation_bounds() {
        let valid = ChatRequest {
            message: "hello".to_string(),
            ..ChatRequest::default()
        };
        assert!(validate_request(&valid).is_ok());

        for bad in [
            ChatRequest {
                message: "  ".to_string(),
                ..ChatRequest::default()
            },
            ChatRequest {
                message: "hello".to_string(),
                k: 0,
                ..ChatRequest::default()
            },
            ChatRequest {
                message: "hello".to_string(),
                k: 21,
                ..ChatRequest::default()
            },
            ChatRequest {
                message: "hello".to_string(),
                max_score: -0.1,
                ..ChatRequest::default()
            },
            ChatRequest {
                message: "hello".to_string(),
                max_score: 2.1,
                ..ChatRequest::default()
            },
        ] {
            let err = validate_request(&bad).unwrap_err();
            assert!(matches!(err, ShopragError::ValidationError(_)));
        }
    }

    #[test]
    fn test_boundary_values_are_valid() {
        for (k, max_score) in [(1, 0.0), (20, 2.0)] {
            let request = ChatRequest {
                message: "hello".to_string(),
                k,
                max_score,
                ..ChatRequest::default()
            };
            assert!(validate_request(&request).is_ok());
        }
    }
}
