//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end pipeline for grounding chat replies in the product catalog:
//! - Semantic retrieval over product embeddings, with optional
//!   score-threshold filtering
//! - Prompt assembly from system instruction, conversation history and
//!   retrieved context
//! - LLM-based reply generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use shoprag::config::AppConfig;
//! use shoprag::rag::ChatPipeline;
//! use shoprag::rag::ChatRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let pipeline = ChatPipeline::new(&config).await?;
//!
//!     let request = ChatRequest {
//!         message: "Do you have wireless sensors?".to_string(),
//!         ..ChatRequest::default()
//!     };
//!     let reply = pipeline.process(&request, &[]).await?;
//!     println!("Assistant: {reply}");
//!
//!     Ok(())
//! }
//! ```

pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use pipeline::ChatPipeline;
pub use pipeline::ChatRequest;
pub use pipeline::HealthReport;
pub use prompt::build_chat_prompt;
pub use retriever::ProductIndex;
pub use retriever::Retriever;

use async_trait::async_trait;

use crate::errors::Result;
use crate::llm::ChatMessage;

/// Document returned from the vector index
#[derive(Debug, Clone)]
pub struct RetrievedDocument {
    pub text: String,
    /// Cosine distance to the query; lower is closer
    pub score: f32,
    pub metadata: DocumentMetadata,
}

/// Catalog fields carried alongside a retrieved document
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub price: Option<f64>,
    pub quantity: Option<i32>,
}

/// Vector index access used by the retriever
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return the `top_n` closest documents, ordered by ascending score
    async fn similarity_search(&self, query: &str, top_n: usize)
        -> Result<Vec<RetrievedDocument>>;
}

/// Text generation backend used by the pipeline
#[async_trait]
pub trait Completion: Send + Sync {
    /// Send an assembled exchange and return the raw reply text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
