//! Document retrieval with optional score filtering

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::info;

use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::errors::ShopragError;
use crate::rag::DocumentMetadata;
use crate::rag::RetrievedDocument;
use crate::rag::VectorSearch;

/// Retriever over an injected vector index
pub struct Retriever {
    index: Arc<dyn VectorSearch>,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(index: Arc<dyn VectorSearch>) -> Self {
        Self { index }
    }

    /// Fetch up to `k` documents for a query
    ///
    /// Without score filtering this asks the index for exactly `k`
    /// documents and returns them untouched. With filtering it over-fetches
    /// `2 * k` candidates, keeps only those whose score is strictly below
    /// `max_score`, and truncates to `k`. A result shorter than `k` is
    /// returned as-is; there is no second round trip.
    ///
    /// # Errors
    /// - Retrieval errors (index unavailable, embedding failures); any
    ///   index-access error surfaces as a retrieval failure
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        use_score_filter: bool,
        max_score: f32,
    ) -> Result<Vec<RetrievedDocument>> {
        if !use_score_filter {
            debug!("Retrieving top {} documents", k);
            return self
                .index
                .similarity_search(query, k)
                .await
                .map_err(Self::as_retrieval_error);
        }

        let fetch_n = k * 2;
        debug!(
            "Retrieving {} candidates for score filtering (max_score {})",
            fetch_n, max_score
        );

        let candidates = self
            .index
            .similarity_search(query, fetch_n)
            .await
            .map_err(Self::as_retrieval_error)?;

        let total = candidates.len();
        let mut filtered: Vec<RetrievedDocument> = candidates
            .into_iter()
            .filter(|doc| doc.score < max_score)
            .collect();
        let discarded = total - filtered.len();
        filtered.truncate(k);

        info!(
            "Found {} documents after score filtering (requested {})",
            filtered.len(),
            k
        );
        debug!("Score filter discarded {} of {} candidates", discarded, total);

        Ok(filtered)
    }

    fn as_retrieval_error(e: ShopragError) -> ShopragError {
        match e {
            ShopragError::RetrievalError(_) => e,
            other => ShopragError::RetrievalError(other.to_string()),
        }
    }
}

/// Production vector index over the `product_embeddings` table
pub struct ProductIndex {
    database: Arc<Database>,
    embedding_service: Arc<EmbeddingService>,
}

impl ProductIndex {
    /// Create a new product index
    pub fn new(database: Arc<Database>, embedding_service: Arc<EmbeddingService>) -> Self {
        Self {
            database,
            embedding_service,
        }
    }
}

#[async_trait]
impl VectorSearch for ProductIndex {
    async fn similarity_search(
        &self,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedding_service.embed(query).await?;

        let matches = self
            .database
            .similarity_search(query_embedding, top_n as i64)
            .await?;

        let documents = matches
            .into_iter()
            .map(|m| RetrievedDocument {
                text: m.document,
                score: m.score,
                metadata: DocumentMetadata {
                    price: Some(m.price),
                    quantity: Some(m.quantity),
                },
            })
            .collect();

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedIndex {
        scores: Vec<f32>,
    }

    #[async_trait]
    impl VectorSearch for FixedIndex {
        async fn similarity_search(
            &self,
            _query: &str,
            top_n: usize,
        ) -> Result<Vec<RetrievedDocument>> {
            Ok(self
                .scores
                .iter()
                .take(top_n)
                .enumerate()
                .map(|(i, &score)| RetrievedDocument {
                    text: format!("doc {i}"),
                    score,
                    metadata: DocumentMetadata::default(),
                })
                .collect())
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl VectorSearch for FailingIndex {
        async fn similarity_search(
            &self,
            _query: &str,
            _top_n: usize,
        ) -> Result<Vec<RetrievedDocument>> {
            Err(ShopragError::Custom("index offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_filter_keeps_strictly_below_threshold() {
        let retriever = Retriever::new(Arc::new(FixedIndex {
            scores: vec![0.2, 0.8, 1.2, 1.5],
        }));

        let docs = retriever.retrieve("q", 4, true, 1.2).await.unwrap();
        // 1.2 itself must be discarded
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.score < 1.2));
    }

    #[tokio::test]
    async fn test_filter_truncates_to_k() {
        let retriever = Retriever::new(Arc::new(FixedIndex {
            scores: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        }));

        let docs = retriever.retrieve("q", 3, true, 1.0).await.unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].text, "doc 0");
    }

    #[tokio::test]
    async fn test_underfilled_result_is_returned_as_is() {
        let retriever = Retriever::new(Arc::new(FixedIndex {
            scores: vec![1.8, 1.9],
        }));

        let docs = retriever.retrieve("q", 5, true, 1.0).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_index_errors_become_retrieval_errors() {
        let retriever = Retriever::new(Arc::new(FailingIndex));

        let err = retriever.retrieve("q", 3, false, 1.0).await.unwrap_err();
        assert!(matches!(err, ShopragError::RetrievalError(_)));
    }
}
