//! End-to-end pipeline tests against stub collaborators

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use shoprag::llm::ChatMessage;
use shoprag::rag::ChatPipeline;
use shoprag::rag::ChatRequest;
use shoprag::rag::Completion;
use shoprag::rag::DocumentMetadata;
use shoprag::rag::RetrievedDocument;
use shoprag::rag::VectorSearch;
use shoprag::Result;
use shoprag::ShopragError;

/// Vector index stub that records every call it receives
struct StubIndex {
    documents: Vec<RetrievedDocument>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, usize)>>,
}

impl StubIndex {
    fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn recorded_requests(&self) -> Vec<(String, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorSearch for StubIndex {
    async fn similarity_search(
        &self,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), top_n));
        Ok(self.documents.iter().take(top_n).cloned().collect())
    }
}

/// Vector index stub that always fails
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

/// Completion stub that returns a fixed reply and records every prompt
struct StubCompletion {
    reply: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubCompletion {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn recorded_prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for StubCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }
}

/// Completion stub that always fails
struct FailingCompletion;

#[async_trait]
impl Completion for FailingCompletion {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Err(ShopragError::Custom("model offline".to_string()))
    }
}

fn document(text: &str, score: f32, price: f64, quantity: i32) -> RetrievedDocument {
    RetrievedDocument {
        text: text.to_string(),
        score,
        metadata: DocumentMetadata {
            price: Some(price),
            quantity: Some(quantity),
        },
    }
}

fn request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        ..ChatRequest::default()
    }
}

#[tokio::test]
async fn test_no_filter_fetches_exactly_k() {
    let index = Arc::new(StubIndex::new(vec![
        document("Wireless Sensor Acme", 0.3, 19.99, 42),
        document("Smart Thermostat Acme", 0.5, 89.50, 15),
    ]));
    let completion = Arc::new(StubCompletion::new("Sure, we have sensors."));
    let pipeline = ChatPipeline::from_services(index.clone(), completion.clone());

    let req = ChatRequest {
        message: "Do you have sensors?".to_string(),
        k: 4,
        use_score_filter: false,
        ..ChatRequest::default()
    };

    let reply = pipeline.process(&req, &[]).await.unwrap();

    assert_eq!(reply, "Sure, we have sensors.");
    assert_eq!(index.call_count(), 1);
    assert_eq!(
        index.recorded_requests(),
        vec![("Do you have sensors?".to_string(), 4)]
    );
}

#[tokio::test]
async fn test_score_filter_overfetches_and_truncates() {
    // Eight candidates with ascending distances; only four are below the
    // threshold, and only k of those may survive
    let documents: Vec<RetrievedDocument> = (0..8)
        .map(|i| document(&format!("Product {i}"), 0.2 + 0.2 * i as f32, 10.0, 1))
        .collect();
    let index = Arc::new(StubIndex::new(documents));
    let completion = Arc::new(StubCompletion::new("Here you go."));
    let pipeline = ChatPipeline::from_services(index.clone(), completion.clone());

    let req = ChatRequest {
        message: "anything cheap?".to_string(),
        k: 3,
        use_score_filter: true,
        max_score: 1.0,
        ..ChatRequest::default()
    };

    pipeline.process(&req, &[]).await.unwrap();

    // One over-fetched call for 2*k candidates, no second round trip
    assert_eq!(
        index.recorded_requests(),
        vec![("anything cheap?".to_string(), 6)]
    );

    // The context entry carries at most k documents, all under the threshold
    let prompts = completion.recorded_prompts();
    let context = &prompts[0][1];
    assert!(context.content.starts_with("Relevant context:\n"));
    let lines: Vec<&str> = context.content.lines().skip(1).collect();
    assert_eq!(lines.len(), 3);
    for line in &lines {
        // Scores 0.2, 0.4, 0.6 pass; 0.8 is dropped by truncation to k
        assert!(
            line.contains("Product 0") || line.contains("Product 1") || line.contains("Product 2")
        );
    }
}

#[tokio::test]
async fn test_score_filter_keeps_fewer_than_k_when_little_passes() {
    let index = Arc::new(StubIndex::new(vec![
        document("Close Match", 0.1, 5.0, 2),
        document("Far Match", 1.8, 5.0, 2),
        document("Far Match 2", 1.9, 5.0, 2),
    ]));
    let completion = Arc::new(StubCompletion::new("One option."));
    let pipeline = ChatPipeline::from_services(index.clone(), completion.clone());

    let req = ChatRequest {
        message: "narrow search".to_string(),
        k: 3,
        use_score_filter: true,
        max_score: 0.5,
        ..ChatRequest::default()
    };

    pipeline.process(&req, &[]).await.unwrap();

    let prompts = completion.recorded_prompts();
    let context = &prompts[0][1];
    let lines: Vec<&str> = context.content.lines().skip(1).collect();
    // Under-filled result is passed through as-is; no retry happened
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Close Match"));
    assert_eq!(index.call_count(), 1);
}

#[tokio::test]
async fn test_prompt_entry_ordering() {
    let index = Arc::new(StubIndex::new(vec![document(
        "Wireless Sensor Acme",
        0.3,
        19.99,
        42,
    )]));
    let completion = Arc::new(StubCompletion::new("We stock wireless sensors."));
    let pipeline = ChatPipeline::from_services(index, completion.clone());

    let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
    let req = ChatRequest {
        message: "Do you have wireless sensors?".to_string(),
        k: 2,
        use_score_filter: false,
        ..ChatRequest::default()
    };

    pipeline.process(&req, &history).await.unwrap();

    let prompts = completion.recorded_prompts();
    let messages = &prompts[0];

    // system, two history turns, one context entry, current message
    assert_eq!(messages.len(), 5);

    assert_eq!(messages[0].role, "system");
    assert!(messages[0]
        .content
        .starts_with("You are a helpful sales assistant for a e-commerce store."));

    assert_eq!(messages[1].role, "user");
    assert_eq!(messages[1].content, "hi");
    assert_eq!(messages[2].role, "assistant");
    assert_eq!(messages[2].content, "hello");

    assert_eq!(messages[3].role, "user");
    assert_eq!(
        messages[3].content,
        "Relevant context:\n- 42x Wireless Sensor Acme (Price: $19.99)"
    );

    assert_eq!(messages[4].role, "user");
    assert_eq!(messages[4].content, "Do you have wireless sensors?");
}

#[tokio::test]
async fn test_empty_retrieval_omits_context_entry() {
    let index = Arc::new(StubIndex::empty());
    let completion = Arc::new(StubCompletion::new("Sorry, nothing matches."));
    let pipeline = ChatPipeline::from_services(index, completion.clone());

    let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];
    let req = request("Do you sell spaceships?");

    pipeline.process(&req, &history).await.unwrap();

    let prompts = completion.recorded_prompts();
    let messages = &prompts[0];

    // system + history + current message only
    assert_eq!(messages.len(), 4);
    assert!(messages
        .iter()
        .all(|m| !m.content.contains("Relevant context")));
    assert_eq!(messages[3].content, "Do you sell spaceships?");
}

#[tokio::test]
async fn test_validation_rejects_before_any_collaborator_call() {
    let cases = [
        ChatRequest {
            message: String::new(),
            ..ChatRequest::default()
        },
        ChatRequest {
            message: "   ".to_string(),
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
    ];

    for req in cases {
        let index = Arc::new(StubIndex::empty());
        let completion = Arc::new(StubCompletion::new("never"));
        let pipeline = ChatPipeline::from_services(index.clone(), completion.clone());

        let err = pipeline.process(&req, &[]).await.unwrap_err();

        assert!(
            matches!(err, ShopragError::ValidationError(_)),
            "expected validation error, got: {err}"
        );
        assert_eq!(index.call_count(), 0);
        assert_eq!(completion.call_count(), 0);
    }
}

#[tokio::test]
async fn test_validation_messages() {
    let index = Arc::new(StubIndex::empty());
    let completion = Arc::new(StubCompletion::new("never"));
    let pipeline = ChatPipeline::from_services(index, completion);

    let empty = pipeline.process(&request(""), &[]).await.unwrap_err();
    assert_eq!(empty.to_string(), "Validation error: Message is required");

    let bad_k = ChatRequest {
        message: "hello".to_string(),
        k: 21,
        ..ChatRequest::default()
    };
    let err = pipeline.process(&bad_k, &[]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: k must be between 1 and 20"
    );

    let bad_score = ChatRequest {
        message: "hello".to_string(),
        max_score: 2.1,
        ..ChatRequest::default()
    };
    let err = pipeline.process(&bad_score, &[]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Validation error: max_score must be between 0.0 and 2.0"
    );
}

#[tokio::test]
async fn test_identical_requests_produce_identical_prompts() {
    let index = Arc::new(StubIndex::new(vec![
        document("Wireless Sensor Acme", 0.3, 19.99, 42),
        document("Door Contact Sensor Orbit", 0.6, 12.0, 120),
    ]));
    let completion = Arc::new(StubCompletion::new("deterministic"));
    let pipeline = ChatPipeline::from_services(index, completion.clone());

    let history = vec![ChatMessage::user("hi")];
    let req = request("any sensors?");

    let first = pipeline.process(&req, &history).await.unwrap();
    let second = pipeline.process(&req, &history).await.unwrap();

    assert_eq!(first, second);

    let prompts = completion.recorded_prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], prompts[1]);
}

#[tokio::test]
async fn test_retrieval_failure_is_tagged_and_skips_generation() {
    let completion = Arc::new(StubCompletion::new("never"));
    let pipeline = ChatPipeline::from_services(Arc::new(FailingIndex), completion.clone());

    let err = pipeline
        .process(&request("anything?"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ShopragError::RetrievalError(_)));
    assert!(err.to_string().contains("index offline"));
    assert_eq!(completion.call_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_is_tagged() {
    let index = Arc::new(StubIndex::new(vec![document("Thing", 0.2, 1.0, 1)]));
    let pipeline = ChatPipeline::from_services(index, Arc::new(FailingCompletion));

    let err = pipeline
        .process(&request("anything?"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ShopragError::GenerationError(_)));
    assert!(err.to_string().contains("model offline"));
}

#[tokio::test]
async fn test_health_probe_healthy() {
    let index = Arc::new(StubIndex::new(vec![document("Thing", 0.2, 1.0, 1)]));
    let completion = Arc::new(StubCompletion::new("alive"));
    let pipeline = ChatPipeline::from_services(index.clone(), completion);

    let report = pipeline.health_check().await;

    assert!(report.is_healthy());
    assert_eq!(report.overall, "healthy");
    assert_eq!(report.rag_pipeline, "healthy");
    assert_eq!(report.vector_index, "healthy");
    assert_eq!(report.llm_service, "healthy");
    assert!(report.error.is_none());

    // The probe asks for a single document
    assert_eq!(index.recorded_requests(), vec![("test".to_string(), 1)]);
}

#[tokio::test]
async fn test_health_probe_unhealthy_on_empty_reply() {
    let index = Arc::new(StubIndex::empty());
    let completion = Arc::new(StubCompletion::new(""));
    let pipeline = ChatPipeline::from_services(index, completion);

    let report = pipeline.health_check().await;

    assert!(!report.is_healthy());
    assert_eq!(report.overall, "unhealthy");
    assert_eq!(report.llm_service, "unhealthy");
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_health_probe_failed_on_error() {
    let pipeline =
        ChatPipeline::from_services(Arc::new(FailingIndex), Arc::new(FailingCompletion));

    let report = pipeline.health_check().await;

    assert_eq!(report.overall, "failed");
    assert_eq!(report.rag_pipeline, "failed");
    assert_eq!(report.vector_index, "failed");
    assert_eq!(report.llm_service, "failed");

    let error = report.error.unwrap();
    assert!(error.contains("index offline"));
}
