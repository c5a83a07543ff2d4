//! Chat completion client
//!
//! Speaks the `OpenAI` chat completions protocol, with an Ollama variant for
//! local models. One request in, one reply out; streaming is deliberately
//! not supported here.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::errors::ShopragError;
use crate::rag::Completion;

/// One message of a chat exchange, in provider wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Supported completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// `OpenAI`-compatible chat completions API
    OpenAI,
    /// Ollama local chat API
    Ollama,
}

/// Client for chat completions
#[derive(Clone)]
pub struct LlmService {
    provider: LlmProvider,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    temperature: f32,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from the application config
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        // Same provider heuristic as the embeddings client: "ollama" as the
        // key or a local endpoint means Ollama, anything else is OpenAI
        let provider = if config.llm_key() == "ollama" {
            LlmProvider::Ollama
        } else if config.llm_endpoint().contains("api.openai.com") {
            LlmProvider::OpenAI
        } else if config.llm_endpoint().contains("localhost")
            || !config.llm_endpoint().contains("openai")
        {
            LlmProvider::Ollama
        } else {
            LlmProvider::OpenAI
        };

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ShopragError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model: config.llm_model().to_string(),
            endpoint: config.llm_endpoint().to_string(),
            api_key: if provider == LlmProvider::OpenAI {
                Some(config.llm_key().to_string())
            } else {
                None
            },
            temperature: config.llm_temperature(),
            client,
        })
    }

    /// Send a chat exchange and return the assistant reply text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, missing choices)
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        match self.provider {
            LlmProvider::OpenAI => self.chat_openai(messages).await,
            LlmProvider::Ollama => self.chat_ollama(messages).await,
        }
    }

    async fn chat_openai(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ShopragError::ConfigError("OpenAI API key not provided".to_string()))?;

        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat API: {} ({} messages)", url, messages.len());

        let request = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ShopragError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ShopragError::LlmError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ShopragError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ShopragError::LlmError("No choices in response".to_string()))
    }

    async fn chat_ollama(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(Serialize)]
        struct OllamaOptions {
            temperature: f32,
        }

        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            stream: bool,
            options: OllamaOptions,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let url = format!("{}/api/chat", self.endpoint);
        debug!("Calling Ollama chat API: {} ({} messages)", url, messages.len());

        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ShopragError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ShopragError::LlmError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| ShopragError::LlmError(format!("Failed to parse response: {e}")))?;

        Ok(result.message.content)
    }
}

#[async_trait]
impl Completion for LlmService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("a").role, "system");
        assert_eq!(ChatMessage::user("b").role, "user");
        assert_eq!(ChatMessage::assistant("c").role, "assistant");
    }

    #[test]
    fn test_message_wire_format() {
        let message = ChatMessage::user("Do you have wireless sensors?");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "user", "content": "Do you have wireless sensors?"})
        );
    }
}
