/*!
 * Client for OpenAI-compatible chat completion endpoints.
 *
 * Both model tiers are served by this client type; they differ only in
 * endpoint, credentials, model name and sampling settings.
 */

use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionProvider, CompletionRequest};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible chat completions client
#[derive(Debug, Clone)]
pub struct OpenAiCompat {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base endpoint URL, e.g. "https://api.openai.com/v1"
    endpoint: String,
    /// Model identifier to request
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Request timeout in seconds, kept for error reporting
    timeout_secs: u64,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// The model to use
    model: String,

    /// Conversation messages (system + user)
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,

    /// Content of the message
    content: String,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Generated choices
    choices: Vec<ChatChoice>,

    /// Token usage information
    usage: Option<ChatUsage>,
}

/// Individual choice in a chat response
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The generated message
    message: ChatMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
struct ChatUsage {
    /// Total tokens consumed by the request
    total_tokens: u64,
}

impl OpenAiCompat {
    /// Create a new client for the given endpoint, model and credentials
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
            timeout_secs,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompat {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_text,
                },
            ],
            temperature: Some(self.temperature),
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Completion API error ({}) from {}: {}", status, self.model, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let text = chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or(ProviderError::EmptyResponse)?;

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let total_tokens = chat_response.usage.map(|u| u.total_tokens).unwrap_or(0);

        Ok(Completion { text, total_tokens })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
