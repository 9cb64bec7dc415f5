//! Chat completions client.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::OpenAiConfig;
use crate::services::advisor::ChatModel;

use super::error::{ApiErrorResponse, OpenAiError};
use super::types::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};

/// `OpenAI` chat completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::InvalidKey` if the API key contains characters
    /// that cannot appear in a header, or `OpenAiError::Http` if the HTTP
    /// client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
            .map_err(|e| OpenAiError::InvalidKey(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(OpenAiClientInner {
                client,
                endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
                model: config.model.clone(),
                temperature: config.temperature,
                max_tokens: config.max_tokens,
            }),
        })
    }

    /// Model identifier sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    /// Send the messages and return the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API answers with an error,
    /// or the reply has no content.
    #[instrument(skip(self, messages), fields(model = %self.inner.model, messages = messages.len()))]
    pub async fn chat(&self, messages: Vec<WireMessage>) -> Result<String, OpenAiError> {
        let request = ChatCompletionRequest {
            model: self.inner.model.clone(),
            messages,
            temperature: self.inner.temperature,
            max_tokens: self.inner.max_tokens,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| OpenAiError::Parse(format!("Failed to parse response: {e}")))?;

        parsed
            .first_content()
            .filter(|content| !content.trim().is_empty())
            .ok_or(OpenAiError::EmptyReply)
    }

    /// Map an error status code to an `OpenAiError`.
    async fn handle_error_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> OpenAiError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(20);
            return OpenAiError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return OpenAiError::Unauthorized("Invalid API key".to_owned());
        }

        match response.text().await {
            Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => OpenAiError::Api {
                    error_type: api_error
                        .error
                        .error_type
                        .unwrap_or_else(|| status.to_string()),
                    message: api_error.error.message,
                },
                Err(_) => OpenAiError::Api {
                    error_type: status.to_string(),
                    message: body.chars().take(200).collect(),
                },
            },
            Err(e) => OpenAiError::Http(e),
        }
    }
}

impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: Vec<WireMessage>) -> Result<String, OpenAiError> {
        self.chat(messages).await
    }
}
