use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AssistantError;

/// A chat model that answers a system + user prompt with plain text.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistantError>;
}

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Client for any OpenAI-compatible `POST {base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AnswerMessage,
}

#[derive(Deserialize)]
struct AnswerMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
            http,
        })
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistantError> {
        let payload = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorResponse>()
                .await
                .map(|err| err.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AssistantError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = res
            .json::<ChatResponse>()
            .await
            .map_err(|err| AssistantError::Decode(err.to_string()))?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::Decode("empty completion".to_string()))
    }
}
