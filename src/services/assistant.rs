// src/services/assistant.rs
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.6;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are Awaken, a careful health assistant for symptom checking. \
Be brief, clear, and non-alarming. Suggest common possibilities and simple self-care steps. \
Avoid definitive diagnoses. Encourage professional care when appropriate.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: status={status}, body={body}")]
    Api { status: u16, body: String },
    #[error("empty completion")]
    EmptyCompletion,
}

/// Generates one stateless symptom-checker reply for a single user
/// utterance in the pivot language. No conversation history is sent.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn generate_reply(&self, user_message: &str) -> Result<String, AssistantError>;
}

/// OpenAI chat-completions implementation.
pub struct OpenAiAssistant {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAssistant {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("failed to build HTTP client"),
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Assistant for OpenAiAssistant {
    async fn generate_reply(&self, user_message: &str) -> Result<String, AssistantError> {
        let body = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ApiMessage {
                    role: "user",
                    content: user_message.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!("assistant request: model={}", body.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status, body });
        }

        let completion: CompletionResponse = response.json().await?;
        let reply = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(AssistantError::EmptyCompletion)?;

        Ok(reply.trim().to_string())
    }
}

#[derive(Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
