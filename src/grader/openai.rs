//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{FeedbackServiceError, Grader, GradingPrompt};
use crate::config::GraderConfig;

#[derive(Clone)]
pub struct OpenAiGrader {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    subject: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiGrader {
    /// Build a client from config. Returns `NotConfigured` without an API key.
    pub fn from_config(config: &GraderConfig) -> Result<Self, FeedbackServiceError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(FeedbackServiceError::NotConfigured)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedbackServiceError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            subject: config.subject.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request_body(&self, prompt: GradingPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl Grader for OpenAiGrader {
    async fn grade(
        &self,
        question: &str,
        reference_answer: &str,
        user_answer: &str,
    ) -> Result<String, FeedbackServiceError> {
        let prompt = GradingPrompt::new(&self.subject, question, reference_answer, user_answer);
        let payload = self.request_body(prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FeedbackServiceError::Unauthorized(status));
        }
        if !status.is_success() {
            return Err(FeedbackServiceError::HttpStatus(status));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        extract_content(&body)
    }
}

fn map_transport_error(e: reqwest::Error) -> FeedbackServiceError {
    if e.is_timeout() {
        FeedbackServiceError::Timeout
    } else {
        FeedbackServiceError::Network(e.to_string())
    }
}

/// Pull the first choice's message text out of a chat-completions response body.
fn extract_content(body: &str) -> Result<String, FeedbackServiceError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| FeedbackServiceError::MalformedResponse(e.to_string()))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(FeedbackServiceError::EmptyResponse);
    }
    Ok(content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
