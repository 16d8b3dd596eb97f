//! Answer grading through an external chat-completion service.

mod openai;
mod prompt;

pub use openai::OpenAiGrader;
pub use prompt::{GradingPrompt, NO_ANSWER_PLACEHOLDER};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while grading an answer. Always recoverable per request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackServiceError {
    #[error("grading is not configured (no API key)")]
    NotConfigured,
    #[error("grading request timed out")]
    Timeout,
    #[error("grading service rejected the API key ({0})")]
    Unauthorized(reqwest::StatusCode),
    #[error("grading request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("grading request failed: {0}")]
    Network(String),
    #[error("grading service returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("grading service returned an empty response")]
    EmptyResponse,
}

impl FeedbackServiceError {
    /// Message shown in place of feedback.
    pub fn user_message(&self) -> &'static str {
        match self {
            FeedbackServiceError::NotConfigured => {
                "Grading is disabled: no API key is configured on the server."
            }
            FeedbackServiceError::Timeout => {
                "The grading service took too long to respond. Please try again."
            }
            FeedbackServiceError::Unauthorized(_) => {
                "The grading service rejected the server's API key."
            }
            FeedbackServiceError::HttpStatus(_) | FeedbackServiceError::Network(_) => {
                "Could not reach the grading service. Please try again."
            }
            FeedbackServiceError::MalformedResponse(_) | FeedbackServiceError::EmptyResponse => {
                "The grading service returned an unusable response. Please try again."
            }
        }
    }
}

/// Grades a free-text answer against a reference answer.
///
/// Implementations make at most one attempt per call and return Markdown text.
#[async_trait]
pub trait Grader: Send + Sync {
    async fn grade(
        &self,
        question: &str,
        reference_answer: &str,
        user_answer: &str,
    ) -> Result<String, FeedbackServiceError>;
}

/// Grader used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGrader;

#[async_trait]
impl Grader for DisabledGrader {
    async fn grade(&self, _: &str, _: &str, _: &str) -> Result<String, FeedbackServiceError> {
        Err(FeedbackServiceError::NotConfigured)
    }
}
