//! Test utilities: sample deck, stub graders and a throwaway app state.

use async_trait::async_trait;
use axum_extra::extract::cookie::Key;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::deck::{Deck, Flashcard};
use crate::grader::{FeedbackServiceError, Grader};
use crate::session_log::SessionLogger;
use crate::state::AppState;

/// Three-card deck used across tests.
pub fn sample_deck() -> Deck {
    let cards = [
        ("What is RAII?", "Resource lifetime is bound to object lifetime."),
        ("What does `std::move` do?", "It casts its argument to an rvalue reference."),
        ("What is a virtual destructor for?", "Deleting derived objects through a base pointer."),
    ]
    .into_iter()
    .map(|(question, answer)| Flashcard {
        question: question.to_string(),
        answer: answer.to_string(),
    })
    .collect();

    Deck::from_cards(cards).expect("sample deck is non-empty")
}

/// Grader returning fixed text and recording every call.
pub struct FixedGrader {
    text: String,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FixedGrader {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (question, reference answer, user answer) per call, oldest first.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Grader for FixedGrader {
    async fn grade(
        &self,
        question: &str,
        reference_answer: &str,
        user_answer: &str,
    ) -> Result<String, FeedbackServiceError> {
        self.calls.lock().unwrap().push((
            question.to_string(),
            reference_answer.to_string(),
            user_answer.to_string(),
        ));
        Ok(self.text.clone())
    }
}

/// Grader that always fails.
pub struct FailingGrader {
    make_error: fn() -> FeedbackServiceError,
}

impl FailingGrader {
    pub fn timeout() -> Self {
        Self {
            make_error: || FeedbackServiceError::Timeout,
        }
    }
}

#[async_trait]
impl Grader for FailingGrader {
    async fn grade(&self, _: &str, _: &str, _: &str) -> Result<String, FeedbackServiceError> {
        Err((self.make_error)())
    }
}

/// App state backed by a temporary log directory.
pub struct TestEnv {
    /// Kept alive so the log directory survives for the test's duration
    pub _temp: TempDir,
    pub state: AppState,
}

impl TestEnv {
    pub fn new(grader: Arc<dyn Grader>) -> Self {
        let temp = TempDir::new().unwrap();
        let logger = SessionLogger::new(temp.path().join("runs"));
        let state = AppState::new(sample_deck(), grader, logger, Key::generate());
        Self { _temp: temp, state }
    }

    /// Log directory sits below a regular file, so every write fails.
    pub fn with_unwritable_logs(grader: Arc<dyn Grader>) -> Self {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();
        let logger = SessionLogger::new(blocker.join("runs"));
        let state = AppState::new(sample_deck(), grader, logger, Key::generate());
        Self { _temp: temp, state }
    }

    pub fn log_path(&self, session_id: &str) -> PathBuf {
        self.state.logger.path_for(session_id)
    }

    /// Parsed log lines for a session; empty if nothing was logged.
    pub fn log_rows(&self, session_id: &str) -> Vec<serde_json::Value> {
        fs::read_to_string(self.log_path(session_id))
            .map(|content| {
                content
                    .lines()
                    .map(|line| serde_json::from_str(line).unwrap())
                    .collect()
            })
            .unwrap_or_default()
    }
}
