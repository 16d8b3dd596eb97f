//! Session state machine driven by the HTTP handlers.
//!
//! Each action loads the session, applies one transition and stores the result.
//! The session store lock is never held across the grading call, so concurrent
//! requests for the same session resolve as last write wins.

use std::time::Instant;

use crate::session::{Session, Step};
use crate::session_log::LogEntry;
use crate::state::AppState;
use crate::util::LogOnError;

/// A user action on the trainer page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  /// Render the current card without changing anything
  Show,
  Next,
  Prev,
  /// Move on without answering; same movement as `Next`
  Skip,
  ToggleAnswer,
  Submit(String),
}

/// Apply an action to a session and return the updated state.
pub async fn apply(state: &AppState, session_id: &str, action: Action) -> Session {
  let mut session = state.sessions.get_or_create(session_id);

  match action {
    Action::Show => return session,
    Action::Next | Action::Skip => {
      session.advance(Step::Next);
    }
    Action::Prev => {
      session.advance(Step::Prev);
    }
    Action::ToggleAnswer => session.toggle_answer(),
    Action::Submit(answer) => submit(state, session_id, &mut session, answer).await,
  }

  state.sessions.save(session_id, session.clone());
  session
}

/// Grade the answer for the current card, log it and store the outcome.
async fn submit(state: &AppState, session_id: &str, session: &mut Session, answer: String) {
  let position = session.card_position();
  let Some(card) = state.deck.get(position) else {
    tracing::warn!("Session points past the deck (card {}); ignoring submit", position);
    return;
  };

  let started = Instant::now();
  let result = state
    .grader
    .grade(&card.question, &card.answer, &answer)
    .await;

  match result {
    Ok(feedback) => {
      tracing::info!(
        "Graded card {} in {} ms",
        position,
        started.elapsed().as_millis()
      );
      state
        .logger
        .append_async(session_id, LogEntry::graded(position, &card.question, &answer, &feedback))
        .await
        .log_warn("Failed to write session log");
      session.record_submission(answer, feedback);
    }
    Err(e) => {
      tracing::warn!("Grading failed for card {}: {}", position, e);
      state
        .logger
        .append_async(session_id, LogEntry::failed(position, &card.question, &answer, &e.to_string()))
        .await
        .log_warn("Failed to write session log");
      session.record_failure(answer, e.user_message().to_string());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::{generate_session_id, Phase};
  use crate::testing::{FailingGrader, FixedGrader, TestEnv};
  use std::sync::Arc;

  #[tokio::test]
  async fn test_navigation_actions() {
    let env = TestEnv::new(Arc::new(FixedGrader::new("fine")));
    let id = generate_session_id();

    assert_eq!(apply(&env.state, &id, Action::Show).await.index, 0);
    assert_eq!(apply(&env.state, &id, Action::Prev).await.index, 0);
    assert_eq!(apply(&env.state, &id, Action::Next).await.index, 1);
    assert_eq!(apply(&env.state, &id, Action::Skip).await.index, 2);
    assert_eq!(apply(&env.state, &id, Action::Next).await.index, 2);
    assert_eq!(apply(&env.state, &id, Action::Prev).await.index, 1);
  }

  #[tokio::test]
  async fn test_submit_stores_feedback_and_logs() {
    let env = TestEnv::new(Arc::new(FixedGrader::new("Good job! Consider mentioning RAII.")));
    let id = generate_session_id();

    let session = apply(&env.state, &id, Action::Submit("answer text".into())).await;
    assert_eq!(session.phase(), Phase::Submitted);
    assert_eq!(session.feedback.as_deref(), Some("Good job! Consider mentioning RAII."));
    assert_eq!(session.submitted_answer.as_deref(), Some("answer text"));

    let rows = env.log_rows(&id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["question"], env.state.deck.get(0).unwrap().question.as_str());
    assert_eq!(rows[0]["user_answer"], "answer text");
    assert_eq!(rows[0]["feedback"], "Good job! Consider mentioning RAII.");
  }

  #[tokio::test]
  async fn test_grader_receives_card_and_answer() {
    let grader = Arc::new(FixedGrader::new("ok"));
    let env = TestEnv::new(grader.clone());
    let id = generate_session_id();

    apply(&env.state, &id, Action::Next).await;
    apply(&env.state, &id, Action::Submit("my take".into())).await;

    let calls = grader.calls();
    let card = env.state.deck.get(1).unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (card.question.clone(), card.answer.clone(), "my take".to_string()));
  }

  #[tokio::test]
  async fn test_failed_submit_keeps_index_and_answer() {
    let env = TestEnv::new(Arc::new(FailingGrader::timeout()));
    let id = generate_session_id();

    apply(&env.state, &id, Action::Next).await;
    let session = apply(&env.state, &id, Action::Submit("draft".into())).await;

    assert_eq!(session.index, 1);
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.submitted_answer.as_deref(), Some("draft"));
    assert!(session.error.is_some());

    let rows = env.log_rows(&id);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["index"], 1);
    assert!(rows[0]["error"].is_string());
  }

  #[tokio::test]
  async fn test_navigation_clears_feedback() {
    let env = TestEnv::new(Arc::new(FixedGrader::new("nice")));
    let id = generate_session_id();

    apply(&env.state, &id, Action::Submit("a".into())).await;
    apply(&env.state, &id, Action::ToggleAnswer).await;
    let session = apply(&env.state, &id, Action::Next).await;
    assert!(session.feedback.is_none());
    assert!(!session.show_answer);

    let session = apply(&env.state, &id, Action::Prev).await;
    assert_eq!(session.index, 0);
    assert!(session.feedback.is_none());
  }

  #[tokio::test]
  async fn test_log_failure_does_not_block_submit() {
    let env = TestEnv::with_unwritable_logs(Arc::new(FixedGrader::new("still shown")));
    let id = generate_session_id();

    let session = apply(&env.state, &id, Action::Submit("x".into())).await;
    assert_eq!(session.feedback.as_deref(), Some("still shown"));
  }
}
