//! Page template and form structs.

use askama::Template;
use serde::Deserialize;

use crate::deck::Flashcard;
use crate::filters;
use crate::render::markdown_to_safe_html;
use crate::session::{Phase, Session};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
  pub question: String,
  /// 1-based position shown to the user
  pub position: usize,
  pub total: usize,
  pub show_answer: bool,
  pub answer_html: Option<String>,
  pub submitted_answer: String,
  pub submitted: bool,
  pub feedback_html: Option<String>,
  pub error: Option<String>,
  pub is_first: bool,
  pub is_last: bool,
  pub grading_enabled: bool,
}

impl IndexTemplate {
  pub fn new(card: &Flashcard, session: &Session, grading_enabled: bool) -> Self {
    let answer_html = if session.show_answer {
      markdown_to_safe_html(&card.answer)
    } else {
      None
    };

    Self {
      question: card.question.clone(),
      position: session.index + 1,
      total: session.len(),
      show_answer: session.show_answer,
      answer_html,
      submitted_answer: session.submitted_answer.clone().unwrap_or_default(),
      submitted: session.phase() == Phase::Submitted,
      feedback_html: session.feedback.as_deref().and_then(markdown_to_safe_html),
      error: session.error.clone(),
      is_first: session.is_first(),
      is_last: session.is_last(),
      grading_enabled,
    }
  }
}

/// Served when a template fails to render.
pub const FALLBACK_PAGE: &str = "<!DOCTYPE html><html><head><title>Interview Cards</title></head>\
<body><h1>Something went wrong</h1><p>Please <a href=\"/\">reload the page</a>.</p></body></html>";

/// Render the trainer page for a card and session.
pub fn render_page(card: &Flashcard, session: &Session, grading_enabled: bool) -> String {
  match IndexTemplate::new(card, session, grading_enabled).render() {
    Ok(html) => html,
    Err(e) => {
      tracing::warn!("Failed to render page: {}", e);
      FALLBACK_PAGE.to_string()
    }
  }
}

// ============================================================================
// Form Structs
// ============================================================================

#[derive(Deserialize)]
pub struct SubmitForm {
  #[serde(default)]
  pub answer: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn card() -> Flashcard {
    Flashcard {
      question: "What is <RAII>?".to_string(),
      answer: "Binding **resources** to scope.".to_string(),
    }
  }

  #[test]
  fn test_idle_page() {
    let session = Session::new(3);
    let html = render_page(&card(), &session, true);

    assert!(html.contains("What is &#60;RAII&#62;?"));
    assert!(!html.contains("<RAII>"));
    assert!(html.contains("1 / 3"));
    assert!(!html.contains("<strong>resources</strong>"));
    assert!(!html.contains("class=\"feedback\""));
    assert!(!html.contains("grading-disabled"));
  }

  #[test]
  fn test_answer_shown_when_toggled() {
    let mut session = Session::new(3);
    session.toggle_answer();
    let html = render_page(&card(), &session, true);
    assert!(html.contains("<strong>resources</strong>"));
  }

  #[test]
  fn test_feedback_is_rendered_and_sanitized() {
    let mut session = Session::new(3);
    session.record_submission(
      "my <b>answer</b>".to_string(),
      "Good job!\n\n<script>alert('pwned')</script>".to_string(),
    );
    let html = render_page(&card(), &session, true);

    assert!(html.contains("class=\"feedback\""));
    assert!(html.contains("<p>Good job!</p>"));
    assert!(!html.contains("<script>alert"));
    assert!(!html.contains("pwned"));
    // The typed answer is echoed escaped
    assert!(html.contains("my &#60;b&#62;answer"));
    assert!(!html.contains("my <b>answer"));
  }

  #[test]
  fn test_error_is_shown_with_typed_answer() {
    let mut session = Session::new(3);
    session.record_failure("keep me".into(), "The grading service took too long.".into());
    let html = render_page(&card(), &session, true);

    assert!(html.contains("role=\"alert\""));
    assert!(html.contains("The grading service took too long."));
    assert!(html.contains("keep me"));
  }

  #[test]
  fn test_grading_disabled_banner() {
    let html = render_page(&card(), &Session::new(1), false);
    assert!(html.contains("grading-disabled"));
  }

  #[test]
  fn test_navigation_buttons_disabled_at_bounds() {
    let session = Session::new(1);
    let template = IndexTemplate::new(&card(), &session, true);
    assert!(template.is_first);
    assert!(template.is_last);

    let html = template.render().unwrap();
    assert!(html.contains("formaction=\"/prev\" disabled"));
    assert!(html.contains("formaction=\"/next\" disabled"));
  }

  #[test]
  fn test_empty_feedback_after_sanitization_renders_nothing() {
    let mut session = Session::new(2);
    session.record_submission("a".into(), "<script>x()</script>".into());
    let template = IndexTemplate::new(&card(), &session, true);
    assert!(template.submitted);
    assert!(template.feedback_html.is_none());
  }
}
