//! HTTP handlers. Every route answers with the full trainer page.

pub mod templates;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;

use crate::session::{BrowserSession, Session};
use crate::state::AppState;
use crate::trainer::{self, Action};

use templates::{render_page, SubmitForm, FALLBACK_PAGE};

/// Apply an action for the requesting browser and render the result.
async fn handle(state: &AppState, browser: BrowserSession, action: Action) -> Response {
  let session = trainer::apply(state, &browser.id, action).await;
  (browser.jar, Html(page(state, &session))).into_response()
}

fn page(state: &AppState, session: &Session) -> String {
  match state.deck.get(session.card_position()) {
    Some(card) => render_page(card, session, state.grading_enabled),
    None => {
      tracing::warn!("Session position {} is outside the deck", session.card_position());
      FALLBACK_PAGE.to_string()
    }
  }
}

/// GET / - current card
pub async fn index(State(state): State<AppState>, browser: BrowserSession) -> Response {
  handle(&state, browser, Action::Show).await
}

/// POST /next
pub async fn next(State(state): State<AppState>, browser: BrowserSession) -> Response {
  handle(&state, browser, Action::Next).await
}

/// POST /prev
pub async fn prev(State(state): State<AppState>, browser: BrowserSession) -> Response {
  handle(&state, browser, Action::Prev).await
}

/// POST /skip
pub async fn skip(State(state): State<AppState>, browser: BrowserSession) -> Response {
  handle(&state, browser, Action::Skip).await
}

/// POST /toggle-answer
pub async fn toggle_answer(State(state): State<AppState>, browser: BrowserSession) -> Response {
  handle(&state, browser, Action::ToggleAnswer).await
}

/// POST /submit - grade the answer for the current card
///
/// A malformed body re-renders the page instead of sending a bare 4xx.
pub async fn submit(
  State(state): State<AppState>,
  browser: BrowserSession,
  form: Result<Form<SubmitForm>, FormRejection>,
) -> Response {
  match form {
    Ok(Form(form)) => handle(&state, browser, Action::Submit(form.answer)).await,
    Err(e) => {
      tracing::warn!("Rejected submit body: {}", e);
      handle(&state, browser, Action::Show).await
    }
  }
}
