//! Session cookie extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use std::convert::Infallible;

use super::store::{generate_session_id, is_valid_session_id, short_id};
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "cards_session";

/// The browser's session ID, read from a signed cookie.
///
/// A missing, unsigned or tampered cookie yields a fresh ID. The cookie is
/// re-issued on every request so its lifetime slides with activity; handlers
/// must return `jar` as part of the response.
pub struct BrowserSession {
  pub id: String,
  pub jar: SignedCookieJar,
}

impl FromRequestParts<AppState> for BrowserSession {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
    let jar = match SignedCookieJar::from_request_parts(parts, state).await {
      Ok(jar) => jar,
      Err(never) => match never {},
    };

    let existing = jar
      .get(SESSION_COOKIE_NAME)
      .map(|c| c.value().to_string())
      .filter(|id| is_valid_session_id(id));

    let id = existing.unwrap_or_else(|| {
      let id = generate_session_id();
      tracing::debug!("Issuing new session cookie {}", short_id(&id));
      id
    });

    let cookie = Cookie::build((SESSION_COOKIE_NAME, id.clone()))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(false) // Set to true in production with HTTPS
      .max_age(time::Duration::hours(state.session_expiry_hours))
      .build();

    Ok(BrowserSession {
      id,
      jar: jar.add(cookie),
    })
  }
}
