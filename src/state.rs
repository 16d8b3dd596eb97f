//! Application state shared by all handlers.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;

use crate::config::{self, Config};
use crate::deck::Deck;
use crate::grader::{DisabledGrader, Grader, OpenAiGrader};
use crate::session::SessionStore;
use crate::session_log::SessionLogger;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only deck loaded at startup
    pub deck: Arc<Deck>,
    pub sessions: SessionStore,
    pub grader: Arc<dyn Grader>,
    pub logger: SessionLogger,
    /// Signing key for the session cookie
    pub cookie_key: Key,
    pub session_expiry_hours: i64,
    /// False when no API key is configured; the page shows a banner
    pub grading_enabled: bool,
}

impl AppState {
    pub fn new(deck: Deck, grader: Arc<dyn Grader>, logger: SessionLogger, cookie_key: Key) -> Self {
        let expiry = config::DEFAULT_SESSION_EXPIRY_HOURS;
        Self {
            sessions: SessionStore::new(deck.len(), false, expiry),
            deck: Arc::new(deck),
            grader,
            logger,
            cookie_key,
            session_expiry_hours: expiry,
            grading_enabled: true,
        }
    }

    /// Walk the deck in a random order per session.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.sessions = SessionStore::new(self.deck.len(), shuffle, self.session_expiry_hours);
        self
    }

    /// Cookie lifetime; the store evicts sessions idle for longer.
    pub fn with_session_expiry_hours(mut self, hours: i64) -> Self {
        self.session_expiry_hours = hours;
        self.sessions = SessionStore::new(self.deck.len(), self.sessions.shuffles(), hours);
        self
    }

    pub fn with_grading_enabled(mut self, enabled: bool) -> Self {
        self.grading_enabled = enabled;
        self
    }

    /// Wire up the real grader, logger and cookie key from configuration.
    pub fn from_config(config: &Config, deck: Deck) -> Self {
        let (grader, enabled): (Arc<dyn Grader>, bool) = match OpenAiGrader::from_config(&config.grader) {
            Ok(grader) => {
                tracing::info!(
                    "Grading enabled: model {} at {}",
                    config.grader.model,
                    config.grader.base_url
                );
                (Arc::new(grader), true)
            }
            Err(e) => {
                tracing::warn!("Grading disabled: {}", e);
                (Arc::new(DisabledGrader), false)
            }
        };

        let key = cookie_key(config.session_secret.as_deref());

        Self::new(deck, grader, SessionLogger::new(&config.log_dir), key)
            .with_session_expiry_hours(config.session_expiry_hours)
            .with_shuffle(config.shuffle_deck)
            .with_grading_enabled(enabled)
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the cookie signing key from the configured secret.
///
/// Without a secret a random key is used, so sessions do not survive a restart.
pub fn cookie_key(secret: Option<&str>) -> Key {
    match secret {
        Some(secret) => {
            let digest = Sha512::digest(secret.as_bytes());
            Key::from(digest.as_slice())
        }
        None => {
            tracing::warn!("SESSION_SECRET not set; using a random key for this process");
            Key::generate()
        }
    }
}
