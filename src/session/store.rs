//! In-memory session storage keyed by session ID (from cookie).
//!
//! Entries idle for longer than the cookie lifetime are dropped, since no
//! browser can present their ID anymore.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::Session;
use crate::config;

/// Session entry with last access time for expiration
struct SessionEntry {
  session: Session,
  last_access: DateTime<Utc>,
}

/// Shared session store; cloning shares the same map.
#[derive(Clone)]
pub struct SessionStore {
  sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
  deck_size: usize,
  shuffle: bool,
  expiry: Duration,
}

impl SessionStore {
  pub fn new(deck_size: usize, shuffle: bool, expiry_hours: i64) -> Self {
    Self {
      sessions: Arc::new(Mutex::new(HashMap::new())),
      deck_size,
      shuffle,
      expiry: Duration::hours(expiry_hours),
    }
  }

  fn new_session(&self) -> Session {
    if self.shuffle {
      Session::shuffled(self.deck_size)
    } else {
      Session::new(self.deck_size)
    }
  }

  /// Get or create a session for the given ID
  pub fn get_or_create(&self, session_id: &str) -> Session {
    // A poisoned map still holds consistent entries; each write replaces a whole session
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      self.cleanup_expired(&mut sessions);
    }

    // Get existing or create new
    if let Some(entry) = sessions.get_mut(session_id) {
      entry.last_access = Utc::now();
      entry.session.clone()
    } else {
      let session = self.new_session();
      tracing::debug!("Created session {}", short_id(session_id));
      sessions.insert(
        session_id.to_string(),
        SessionEntry {
          session: session.clone(),
          last_access: Utc::now(),
        },
      );
      session
    }
  }

  /// Update a session (last write wins)
  pub fn save(&self, session_id: &str, session: Session) {
    let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    sessions.insert(
      session_id.to_string(),
      SessionEntry {
        session,
        last_access: Utc::now(),
      },
    );
  }

  /// Number of live sessions.
  pub fn len(&self) -> usize {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Whether new sessions get a random card order.
  pub fn shuffles(&self) -> bool {
    self.shuffle
  }

  /// Clean up expired sessions
  fn cleanup_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
    let cutoff = Utc::now() - self.expiry;
    let before = sessions.len();
    sessions.retain(|_, entry| entry.last_access > cutoff);
    let removed = before - sessions.len();
    if removed > 0 {
      tracing::debug!("Dropped {} expired sessions", removed);
    }
  }
}

/// Abbreviated ID for log lines.
pub(crate) fn short_id(session_id: &str) -> &str {
  session_id.get(..8).unwrap_or(session_id)
}

/// Length of generated session IDs
const SESSION_ID_LEN: usize = 32;

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// Session IDs end up in log file names, so only generator output is accepted.
pub fn is_valid_session_id(session_id: &str) -> bool {
  session_id.len() == SESSION_ID_LEN
    && session_id
      .bytes()
      .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}
